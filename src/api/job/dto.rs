use serde::Serialize;
use crate::db::models::JobRow;

/// `{"job": {...}}`
#[derive(Serialize)]
pub struct JobResponse {
    pub job: JobRow,
}

/// `{"jobs": [...]}`
#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

/// `{"deleted": id}`
#[derive(Serialize)]
pub struct JobDeletedResponse {
    pub deleted: i32,
}
