use serde::Serialize;
use crate::db::models::{CompanyJobRow, CompanyRow};

#[derive(Serialize)]
pub struct CompanyResponse {
    pub company: CompanyRow,
}

/// A company together with the jobs it posts
#[derive(Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: CompanyRow,
    pub jobs: Vec<CompanyJobRow>,
}

#[derive(Serialize)]
pub struct CompanyDetailResponse {
    pub company: CompanyDetail,
}

#[derive(Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<CompanyRow>,
}

#[derive(Serialize)]
pub struct CompanyDeletedResponse {
    pub deleted: String,
}
