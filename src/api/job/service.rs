use serde_json::{Map, Value};
use sqlx::{Pool, Postgres};
use tracing::{info, warn};

use crate::db::job_repository::JobRepository;
use crate::db::models::JobRow;
use crate::db::sql::compile_partial_update;
use crate::error::ServiceError;
use super::models::{JobFilter, JobUpdate, NewJob, JOB_COLUMNS};

/// Job service containing business logic
///
/// Every method validates its whole input before the first query runs and
/// turns storage outcomes (missing rows, constraint violations) into
/// `ServiceError` variants.
pub struct JobService {
    pool: Pool<Postgres>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a single job
    ///
    /// # Returns
    /// - `Ok(JobRow)` - Job created, with its generated id
    /// - `Err(ServiceError::NotFound)` - `companyHandle` names no company
    pub async fn create(&self, job: &NewJob) -> Result<JobRow, ServiceError> {
        info!("Service: Creating job title={} company={}", job.title, job.company_handle);

        let row = JobRepository::create(&self.pool, job)
            .await
            .map_err(|e| {
                ServiceError::from_constraint(e, format!("No company: {}", job.company_handle))
            })?;

        info!("Service: Job created successfully with id={}", row.id);
        Ok(row)
    }

    /// List jobs matching `filter`
    pub async fn find_all(&self, filter: &JobFilter) -> Result<Vec<JobRow>, ServiceError> {
        let clause = filter.compose()?;
        let rows = JobRepository::find_all(&self.pool, clause).await?;

        info!("Service: Listed {} jobs", rows.len());
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<JobRow, ServiceError> {
        JobRepository::get(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No job: {}", id)))
    }

    /// Apply a sparse update
    ///
    /// `body` keeps the client's key order; it decides placeholder numbering.
    pub async fn update(&self, id: i32, body: Map<String, Value>) -> Result<JobRow, ServiceError> {
        let update = JobUpdate::try_from(body)?;
        let compiled = compile_partial_update(update.into_fields(), JOB_COLUMNS)?;

        info!("Service: Updating job id={} fields={}", id, compiled.set_cols.len());

        let row = JobRepository::update(&self.pool, id, compiled)
            .await
            .map_err(|e| ServiceError::from_constraint(e, format!("No job: {}", id)))?;

        match row {
            Some(row) => Ok(row),
            None => {
                warn!("Service: Update targeted missing job id={}", id);
                Err(ServiceError::not_found(format!("No job: {}", id)))
            }
        }
    }

    pub async fn remove(&self, id: i32) -> Result<i32, ServiceError> {
        let deleted = JobRepository::remove(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No job: {}", id)))?;

        info!("Service: Deleted job id={}", deleted);
        Ok(deleted)
    }
}
