use serde_json::{Map, Value};
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::db::company_repository::CompanyRepository;
use crate::db::models::CompanyRow;
use crate::db::sql::compile_partial_update;
use crate::error::ServiceError;
use super::dto::CompanyDetail;
use super::models::{CompanyFilter, CompanyUpdate, NewCompany, COMPANY_COLUMNS};

pub struct CompanyService {
    pool: Pool<Postgres>,
}

impl CompanyService {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a company; a taken handle or name is `InvalidInput`
    pub async fn create(&self, company: &NewCompany) -> Result<CompanyRow, ServiceError> {
        info!("Service: Creating company handle={}", company.handle);

        let row = CompanyRepository::create(&self.pool, company)
            .await
            .map_err(|e| ServiceError::from_constraint(e, format!("No company: {}", company.handle)))?;

        info!("Service: Company created handle={}", row.handle);
        Ok(row)
    }

    pub async fn find_all(&self, filter: &CompanyFilter) -> Result<Vec<CompanyRow>, ServiceError> {
        let clause = filter.compose()?;
        let rows = CompanyRepository::find_all(&self.pool, clause).await?;

        info!("Service: Listed {} companies", rows.len());
        Ok(rows)
    }

    /// The company plus its jobs
    pub async fn get(&self, handle: &str) -> Result<CompanyDetail, ServiceError> {
        let company = CompanyRepository::get(&self.pool, handle)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No company: {}", handle)))?;
        let jobs = CompanyRepository::jobs_for(&self.pool, handle).await?;

        Ok(CompanyDetail { company, jobs })
    }

    pub async fn update(
        &self,
        handle: &str,
        body: Map<String, Value>,
    ) -> Result<CompanyRow, ServiceError> {
        let update = CompanyUpdate::try_from(body)?;
        let compiled = compile_partial_update(update.into_fields(), COMPANY_COLUMNS)?;

        info!("Service: Updating company handle={} fields={}", handle, compiled.set_cols.len());

        CompanyRepository::update(&self.pool, handle, compiled)
            .await
            .map_err(|e| ServiceError::from_constraint(e, format!("No company: {}", handle)))?
            .ok_or_else(|| ServiceError::not_found(format!("No company: {}", handle)))
    }

    pub async fn remove(&self, handle: &str) -> Result<String, ServiceError> {
        let deleted = CompanyRepository::remove(&self.pool, handle)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("No company: {}", handle)))?;

        info!("Service: Deleted company handle={}", deleted);
        Ok(deleted)
    }
}
