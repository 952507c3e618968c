use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::company::NewCompany;
use crate::db::models::{CompanyJobRow, CompanyRow};
use crate::db::sql::{CompiledUpdate, FilterClause, SqlValue};

const COMPANY_SELECT: &str = "handle, name, description, num_employees, logo_url";

/// Repository for Company database operations
pub struct CompanyRepository;

impl CompanyRepository {
    pub async fn create(
        pool: &Pool<Postgres>,
        company: &NewCompany,
    ) -> Result<CompanyRow, sqlx::Error> {
        debug!("Creating company: handle={}", company.handle);

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_SELECT
        );
        sqlx::query_as::<_, CompanyRow>(&sql)
            .bind(&company.handle)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.num_employees)
            .bind(&company.logo_url)
            .fetch_one(pool)
            .await
    }

    /// All companies matching `filter`, ordered by name
    pub async fn find_all(
        pool: &Pool<Postgres>,
        filter: FilterClause,
    ) -> Result<Vec<CompanyRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM companies {} ORDER BY name",
            COMPANY_SELECT,
            filter.where_sql()
        );
        debug!("Listing companies: {}", sql);

        let mut query = sqlx::query_as::<_, CompanyRow>(&sql);
        for value in filter.values {
            query = value.bind_to(query);
        }
        query.fetch_all(pool).await
    }

    pub async fn get(
        pool: &Pool<Postgres>,
        handle: &str,
    ) -> Result<Option<CompanyRow>, sqlx::Error> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_SELECT);
        sqlx::query_as::<_, CompanyRow>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await
    }

    /// Jobs posted by `handle`, ordered by id
    pub async fn jobs_for(
        pool: &Pool<Postgres>,
        handle: &str,
    ) -> Result<Vec<CompanyJobRow>, sqlx::Error> {
        sqlx::query_as::<_, CompanyJobRow>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &Pool<Postgres>,
        handle: &str,
        update: CompiledUpdate<SqlValue>,
    ) -> Result<Option<CompanyRow>, sqlx::Error> {
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            update.set_clause(),
            update.next_placeholder(),
            COMPANY_SELECT
        );
        debug!("Updating company {}: {}", handle, sql);

        let mut query = sqlx::query_as::<_, CompanyRow>(&sql);
        for value in update.values {
            query = value.bind_to(query);
        }
        query.bind(handle).fetch_optional(pool).await
    }

    /// Delete by handle; its jobs go with it
    pub async fn remove(pool: &Pool<Postgres>, handle: &str) -> Result<Option<String>, sqlx::Error> {
        debug!("Deleting company {}", handle);
        sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await
    }
}
