use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::api::job::NewJob;
use crate::db::models::JobRow;
use crate::db::sql::{CompiledUpdate, FilterClause, SqlValue};

const JOB_SELECT: &str = "id, title, salary, equity, company_handle";

/// Repository for Job database operations
pub struct JobRepository;

impl JobRepository {
    /// Insert a new job and return the full job record
    pub async fn create(pool: &Pool<Postgres>, job: &NewJob) -> Result<JobRow, sqlx::Error> {
        debug!(
            "Creating job: title={}, company_handle={}",
            job.title, job.company_handle
        );

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_SELECT
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(&job.title)
            .bind(job.salary)
            .bind(job.equity)
            .bind(&job.company_handle)
            .fetch_one(pool)
            .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    /// All jobs matching `filter`, ordered by title then id
    pub async fn find_all(
        pool: &Pool<Postgres>,
        filter: FilterClause,
    ) -> Result<Vec<JobRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM jobs {} ORDER BY title, id",
            JOB_SELECT,
            filter.where_sql()
        );
        debug!("Listing jobs: {} ({} bound values)", sql, filter.values.len());

        let mut query = sqlx::query_as::<_, JobRow>(&sql);
        for value in filter.values {
            query = value.bind_to(query);
        }
        query.fetch_all(pool).await
    }

    pub async fn get(pool: &Pool<Postgres>, id: i32) -> Result<Option<JobRow>, sqlx::Error> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_SELECT);
        sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a compiled partial update; `None` when no row has `id`
    pub async fn update(
        pool: &Pool<Postgres>,
        id: i32,
        update: CompiledUpdate<SqlValue>,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            update.set_clause(),
            update.next_placeholder(),
            JOB_SELECT
        );
        debug!("Updating job {}: {}", id, sql);

        let mut query = sqlx::query_as::<_, JobRow>(&sql);
        for value in update.values {
            query = value.bind_to(query);
        }
        query.bind(id).fetch_optional(pool).await
    }

    /// Delete by id; returns the deleted id, or `None` when nothing matched
    pub async fn remove(pool: &Pool<Postgres>, id: i32) -> Result<Option<i32>, sqlx::Error> {
        debug!("Deleting job {}", id);
        sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    //! These run against a throwaway database created by `sqlx::test`.

    use super::*;
    use crate::api::job::JobFilter;
    use crate::db::sql::{compile_partial_update, ColumnMap};
    use indexmap::IndexMap;
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use std::str::FromStr;

    async fn seed(pool: &PgPool) -> Vec<i32> {
        for handle in ["c1", "c2", "c3", "c4"] {
            sqlx::query(
                "INSERT INTO companies (handle, name, description) VALUES ($1, $2, 'desc')",
            )
            .bind(handle)
            .bind(handle.to_uppercase())
            .execute(pool)
            .await
            .unwrap();
        }

        let mut ids = Vec::new();
        for (title, salary, equity, handle) in [
            ("j1", 10000, "0", "c1"),
            ("j2", 20000, "0", "c2"),
            ("j3", 30000, "0.2", "c3"),
            ("j4", 40000, "0.4", "c4"),
        ] {
            let job = NewJob {
                title: title.to_string(),
                salary,
                equity: Decimal::from_str(equity).unwrap(),
                company_handle: handle.to_string(),
            };
            ids.push(JobRepository::create(pool, &job).await.unwrap().id);
        }
        ids
    }

    fn titles(rows: &[JobRow]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL server via DATABASE_URL"]
    async fn filters_select_expected_rows(pool: PgPool) {
        seed(&pool).await;

        let all = JobRepository::find_all(&pool, FilterClause::new()).await.unwrap();
        assert_eq!(titles(&all), vec!["j1", "j2", "j3", "j4"]);

        let rich = JobFilter { min_salary: Some(40000), ..Default::default() };
        let rows = JobRepository::find_all(&pool, rich.compose().unwrap()).await.unwrap();
        assert_eq!(titles(&rows), vec!["j4"]);
        assert_eq!(rows[0].equity, Some(Decimal::from_str("0.4").unwrap()));

        let equity = JobFilter { has_equity: Some(true), ..Default::default() };
        let rows = JobRepository::find_all(&pool, equity.compose().unwrap()).await.unwrap();
        assert_eq!(titles(&rows), vec!["j3", "j4"]);

        let named = JobFilter { title_like: Some("4".to_string()), ..Default::default() };
        let rows = JobRepository::find_all(&pool, named.compose().unwrap()).await.unwrap();
        assert_eq!(titles(&rows), vec!["j4"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL server via DATABASE_URL"]
    async fn update_sets_nulls_and_misses_unknown_ids(pool: PgPool) {
        let ids = seed(&pool).await;

        let mut fields = IndexMap::new();
        fields.insert("title".to_string(), SqlValue::Text(Some("New".to_string())));
        fields.insert("salary".to_string(), SqlValue::Int(None));
        fields.insert("equity".to_string(), SqlValue::Decimal(None));

        let compiled = compile_partial_update(fields.clone(), ColumnMap::IDENTITY).unwrap();
        let row = JobRepository::update(&pool, ids[0], compiled).await.unwrap().unwrap();
        assert_eq!(row.title, "New");
        assert_eq!(row.salary, None);
        assert_eq!(row.equity, None);
        assert_eq!(row.company_handle, "c1");

        let compiled = compile_partial_update(fields, ColumnMap::IDENTITY).unwrap();
        assert!(JobRepository::update(&pool, 0, compiled).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a PostgreSQL server via DATABASE_URL"]
    async fn remove_reports_deleted_id(pool: PgPool) {
        let ids = seed(&pool).await;

        assert_eq!(JobRepository::remove(&pool, ids[0]).await.unwrap(), Some(ids[0]));
        assert!(JobRepository::get(&pool, ids[0]).await.unwrap().is_none());
        assert_eq!(JobRepository::remove(&pool, 0).await.unwrap(), None);
    }
}
