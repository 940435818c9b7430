use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use rozgar_domain::entities::{Job, JobPosting, JobStatus};
use rozgar_domain::repositories::JobRepository;
use rozgar_errors::RozgarResult;

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};
use crate::id_generator::{self, EntityKind};

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<Job> {
        Ok(Job {
            id: row.try_get("id")?,
            district: row.try_get("district")?,
            work_category: row.try_get("work_category")?,
            start_date: row.try_get("start_date")?,
            duration_days: row.try_get("duration_days")?,
            workers_required: row.try_get("workers_required")?,
            daily_wage: row.try_get("daily_wage")?,
            status: row.try_get("status")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    #[instrument(skip(self, posting), fields(district = %posting.district, category = %posting.work_category))]
    async fn create(&self, posting: &JobPosting, created_by: &str) -> RozgarResult<Job> {
        let context = OperationContext::new(RepositoryOperation::Create, "作业")
            .with_detail(posting.work_category.clone());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        let id = id_generator::next_id(&mut *tx, EntityKind::Job).await?;
        let mut job = Job::new(posting.clone(), created_by.to_string());
        job.id = id;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, district, work_category, start_date, duration_days,
                              workers_required, daily_wage, status, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&job.id)
        .bind(&job.district)
        .bind(&job.work_category)
        .bind(job.start_date)
        .bind(job.duration_days)
        .bind(job.workers_required)
        .bind(job.daily_wage)
        .bind(job.status)
        .bind(&job.created_by)
        .bind(job.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        debug!(job_id = %job.id, "作业记录已创建");
        Ok(job)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Job>> {
        let context =
            OperationContext::new(RepositoryOperation::Read, "作业").with_id(id.to_string());
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_job(&r)).transpose()
    }

    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Job>> {
        let context = OperationContext::new(RepositoryOperation::Query, "作业")
            .with_detail(format!("区县 {district}"));
        let rows = sqlx::query("SELECT * FROM jobs WHERE district = ?1 ORDER BY id ASC")
            .bind(district)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_job).collect()
    }

    async fn update_status(&self, id: &str, status: JobStatus) -> RozgarResult<bool> {
        let context =
            OperationContext::new(RepositoryOperation::Update, "作业").with_id(id.to_string());
        let result = sqlx::query("UPDATE jobs SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self) -> RozgarResult<i64> {
        let context = OperationContext::new(RepositoryOperation::Query, "作业");
        let row = sqlx::query("SELECT COUNT(*) FROM jobs WHERE status = 'ACTIVE'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(row.try_get(0)?)
    }
}
