use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use rozgar_domain::entities::{Worker, WorkerRegistration};
use rozgar_domain::repositories::WorkerRepository;
use rozgar_errors::{RozgarError, RozgarResult};

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};
use crate::id_generator::{self, EntityKind};

pub struct SqliteWorkerRepository {
    pool: SqlitePool,
}

impl SqliteWorkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_worker(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<Worker> {
        Ok(Worker {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            district: row.try_get("district")?,
            disabled: row.try_get("disabled")?,
            days_worked: row.try_get("days_worked")?,
            registered_at: row.try_get("registered_at")?,
        })
    }

    async fn count_where(&self, sql: &str) -> RozgarResult<i64> {
        let context = OperationContext::new(RepositoryOperation::Query, "工人");
        let row = sqlx::query(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(row.try_get(0)?)
    }
}

#[async_trait]
impl WorkerRepository for SqliteWorkerRepository {
    #[instrument(skip(self, registration), fields(name = %registration.name, district = %registration.district))]
    async fn create(&self, registration: &WorkerRegistration) -> RozgarResult<Worker> {
        let context = OperationContext::new(RepositoryOperation::Create, "工人")
            .with_detail(registration.name.clone());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        let id = id_generator::next_id(&mut *tx, EntityKind::Worker).await?;
        let mut worker = Worker::new(registration.clone());
        worker.id = id;

        sqlx::query(
            r#"
            INSERT INTO workers (id, name, email, phone, district, disabled, days_worked, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(&worker.email)
        .bind(&worker.phone)
        .bind(&worker.district)
        .bind(worker.disabled)
        .bind(worker.days_worked)
        .bind(worker.registered_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if RepositoryErrorHelpers::is_unique_violation(&e) {
                RozgarError::validation_error("联系方式已注册")
            } else {
                RepositoryErrorHelpers::database_error(context.clone(), e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        debug!(worker_id = %worker.id, "工人记录已创建");
        Ok(worker)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Worker>> {
        let context =
            OperationContext::new(RepositoryOperation::Read, "工人").with_id(id.to_string());
        let row = sqlx::query("SELECT * FROM workers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_worker(&r)).transpose()
    }

    async fn find_by_contact(&self, contact: &str) -> RozgarResult<Option<Worker>> {
        let context = OperationContext::new(RepositoryOperation::Read, "工人")
            .with_detail(format!("联系方式 {contact}"));
        let row = sqlx::query("SELECT * FROM workers WHERE email = ?1 OR phone = ?1 LIMIT 1")
            .bind(contact)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_worker(&r)).transpose()
    }

    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Worker>> {
        let context = OperationContext::new(RepositoryOperation::Query, "工人")
            .with_detail(format!("区县 {district}"));
        // 注册顺序: 先注册的在前
        let rows = sqlx::query(
            "SELECT * FROM workers WHERE district = ?1 ORDER BY registered_at ASC, id ASC",
        )
        .bind(district)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        rows.iter().map(Self::row_to_worker).collect()
    }

    async fn count_workers(&self) -> RozgarResult<i64> {
        self.count_where("SELECT COUNT(*) FROM workers").await
    }

    async fn count_disabled(&self) -> RozgarResult<i64> {
        self.count_where("SELECT COUNT(*) FROM workers WHERE disabled = 1")
            .await
    }
}
