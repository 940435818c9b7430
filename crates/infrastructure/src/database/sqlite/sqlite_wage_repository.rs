use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use rozgar_domain::entities::{PaymentStatus, WageRecord};
use rozgar_domain::repositories::WageRepository;
use rozgar_errors::{RozgarError, RozgarResult};

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};
use crate::id_generator::{self, EntityKind};

pub struct SqliteWageRepository {
    pool: SqlitePool,
}

impl SqliteWageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_wage(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<WageRecord> {
        Ok(WageRecord {
            id: row.try_get("id")?,
            worker_id: row.try_get("worker_id")?,
            job_id: row.try_get("job_id")?,
            days_present: row.try_get("days_present")?,
            daily_wage: row.try_get("daily_wage")?,
            total_wage: row.try_get("total_wage")?,
            payment_status: row.try_get("payment_status")?,
            computed_at: row.try_get("computed_at")?,
        })
    }
}

#[async_trait]
impl WageRepository for SqliteWageRepository {
    #[instrument(skip(self, wages, attendance_ids), fields(
        wage_count = wages.len(),
        attendance_count = attendance_ids.len(),
    ))]
    async fn create_settlement(
        &self,
        wages: &[WageRecord],
        attendance_ids: &[String],
    ) -> RozgarResult<Vec<WageRecord>> {
        if wages.is_empty() {
            return Ok(Vec::new());
        }
        let context = OperationContext::new(RepositoryOperation::BatchCreate, "工资记录")
            .with_detail(format!("{}条", wages.len()));

        // 工资写入与出勤的已结算标记在同一事务提交
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        let mut created = Vec::with_capacity(wages.len());
        for wage in wages {
            let id = id_generator::next_id(&mut *tx, EntityKind::Wage).await?;
            sqlx::query(
                r#"
                INSERT INTO wages (id, worker_id, job_id, days_present, daily_wage, total_wage, payment_status, computed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&id)
            .bind(&wage.worker_id)
            .bind(&wage.job_id)
            .bind(wage.days_present)
            .bind(wage.daily_wage)
            .bind(wage.total_wage)
            .bind(wage.payment_status)
            .bind(wage.computed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;
            created.push(WageRecord {
                id,
                ..wage.clone()
            });
        }

        let placeholders: Vec<String> = (1..=attendance_ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "UPDATE attendance SET settled = 1 WHERE settled = 0 AND id IN ({})",
            placeholders.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for attendance_id in attendance_ids {
            query = query.bind(attendance_id);
        }
        let updated = query
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;
        if updated.rows_affected() != attendance_ids.len() as u64 {
            // 并发结算竞争；事务随丢弃回滚，重试时会重新聚合
            return Err(RozgarError::store_conflict("出勤记录已被并发结算"));
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        debug!(count = created.len(), "工资结算批量写入完成");
        Ok(created)
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<WageRecord>> {
        let context = OperationContext::new(RepositoryOperation::Query, "工资记录")
            .with_detail(format!("工人 {worker_id}"));
        let rows = sqlx::query("SELECT * FROM wages WHERE worker_id = ?1 ORDER BY id ASC")
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_wage).collect()
    }

    async fn find_all(&self) -> RozgarResult<Vec<WageRecord>> {
        let context = OperationContext::new(RepositoryOperation::Query, "工资记录");
        let rows = sqlx::query("SELECT * FROM wages ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_wage).collect()
    }

    async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> RozgarResult<WageRecord> {
        let context =
            OperationContext::new(RepositoryOperation::Update, "工资记录").with_id(id.to_string());
        let result = sqlx::query("UPDATE wages SET payment_status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;
        if result.rows_affected() == 0 {
            return Err(RozgarError::WageRecordNotFound { id: id.to_string() });
        }
        let row = sqlx::query("SELECT * FROM wages WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Self::row_to_wage(&row)
    }

    async fn total_settled(&self) -> RozgarResult<f64> {
        let context = OperationContext::new(RepositoryOperation::Query, "工资记录");
        let row = sqlx::query("SELECT COALESCE(SUM(total_wage), 0.0) FROM wages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(row.try_get(0)?)
    }
}
