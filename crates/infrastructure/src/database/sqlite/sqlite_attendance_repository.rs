use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use rozgar_domain::entities::AttendanceRecord;
use rozgar_domain::repositories::AttendanceRepository;
use rozgar_errors::{RozgarError, RozgarResult};

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};
use crate::id_generator::{self, EntityKind};

pub struct SqliteAttendanceRepository {
    pool: SqlitePool,
}

impl SqliteAttendanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            worker_id: row.try_get("worker_id")?,
            supervisor_id: row.try_get("supervisor_id")?,
            work_date: row.try_get("work_date")?,
            status: row.try_get("status")?,
            settled: row.try_get("settled")?,
            marked_at: row.try_get("marked_at")?,
        })
    }
}

#[async_trait]
impl AttendanceRepository for SqliteAttendanceRepository {
    #[instrument(skip(self, record), fields(
        worker_id = %record.worker_id,
        job_id = %record.job_id,
        date = %record.work_date,
    ))]
    async fn record_present(&self, record: &AttendanceRecord) -> RozgarResult<AttendanceRecord> {
        let context = OperationContext::new(RepositoryOperation::Create, "考勤记录")
            .with_detail(format!("工人 {} 作业 {}", record.worker_id, record.job_id));

        // 出勤插入与工龄递增在同一事务提交
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        let id = id_generator::next_id(&mut *tx, EntityKind::Attendance).await?;
        sqlx::query(
            r#"
            INSERT INTO attendance (id, job_id, worker_id, supervisor_id, work_date, status, settled, marked_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&record.job_id)
        .bind(&record.worker_id)
        .bind(&record.supervisor_id)
        .bind(record.work_date)
        .bind(record.status)
        .bind(record.settled)
        .bind(record.marked_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if RepositoryErrorHelpers::is_unique_violation(&e) {
                // 唯一索引兜底: 并发标记只有一方成功
                RozgarError::AlreadyMarked {
                    worker_id: record.worker_id.clone(),
                    job_id: record.job_id.clone(),
                    date: record.work_date.to_string(),
                }
            } else {
                RepositoryErrorHelpers::database_error(context.clone(), e)
            }
        })?;

        let updated = sqlx::query("UPDATE workers SET days_worked = days_worked + 1 WHERE id = ?1")
            .bind(&record.worker_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;
        if updated.rows_affected() == 0 {
            // 事务随丢弃回滚，不留下出勤记录
            return Err(RozgarError::worker_not_found(&record.worker_id));
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        debug!(attendance_id = %id, "考勤记录已写入，工龄已递增");
        Ok(AttendanceRecord {
            id,
            ..record.clone()
        })
    }

    async fn find_by_worker_job_date(
        &self,
        worker_id: &str,
        job_id: &str,
        date: NaiveDate,
    ) -> RozgarResult<Option<AttendanceRecord>> {
        let context = OperationContext::new(RepositoryOperation::Read, "考勤记录");
        let row = sqlx::query(
            "SELECT * FROM attendance WHERE worker_id = ?1 AND job_id = ?2 AND work_date = ?3",
        )
        .bind(worker_id)
        .bind(job_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_record(&r)).transpose()
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<AttendanceRecord>> {
        let context = OperationContext::new(RepositoryOperation::Query, "考勤记录")
            .with_detail(format!("工人 {worker_id}"));
        let rows = sqlx::query("SELECT * FROM attendance WHERE worker_id = ?1 ORDER BY id ASC")
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn find_unsettled_present(&self) -> RozgarResult<Vec<AttendanceRecord>> {
        let context = OperationContext::new(RepositoryOperation::Query, "考勤记录")
            .with_detail("未结算".to_string());
        let rows = sqlx::query(
            r#"
            SELECT * FROM attendance
            WHERE settled = 0 AND status = 'PRESENT'
            ORDER BY worker_id ASC, job_id ASC, work_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_record).collect()
    }
}
