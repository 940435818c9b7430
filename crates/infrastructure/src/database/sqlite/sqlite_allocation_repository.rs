use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use rozgar_domain::entities::{Allocation, WorkerResponse};
use rozgar_domain::repositories::AllocationRepository;
use rozgar_errors::{RozgarError, RozgarResult};

use crate::error_handling::{OperationContext, RepositoryErrorHelpers, RepositoryOperation};
use crate::id_generator::{self, EntityKind};

pub struct SqliteAllocationRepository {
    pool: SqlitePool,
}

impl SqliteAllocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_allocation(row: &sqlx::sqlite::SqliteRow) -> RozgarResult<Allocation> {
        Ok(Allocation {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            worker_id: row.try_get("worker_id")?,
            status: row.try_get("status")?,
            response: row.try_get("response")?,
            priority_score: row.try_get("priority_score")?,
            allocated_at: row.try_get("allocated_at")?,
        })
    }
}

#[async_trait]
impl AllocationRepository for SqliteAllocationRepository {
    #[instrument(skip(self, allocations), fields(count = allocations.len()))]
    async fn create_batch(&self, allocations: &[Allocation]) -> RozgarResult<Vec<Allocation>> {
        if allocations.is_empty() {
            return Ok(Vec::new());
        }
        let context = OperationContext::new(RepositoryOperation::BatchCreate, "分配记录")
            .with_detail(format!("{}条", allocations.len()));

        // 全部或全无: 任一插入失败，事务整体回滚
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context.clone(), e))?;

        let mut created = Vec::with_capacity(allocations.len());
        for alloc in allocations {
            let id = id_generator::next_id(&mut *tx, EntityKind::Allocation).await?;
            sqlx::query(
                r#"
                INSERT INTO allocations (id, job_id, worker_id, status, response, priority_score, allocated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&id)
            .bind(&alloc.job_id)
            .bind(&alloc.worker_id)
            .bind(alloc.status)
            .bind(alloc.response)
            .bind(alloc.priority_score)
            .bind(alloc.allocated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if RepositoryErrorHelpers::is_unique_violation(&e) {
                    // 并发分配竞争；重试时引擎会跳过已存在的记录
                    RozgarError::store_conflict(format!(
                        "分配记录已存在: 作业 {} 工人 {}",
                        alloc.job_id, alloc.worker_id
                    ))
                } else {
                    RepositoryErrorHelpers::database_error(context.clone(), e)
                }
            })?;
            created.push(Allocation {
                id,
                ..alloc.clone()
            });
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        debug!(count = created.len(), "分配记录批量创建完成");
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Allocation>> {
        let context =
            OperationContext::new(RepositoryOperation::Read, "分配记录").with_id(id.to_string());
        let row = sqlx::query("SELECT * FROM allocations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        row.map(|r| Self::row_to_allocation(&r)).transpose()
    }

    async fn find_by_job(&self, job_id: &str) -> RozgarResult<Vec<Allocation>> {
        let context = OperationContext::new(RepositoryOperation::Query, "分配记录")
            .with_detail(format!("作业 {job_id}"));
        let rows = sqlx::query("SELECT * FROM allocations WHERE job_id = ?1 ORDER BY id ASC")
            .bind(job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_allocation).collect()
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<Allocation>> {
        let context = OperationContext::new(RepositoryOperation::Query, "分配记录")
            .with_detail(format!("工人 {worker_id}"));
        let rows = sqlx::query("SELECT * FROM allocations WHERE worker_id = ?1 ORDER BY id ASC")
            .bind(worker_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        rows.iter().map(Self::row_to_allocation).collect()
    }

    async fn update_response(
        &self,
        id: &str,
        response: WorkerResponse,
    ) -> RozgarResult<Allocation> {
        let context =
            OperationContext::new(RepositoryOperation::Update, "分配记录").with_id(id.to_string());

        // 比较交换: 只有 PENDING 状态允许写入回复
        let result =
            sqlx::query("UPDATE allocations SET response = ?1 WHERE id = ?2 AND response = 'PENDING'")
                .bind(response)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(RozgarError::validation_error("该分配已有回复")),
                None => Err(RozgarError::allocation_not_found(id)),
            };
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RozgarError::allocation_not_found(id))
    }

    async fn count_allocated(&self) -> RozgarResult<i64> {
        let context = OperationContext::new(RepositoryOperation::Query, "分配记录");
        let row = sqlx::query("SELECT COUNT(*) FROM allocations WHERE status = 'ALLOCATED'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(context, e))?;
        Ok(row.try_get(0)?)
    }
}
