use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use rozgar_domain::entities::{Allocation, AllocationStatus, WorkerResponse};
use rozgar_domain::repositories::{AllocationRepository, JobRepository, WorkerRepository};
use rozgar_errors::{RozgarError, RozgarResult};

use crate::ranking::{rank_workers, RankingStrategy};

/// 一次分配运行的结果
#[derive(Debug, Default)]
pub struct AllocationOutcome {
    pub allocated: Vec<Allocation>,
    pub waiting: Vec<Allocation>,
}

/// 作业分配引擎
///
/// 把区县内的候选工人按优先级切分为在岗与候补。重复调用是
/// 幂等的：已持有该作业分配记录的工人被跳过，只补足剩余名额。
pub struct AllocationEngine {
    pub job_repo: Arc<dyn JobRepository>,
    pub worker_repo: Arc<dyn WorkerRepository>,
    pub allocation_repo: Arc<dyn AllocationRepository>,
    pub strategy: Arc<dyn RankingStrategy>,
}

impl AllocationEngine {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        worker_repo: Arc<dyn WorkerRepository>,
        allocation_repo: Arc<dyn AllocationRepository>,
        strategy: Arc<dyn RankingStrategy>,
    ) -> Self {
        Self {
            job_repo,
            worker_repo,
            allocation_repo,
            strategy,
        }
    }

    pub async fn allocate_workers(&self, job_id: &str) -> RozgarResult<AllocationOutcome> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| RozgarError::job_not_found(job_id))?;
        if !job.is_active() {
            return Err(RozgarError::validation_error(format!(
                "作业 {job_id} 已关闭，不能分配"
            )));
        }

        let candidates = self.worker_repo.find_by_district(&job.district).await?;
        if candidates.is_empty() {
            debug!(job_id = %job.id, district = %job.district, "区县内没有候选工人");
            return Ok(AllocationOutcome::default());
        }

        // 幂等: 跳过已持有该作业分配记录的工人，只补足剩余名额
        let existing = self.allocation_repo.find_by_job(&job.id).await?;
        let taken: HashSet<&str> = existing.iter().map(|a| a.worker_id.as_str()).collect();
        let already_allocated = existing.iter().filter(|a| a.is_allocated()).count() as i64;
        let remaining = (job.workers_required - already_allocated).max(0) as usize;

        let fresh: Vec<_> = candidates
            .into_iter()
            .filter(|w| !taken.contains(w.id.as_str()))
            .collect();
        if fresh.is_empty() {
            debug!(job_id = %job.id, "所有候选工人都已有分配记录");
            return Ok(AllocationOutcome::default());
        }

        let ranked = rank_workers(self.strategy.as_ref(), &job, &fresh);
        debug!(
            job_id = %job.id,
            strategy = self.strategy.name(),
            candidates = ranked.len(),
            remaining,
            "候选工人评分完成"
        );

        let batch: Vec<Allocation> = ranked
            .iter()
            .enumerate()
            .map(|(i, (worker, score))| {
                let status = if i < remaining {
                    AllocationStatus::Allocated
                } else {
                    AllocationStatus::Waiting
                };
                Allocation::new(job.id.clone(), worker.id.clone(), status, *score)
            })
            .collect();

        let created = self.allocation_repo.create_batch(&batch).await?;

        let mut outcome = AllocationOutcome::default();
        for alloc in created {
            if alloc.is_allocated() {
                outcome.allocated.push(alloc);
            } else {
                outcome.waiting.push(alloc);
            }
        }
        info!(
            job_id = %job.id,
            allocated = outcome.allocated.len(),
            waiting = outcome.waiting.len(),
            "作业分配完成"
        );
        Ok(outcome)
    }

    /// 转发工人对分配的接受/拒绝决定
    pub async fn respond(
        &self,
        allocation_id: &str,
        response: WorkerResponse,
    ) -> RozgarResult<Allocation> {
        if matches!(response, WorkerResponse::Pending) {
            return Err(RozgarError::validation_error("回复不能为 PENDING"));
        }
        let updated = self
            .allocation_repo
            .update_response(allocation_id, response)
            .await?;
        info!(allocation_id = %updated.id, response = ?updated.response, "工人已回复分配");
        Ok(updated)
    }
}
