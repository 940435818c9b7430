use std::sync::Arc;

use rozgar_domain::repositories::{
    AllocationRepository, JobRepository, WageRepository, WorkerRepository,
};
use rozgar_errors::RozgarResult;

/// 看板统计数据
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_workers: i64,
    pub active_jobs: i64,
    pub workers_allocated: i64,
    pub wages_settled: f64,
    pub disabled_workers: i64,
}

/// 只读统计投影，不产生任何变更
pub struct StatsService {
    pub worker_repo: Arc<dyn WorkerRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub allocation_repo: Arc<dyn AllocationRepository>,
    pub wage_repo: Arc<dyn WageRepository>,
}

impl StatsService {
    pub fn new(
        worker_repo: Arc<dyn WorkerRepository>,
        job_repo: Arc<dyn JobRepository>,
        allocation_repo: Arc<dyn AllocationRepository>,
        wage_repo: Arc<dyn WageRepository>,
    ) -> Self {
        Self {
            worker_repo,
            job_repo,
            allocation_repo,
            wage_repo,
        }
    }

    pub async fn dashboard_stats(&self) -> RozgarResult<DashboardStats> {
        Ok(DashboardStats {
            total_workers: self.worker_repo.count_workers().await?,
            active_jobs: self.job_repo.count_active().await?,
            workers_allocated: self.allocation_repo.count_allocated().await?,
            wages_settled: self.wage_repo.total_settled().await?,
            disabled_workers: self.worker_repo.count_disabled().await?,
        })
    }
}
