use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use rozgar_config::AppConfig;
use rozgar_domain::entities::{
    Allocation, AttendanceRecord, Job, JobPosting, JobStatus, PaymentStatus, WageRecord, Worker,
    WorkerRegistration, WorkerResponse,
};
use rozgar_domain::ports::PasscodeNotifier;
use rozgar_domain::repositories::{
    AllocationRepository, AttendanceRepository, JobRepository, WageRepository, WorkerRepository,
};
use rozgar_engine::{
    with_store_retry, AllocationEngine, AllocationOutcome, AttendanceRecorder, DashboardStats,
    PasscodeService, StatsService, TenureDecayRanking, WageSettlement,
};
use rozgar_errors::{RozgarError, RozgarResult};
use rozgar_infrastructure::{
    create_pool, run_migrations, ConsolePasscodeNotifier, SqliteAllocationRepository,
    SqliteAttendanceRepository, SqliteJobRepository, SqlitePasscodeRepository,
    SqliteWageRepository, SqliteWorkerRepository,
};

/// 组合根
///
/// 负责连接池、迁移与组件装配，并把引擎操作作为唯一门面暴露给
/// 表现层外壳。所有操作返回带类型的 `RozgarResult`，存储细节不
/// 越过这一边界。
pub struct Application {
    pool: SqlitePool,
    worker_repo: Arc<dyn WorkerRepository>,
    job_repo: Arc<dyn JobRepository>,
    allocation_repo: Arc<dyn AllocationRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    wage_repo: Arc<dyn WageRepository>,
    allocation: AllocationEngine,
    passcodes: PasscodeService,
    attendance: AttendanceRecorder,
    settlement: WageSettlement,
    stats: StatsService,
    retry_attempts: u32,
}

impl Application {
    /// 嵌入式启动: 控制台验证码通道
    pub async fn new(config: AppConfig) -> Result<Self> {
        Self::with_notifier(config, Arc::new(ConsolePasscodeNotifier)).await
    }

    /// 使用自定义验证码下发通道启动（短信/邮件网关适配器）
    pub async fn with_notifier(
        config: AppConfig,
        notifier: Arc<dyn PasscodeNotifier>,
    ) -> Result<Self> {
        info!("初始化就业分配与结算引擎");

        let pool = create_pool(&config.database)
            .await
            .context("创建数据库连接池失败")?;
        run_migrations(&pool).await.context("运行数据库迁移失败")?;

        let worker_repo: Arc<dyn WorkerRepository> =
            Arc::new(SqliteWorkerRepository::new(pool.clone()));
        let job_repo: Arc<dyn JobRepository> = Arc::new(SqliteJobRepository::new(pool.clone()));
        let allocation_repo: Arc<dyn AllocationRepository> =
            Arc::new(SqliteAllocationRepository::new(pool.clone()));
        let attendance_repo: Arc<dyn AttendanceRepository> =
            Arc::new(SqliteAttendanceRepository::new(pool.clone()));
        let wage_repo: Arc<dyn WageRepository> =
            Arc::new(SqliteWageRepository::new(pool.clone()));
        let passcode_repo = Arc::new(SqlitePasscodeRepository::new(pool.clone()));

        let allocation = AllocationEngine::new(
            job_repo.clone(),
            worker_repo.clone(),
            allocation_repo.clone(),
            Arc::new(TenureDecayRanking::new()),
        );
        let passcodes = PasscodeService::new(
            passcode_repo,
            notifier,
            config.engine.passcode_expiry_minutes,
        );
        let attendance = AttendanceRecorder::new(
            worker_repo.clone(),
            job_repo.clone(),
            attendance_repo.clone(),
        );
        let settlement =
            WageSettlement::new(attendance_repo.clone(), job_repo.clone(), wage_repo.clone());
        let stats = StatsService::new(
            worker_repo.clone(),
            job_repo.clone(),
            allocation_repo.clone(),
            wage_repo.clone(),
        );

        info!("引擎初始化完成");
        Ok(Self {
            pool,
            worker_repo,
            job_repo,
            allocation_repo,
            attendance_repo,
            wage_repo,
            allocation,
            passcodes,
            attendance,
            settlement,
            stats,
            retry_attempts: config.engine.store_retry_attempts,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- 注册与作业管理（外部协作方入口） ----

    pub async fn register_worker(&self, registration: WorkerRegistration) -> RozgarResult<Worker> {
        registration.validate()?;
        self.worker_repo.create(&registration).await
    }

    pub async fn create_job(&self, posting: JobPosting, created_by: &str) -> RozgarResult<Job> {
        posting.validate()?;
        self.job_repo.create(&posting, created_by).await
    }

    pub async fn close_job(&self, job_id: &str) -> RozgarResult<()> {
        if !self
            .job_repo
            .update_status(job_id, JobStatus::Closed)
            .await?
        {
            return Err(RozgarError::job_not_found(job_id));
        }
        Ok(())
    }

    // ---- 引擎操作 ----

    /// 为作业分配工人（重复调用幂等）
    pub async fn allocate_workers(&self, job_id: &str) -> RozgarResult<AllocationOutcome> {
        with_store_retry(self.retry_attempts, || {
            self.allocation.allocate_workers(job_id)
        })
        .await
    }

    /// 签发一次性验证码，验证码经下发通道出站
    pub async fn issue_passcode(&self, contact: &str) -> RozgarResult<()> {
        self.passcodes.issue(contact).await
    }

    /// 校验验证码并记录今日考勤
    pub async fn verify_and_mark_attendance(
        &self,
        contact: &str,
        code: &str,
        job_id: &str,
        supervisor_id: &str,
    ) -> RozgarResult<AttendanceRecord> {
        if !self.passcodes.verify(contact, code).await? {
            return Err(RozgarError::InvalidPasscode);
        }
        with_store_retry(self.retry_attempts, || {
            self.attendance.mark_today(contact, job_id, supervisor_id)
        })
        .await
    }

    /// 记录指定日期考勤。只应在验证码校验通过后调用。
    pub async fn mark_attendance(
        &self,
        contact: &str,
        job_id: &str,
        supervisor_id: &str,
        date: NaiveDate,
    ) -> RozgarResult<AttendanceRecord> {
        with_store_retry(self.retry_attempts, || {
            self.attendance
                .mark_attendance(contact, job_id, supervisor_id, date)
        })
        .await
    }

    /// 转发工人对分配的决定
    pub async fn respond_to_allocation(
        &self,
        allocation_id: &str,
        response: WorkerResponse,
    ) -> RozgarResult<Allocation> {
        self.allocation.respond(allocation_id, response).await
    }

    /// 批量结算工资（重复调用幂等）
    pub async fn settle_wages(&self) -> RozgarResult<Vec<WageRecord>> {
        with_store_retry(self.retry_attempts, || self.settlement.settle_wages()).await
    }

    pub async fn mark_wage_paid(&self, wage_id: &str) -> RozgarResult<WageRecord> {
        self.wage_repo
            .update_payment_status(wage_id, PaymentStatus::Paid)
            .await
    }

    // ---- 只读查询 ----

    pub async fn dashboard_stats(&self) -> RozgarResult<DashboardStats> {
        self.stats.dashboard_stats().await
    }

    pub async fn job_allocations(&self, job_id: &str) -> RozgarResult<Vec<Allocation>> {
        self.allocation_repo.find_by_job(job_id).await
    }

    pub async fn worker_allocations(&self, worker_id: &str) -> RozgarResult<Vec<Allocation>> {
        self.allocation_repo.find_by_worker(worker_id).await
    }

    pub async fn worker_attendance(
        &self,
        worker_id: &str,
    ) -> RozgarResult<Vec<AttendanceRecord>> {
        self.attendance_repo.find_by_worker(worker_id).await
    }

    pub async fn worker_wages(&self, worker_id: &str) -> RozgarResult<Vec<WageRecord>> {
        self.wage_repo.find_by_worker(worker_id).await
    }
}
