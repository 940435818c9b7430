//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则。
//! 引擎只依赖这些接口，从不依赖具体存储格式。
//! 跨实体的原子性约定由需要它的仓储方法承担，接口文档中注明。

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{
    Allocation, AttendanceRecord, Job, JobPosting, JobStatus, PasscodeToken, PaymentStatus,
    WageRecord, Worker, WorkerRegistration, WorkerResponse,
};
use rozgar_errors::RozgarResult;

/// 工人仓储抽象
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// 创建工人记录并分配标识符；联系方式重复时返回 ValidationError
    async fn create(&self, registration: &WorkerRegistration) -> RozgarResult<Worker>;
    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Worker>>;
    /// 按联系方式（手机号或邮箱）解析工人
    async fn find_by_contact(&self, contact: &str) -> RozgarResult<Option<Worker>>;
    /// 按区县查询，结果按注册顺序排列
    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Worker>>;
    async fn count_workers(&self) -> RozgarResult<i64>;
    async fn count_disabled(&self) -> RozgarResult<i64>;
}

/// 作业仓储抽象
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, posting: &JobPosting, created_by: &str) -> RozgarResult<Job>;
    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Job>>;
    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Job>>;
    /// 更新生命周期状态，作业不存在时返回 false
    async fn update_status(&self, id: &str, status: JobStatus) -> RozgarResult<bool>;
    async fn count_active(&self) -> RozgarResult<i64>;
}

/// 分配仓储抽象
#[async_trait]
pub trait AllocationRepository: Send + Sync {
    /// 批量创建一次分配运行的全部记录，同一事务全部提交或全部回滚。
    /// (job, worker) 对重复时整批失败并返回 StoreConflict。
    async fn create_batch(&self, allocations: &[Allocation]) -> RozgarResult<Vec<Allocation>>;
    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Allocation>>;
    async fn find_by_job(&self, job_id: &str) -> RozgarResult<Vec<Allocation>>;
    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<Allocation>>;
    /// 仅当当前回复为 PENDING 时更新（原子比较交换）；
    /// 已回复的记录返回 ValidationError
    async fn update_response(&self, id: &str, response: WorkerResponse)
        -> RozgarResult<Allocation>;
    async fn count_allocated(&self) -> RozgarResult<i64>;
}

/// 考勤仓储抽象
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// 插入出勤记录并递增对应工人的累计出勤天数，
    /// 两个写入在同一事务提交。
    /// (worker, job, date) 重复时返回 AlreadyMarked 且不产生任何变更。
    async fn record_present(&self, record: &AttendanceRecord) -> RozgarResult<AttendanceRecord>;
    async fn find_by_worker_job_date(
        &self,
        worker_id: &str,
        job_id: &str,
        date: NaiveDate,
    ) -> RozgarResult<Option<AttendanceRecord>>;
    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<AttendanceRecord>>;
    /// 尚未结算的出勤记录，按 (worker, job, date) 排序
    async fn find_unsettled_present(&self) -> RozgarResult<Vec<AttendanceRecord>>;
}

/// 工资仓储抽象
#[async_trait]
pub trait WageRepository: Send + Sync {
    /// 写入一批工资记录并把被消费的出勤记录标记为已结算，同一事务。
    /// 出勤记录已被并发结算时整批回滚并返回 StoreConflict。
    async fn create_settlement(
        &self,
        wages: &[WageRecord],
        attendance_ids: &[String],
    ) -> RozgarResult<Vec<WageRecord>>;
    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<WageRecord>>;
    async fn find_all(&self) -> RozgarResult<Vec<WageRecord>>;
    async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> RozgarResult<WageRecord>;
    /// 全部已结算工资总额
    async fn total_settled(&self) -> RozgarResult<f64>;
}

/// 验证码仓储抽象
#[async_trait]
pub trait PasscodeRepository: Send + Sync {
    async fn create(&self, token: &PasscodeToken) -> RozgarResult<PasscodeToken>;
    /// contact + code 匹配且未使用的最近一条
    async fn find_latest_unused(
        &self,
        contact: &str,
        code: &str,
    ) -> RozgarResult<Option<PasscodeToken>>;
    /// 原子比较交换 used=false -> true；已被消费返回 false
    async fn consume(&self, id: &str) -> RozgarResult<bool>;
}
