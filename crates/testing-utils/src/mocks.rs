//! Mock implementations for all repository traits and the passcode
//! delivery port. In-memory, no database required.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use rozgar_domain::entities::{
    Allocation, AttendanceRecord, Job, JobPosting, JobStatus, PasscodeToken, PaymentStatus,
    WageRecord, Worker, WorkerRegistration, WorkerResponse,
};
use rozgar_domain::ports::PasscodeNotifier;
use rozgar_domain::repositories::{
    AllocationRepository, AttendanceRepository, JobRepository, PasscodeRepository, WageRepository,
    WorkerRepository,
};
use rozgar_errors::{RozgarError, RozgarResult};

/// Mock implementation of WorkerRepository
#[derive(Debug, Clone, Default)]
pub struct MockWorkerRepository {
    workers: Arc<Mutex<HashMap<String, Worker>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockWorkerRepository {
    pub fn new() -> Self {
        Self {
            workers: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_workers(workers: Vec<Worker>) -> Self {
        let repo = Self::new();
        for worker in workers {
            repo.insert(worker);
        }
        repo
    }

    /// 直接插入已构建的工人记录（绕过注册流程）
    pub fn insert(&self, worker: Worker) {
        self.workers
            .lock()
            .unwrap()
            .insert(worker.id.clone(), worker);
    }

    pub fn get(&self, id: &str) -> Option<Worker> {
        self.workers.lock().unwrap().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkerRepository for MockWorkerRepository {
    async fn create(&self, registration: &WorkerRegistration) -> RozgarResult<Worker> {
        let mut workers = self.workers.lock().unwrap();
        let duplicate = workers.values().any(|w| {
            (!registration.email.is_empty() && w.email == registration.email)
                || (!registration.phone.is_empty() && w.phone == registration.phone)
        });
        if duplicate {
            return Err(RozgarError::validation_error("联系方式已注册"));
        }
        let mut next_id = self.next_id.lock().unwrap();
        let mut worker = Worker::new(registration.clone());
        worker.id = format!("WOR{:04}", *next_id);
        *next_id += 1;
        workers.insert(worker.id.clone(), worker.clone());
        Ok(worker)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Worker>> {
        Ok(self.workers.lock().unwrap().get(id).cloned())
    }

    async fn find_by_contact(&self, contact: &str) -> RozgarResult<Option<Worker>> {
        Ok(self
            .workers
            .lock()
            .unwrap()
            .values()
            .find(|w| w.matches_contact(contact))
            .cloned())
    }

    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Worker>> {
        let mut result: Vec<Worker> = self
            .workers
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.district == district)
            .cloned()
            .collect();
        // 注册顺序
        result.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn count_workers(&self) -> RozgarResult<i64> {
        Ok(self.workers.lock().unwrap().len() as i64)
    }

    async fn count_disabled(&self) -> RozgarResult<i64> {
        Ok(self
            .workers
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.disabled)
            .count() as i64)
    }
}

/// Mock implementation of JobRepository
#[derive(Debug, Clone, Default)]
pub struct MockJobRepository {
    jobs: Arc<Mutex<HashMap<String, Job>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let repo = Self::new();
        for job in jobs {
            repo.insert(job);
        }
        repo
    }

    pub fn insert(&self, job: Job) {
        self.jobs.lock().unwrap().insert(job.id.clone(), job);
    }
}

#[async_trait]
impl JobRepository for MockJobRepository {
    async fn create(&self, posting: &JobPosting, created_by: &str) -> RozgarResult<Job> {
        let mut jobs = self.jobs.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let mut job = Job::new(posting.clone(), created_by.to_string());
        job.id = format!("JOB{:04}", *next_id);
        *next_id += 1;
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Job>> {
        Ok(self.jobs.lock().unwrap().get(id).cloned())
    }

    async fn find_by_district(&self, district: &str) -> RozgarResult<Vec<Job>> {
        let mut result: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.district == district)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn update_status(&self, id: &str, status: JobStatus) -> RozgarResult<bool> {
        match self.jobs.lock().unwrap().get_mut(id) {
            Some(job) => {
                job.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_active(&self) -> RozgarResult<i64> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.is_active())
            .count() as i64)
    }
}

/// Mock implementation of AllocationRepository
#[derive(Debug, Clone, Default)]
pub struct MockAllocationRepository {
    allocations: Arc<Mutex<HashMap<String, Allocation>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockAllocationRepository {
    pub fn new() -> Self {
        Self {
            allocations: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn count(&self) -> usize {
        self.allocations.lock().unwrap().len()
    }
}

#[async_trait]
impl AllocationRepository for MockAllocationRepository {
    async fn create_batch(&self, allocations: &[Allocation]) -> RozgarResult<Vec<Allocation>> {
        let mut store = self.allocations.lock().unwrap();
        // 全部或全无: 先检查唯一性，再写入
        for (i, alloc) in allocations.iter().enumerate() {
            let duplicate_existing = store
                .values()
                .any(|a| a.job_id == alloc.job_id && a.worker_id == alloc.worker_id);
            let duplicate_in_batch = allocations[..i]
                .iter()
                .any(|a| a.job_id == alloc.job_id && a.worker_id == alloc.worker_id);
            if duplicate_existing || duplicate_in_batch {
                return Err(RozgarError::store_conflict(format!(
                    "分配记录已存在: 作业 {} 工人 {}",
                    alloc.job_id, alloc.worker_id
                )));
            }
        }
        let mut next_id = self.next_id.lock().unwrap();
        let mut created = Vec::with_capacity(allocations.len());
        for alloc in allocations {
            let mut alloc = alloc.clone();
            alloc.id = format!("ALLOC{:05}", *next_id);
            *next_id += 1;
            store.insert(alloc.id.clone(), alloc.clone());
            created.push(alloc);
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> RozgarResult<Option<Allocation>> {
        Ok(self.allocations.lock().unwrap().get(id).cloned())
    }

    async fn find_by_job(&self, job_id: &str) -> RozgarResult<Vec<Allocation>> {
        let mut result: Vec<Allocation> = self
            .allocations
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<Allocation>> {
        let mut result: Vec<Allocation> = self
            .allocations
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.worker_id == worker_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn update_response(
        &self,
        id: &str,
        response: WorkerResponse,
    ) -> RozgarResult<Allocation> {
        let mut store = self.allocations.lock().unwrap();
        let alloc = store
            .get_mut(id)
            .ok_or_else(|| RozgarError::allocation_not_found(id))?;
        if !alloc.is_pending_response() {
            return Err(RozgarError::validation_error("该分配已有回复"));
        }
        alloc.response = response;
        Ok(alloc.clone())
    }

    async fn count_allocated(&self) -> RozgarResult<i64> {
        Ok(self
            .allocations
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.is_allocated())
            .count() as i64)
    }
}

/// Mock implementation of AttendanceRepository
///
/// 持有工人仓储的共享句柄，以便在同一步骤里递增累计出勤天数，
/// 与SQLite实现的事务约定一致。
#[derive(Debug, Clone)]
pub struct MockAttendanceRepository {
    records: Arc<Mutex<HashMap<String, AttendanceRecord>>>,
    next_id: Arc<Mutex<i64>>,
    workers: MockWorkerRepository,
}

impl MockAttendanceRepository {
    pub fn new(workers: MockWorkerRepository) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            workers,
        }
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn mark_settled(&self, attendance_ids: &[String]) -> RozgarResult<()> {
        let mut records = self.records.lock().unwrap();
        // 全部或全无: 先验证，再改写
        for id in attendance_ids {
            match records.get(id) {
                Some(record) if !record.settled => {}
                Some(_) => {
                    return Err(RozgarError::store_conflict(format!(
                        "出勤记录已被结算: {id}"
                    )))
                }
                None => {
                    return Err(RozgarError::store_conflict(format!(
                        "出勤记录不存在: {id}"
                    )))
                }
            }
        }
        for id in attendance_ids {
            if let Some(record) = records.get_mut(id) {
                record.settled = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceRepository for MockAttendanceRepository {
    async fn record_present(&self, record: &AttendanceRecord) -> RozgarResult<AttendanceRecord> {
        let mut records = self.records.lock().unwrap();
        let duplicate = records.values().any(|r| {
            r.worker_id == record.worker_id
                && r.job_id == record.job_id
                && r.work_date == record.work_date
        });
        if duplicate {
            return Err(RozgarError::AlreadyMarked {
                worker_id: record.worker_id.clone(),
                job_id: record.job_id.clone(),
                date: record.work_date.to_string(),
            });
        }
        {
            let mut workers = self.workers.workers.lock().unwrap();
            let worker = workers
                .get_mut(&record.worker_id)
                .ok_or_else(|| RozgarError::worker_not_found(&record.worker_id))?;
            worker.days_worked += 1;
        }
        let mut next_id = self.next_id.lock().unwrap();
        let mut record = record.clone();
        record.id = format!("ATT{:05}", *next_id);
        *next_id += 1;
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_worker_job_date(
        &self,
        worker_id: &str,
        job_id: &str,
        date: NaiveDate,
    ) -> RozgarResult<Option<AttendanceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.worker_id == worker_id && r.job_id == job_id && r.work_date == date)
            .cloned())
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<AttendanceRecord>> {
        let mut result: Vec<AttendanceRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.worker_id == worker_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn find_unsettled_present(&self) -> RozgarResult<Vec<AttendanceRecord>> {
        let mut result: Vec<AttendanceRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| !r.settled)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            (&a.worker_id, &a.job_id, a.work_date).cmp(&(&b.worker_id, &b.job_id, b.work_date))
        });
        Ok(result)
    }
}

/// Mock implementation of WageRepository
#[derive(Debug, Clone)]
pub struct MockWageRepository {
    wages: Arc<Mutex<HashMap<String, WageRecord>>>,
    next_id: Arc<Mutex<i64>>,
    attendance: MockAttendanceRepository,
}

impl MockWageRepository {
    pub fn new(attendance: MockAttendanceRepository) -> Self {
        Self {
            wages: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            attendance,
        }
    }

    pub fn count(&self) -> usize {
        self.wages.lock().unwrap().len()
    }
}

#[async_trait]
impl WageRepository for MockWageRepository {
    async fn create_settlement(
        &self,
        wages: &[WageRecord],
        attendance_ids: &[String],
    ) -> RozgarResult<Vec<WageRecord>> {
        // 先标记出勤，失败则整批放弃
        self.attendance.mark_settled(attendance_ids)?;
        let mut store = self.wages.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let mut created = Vec::with_capacity(wages.len());
        for wage in wages {
            let mut wage = wage.clone();
            wage.id = format!("WAGE{:05}", *next_id);
            *next_id += 1;
            store.insert(wage.id.clone(), wage.clone());
            created.push(wage);
        }
        Ok(created)
    }

    async fn find_by_worker(&self, worker_id: &str) -> RozgarResult<Vec<WageRecord>> {
        let mut result: Vec<WageRecord> = self
            .wages
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.worker_id == worker_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn find_all(&self) -> RozgarResult<Vec<WageRecord>> {
        let mut result: Vec<WageRecord> = self.wages.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> RozgarResult<WageRecord> {
        let mut store = self.wages.lock().unwrap();
        let wage = store
            .get_mut(id)
            .ok_or_else(|| RozgarError::WageRecordNotFound { id: id.to_string() })?;
        wage.payment_status = status;
        Ok(wage.clone())
    }

    async fn total_settled(&self) -> RozgarResult<f64> {
        Ok(self
            .wages
            .lock()
            .unwrap()
            .values()
            .map(|w| w.total_wage)
            .sum())
    }
}

/// Mock implementation of PasscodeRepository
#[derive(Debug, Clone, Default)]
pub struct MockPasscodeRepository {
    tokens: Arc<Mutex<Vec<PasscodeToken>>>,
}

impl MockPasscodeRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl PasscodeRepository for MockPasscodeRepository {
    async fn create(&self, token: &PasscodeToken) -> RozgarResult<PasscodeToken> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(token.clone())
    }

    async fn find_latest_unused(
        &self,
        contact: &str,
        code: &str,
    ) -> RozgarResult<Option<PasscodeToken>> {
        let tokens = self.tokens.lock().unwrap();
        // max_by_key 取同时刻里后插入的一条
        Ok(tokens
            .iter()
            .filter(|t| t.contact == contact && t.code == code && !t.used)
            .max_by_key(|t| t.issued_at)
            .cloned())
    }

    async fn consume(&self, id: &str) -> RozgarResult<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && !t.used) {
            Some(token) => {
                token.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Capturing mock of the passcode delivery port
#[derive(Debug, Clone, Default)]
pub struct MockPasscodeNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockPasscodeNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// 最近一次下发给该联系方式的验证码
    pub fn last_code_for(&self, contact: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(c, _)| c == contact)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl PasscodeNotifier for MockPasscodeNotifier {
    async fn notify(&self, contact: &str, code: &str) -> RozgarResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((contact.to_string(), code.to_string()));
        Ok(())
    }
}
