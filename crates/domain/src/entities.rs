use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub district: String,
    pub disabled: bool,
    /// 累计出勤天数，只增不减，仅由考勤记录器递增
    pub days_worked: i64,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub district: String,
    pub disabled: bool,
}

impl Worker {
    pub fn new(registration: WorkerRegistration) -> Self {
        Self {
            id: String::new(), // 由存储分配
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            district: registration.district,
            disabled: registration.disabled,
            days_worked: 0,
            registered_at: Utc::now(),
        }
    }
    pub fn matches_contact(&self, contact: &str) -> bool {
        self.email == contact || self.phone == contact
    }
}

impl WorkerRegistration {
    pub fn validate(&self) -> rozgar_errors::RozgarResult<()> {
        if self.name.trim().is_empty() {
            return Err(rozgar_errors::RozgarError::validation_error(
                "工人姓名不能为空",
            ));
        }
        if self.email.trim().is_empty() && self.phone.trim().is_empty() {
            return Err(rozgar_errors::RozgarError::validation_error(
                "必须提供至少一种联系方式",
            ));
        }
        if self.district.trim().is_empty() {
            return Err(rozgar_errors::RozgarError::validation_error(
                "所属区县不能为空",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub district: String,
    pub work_category: String,
    pub start_date: NaiveDate,
    pub duration_days: i64,
    pub workers_required: i64,
    pub daily_wage: f64,
    pub status: JobStatus, // ACTIVE, CLOSED
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub district: String,
    pub work_category: String,
    pub start_date: NaiveDate,
    pub duration_days: i64,
    pub workers_required: i64,
    pub daily_wage: f64,
}

impl Job {
    pub fn new(posting: JobPosting, created_by: String) -> Self {
        Self {
            id: String::new(), // 由存储分配
            district: posting.district,
            work_category: posting.work_category,
            start_date: posting.start_date,
            duration_days: posting.duration_days,
            workers_required: posting.workers_required,
            daily_wage: posting.daily_wage,
            status: JobStatus::Active,
            created_by,
            created_at: Utc::now(),
        }
    }
    pub fn is_active(&self) -> bool {
        matches!(self.status, JobStatus::Active)
    }
}

impl JobPosting {
    pub fn validate(&self) -> rozgar_errors::RozgarResult<()> {
        if self.district.trim().is_empty() {
            return Err(rozgar_errors::RozgarError::validation_error(
                "作业区县不能为空",
            ));
        }
        if self.workers_required < 1 {
            return Err(rozgar_errors::RozgarError::validation_error(
                "需求工人数必须为正整数",
            ));
        }
        if self.daily_wage <= 0.0 {
            return Err(rozgar_errors::RozgarError::validation_error(
                "日工资必须大于0",
            ));
        }
        if self.duration_days < 1 {
            return Err(rozgar_errors::RozgarError::validation_error(
                "工期必须为正整数",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl sqlx::Type<sqlx::Sqlite> for JobStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for JobStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "ACTIVE" => Ok(JobStatus::Active),
            "CLOSED" => Ok(JobStatus::Closed),
            _ => Err(format!("Invalid job status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for JobStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = match self {
            JobStatus::Active => "ACTIVE",
            JobStatus::Closed => "CLOSED",
        };
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: String,
    pub job_id: String,
    pub worker_id: String,
    pub status: AllocationStatus, // ALLOCATED, WAITING
    pub response: WorkerResponse, // PENDING, ACCEPTED, DECLINED
    /// 分配时刻的优先级得分快照
    pub priority_score: i64,
    pub allocated_at: DateTime<Utc>,
}

impl Allocation {
    pub fn new(job_id: String, worker_id: String, status: AllocationStatus, score: i64) -> Self {
        Self {
            id: String::new(), // 由存储分配
            job_id,
            worker_id,
            status,
            response: WorkerResponse::Pending,
            priority_score: score,
            allocated_at: Utc::now(),
        }
    }
    pub fn is_allocated(&self) -> bool {
        matches!(self.status, AllocationStatus::Allocated)
    }
    pub fn is_pending_response(&self) -> bool {
        matches!(self.response, WorkerResponse::Pending)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AllocationStatus {
    #[serde(rename = "ALLOCATED")]
    Allocated,
    #[serde(rename = "WAITING")]
    Waiting,
}

impl sqlx::Type<sqlx::Sqlite> for AllocationStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for AllocationStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "ALLOCATED" => Ok(AllocationStatus::Allocated),
            "WAITING" => Ok(AllocationStatus::Waiting),
            _ => Err(format!("Invalid allocation status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for AllocationStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = match self {
            AllocationStatus::Allocated => "ALLOCATED",
            AllocationStatus::Waiting => "WAITING",
        };
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkerResponse {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "ACCEPTED")]
    Accepted,
    #[serde(rename = "DECLINED")]
    Declined,
}

impl sqlx::Type<sqlx::Sqlite> for WorkerResponse {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for WorkerResponse {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "PENDING" => Ok(WorkerResponse::Pending),
            "ACCEPTED" => Ok(WorkerResponse::Accepted),
            "DECLINED" => Ok(WorkerResponse::Declined),
            _ => Err(format!("Invalid worker response: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for WorkerResponse {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = match self {
            WorkerResponse::Pending => "PENDING",
            WorkerResponse::Accepted => "ACCEPTED",
            WorkerResponse::Declined => "DECLINED",
        };
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub job_id: String,
    pub worker_id: String,
    pub supervisor_id: String,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus, // PRESENT
    /// 已被工资结算消费
    pub settled: bool,
    pub marked_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        job_id: String,
        worker_id: String,
        supervisor_id: String,
        work_date: NaiveDate,
    ) -> Self {
        Self {
            id: String::new(), // 由存储分配
            job_id,
            worker_id,
            supervisor_id,
            work_date,
            status: AttendanceStatus::Present,
            settled: false,
            marked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    #[serde(rename = "PRESENT")]
    Present,
}

impl sqlx::Type<sqlx::Sqlite> for AttendanceStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for AttendanceStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "PRESENT" => Ok(AttendanceStatus::Present),
            _ => Err(format!("Invalid attendance status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for AttendanceStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = match self {
            AttendanceStatus::Present => "PRESENT",
        };
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WageRecord {
    pub id: String,
    pub worker_id: String,
    pub job_id: String,
    pub days_present: i64,
    /// 结算时刻的日工资快照
    pub daily_wage: f64,
    pub total_wage: f64,
    pub payment_status: PaymentStatus, // PENDING, PAID
    pub computed_at: DateTime<Utc>,
}

impl WageRecord {
    pub fn new(worker_id: String, job_id: String, days_present: i64, daily_wage: f64) -> Self {
        Self {
            id: String::new(), // 由存储分配
            worker_id,
            job_id,
            days_present,
            daily_wage,
            total_wage: days_present as f64 * daily_wage,
            payment_status: PaymentStatus::Pending,
            computed_at: Utc::now(),
        }
    }
    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status, PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "PAID")]
    Paid,
}

impl sqlx::Type<sqlx::Sqlite> for PaymentStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for PaymentStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Invalid payment status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for PaymentStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
        };
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasscodeToken {
    pub id: String,
    /// 联系方式（手机号或邮箱），验证码按联系方式下发
    pub contact: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    /// 单次消费标记
    pub used: bool,
}

impl PasscodeToken {
    pub fn new(contact: String, code: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contact,
            code,
            issued_at: Utc::now(),
            used: false,
        }
    }
    pub fn is_expired(&self, validity: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= validity
    }
}
