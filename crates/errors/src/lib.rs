use thiserror::Error;

#[derive(Debug, Error)]
pub enum RozgarError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("作业未找到: {id}")]
    JobNotFound { id: String },
    #[error("工人未找到: {id}")]
    WorkerNotFound { id: String },
    #[error("分配记录未找到: {id}")]
    AllocationNotFound { id: String },
    #[error("工资记录未找到: {id}")]
    WageRecordNotFound { id: String },
    #[error("考勤已记录: 工人 {worker_id} 作业 {job_id} 日期 {date}")]
    AlreadyMarked {
        worker_id: String,
        job_id: String,
        date: String,
    },
    #[error("验证码无效")]
    InvalidPasscode,
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("存储写入冲突: {0}")]
    StoreConflict(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type RozgarResult<T> = Result<T, RozgarError>;

impl RozgarError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn job_not_found<S: Into<String>>(id: S) -> Self {
        Self::JobNotFound { id: id.into() }
    }
    pub fn worker_not_found<S: Into<String>>(id: S) -> Self {
        Self::WorkerNotFound { id: id.into() }
    }
    pub fn allocation_not_found<S: Into<String>>(id: S) -> Self {
        Self::AllocationNotFound { id: id.into() }
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn store_conflict<S: Into<String>>(msg: S) -> Self {
        Self::StoreConflict(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RozgarError::Internal(_) | RozgarError::Configuration(_)
        )
    }
    /// 只有存储层的写冲突允许内部重试；其余错误对调用方终止
    pub fn is_retryable(&self) -> bool {
        matches!(self, RozgarError::StoreConflict(_))
    }
    pub fn user_message(&self) -> &str {
        match self {
            RozgarError::JobNotFound { .. } => "请求的作业不存在",
            RozgarError::WorkerNotFound { .. } => "请求的工人不存在",
            RozgarError::AllocationNotFound { .. } => "请求的分配记录不存在",
            RozgarError::WageRecordNotFound { .. } => "请求的工资记录不存在",
            RozgarError::AlreadyMarked { .. } => "该工人今日考勤已记录",
            RozgarError::InvalidPasscode => "验证码无效",
            RozgarError::ValidationError(_) => "输入数据验证失败",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for RozgarError {
    fn from(err: serde_json::Error) -> Self {
        RozgarError::Serialization(err.to_string())
    }
}
