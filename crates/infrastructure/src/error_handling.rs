//! Error-context helpers for repository operations
//!
//! Maps sqlx failures into the engine taxonomy with operation context and
//! structured logging. SQLITE_BUSY surfaces as the retryable StoreConflict;
//! everything else becomes a terminal DatabaseOperation error.

use std::fmt;

use rozgar_errors::RozgarError;
use tracing::{error, warn};

/// Operation context for repository operations
#[derive(Debug, Clone, Copy)]
pub enum RepositoryOperation {
    Create,
    Read,
    Update,
    Delete,
    Query,
    BatchCreate,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::Read => write!(f, "读取"),
            RepositoryOperation::Update => write!(f, "更新"),
            RepositoryOperation::Delete => write!(f, "删除"),
            RepositoryOperation::Query => write!(f, "查询"),
            RepositoryOperation::BatchCreate => write!(f, "批量创建"),
        }
    }
}

/// Context information for a single repository operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub operation: RepositoryOperation,
    pub entity: &'static str,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
}

impl OperationContext {
    pub fn new(operation: RepositoryOperation, entity: &'static str) -> Self {
        Self {
            operation,
            entity,
            entity_id: None,
            detail: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn entity_description(&self) -> String {
        match &self.entity_id {
            Some(id) => format!("{} (ID: {id})", self.entity),
            None => self.entity.to_string(),
        }
    }
}

pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }

    pub fn database_error(context: OperationContext, err: sqlx::Error) -> RozgarError {
        if let sqlx::Error::Database(ref db) = err {
            let message = db.message();
            if message.contains("database is locked")
                || message.contains("database table is locked")
            {
                warn!(
                    entity = context.entity,
                    operation = %context.operation,
                    "存储写入冲突: {message}"
                );
                return RozgarError::store_conflict(format!(
                    "{}: {message}",
                    context.entity_description()
                ));
            }
        }
        error!(
            entity = context.entity,
            operation = %context.operation,
            detail = context.detail.as_deref().unwrap_or(""),
            error = %err,
            "数据库操作失败"
        );
        RozgarError::database_error(format!(
            "{}{}失败: {err}",
            context.entity_description(),
            context.operation
        ))
    }
}
