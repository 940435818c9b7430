//! 标识符序列
//!
//! 人类可读的实体标识符: 类型前缀 + 零填充序号（JOB0001、
//! ALLOC00001 …）。取号通过单行 UPDATE … RETURNING 原子完成，
//! 并发创建不会取到重复序号；在仓储事务内取号则与插入一起
//! 提交或回滚。

use sqlx::Row;

use rozgar_errors::{RozgarError, RozgarResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Worker,
    Job,
    Allocation,
    Attendance,
    Wage,
}

impl EntityKind {
    pub fn sequence_name(self) -> &'static str {
        match self {
            EntityKind::Worker => "worker",
            EntityKind::Job => "job",
            EntityKind::Allocation => "allocation",
            EntityKind::Attendance => "attendance",
            EntityKind::Wage => "wage",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Worker => "WOR",
            EntityKind::Job => "JOB",
            EntityKind::Allocation => "ALLOC",
            EntityKind::Attendance => "ATT",
            EntityKind::Wage => "WAGE",
        }
    }

    pub fn width(self) -> usize {
        match self {
            EntityKind::Worker | EntityKind::Job => 4,
            EntityKind::Allocation | EntityKind::Attendance | EntityKind::Wage => 5,
        }
    }
}

/// 在给定执行器（连接池或事务）上原子取下一个标识符
pub async fn next_id<'c, E>(executor: E, kind: EntityKind) -> RozgarResult<String>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        "UPDATE id_sequences SET next_value = next_value + 1 WHERE name = ?1 RETURNING next_value",
    )
    .bind(kind.sequence_name())
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| {
        RozgarError::Internal(format!("标识符序列缺失: {}", kind.sequence_name()))
    })?;

    let value: i64 = row.try_get("next_value")?;
    Ok(format!(
        "{}{:0width$}",
        kind.prefix(),
        value,
        width = kind.width()
    ))
}
