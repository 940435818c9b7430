//! 基础设施层
//!
//! SQLite仓储实现、原子标识符序列、仓储错误上下文、日志初始化
//! 以及验证码下发适配器。领域与引擎层只通过仓储接口使用这里的
//! 实现。

pub mod database;
pub mod error_handling;
pub mod id_generator;
pub mod notification;
pub mod observability;

pub use database::sqlite::{
    SqliteAllocationRepository, SqliteAttendanceRepository, SqliteJobRepository,
    SqlitePasscodeRepository, SqliteWageRepository, SqliteWorkerRepository,
};
pub use database::{create_pool, run_migrations};
pub use notification::ConsolePasscodeNotifier;
pub use observability::init_logging;
