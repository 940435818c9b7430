//! 分配与结算引擎
//!
//! 五个引擎组件：优先级排序、作业分配、验证码服务、考勤记录、
//! 工资结算，外加面向看板的只读统计。组件只依赖领域仓储接口，
//! 由组合根注入具体存储实现。

pub mod allocation;
pub mod attendance;
pub mod passcode;
pub mod ranking;
pub mod retry;
pub mod settlement;
pub mod stats;

pub use allocation::{AllocationEngine, AllocationOutcome};
pub use attendance::AttendanceRecorder;
pub use passcode::PasscodeService;
pub use ranking::{rank_workers, RankingStrategy, TenureDecayRanking};
pub use retry::with_store_retry;
pub use settlement::WageSettlement;
pub use stats::{DashboardStats, StatsService};
