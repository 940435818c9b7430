//! 应用配置
//!
//! 配置来源优先级: 环境变量 > TOML配置文件 > 内置默认值。
//! 嵌入式模式 (`AppConfig::embedded_default`) 零配置即可启动。

mod models;
mod validation;

pub use models::{AppConfig, DatabaseConfig, EngineConfig, LoggingConfig};
