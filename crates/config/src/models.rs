use std::path::Path;

use rozgar_errors::{RozgarError, RozgarResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite连接串，例如 `sqlite:rozgar.db`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:rozgar.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing过滤表达式，如 `info` 或 `rozgar=debug,sqlx=warn`
    pub level: String,
    /// 结构化JSON输出
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 验证码有效期（分钟）
    pub passcode_expiry_minutes: i64,
    /// 存储写冲突的内部重试次数上限
    pub store_retry_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            passcode_expiry_minutes: 10,
            store_retry_attempts: 3,
        }
    }
}

impl AppConfig {
    /// 嵌入式默认配置，零配置启动
    pub fn embedded_default() -> Self {
        Self::default()
    }

    /// 从TOML文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> RozgarResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RozgarError::config_error(format!(
                "读取配置文件 {} 失败: {e}",
                path.as_ref().display()
            ))
        })?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| RozgarError::config_error(format!("解析配置文件失败: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置: 可选文件 + 环境变量覆盖
    pub fn load(path: Option<&Path>) -> RozgarResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::embedded_default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        debug!(database_url = %config.database.url, "配置加载完成");
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ROZGAR_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(level) = std::env::var("ROZGAR_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
