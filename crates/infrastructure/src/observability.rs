use tracing_subscriber::EnvFilter;

use rozgar_config::LoggingConfig;
use rozgar_errors::{RozgarError, RozgarResult};

/// 初始化tracing订阅器
///
/// 环境变量 RUST_LOG 优先于配置文件中的过滤表达式。
/// 已初始化过的进程内重复调用返回配置错误。
pub fn init_logging(config: &LoggingConfig) -> RozgarResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RozgarError::config_error(format!("无效的日志过滤表达式: {e}")))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| RozgarError::config_error(format!("初始化日志订阅器失败: {e}")))
}
