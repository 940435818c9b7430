use rozgar_errors::{RozgarError, RozgarResult};

use crate::models::AppConfig;

impl AppConfig {
    pub fn validate(&self) -> RozgarResult<()> {
        if self.database.url.is_empty() {
            return Err(RozgarError::config_error("数据库URL不能为空"));
        }
        if self.database.max_connections == 0 {
            return Err(RozgarError::config_error("数据库最大连接数必须大于0"));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(RozgarError::config_error(
                "数据库最小连接数不能大于最大连接数",
            ));
        }
        if self.engine.passcode_expiry_minutes <= 0 {
            return Err(RozgarError::config_error("验证码有效期必须大于0"));
        }
        if self.engine.store_retry_attempts == 0 {
            return Err(RozgarError::config_error("存储重试次数必须大于0"));
        }
        Ok(())
    }
}
