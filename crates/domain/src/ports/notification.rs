use async_trait::async_trait;

use rozgar_errors::RozgarResult;

/// 验证码下发出站端口
///
/// 引擎只负责生成与校验验证码，下发渠道（短信/邮件网关）由
/// 外部适配器实现。
#[async_trait]
pub trait PasscodeNotifier: Send + Sync {
    async fn notify(&self, contact: &str, code: &str) -> RozgarResult<()>;
}
