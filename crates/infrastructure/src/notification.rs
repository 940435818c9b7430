use async_trait::async_trait;
use tracing::info;

use rozgar_domain::ports::PasscodeNotifier;
use rozgar_errors::RozgarResult;

/// 控制台验证码下发器
///
/// 嵌入式/演示环境把验证码输出到运维控制台；生产环境替换为
/// 短信或邮件网关适配器。
pub struct ConsolePasscodeNotifier;

#[async_trait]
impl PasscodeNotifier for ConsolePasscodeNotifier {
    async fn notify(&self, contact: &str, code: &str) -> RozgarResult<()> {
        info!(contact = %contact, "验证码（控制台通道）: {code}");
        Ok(())
    }
}
