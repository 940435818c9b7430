use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::debug;

use rozgar_domain::entities::PasscodeToken;
use rozgar_domain::ports::PasscodeNotifier;
use rozgar_domain::repositories::PasscodeRepository;
use rozgar_errors::RozgarResult;

/// 一次性验证码服务
///
/// 签发6位数字验证码并通过出站端口下发；校验时只消费
/// 最近签发、未使用、未过期的匹配令牌。对调用方只暴露
/// 布尔结果，不区分失败原因。
pub struct PasscodeService {
    pub passcode_repo: Arc<dyn PasscodeRepository>,
    pub notifier: Arc<dyn PasscodeNotifier>,
    validity: Duration,
}

impl PasscodeService {
    pub fn new(
        passcode_repo: Arc<dyn PasscodeRepository>,
        notifier: Arc<dyn PasscodeNotifier>,
        validity_minutes: i64,
    ) -> Self {
        Self {
            passcode_repo,
            notifier,
            validity: Duration::minutes(validity_minutes),
        }
    }

    fn generate_code() -> String {
        rand::rng().random_range(100_000..=999_999).to_string()
    }

    /// 签发验证码。允许同一联系方式存在多个未消费令牌。
    pub async fn issue(&self, contact: &str) -> RozgarResult<()> {
        let code = Self::generate_code();
        let token = PasscodeToken::new(contact.to_string(), code.clone());
        self.passcode_repo.create(&token).await?;
        self.notifier.notify(contact, &code).await?;
        debug!(contact = %contact, token_id = %token.id, "验证码已签发");
        Ok(())
    }

    /// 校验并消费验证码
    ///
    /// 失败路径（无匹配、已过期、已使用、消费竞争失败）一律返回
    /// false 且不产生任何变更。
    pub async fn verify(&self, contact: &str, code: &str) -> RozgarResult<bool> {
        let Some(token) = self.passcode_repo.find_latest_unused(contact, code).await? else {
            debug!(contact = %contact, "验证失败: 无匹配令牌");
            return Ok(false);
        };
        if token.is_expired(self.validity, Utc::now()) {
            debug!(contact = %contact, token_id = %token.id, "验证失败: 令牌已过期");
            return Ok(false);
        }
        // 原子消费；并发校验只有一方成功
        let consumed = self.passcode_repo.consume(&token.id).await?;
        if consumed {
            debug!(contact = %contact, token_id = %token.id, "验证码校验通过");
        }
        Ok(consumed)
    }
}
