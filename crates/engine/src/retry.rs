use std::future::Future;
use std::time::Duration;

use tracing::warn;

use rozgar_errors::RozgarResult;

/// 对存储写冲突做有界重试
///
/// 只重试 `is_retryable()` 的错误。被包裹的操作必须幂等
/// （本引擎的写操作由唯一索引保证），否则不得使用。
pub async fn with_store_retry<T, F, Fut>(max_attempts: u32, mut op: F) -> RozgarResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RozgarResult<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %err, "存储写冲突，准备重试");
                tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
