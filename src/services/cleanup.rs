use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::repositories::ResetTokenStore;

/// 期限切れかつ未使用のリセットトークンを1回削除する
///
/// 失敗はログに出すだけで呼び出し元には伝播しない
pub async fn purge_expired_tokens<T: ResetTokenStore>(tokens: &T) -> Option<u64> {
    let now = OffsetDateTime::now_utc();
    tracing::info!(now = %now, "期限切れリセットトークンの削除開始");

    match tokens.delete_expired_unused(now).await {
        Ok(deleted) => {
            tracing::info!(deleted, "期限切れリセットトークンの削除完了");
            Some(deleted)
        }
        Err(e) => {
            tracing::error!(error = ?e, "期限切れリセットトークンの削除中にエラー");
            None
        }
    }
}

/// 定期クリーンアップタスクを起動（単一インスタンス）
pub fn spawn_token_cleanup<T: ResetTokenStore>(tokens: T, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // 初回 tick は即時に完了するので起動直後は実行しない
        interval.tick().await;

        loop {
            interval.tick().await;
            purge_expired_tokens(&tokens).await;
        }
    })
}
