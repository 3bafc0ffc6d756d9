use sqlx::FromRow;
use time::OffsetDateTime;

/// パスワードリセットトークン
///
/// トークン自体はSHA256ハッシュ化してDBに保存（token_hash）
/// 平文トークンはユーザーにメールで送信し、DBには保存しない
///
/// 状態: 発行済み → 使用済み（used_at 設定） | 期限切れ（未使用のまま expires_at 経過）
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    /// `now < expires_at` かつ未使用の場合のみ消費可能
    pub fn is_redeemable(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at && self.used_at.is_none()
    }

    /// クリーンアップ対象か（期限切れかつ未使用のみ。使用済みは残す）
    pub fn is_purgeable(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now && self.used_at.is_none()
    }
}
