use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::AccountService;
use crate::error::AppError;
use crate::repositories::{ResetTokenStore, UserStore};
use crate::services::mail_queue::ResetMail;
use crate::services::validator::validate_password_confirmation;

/// リセットトークンの有効期限（分）
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// トークンをSHA256でハッシュ化（DBには平文を保存しない）
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl<U: UserStore, T: ResetTokenStore> AccountService<U, T> {
    /// パスワードリセットをリクエスト
    ///
    /// トークン保存はメール送信結果と独立してコミットされる。
    /// メールはキューに投入するだけで送信完了は待たない。
    ///
    /// # Security
    /// - ユーザー不在時は NotFound を返す（アカウント存在有無が観測可能）
    /// - トークン（平文）はログに出力しない
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        tracing::info!(email = %email, "パスワードリセットリクエスト");

        let user = self.users.find_by_email(email).await?.ok_or_else(|| {
            tracing::info!(email = %email, "パスワードリセット: ユーザー不在");
            AppError::NotFound
        })?;

        let token = Uuid::new_v4().to_string();
        let expires_at = OffsetDateTime::now_utc() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        self.tokens
            .create(user.id, &hash_token(&token), expires_at)
            .await?;

        if let Err(e) = self.mail_queue.enqueue(ResetMail {
            to: user.email.clone(),
            token,
        }) {
            tracing::error!(email = %email, error = %e, "メールキュー投入失敗（トークンは作成済み）");
        }

        Ok(())
    }

    /// パスワードをリセット
    ///
    /// パスワード更新とトークン使用済みマークは1トランザクションで行う
    ///
    /// # Security
    /// - トークン・新パスワードはログに出力しない
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        validate_password_confirmation(new_password, confirm_password)?;

        let reset_token = self
            .tokens
            .find_valid(&hash_token(token), OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| {
                tracing::warn!("無効または期限切れのリセットトークン");
                AppError::InvalidResetToken
            })?;

        let password_hash = self.hasher.hash(new_password)?;

        if !self
            .tokens
            .redeem(reset_token.id, reset_token.user_id, &password_hash)
            .await?
        {
            tracing::warn!(token_id = reset_token.id, "リセットトークンは既に使用済み");
            return Err(AppError::InvalidResetToken);
        }

        tracing::info!(user_id = reset_token.user_id, "パスワードリセット完了");
        Ok(())
    }
}
