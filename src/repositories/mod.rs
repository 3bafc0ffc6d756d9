//! 永続化層
//!
//! サービス層はトレイト越しにストアを扱う。本番実装は PostgreSQL (sqlx)。

use std::future::Future;

use time::OffsetDateTime;

use crate::error::AppError;
use crate::models::{NewUser, PasswordResetToken, ProfileUpdate, User};

pub mod password_reset_token;
pub mod user;

pub use password_reset_token::PasswordResetTokenRepository;
pub use user::UserRepository;

/// ユーザーストア
///
/// UNIQUE制約違反は `AppError::Duplicate*` に変換して返すこと
pub trait UserStore: Clone + Send + Sync + 'static {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn find_by_id(&self, user_id: i64)
    -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn exists_by_email(&self, email: &str) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn exists_by_nickname(
        &self,
        nickname: &str,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn exists_by_phone_number(
        &self,
        phone_number: &str,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn create(&self, user: NewUser<'_>) -> impl Future<Output = Result<User, AppError>> + Send;

    fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate<'_>,
    ) -> impl Future<Output = Result<User, AppError>> + Send;
}

/// パスワードリセットトークンストア
pub trait ResetTokenStore: Clone + Send + Sync + 'static {
    fn create(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> impl Future<Output = Result<PasswordResetToken, AppError>> + Send;

    /// `expires_at > now AND used_at IS NULL` のトークンのみ返す
    fn find_valid(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> impl Future<Output = Result<Option<PasswordResetToken>, AppError>> + Send;

    /// パスワード更新とトークン使用済みマークを1トランザクションで行う
    ///
    /// 並行リクエストが先にトークンを消費していた場合は何も変更せず `false` を返す
    fn redeem(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// 期限切れかつ未使用のトークンを削除（使用済みは対象外）
    fn delete_expired_unused(
        &self,
        now: OffsetDateTime,
    ) -> impl Future<Output = Result<u64, AppError>> + Send;
}
