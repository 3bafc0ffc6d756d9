//! アカウントサービス
//!
//! 状態を変更する唯一のコンポーネント。各操作はストアから毎回最新の状態を取得し、
//! リクエストをまたいでユーザーをキャッシュしない。

use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, User};
use crate::repositories::{ResetTokenStore, UserStore};
use crate::services::mail_queue::MailQueue;
use crate::services::token::{TokenCodec, TokenPair};
use crate::services::validator::{UserValidator, validate_password_confirmation};
use crate::services::CredentialHasher;

mod password_reset;

pub use password_reset::{RESET_TOKEN_TTL_MINUTES, hash_token};

/// 会員登録の入力
#[derive(Debug)]
pub struct SignUpInput<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub nickname: &'a str,
    pub name: &'a str,
    pub phone_number: &'a str,
}

/// パスワード変更の入力
#[derive(Debug)]
pub struct ChangePasswordInput<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
    pub confirm_new_password: &'a str,
}

/// ログイン・トークン更新の結果
#[derive(Debug)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Clone)]
pub struct AccountService<U, T> {
    users: U,
    tokens: T,
    hasher: CredentialHasher,
    codec: TokenCodec,
    validator: UserValidator<U>,
    mail_queue: MailQueue,
}

impl<U: UserStore, T: ResetTokenStore> AccountService<U, T> {
    /// 新しい AccountService を作成
    pub fn new(
        users: U,
        tokens: T,
        hasher: CredentialHasher,
        codec: TokenCodec,
        mail_queue: MailQueue,
    ) -> Self {
        let validator = UserValidator::new(users.clone(), hasher.clone());
        Self {
            users,
            tokens,
            hasher,
            codec,
            validator,
            mail_queue,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// 会員登録
    ///
    /// # Security
    /// - パスワードはログに出力しない
    /// - パスワードは即座にハッシュ化
    pub async fn sign_up(&self, input: SignUpInput<'_>) -> Result<User, AppError> {
        validate_password_confirmation(input.password, input.confirm_password)?;
        self.validator
            .validate_duplicate_user(input.email, input.nickname)
            .await?;

        let password_hash = self.hasher.hash(input.password)?;

        let user = self
            .users
            .create(NewUser {
                email: input.email,
                password_hash: &password_hash,
                nickname: input.nickname,
                name: input.name,
                phone_number: input.phone_number,
            })
            .await?;

        tracing::info!(email = %user.email, user_id = user.id, "会員登録完了");
        Ok(user)
    }

    /// ログイン（アクセストークン + リフレッシュトークンを発行）
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        tracing::info!(email = %email, "ログインリクエスト");

        let user = self.validator.validate_login(email, password).await?;
        let tokens = self.codec.issue_pair(user.id, &user.email)?;

        tracing::info!(email = %user.email, user_id = user.id, "ログイン成功");
        Ok(AuthSession { tokens, user })
    }

    /// トークン更新
    ///
    /// リフレッシュトークンと同じ userId / email で新しいペアを発行する
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let claims = self.codec.verify(refresh_token)?;

        let user = self.users.find_by_id(claims.user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = claims.user_id, "トークン更新: ユーザー不在");
            AppError::InvalidToken
        })?;

        let tokens = self.codec.issue_pair(claims.user_id, &claims.sub)?;

        tracing::info!(email = %claims.sub, user_id = claims.user_id, "トークン更新成功");
        Ok(AuthSession { tokens, user })
    }

    /// 認証済みユーザー自身の情報を取得
    pub async fn current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// パスワード変更
    pub async fn change_password(
        &self,
        user_id: i64,
        input: ChangePasswordInput<'_>,
    ) -> Result<(), AppError> {
        validate_password_confirmation(input.new_password, input.confirm_new_password)?;

        let user = self.current_user(user_id).await?;
        self.validator
            .validate_current_password(&user, input.current_password)?;

        let password_hash = self.hasher.hash(input.new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id, "パスワード変更完了");
        Ok(())
    }

    /// プロフィール更新
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate<'_>,
    ) -> Result<User, AppError> {
        let user = self.current_user(user_id).await?;
        self.validator
            .validate_duplicate_for_update(&user, update.nickname)
            .await?;

        let updated = self.users.update_profile(user.id, update).await?;

        tracing::info!(user_id, "プロフィール更新完了");
        Ok(updated)
    }
}
