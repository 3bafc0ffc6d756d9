use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::{PasswordResetTokenRepository, UserRepository};
use crate::services::{AccountService, CredentialHasher, EmailService, MailQueue, TokenCodec};

/// PostgreSQL ストアを使うアカウントサービス
pub type Accounts = AccountService<UserRepository, PasswordResetTokenRepository>;

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
/// リクエスト間で共有される可変状態はなく、署名キーとハッシュコストは読み取り専用。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    /// パスワードリセットトークンリポジトリ（クリーンアップタスク用）
    pub token_repo: PasswordResetTokenRepository,
    /// アカウントサービス
    pub account_service: Accounts,
}

impl AppState {
    /// 新しい AppState を作成
    ///
    /// メールキューのワーカーを起動するため tokio ランタイム内で呼び出すこと
    pub fn new(db_pool: PgPool, config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let user_repo = UserRepository::new(db_pool.clone());
        let token_repo = PasswordResetTokenRepository::new(db_pool);

        let hasher = CredentialHasher::new(config.password_hash_cost)?;
        let codec = TokenCodec::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.jwt_access_token_ttl_secs,
        )?;

        let email_service = EmailService::new(&config)?;
        let mail_queue = MailQueue::start(
            email_service,
            config.email_workers,
            config.email_queue_capacity,
        );

        let account_service =
            AccountService::new(user_repo, token_repo.clone(), hasher, codec, mail_queue);

        Ok(Self {
            config,
            token_repo,
            account_service,
        })
    }
}
