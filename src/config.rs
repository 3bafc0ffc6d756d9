use secrecy::SecretBox;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // JWT設定
    /// 署名キー（32バイト以上）
    pub jwt_secret: SecretBox<String>,
    #[serde(default = "default_jwt_access_token_ttl_secs")]
    pub jwt_access_token_ttl_secs: i64,

    /// argon2 の反復回数（t_cost）
    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,

    // Cookie / CORS 設定
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,

    // SMTP設定（オプション - email機能有効時のみ使用）
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<SecretBox<String>>,
    pub smtp_password: Option<SecretBox<String>>,
    #[serde(default)]
    pub smtp_from_address: Option<String>,

    // パスワードリセット設定
    /// リセットリンクの生成に使うフロントエンドURL
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_email_workers")]
    pub email_workers: usize,
    #[serde(default = "default_email_queue_capacity")]
    pub email_queue_capacity: usize,
    #[serde(default = "default_token_cleanup_interval_secs")]
    pub token_cleanup_interval_secs: u64,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;
const DEFAULT_PASSWORD_HASH_COST: u32 = 3;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_EMAIL_WORKERS: usize = 2;
const DEFAULT_EMAIL_QUEUE_CAPACITY: usize = 10;
const DEFAULT_TOKEN_CLEANUP_INTERVAL_SECS: u64 = 3600;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_max_connections() -> u32 {
    DEFAULT_DATABASE_MAX_CONNECTIONS
}

fn default_jwt_access_token_ttl_secs() -> i64 {
    DEFAULT_JWT_ACCESS_TOKEN_TTL_SECS
}

fn default_password_hash_cost() -> u32 {
    DEFAULT_PASSWORD_HASH_COST
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_frontend_url() -> String {
    DEFAULT_FRONTEND_URL.to_string()
}

fn default_email_workers() -> usize {
    DEFAULT_EMAIL_WORKERS
}

fn default_email_queue_capacity() -> usize {
    DEFAULT_EMAIL_QUEUE_CAPACITY
}

fn default_token_cleanup_interval_secs() -> u64 {
    DEFAULT_TOKEN_CLEANUP_INTERVAL_SECS
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// SMTP送信に必要な設定が揃っているか
    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some()
            && self.smtp_username.is_some()
            && self.smtp_password.is_some()
            && self.smtp_from_address.is_some()
    }
}
