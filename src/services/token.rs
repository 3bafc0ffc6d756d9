//! JWT アクセストークン / リフレッシュトークンの発行と検証
//!
//! 両トークンは同一の構造・署名キーを使い、有効期限のみが異なる。
//! 検証時にトークン種別を区別する手段はない（提出場所で区別する）。

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::AppError;

/// リフレッシュトークンの有効期限（7日、固定）
pub const REFRESH_TOKEN_TTL_SECS: i64 = 604_800;

/// 署名キーの最小長（バイト）
pub const JWT_SECRET_MIN_LENGTH: usize = 32;

/// JWT クレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// メールアドレス
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: u64,
    pub exp: u64,
}

/// トークン検証失敗の種別（ログ出力用。クライアントには一律「未認証」）
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unsupported token")]
    Unsupported,
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::InvalidToken
    }
}

/// アクセストークン + リフレッシュトークン
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// トークンコーデック
///
/// 署名キーは起動時に一度だけ読み込み、Arc で全リクエストから読み取り専用で共有する
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<Keys>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// 新しい TokenCodec を作成
    ///
    /// # Errors
    /// 署名キーが32バイト未満の場合
    pub fn new(secret: &[u8], access_ttl_secs: i64) -> Result<Self, AppError> {
        if secret.len() < JWT_SECRET_MIN_LENGTH {
            tracing::error!(
                expected = JWT_SECRET_MIN_LENGTH,
                actual = secret.len(),
                "JWT署名キーが短すぎる"
            );
            return Err(AppError::Internal(anyhow::anyhow!(
                "jwt secret must be at least {JWT_SECRET_MIN_LENGTH} bytes"
            )));
        }

        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        })
    }

    /// リフレッシュトークンの有効期限（Cookie の Max-Age に使用）
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// トークンを発行
    pub fn issue(&self, user_id: i64, email: &str, ttl: Duration) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let claims = TokenClaims {
            sub: email.to_string(),
            user_id,
            iat: now.unix_timestamp() as u64,
            exp: (now + ttl).unix_timestamp() as u64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding).map_err(|e| {
            tracing::error!(error = ?e, "JWT署名エラー");
            AppError::Internal(anyhow::anyhow!("jwt encode error"))
        })
    }

    /// アクセストークンとリフレッシュトークンを発行
    pub fn issue_pair(&self, user_id: i64, email: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, email, self.access_ttl)?,
            refresh_token: self.issue(user_id, email, self.refresh_ttl)?,
        })
    }

    /// 署名と有効期限を検証し、クレームを返す
    ///
    /// 失敗種別はここでログ出力する
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp を過ぎたトークンは猶予なしで失効
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<TokenClaims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let kind = match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidAlgorithmName
                    | ErrorKind::MissingAlgorithm => TokenError::Unsupported,
                    _ => TokenError::Malformed,
                };
                tracing::warn!(kind = %kind, "JWT検証失敗");
                kind
            })
    }
}
