use std::future::Future;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};

use crate::error::AppError;
use crate::services::TokenCodec;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// アクセストークンで認証されたユーザー
///
/// `Authorization: Bearer <token>` ヘッダーから境界で一度だけ抽出し、
/// user_id はサービス呼び出しに明示的な引数として渡す。
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
}

/// ヘッダーからベアラートークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// ヘッダーを検証して認証ユーザーを得る
///
/// トークン不在・検証失敗はどちらもクライアントには「未認証」として返す
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthenticatedUser, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthenticated)?;
    let claims = codec
        .verify(token)
        .map_err(|_| AppError::Unauthenticated)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        email: claims.sub,
    })
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    // 検証は同期で済ませ、'static な future を返す
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = authenticate(&parts.headers, state.account_service.codec());
        async move { result }
    }
}
