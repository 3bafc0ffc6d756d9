use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::cookie::set_refresh_token_cookie;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::account::AuthSession;
use crate::state::AppState;

/// ログインリクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// ユーザーのメールアドレス
    #[garde(email)]
    pub email: String,
    /// ユーザーのパスワード
    #[garde(length(min = 1))]
    pub password: String,
}

/// ログイン・トークン更新レスポンス
///
/// リフレッシュトークンは Cookie でのみ送信し、本文には含めない
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    pub access_token: String,
    pub user_info: User,
}

/// セッションを Cookie + レスポンス本文に分けて返す
pub(crate) fn session_response(
    state: &AppState,
    jar: CookieJar,
    session: AuthSession,
) -> (CookieJar, ApiResponse<JwtResponse>) {
    let jar = set_refresh_token_cookie(
        jar,
        session.tokens.refresh_token,
        state.account_service.codec().refresh_ttl(),
        state.config.cookie_secure,
    );

    let body = JwtResponse {
        access_token: session.tokens.access_token,
        user_info: session.user,
    };

    (jar, ApiResponse::success("成功しました", Some(body)))
}

/// ログインハンドラー
///
/// POST /auth/login
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. ユーザー認証（DB照合）
/// 3. トークンペア発行
/// 4. リフレッシュトークンを Cookie に設定し、アクセストークンを返却
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<JwtResponse>), AppError> {
    request.validate()?;

    let session = state
        .account_service
        .login(&request.email, &request.password)
        .await?;

    Ok(session_response(&state, jar, session))
}
