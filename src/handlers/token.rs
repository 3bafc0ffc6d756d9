use axum::extract::State;
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::handlers::cookie::{clear_refresh_token_cookie, refresh_token_from};
use crate::handlers::login::{JwtResponse, session_response};
use crate::response::ApiResponse;
use crate::state::AppState;

/// トークン更新ハンドラー
///
/// POST /auth/refresh
///
/// Cookie のリフレッシュトークンで新しいトークンペアを発行する
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<JwtResponse>), AppError> {
    let refresh_token = refresh_token_from(&jar)
        .ok_or_else(|| AppError::validation("リフレッシュトークンがありません"))?;

    let session = state.account_service.refresh(&refresh_token).await?;

    Ok(session_response(&state, jar, session))
}

/// ログアウトハンドラー
///
/// POST /auth/logout
///
/// サーバー側の失効リストはなく、リフレッシュトークン Cookie を削除するのみ
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<()>) {
    let jar = clear_refresh_token_cookie(jar, state.config.cookie_secure);

    tracing::info!("ログアウト完了");

    (jar, ApiResponse::success("ログアウトしました", None))
}
