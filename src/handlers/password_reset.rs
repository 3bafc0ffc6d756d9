use axum::{Json, extract::State};
use garde::Validate;
use serde::Deserialize;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

// === リセットリクエスト ===

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequestRequest {
    #[garde(email)]
    pub email: String,
}

/// POST /auth/password/reset-request
///
/// メールはバックグラウンドで送信されるため、レスポンス時点で送信済みとは限らない
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequestRequest>,
) -> Result<ApiResponse<()>, AppError> {
    request.validate()?;

    state
        .account_service
        .request_password_reset(&request.email)
        .await?;

    Ok(ApiResponse::success(
        "パスワード再設定メールを送信しました",
        None,
    ))
}

// === パスワードリセット実行 ===

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[garde(length(min = 1))]
    pub token: String,
    #[garde(length(chars, min = 6))]
    pub new_password: String,
    #[garde(length(min = 1))]
    pub confirm_password: String,
}

/// POST /auth/password/reset
///
/// # Security
/// - token, new_password はログに出力しない
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    request.validate()?;

    state
        .account_service
        .reset_password(
            &request.token,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;

    Ok(ApiResponse::success("パスワードを再設定しました", None))
}
