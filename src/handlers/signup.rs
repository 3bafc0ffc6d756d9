use axum::{Json, extract::State};
use garde::Validate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::account::SignUpInput;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[garde(email, length(chars, max = 100))]
    pub email: String,
    #[garde(length(chars, min = 6, max = 20))]
    pub password: String, // SecretBox不要（Deserialize後すぐハッシュ化）
    #[garde(length(min = 1))]
    pub confirm_password: String,
    #[garde(length(chars, min = 2, max = 20))]
    pub nickname: String,
    #[garde(length(chars, min = 2, max = 10))]
    pub name: String,
    /// 例: 010-1234-5678
    #[garde(length(max = 13), pattern(r"^01[0-9]-[0-9]{4}-[0-9]{4}$"))]
    pub phone_number: String,
}

/// 会員登録ハンドラー
///
/// POST /auth/signup
///
/// # Security
/// - パスワードはログに出力しない
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<ApiResponse<User>, AppError> {
    request.validate()?;

    let user = state
        .account_service
        .sign_up(SignUpInput {
            email: &request.email,
            password: &request.password,
            confirm_password: &request.confirm_password,
            nickname: &request.nickname,
            name: &request.name,
            phone_number: &request.phone_number,
        })
        .await?;

    Ok(ApiResponse::created("会員登録が完了しました", user))
}
