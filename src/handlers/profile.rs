use axum::{Json, extract::State};
use garde::Validate;
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::auth::AuthenticatedUser;
use crate::models::{ProfileUpdate, User};
use crate::response::ApiResponse;
use crate::services::account::ChangePasswordInput;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[garde(length(chars, min = 2, max = 20))]
    pub nickname: String,
    #[garde(length(chars, min = 2, max = 10))]
    pub name: String,
    #[garde(length(max = 13), pattern(r"^01[0-9]-[0-9]{4}-[0-9]{4}$"))]
    pub phone_number: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[garde(length(min = 1))]
    pub current_password: String,
    #[garde(length(chars, min = 6, max = 20))]
    pub new_password: String,
    #[garde(length(min = 1))]
    pub confirm_new_password: String,
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<ApiResponse<User>, AppError> {
    let user = state.account_service.current_user(auth.user_id).await?;
    Ok(ApiResponse::success("成功しました", Some(user)))
}

/// PUT /auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<User>, AppError> {
    tracing::info!(
        user_id = auth.user_id,
        email = %auth.email,
        "プロフィール更新リクエスト"
    );
    request.validate()?;

    let user = state
        .account_service
        .update_profile(
            auth.user_id,
            ProfileUpdate {
                nickname: &request.nickname,
                name: &request.name,
                phone_number: &request.phone_number,
            },
        )
        .await?;

    Ok(ApiResponse::success("プロフィールを更新しました", Some(user)))
}

/// PUT /auth/password
///
/// # Security
/// - パスワードはログに出力しない
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    tracing::info!(
        user_id = auth.user_id,
        email = %auth.email,
        "パスワード変更リクエスト"
    );
    request.validate()?;

    state
        .account_service
        .change_password(
            auth.user_id,
            ChangePasswordInput {
                current_password: &request.current_password,
                new_password: &request.new_password,
                confirm_new_password: &request.confirm_new_password,
            },
        )
        .await?;

    Ok(ApiResponse::success("パスワードを変更しました", None))
}
