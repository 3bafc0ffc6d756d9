use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// UNIQUE制約名（マイグレーションで定義）
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const USERS_NICKNAME_KEY: &str = "users_nickname_key";
pub const USERS_PHONE_NUMBER_KEY: &str = "users_phone_number_key";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("入力データが正しくありません: {message}")]
    Validation {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },

    #[error("パスワードが一致しません")]
    PasswordMismatch,

    #[error("メールアドレスまたはパスワードが正しくありません")]
    LoginFailed,

    #[error("現在のパスワードが正しくありません")]
    CurrentPasswordInvalid,

    #[error("認証されていないユーザーです")]
    Unauthenticated,

    #[error("無効または期限切れのトークンです")]
    InvalidToken,

    /// パスワードリセットトークンの検証失敗
    #[error("無効または期限切れのリセットトークンです")]
    InvalidResetToken,

    #[error("アクセス権限がありません")]
    AccessDenied,

    #[error("ユーザーが見つかりません")]
    NotFound,

    #[error("このメールアドレスは既に使用されています")]
    DuplicateEmail,

    #[error("このニックネームは既に使用されています")]
    DuplicateNickname,

    #[error("この電話番号は既に使用されています")]
    DuplicatePhoneNumber,

    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// 単一メッセージのバリデーションエラー
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// UNIQUE制約違反を重複エラーに変換する
    ///
    /// 事前の重複チェックをすり抜けた同時登録はここで捕捉される。
    pub fn from_unique_violation(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            match db_err.constraint() {
                Some(USERS_EMAIL_KEY) => return Self::DuplicateEmail,
                Some(USERS_NICKNAME_KEY) => return Self::DuplicateNickname,
                Some(USERS_PHONE_NUMBER_KEY) => return Self::DuplicatePhoneNumber,
                _ => {}
            }
        }
        Self::Database(e)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::PasswordMismatch | Self::InvalidResetToken => {
                StatusCode::BAD_REQUEST
            }
            Self::LoginFailed
            | Self::CurrentPasswordInvalid
            | Self::Unauthenticated
            | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DuplicateEmail | Self::DuplicateNickname | Self::DuplicatePhoneNumber => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        let field_errors = report
            .iter()
            .map(|(path, error)| (to_camel_case(&path.to_string()), error.message().to_string()))
            .collect();
        Self::Validation {
            message: "入力データが正しくありません".to_string(),
            field_errors: Some(field_errors),
        }
    }
}

/// フィールド名をリクエストJSONと同じ camelCase に揃える
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, field_errors) = match self {
            Self::Validation {
                message,
                field_errors,
            } => {
                tracing::warn!(message = %message, fields = ?field_errors, "入力データ検証失敗");
                (message, field_errors)
            }
            Self::Database(e) => {
                tracing::error!(error = ?e, "データベースエラー");
                ("サーバー内部でエラーが発生しました".to_string(), None)
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                ("サーバー内部でエラーが発生しました".to_string(), None)
            }
            other => {
                tracing::warn!(status = status.as_u16(), error = %other, "リクエスト失敗");
                (other.to_string(), None)
            }
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
            field_errors,
        };
        (status, Json(body)).into_response()
    }
}
