use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// ユーザー
///
/// email / nickname / phone_number はそれぞれ全ユーザーで一意（DBのUNIQUE制約で保証）
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userId")]
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub nickname: String,
    pub name: String,
    pub phone_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// ユーザー作成時の入力（パスワードはハッシュ済み）
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub nickname: &'a str,
    pub name: &'a str,
    pub phone_number: &'a str,
}

/// プロフィール更新内容
#[derive(Debug)]
pub struct ProfileUpdate<'a> {
    pub nickname: &'a str,
    pub name: &'a str,
    pub phone_number: &'a str,
}
