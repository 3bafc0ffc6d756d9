use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, User};
use crate::repositories::UserStore;

const USER_COLUMNS: &str =
    "id, email, password_hash, nickname, name, phone_number, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists_where(&self, column: &str, value: &str) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM users WHERE {column} = $1)");
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

impl UserStore for UserRepository {
    /// メールアドレスでユーザーを検索
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// ユーザーIDでユーザーを検索
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        self.exists_where("email", email).await
    }

    async fn exists_by_nickname(&self, nickname: &str) -> Result<bool, AppError> {
        self.exists_where("nickname", nickname).await
    }

    async fn exists_by_phone_number(&self, phone_number: &str) -> Result<bool, AppError> {
        self.exists_where("phone_number", phone_number).await
    }

    /// 新しいユーザーを作成
    ///
    /// # Errors
    /// - UNIQUE制約違反時: 制約名から `AppError::Duplicate*` に変換
    async fn create(&self, user: NewUser<'_>) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, nickname, name, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.nickname)
        .bind(user.name)
        .bind(user.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// ユーザーのパスワードを更新
    ///
    /// # Note
    /// password_hash はログに出力しないこと
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// プロフィール（ニックネーム・名前・電話番号）を更新
    async fn update_profile(&self, user_id: i64, update: ProfileUpdate<'_>) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET nickname = $2, name = $3, phone_number = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(update.nickname)
        .bind(update.name)
        .bind(update.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_unique_violation)?
        .ok_or(AppError::NotFound)
    }
}
