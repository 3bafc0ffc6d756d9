use sqlx::PgPool;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::models::PasswordResetToken;
use crate::repositories::ResetTokenStore;

#[derive(Clone)]
pub struct PasswordResetTokenRepository {
    pool: PgPool,
}

impl PasswordResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ResetTokenStore for PasswordResetTokenRepository {
    /// 新しいパスワードリセットトークンを作成
    ///
    /// # Arguments
    /// * `user_id` - 対象ユーザーのID
    /// * `token_hash` - トークンのSHA256ハッシュ
    /// * `expires_at` - 有効期限
    async fn create(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<PasswordResetToken, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, used_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, used_at, created_at
            FROM password_reset_tokens
            WHERE token_hash = $1 AND expires_at > $2 AND used_at IS NULL
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    /// トークンを使用済みにし、同一トランザクションでパスワードを更新
    ///
    /// used_at IS NULL 条件付きUPDATEで行ロックを取るため、同じトークンの
    /// 同時消費は片方だけが成功する
    async fn redeem(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let marked = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used_at = NOW()
            WHERE id = $1 AND used_at IS NULL AND expires_at > NOW()
            "#,
        )
        .bind(token_id)
        .execute(&mut *tx)
        .await?;

        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// 期限切れかつ未使用のトークンを削除
    ///
    /// # Returns
    /// 削除された行数
    async fn delete_expired_unused(&self, now: OffsetDateTime) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM password_reset_tokens
            WHERE expires_at < $1 AND used_at IS NULL
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
