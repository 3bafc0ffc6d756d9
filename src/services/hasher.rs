use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::error::AppError;

/// パスワードハッシュ化サービス（argon2id）
///
/// コスト（t_cost）は起動時に固定され、全リクエストで読み取り専用として共有される。
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    /// ユーザー不在時のダミー検証用ハッシュ
    dummy_hash: Arc<str>,
}

impl CredentialHasher {
    /// 新しい CredentialHasher を作成
    ///
    /// # Arguments
    /// * `t_cost` - argon2 の反復回数
    pub fn new(t_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(Params::DEFAULT_M_COST, t_cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| {
                tracing::error!(error = ?e, t_cost, "argon2 パラメータが不正");
                AppError::Internal(anyhow::anyhow!("invalid argon2 params: {e}"))
            })?;

        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash("dummy-password-for-timing")?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// パスワードをargon2idでハッシュ化（呼び出しごとに新しいソルト）
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
                AppError::Internal(anyhow::anyhow!("password hash error"))
            })?;
        Ok(hash.to_string())
    }

    /// パスワードを検証
    ///
    /// ハッシュ形式が不正な場合もエラーにせず `false` を返す
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = ?e, "パスワードハッシュのパースエラー");
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// タイミング攻撃対策: ユーザーが存在しない場合もダミーのパスワード検証を実行
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}
