use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserStore;
use crate::services::CredentialHasher;

/// パスワード確認の検証（バイト単位の完全一致）
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), AppError> {
    if password != confirm {
        return Err(AppError::PasswordMismatch);
    }
    Ok(())
}

/// ユーザー関連の検証ルール
///
/// 重複チェックはストレージのUNIQUE制約の前段で行う高速パスであり、
/// 並行登録の最終的な防御はストア側の制約違反変換が担う。
#[derive(Clone)]
pub struct UserValidator<U> {
    users: U,
    hasher: CredentialHasher,
}

impl<U: UserStore> UserValidator<U> {
    pub fn new(users: U, hasher: CredentialHasher) -> Self {
        Self { users, hasher }
    }

    /// ログイン検証
    ///
    /// ユーザー不在・パスワード不一致はどちらも `LoginFailed` を返す
    pub async fn validate_login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.hasher.verify_dummy(password);
            tracing::warn!(email = %email, "認証失敗: ユーザー不在");
            return Err(AppError::LoginFailed);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!(email = %email, "認証失敗: パスワード不一致");
            return Err(AppError::LoginFailed);
        }

        Ok(user)
    }

    /// 現在のパスワードの検証
    pub fn validate_current_password(&self, user: &User, current: &str) -> Result<(), AppError> {
        if !self.hasher.verify(current, &user.password_hash) {
            tracing::warn!(user_id = user.id, "現在のパスワード不一致");
            return Err(AppError::CurrentPasswordInvalid);
        }
        Ok(())
    }

    /// 登録時の重複検証（メールアドレス → ニックネームの順）
    pub async fn validate_duplicate_user(&self, email: &str, nickname: &str) -> Result<(), AppError> {
        if self.users.exists_by_email(email).await? {
            return Err(AppError::DuplicateEmail);
        }
        if self.users.exists_by_nickname(nickname).await? {
            return Err(AppError::DuplicateNickname);
        }
        Ok(())
    }

    /// プロフィール更新時の重複検証（本人を除く）
    ///
    /// ニックネームが変更される場合のみ確認する
    pub async fn validate_duplicate_for_update(
        &self,
        current: &User,
        nickname: &str,
    ) -> Result<(), AppError> {
        if current.nickname != nickname && self.users.exists_by_nickname(nickname).await? {
            return Err(AppError::DuplicateNickname);
        }
        Ok(())
    }
}
