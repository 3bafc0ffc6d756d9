use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use hs_auth::error::AppError;
use hs_auth::models::{NewUser, PasswordResetToken, ProfileUpdate, User};
use hs_auth::repositories::{ResetTokenStore, UserStore};
use hs_auth::services::account::SignUpInput;
use hs_auth::services::{AccountService, CredentialHasher, MailQueue, Notifier, TokenCodec};

pub const TEST_JWT_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

pub type TestAccounts = AccountService<MemoryStore, MemoryStore>;

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tokens: Vec<PasswordResetToken>,
    next_user_id: i64,
    next_token_id: i64,
    /// 次の redeem の直前に、別リクエストがトークンを先に消費したことにする
    consume_before_redeem: bool,
}

/// ユーザーとリセットトークンを保持するインメモリストア
///
/// clone は同じ状態を共有する
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// find_valid と redeem の間に並行リクエストが割り込んだ状態を再現する
    pub fn consume_before_next_redeem(&self) {
        self.inner.lock().unwrap().consume_before_redeem = true;
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn tokens(&self) -> Vec<PasswordResetToken> {
        self.inner.lock().unwrap().tokens.clone()
    }

    pub fn user(&self, user_id: i64) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    /// 有効期限・使用日時を直接指定してトークンを挿入する
    pub fn insert_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: OffsetDateTime,
        used_at: Option<OffsetDateTime>,
    ) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_token_id += 1;
        let id = inner.next_token_id;
        inner.tokens.push(PasswordResetToken {
            id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            used_at,
            created_at: OffsetDateTime::now_utc(),
        });
        id
    }
}

impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self.user(user_id))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().any(|u| u.email == email))
    }

    async fn exists_by_nickname(&self, nickname: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().any(|u| u.nickname == nickname))
    }

    async fn exists_by_phone_number(&self, phone_number: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().any(|u| u.phone_number == phone_number))
    }

    async fn create(&self, user: NewUser<'_>) -> Result<User, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        if inner.users.iter().any(|u| u.nickname == user.nickname) {
            return Err(AppError::DuplicateNickname);
        }
        if inner.users.iter().any(|u| u.phone_number == user.phone_number) {
            return Err(AppError::DuplicatePhoneNumber);
        }

        inner.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: inner.next_user_id,
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            nickname: user.nickname.to_string(),
            name: user.name.to_string(),
            phone_number: user.phone_number.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());
        Ok(created)
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate<'_>,
    ) -> Result<User, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.id != user_id && u.nickname == update.nickname)
        {
            return Err(AppError::DuplicateNickname);
        }
        if inner
            .users
            .iter()
            .any(|u| u.id != user_id && u.phone_number == update.phone_number)
        {
            return Err(AppError::DuplicatePhoneNumber);
        }

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::NotFound)?;
        user.nickname = update.nickname.to_string();
        user.name = update.name.to_string();
        user.phone_number = update.phone_number.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}

impl ResetTokenStore for MemoryStore {
    async fn create(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<PasswordResetToken, AppError> {
        let id = self.insert_token(user_id, token_hash, expires_at, None);
        let inner = self.inner.lock().unwrap();
        inner
            .tokens
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.is_redeemable(now))
            .cloned())
    }

    async fn redeem(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let now = OffsetDateTime::now_utc();

        if std::mem::take(&mut inner.consume_before_redeem) {
            if let Some(token) = inner.tokens.iter_mut().find(|t| t.id == token_id) {
                token.used_at.get_or_insert(now);
            }
        }

        let Some(token) = inner
            .tokens
            .iter_mut()
            .find(|t| t.id == token_id && t.is_redeemable(now))
        else {
            return Ok(false);
        };
        token.used_at = Some(now);

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = now;
        Ok(true)
    }

    async fn delete_expired_unused(&self, now: OffsetDateTime) -> Result<u64, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tokens.len();
        inner.tokens.retain(|t| !t.is_purgeable(now));
        Ok((before - inner.tokens.len()) as u64)
    }
}

// ── RecordingNotifier ────────────────────────────────────────────────────────

/// 送信されたリセットメール (宛先, トークン) を記録する
pub struct RecordingNotifier {
    sent: UnboundedSender<(String, String)>,
}

impl Notifier for RecordingNotifier {
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), AppError> {
        let _ = self.sent.send((to.to_string(), token.to_string()));
        Ok(())
    }
}

/// 解放されるまで送信を止める通知先
pub struct BlockingNotifier {
    release: Arc<Notify>,
}

impl Notifier for BlockingNotifier {
    async fn send_password_reset(&self, _to: &str, _token: &str) -> Result<(), AppError> {
        self.release.notified().await;
        Ok(())
    }
}

pub struct Harness {
    pub store: MemoryStore,
    pub accounts: TestAccounts,
    pub codec: TokenCodec,
    pub hasher: CredentialHasher,
    pub mail: UnboundedReceiver<(String, String)>,
}

impl Harness {
    /// 次のリセットメールを待って (宛先, トークン) を返す
    pub async fn next_mail(&mut self) -> (String, String) {
        tokio::time::timeout(Duration::from_secs(5), self.mail.recv())
            .await
            .expect("mail not delivered in time")
            .expect("mail queue closed")
    }
}

fn accounts(
    store: &MemoryStore,
    hasher: &CredentialHasher,
    codec: &TokenCodec,
    queue: MailQueue,
) -> TestAccounts {
    AccountService::new(
        store.clone(),
        store.clone(),
        hasher.clone(),
        codec.clone(),
        queue,
    )
}

pub fn harness() -> Harness {
    let store = MemoryStore::default();
    let hasher = CredentialHasher::new(1).unwrap();
    let codec = TokenCodec::new(TEST_JWT_SECRET, 3600).unwrap();
    let (sent, mail) = unbounded_channel();
    let queue = MailQueue::start(RecordingNotifier { sent }, 2, 10);
    let accounts = accounts(&store, &hasher, &codec, queue);

    Harness {
        store,
        accounts,
        codec,
        hasher,
        mail,
    }
}

/// 送信が止まったワーカー1つと容量1のメールキューを持つサービス
///
/// 返り値の `Notify` で止まっている送信を解放する
pub fn blocked_mail_accounts() -> (MemoryStore, TestAccounts, Arc<Notify>) {
    let store = MemoryStore::default();
    let hasher = CredentialHasher::new(1).unwrap();
    let codec = TokenCodec::new(TEST_JWT_SECRET, 3600).unwrap();
    let release = Arc::new(Notify::new());
    let queue = MailQueue::start(
        BlockingNotifier {
            release: Arc::clone(&release),
        },
        1,
        1,
    );
    let accounts = accounts(&store, &hasher, &codec, queue);
    (store, accounts, release)
}

pub fn signup_input<'a>(email: &'a str, nickname: &'a str, phone: &'a str) -> SignUpInput<'a> {
    SignUpInput {
        email,
        password: "secret1",
        confirm_password: "secret1",
        nickname,
        name: "hong",
        phone_number: phone,
    }
}

pub async fn signed_up_user(h: &Harness) -> User {
    h.accounts
        .sign_up(signup_input("a@x.com", "abc", "010-1234-5678"))
        .await
        .unwrap()
}
