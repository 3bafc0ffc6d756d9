use time::{Duration, OffsetDateTime};

use hs_auth::error::AppError;
use hs_auth::services::account::{RESET_TOKEN_TTL_MINUTES, hash_token};

use crate::helpers::{blocked_mail_accounts, harness, signed_up_user, signup_input};

#[tokio::test]
async fn should_store_only_hashed_token_with_thirty_minute_expiry() {
    let mut h = harness();
    let user = signed_up_user(&h).await;

    let before = OffsetDateTime::now_utc();
    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let (to, token) = h.next_mail().await;

    assert_eq!(to, "a@x.com");
    let tokens = h.store.tokens();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].user_id, user.id);
    assert_eq!(tokens[0].token_hash, hash_token(&token));
    assert_ne!(tokens[0].token_hash, token);
    assert!(tokens[0].used_at.is_none());

    let ttl = tokens[0].expires_at - before;
    assert!(ttl >= Duration::minutes(RESET_TOKEN_TTL_MINUTES));
    assert!(ttl < Duration::minutes(RESET_TOKEN_TTL_MINUTES + 1));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_email() {
    let h = harness();
    let result = h.accounts.request_password_reset("nobody@x.com").await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert!(h.store.tokens().is_empty());
}

#[tokio::test]
async fn should_reset_password_once_and_reject_replay() {
    let mut h = harness();
    signed_up_user(&h).await;
    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let (_, token) = h.next_mail().await;

    h.accounts
        .reset_password(&token, "newpass1", "newpass1")
        .await
        .unwrap();

    assert!(h.accounts.login("a@x.com", "newpass1").await.is_ok());
    assert!(h.store.tokens()[0].used_at.is_some());

    let replay = h
        .accounts
        .reset_password(&token, "another1", "another1")
        .await;
    assert!(
        matches!(replay, Err(AppError::InvalidResetToken)),
        "expected InvalidResetToken, got {replay:?}"
    );
    assert!(h.accounts.login("a@x.com", "newpass1").await.is_ok());
}

#[tokio::test]
async fn should_reject_expired_token_without_changing_password() {
    let h = harness();
    let user = signed_up_user(&h).await;
    let before = h.store.user(user.id).unwrap().password_hash;

    h.store.insert_token(
        user.id,
        &hash_token("expired-token"),
        OffsetDateTime::now_utc() - Duration::minutes(1),
        None,
    );

    let result = h
        .accounts
        .reset_password("expired-token", "newpass1", "newpass1")
        .await;
    assert!(matches!(result, Err(AppError::InvalidResetToken)));
    assert_eq!(h.store.user(user.id).unwrap().password_hash, before);
}

#[tokio::test]
async fn should_reject_unknown_token() {
    let h = harness();
    signed_up_user(&h).await;

    let result = h
        .accounts
        .reset_password("no-such-token", "newpass1", "newpass1")
        .await;
    assert!(matches!(result, Err(AppError::InvalidResetToken)));
}

#[tokio::test]
async fn should_check_confirmation_before_consuming_token() {
    let mut h = harness();
    signed_up_user(&h).await;
    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let (_, token) = h.next_mail().await;

    let result = h
        .accounts
        .reset_password(&token, "newpass1", "newpass2")
        .await;
    assert!(matches!(result, Err(AppError::PasswordMismatch)));
    assert!(h.store.tokens()[0].used_at.is_none());

    // トークンは未使用のまま再利用できる
    h.accounts
        .reset_password(&token, "newpass1", "newpass1")
        .await
        .unwrap();
}

#[tokio::test]
async fn should_walk_through_full_account_lifecycle() {
    let mut h = harness();
    let user = signed_up_user(&h).await;

    let session = h.accounts.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(h.codec.verify(&session.tokens.access_token).unwrap().user_id, user.id);

    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let (_, token) = h.next_mail().await;
    h.accounts
        .reset_password(&token, "newpass1", "newpass1")
        .await
        .unwrap();

    assert!(matches!(
        h.accounts.login("a@x.com", "secret1").await,
        Err(AppError::LoginFailed)
    ));
    let session = h.accounts.login("a@x.com", "newpass1").await.unwrap();
    assert_eq!(session.user.id, user.id);
}

#[tokio::test]
async fn should_reject_token_consumed_by_concurrent_request() {
    let mut h = harness();
    let user = signed_up_user(&h).await;
    h.accounts.request_password_reset("a@x.com").await.unwrap();
    let (_, token) = h.next_mail().await;
    let before = h.store.user(user.id).unwrap().password_hash;

    h.store.consume_before_next_redeem();
    let result = h
        .accounts
        .reset_password(&token, "newpass1", "newpass1")
        .await;

    assert!(
        matches!(result, Err(AppError::InvalidResetToken)),
        "expected InvalidResetToken, got {result:?}"
    );
    assert_eq!(h.store.user(user.id).unwrap().password_hash, before);
    assert!(h.accounts.login("a@x.com", "secret1").await.is_ok());
}

#[tokio::test]
async fn should_keep_token_and_succeed_when_mail_queue_is_full() {
    let (store, accounts, release) = blocked_mail_accounts();
    accounts
        .sign_up(signup_input("a@x.com", "abc", "010-1234-5678"))
        .await
        .unwrap();

    // 1件目はワーカーが保持、2件目でキュー満杯、3件目は投入を拒否される
    for _ in 0..3 {
        accounts.request_password_reset("a@x.com").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let tokens = store.tokens();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| t.used_at.is_none()));

    release.notify_waiters();
}
