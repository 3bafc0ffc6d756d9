//! リフレッシュトークン Cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// リフレッシュトークンの Cookie 名
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Cookie の送信範囲（認証系エンドポイントのみ）
pub const REFRESH_TOKEN_COOKIE_PATH: &str = "/auth";

/// リフレッシュトークンを HTTP-only Cookie に設定
pub fn set_refresh_token_cookie(
    jar: CookieJar,
    value: String,
    max_age: Duration,
    secure: bool,
) -> CookieJar {
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, value))
        .path(REFRESH_TOKEN_COOKIE_PATH)
        .max_age(max_age)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// リフレッシュトークン Cookie を即時失効させる
pub fn clear_refresh_token_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, ""))
        .path(REFRESH_TOKEN_COOKIE_PATH)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Cookie からリフレッシュトークンを取り出す
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
