use axum::{
    Router,
    routing::{get, post, put},
};
use http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Router の構築
pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref())?;

    let router = Router::new()
        .route("/api/health", get(handlers::health_check))
        // 認証
        .route("/auth/signup", post(handlers::sign_up))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        // アカウント管理
        .route("/auth/me", get(handlers::me))
        .route("/auth/profile", put(handlers::update_profile))
        .route("/auth/password", put(handlers::change_password))
        // パスワードリセット
        .route(
            "/auth/password/reset-request",
            post(handlers::request_password_reset),
        )
        .route("/auth/password/reset", post(handlers::reset_password))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// CORS レイヤーの構築
///
/// リフレッシュトークン Cookie を送るため、許可オリジンは1つに限定して credentials を許可する
fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = allowed_origin else {
        tracing::info!("CORS 許可オリジン未設定（同一オリジンのみ）");
        return Ok(CorsLayer::new());
    };

    let origin = HeaderValue::from_str(origin).map_err(|e| {
        tracing::error!(error = ?e, origin = %origin, "CORS 許可オリジンが不正");
        anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e)
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
