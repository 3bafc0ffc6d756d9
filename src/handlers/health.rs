use axum::Json;
use serde::Serialize;

/// 稼働状況
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

impl Health {
    fn up() -> Self {
        Self {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /api/health
///
/// DB には問い合わせず、プロセスが応答できることだけを返す
pub async fn health_check() -> Json<Health> {
    Json(Health::up())
}
