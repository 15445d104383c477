//! Health check endpoints.

use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::models::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Service name.
    pub service: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Service status.
    pub status: &'static str,
    /// Songs folder accessible.
    pub songs_folder: bool,
}

/// Health check endpoint.
///
/// GET /health
///
/// Returns 200 if the service is running.
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: env!("CARGO_PKG_NAME"),
    })
}

/// Readiness check endpoint.
///
/// GET /ready
///
/// Returns 200 once the songs folder is an accessible directory.
#[get("/ready")]
pub async fn ready(data: web::Data<AppState>) -> HttpResponse {
    let songs_folder = tokio::fs::metadata(data.library.root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let response = ReadyResponse {
        status: if songs_folder { "ready" } else { "not_ready" },
        songs_folder,
    };

    if songs_folder {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
