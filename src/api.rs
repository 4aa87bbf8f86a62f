//! Unified API router for Privacy Shield
//!
//! Mounts the privacy handlers (optionally under a base path), adds a
//! health probe, CORS, request tracing and the body size limit.
//!
//! ## Endpoint Map
//!
//! | Path                          | Description                         |
//! |-------------------------------|-------------------------------------|
//! | `/health`                     | Health probe                        |
//! | `{base}/compliance-check`     | Validate payload against a rule set |
//! | `{base}/pii-redact`           | Redact PII from a JSON value        |
//! | `{base}/data-encrypt`         | Encrypt a JSON value                |
//! | `{base}/compliance-rules`     | List registered rule sets           |

use crate::config::ServerConfig;
use crate::privacy::handler::{privacy_router, PrivacyState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Privacy Shield HTTP application
pub fn build_app(privacy_state: PrivacyState, server: &ServerConfig) -> Router {
    let base_path = server.base_path.trim_matches('/');
    let handlers = privacy_router(privacy_state);

    let router = if base_path.is_empty() {
        Router::new().merge(handlers)
    } else {
        Router::new().nest(&format!("/{}", base_path), handlers)
    };

    router
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(build_cors(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}
