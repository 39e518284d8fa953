//! Health and version endpoints
//!
//! - /health, /healthz - liveness probe
//! - /version - build info for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    /// Whether Kit sync is configured (skipped outcomes otherwise)
    #[serde(rename = "kitConfigured")]
    pub kit_configured: bool,
}

/// Liveness probe - returns 200 whenever the service is running
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let body = HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        kit_configured: state.args.kit_api_key.is_some(),
    };

    json_response(StatusCode::OK, &body)
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    #[serde(rename = "gitCommit")]
    pub git_commit: &'static str,
    #[serde(rename = "buildTimestamp")]
    pub build_timestamp: &'static str,
}

/// Version info captured by the build script
pub fn version_info() -> Response<Full<Bytes>> {
    let body = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        git_commit: env!("GIT_COMMIT_SHORT"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
    };

    json_response(StatusCode::OK, &body)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}
