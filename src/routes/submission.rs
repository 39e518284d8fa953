//! Survey submission endpoint
//!
//! POST /survey-submission
//!
//! Response contract:
//! - 200 `{success: true, message, data}` once the response record is
//!   durable, regardless of tag-upsert or Kit-sync outcomes
//! - 400 `{success: false, error, details}` on validation failure, with
//!   every violation listed
//! - 429 when the caller exhausts its rate-limit window
//! - 500 only when the durable write itself fails

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

use crate::orchestrator::{SubmissionSummary, SubmitError};
use crate::server::AppState;
use crate::validator::{FieldViolation, SubmissionRequest};

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
    message: &'static str,
    data: SubmissionSummary,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldViolation>,
}

/// Handle one survey submission request
pub async fn handle_submission(
    req: Request<Incoming>,
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Response<Full<Bytes>> {
    // Rate limit keyed by caller IP, before the body is read
    if !state.limiter.check(&addr.ip().to_string()) {
        warn!(caller = %addr.ip(), "Submission rate limit exceeded");
        return error_response(
            &state,
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, try again shortly".to_string(),
            Vec::new(),
        );
    }

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "Failed to read submission body");
            return error_response(
                &state,
                StatusCode::BAD_REQUEST,
                "Failed to read request body".to_string(),
                Vec::new(),
            );
        }
    };

    let request: SubmissionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Malformed submission JSON");
            return error_response(
                &state,
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", e),
                Vec::new(),
            );
        }
    };

    match state.orchestrator.process(request).await {
        Ok(summary) => {
            let body = SuccessBody {
                success: true,
                message: "Survey submission received",
                data: summary,
            };
            json_response(&state, StatusCode::OK, &body)
        }
        Err(SubmitError::Rejected(violations)) => error_response(
            &state,
            StatusCode::BAD_REQUEST,
            "Validation failed".to_string(),
            violations,
        ),
        Err(SubmitError::Storage(e)) => {
            error!(error = %e, "Submission storage failed");
            error_response(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store submission".to_string(),
                Vec::new(),
            )
        }
    }
}

fn error_response(
    state: &AppState,
    status: StatusCode,
    error: String,
    details: Vec<FieldViolation>,
) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        success: false,
        error,
        details,
    };
    json_response(state, status, &body)
}

fn json_response<T: Serialize>(
    state: &AppState,
    status: StatusCode,
    body: &T,
) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| json!({"success": false, "error": "serialization"}).to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", state.args.allowed_origin.as_str())
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}
