//! HTTP server implementation
//!
//! hyper http1 accept loop with one tokio task per connection. Each
//! submission runs to completion inside its own request task; there is
//! no shared queue or cross-request coordination beyond the injected
//! rate limiter and the stores themselves.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::orchestrator::Orchestrator;
use crate::rate_limit::RateLimiter;
use crate::routes;
use crate::types::IntakeError;

/// Shared application state, constructed once at startup
pub struct AppState {
    pub args: Args,
    pub orchestrator: Arc<Orchestrator>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, orchestrator: Arc<Orchestrator>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            args,
            orchestrator,
            limiter,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), IntakeError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Intake listening on {}", state.args.listen);

    // Periodic rate-limit bucket cleanup
    {
        let limiter = Arc::clone(&state.limiter);
        let window = state.args.rate_limit_window();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(window * 2);
            loop {
                interval.tick().await;
                limiter.prune();
            }
        });
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        (Method::POST, "/survey-submission") => {
            routes::handle_submission(req, Arc::clone(&state), addr).await
        }

        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight for the onboarding form
        (Method::OPTIONS, _) => preflight_response(&state.args.allowed_origin),

        _ => not_found_response(&path),
    };

    Ok(response)
}

/// CORS preflight response
fn preflight_response(allowed_origin: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", allowed_origin)
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "success": false,
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
