//! Audit HTTP Routes
//!
//! `POST /api/audit` accepts `{"text": "..."}` and answers with an NDJSON
//! stream, one line per citation in completion order.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use super::errors::{ApiError, ApiResult};
use super::rate_limit::RateLimiter;
use crate::audit::AuditOrchestrator;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Caller key used when neither a forwarded address nor a peer is known
const UNKNOWN_CALLER: &str = "unknown";

/// Shared state for audit routes
pub struct AuditState {
    pub orchestrator: Arc<AuditOrchestrator>,
    pub limiter: RateLimiter,
}

impl AuditState {
    pub fn new(orchestrator: Arc<AuditOrchestrator>, limiter: RateLimiter) -> Self {
        Self {
            orchestrator,
            limiter,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub text: String,
}

/// Create audit routes
pub fn audit_routes(state: Arc<AuditState>) -> Router {
    Router::new()
        .route("/audit", post(audit_handler))
        .with_state(state)
}

/// Peer IP, or the first `X-Forwarded-For` entry when the deployment sits
/// behind a trusted proxy.
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| trust_forwarded_for)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match (forwarded, peer) {
        (Some(first), _) => first.to_string(),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => UNKNOWN_CALLER.to_string(),
    }
}

async fn audit_handler(
    State(state): State<Arc<AuditState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let caller = caller_key(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.limiter.trusts_forwarded_for(),
    );
    if let Err(limited) = state.limiter.check(&caller, Instant::now()) {
        state.orchestrator.metrics().increment_rate_limited();
        warn!(caller = %caller, retry_after = limited.retry_after_secs, "Audit request rate limited");
        return Err(ApiError::RateLimited {
            retry_after_secs: limited.retry_after_secs,
        });
    }

    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let lines = state.orchestrator.start(request.text)?;
    debug!(caller = %caller, "Audit stream opened");

    let body = Body::from_stream(lines.map(|line| Ok::<_, Infallible>(line.to_ndjson())));
    Ok(([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], body).into_response())
}
