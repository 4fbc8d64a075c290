//! Fact-check HTTP Routes
//!
//! `POST /api/fact-check` accepts `{"text": "...", "source_filter": "news"}`
//! and answers with one JSON verdict.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use super::audit_routes::caller_key;
use super::errors::{ApiError, ApiResult};
use super::rate_limit::RateLimiter;
use crate::fact_check::{FactCheckResult, FactChecker, SourceFilter};

/// Shared state for fact-check routes
pub struct FactCheckState {
    pub checker: Arc<FactChecker>,
    pub limiter: RateLimiter,
}

impl FactCheckState {
    pub fn new(checker: Arc<FactChecker>, limiter: RateLimiter) -> Self {
        Self { checker, limiter }
    }
}

#[derive(Debug, Deserialize)]
pub struct FactCheckRequest {
    pub text: String,
    /// Omitted or unrecognized filters check against all sources
    #[serde(default)]
    pub source_filter: SourceFilter,
}

/// Create fact-check routes
pub fn fact_check_routes(state: Arc<FactCheckState>) -> Router {
    Router::new()
        .route("/fact-check", post(fact_check_handler))
        .with_state(state)
}

async fn fact_check_handler(
    State(state): State<Arc<FactCheckState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<FactCheckRequest>, JsonRejection>,
) -> ApiResult<Json<FactCheckResult>> {
    let caller = caller_key(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.limiter.trusts_forwarded_for(),
    );
    if let Err(limited) = state.limiter.check(&caller, Instant::now()) {
        state.checker.metrics().increment_rate_limited();
        warn!(caller = %caller, retry_after = limited.retry_after_secs, "Fact check rate limited");
        return Err(ApiError::RateLimited {
            retry_after_secs: limited.retry_after_secs,
        });
    }

    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    let result = state
        .checker
        .verify_claim(&request.text, request.source_filter)
        .await?;
    Ok(Json(result))
}
