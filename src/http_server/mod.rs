//! # HTTP Server Module
//!
//! Axum front end for the citation audit pipeline.
//!
//! # Endpoints
//!
//! - `/`, `/health` - Health check
//! - `POST /api/audit` - Audit text, streaming NDJSON verdicts
//! - `POST /api/fact-check` - Verify one claim
//! - `/observability/*` - Health and metrics

pub mod audit_routes;
pub mod config;
pub mod errors;
pub mod fact_check_routes;
pub mod observability_routes;
pub mod rate_limit;
pub mod server;

pub use audit_routes::{AuditRequest, AuditState, NDJSON_CONTENT_TYPE};
pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use fact_check_routes::{FactCheckRequest, FactCheckState};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use server::HttpServer;
