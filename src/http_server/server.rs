//! # HTTP Server
//!
//! Combines the audit, fact-check, health and observability routers into
//! one axum service.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::audit_routes::{audit_routes, AuditState};
use super::config::HttpServerConfig;
use super::fact_check_routes::{fact_check_routes, FactCheckState};
use super::observability_routes::{health_routes, observability_routes};
use super::rate_limit::{RateLimitConfig, RateLimiter};
use crate::audit::AuditOrchestrator;
use crate::fact_check::FactChecker;

/// HTTP server for the audit service
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(
        config: HttpServerConfig,
        rate_limit: &RateLimitConfig,
        orchestrator: Arc<AuditOrchestrator>,
        fact_checker: Arc<FactChecker>,
    ) -> Self {
        let router = Self::build_router(&config, rate_limit, orchestrator, fact_checker);
        Self { config, router }
    }

    /// Build the combined router with all endpoints.
    ///
    /// Each endpoint keeps its own per-caller limit.
    pub fn build_router(
        config: &HttpServerConfig,
        rate_limit: &RateLimitConfig,
        orchestrator: Arc<AuditOrchestrator>,
        fact_checker: Arc<FactChecker>,
    ) -> Router {
        let metrics = Arc::clone(orchestrator.metrics());
        let audit_state = Arc::new(AuditState::new(orchestrator, RateLimiter::new(rate_limit)));
        let fact_check_state = Arc::new(FactCheckState::new(fact_checker, RateLimiter::new(rate_limit)));

        Router::new()
            .merge(health_routes())
            .nest(
                "/api",
                audit_routes(audit_state).merge(fact_check_routes(fact_check_state)),
            )
            .nest("/observability", observability_routes(metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors_layer(&config.cors_origins)),
            )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C.
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{}: {}", self.config.socket_addr(), e),
                )
            })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Citation audit service listening");
        info!("  POST /api/audit - stream citation verdicts (NDJSON)");
        info!("  POST /api/fact-check - verify a single claim");
        info!("  GET  /health - health check");
        info!("  GET  /observability/metrics - counters");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Configured origins, or permissive when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<_> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::mock::{ScriptedConsistency, ScriptedExtractor, ScriptedLookup, ScriptedWebVerifier};
    use crate::audit::Collaborators;
    use crate::fact_check::mock::ScriptedClaimChecker;
    use crate::fact_check::FactCheckAnswer;
    use crate::observability::MetricsRegistry;
    use std::time::Duration;

    fn fact_checker() -> Arc<FactChecker> {
        Arc::new(FactChecker::new(
            Arc::new(ScriptedClaimChecker::answering(FactCheckAnswer::default())),
            Duration::from_secs(5),
            Arc::new(MetricsRegistry::new()),
        ))
    }

    fn orchestrator() -> Arc<AuditOrchestrator> {
        let collaborators = Collaborators {
            extractor: Arc::new(ScriptedExtractor::returning(vec![])),
            primary: Arc::new(ScriptedLookup::new("Primary")),
            secondary: Arc::new(ScriptedLookup::new("Secondary")),
            consistency: Arc::new(ScriptedConsistency::agreeing()),
            web: Arc::new(ScriptedWebVerifier::inconclusive()),
        };
        Arc::new(AuditOrchestrator::new(
            collaborators,
            Duration::from_secs(5),
            Arc::new(MetricsRegistry::new()),
        ))
    }

    #[test]
    fn test_server_socket_addr() {
        let server = HttpServer::new(
            HttpServerConfig::with_port(8080),
            &RateLimitConfig::default(),
            orchestrator(),
            fact_checker(),
        );
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_permissive_cors() {
        let config = HttpServerConfig {
            cors_origins: vec![],
            ..Default::default()
        };
        let server = HttpServer::new(config, &RateLimitConfig::default(), orchestrator(), fact_checker());
        let _router = server.router();
    }
}
