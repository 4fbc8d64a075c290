//! HTTP Surface Tests
//!
//! Drives the axum router in-process:
//! - Health and metrics endpoints
//! - Validation and malformed bodies answer 400 with a JSON error
//! - The per-caller rate limit answers 429 before validation
//! - Successful audits stream NDJSON
//! - Fact checks answer one JSON verdict

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::extract::ConnectInfo;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use citeaudit::audit::mock::{
    ScriptedConsistency, ScriptedExtractor, ScriptedLookup, ScriptedWebVerifier,
};
use citeaudit::audit::{AuditOrchestrator, Citation, Collaborators};
use citeaudit::fact_check::mock::ScriptedClaimChecker;
use citeaudit::fact_check::{FactCheckAnswer, FactChecker};
use citeaudit::http_server::{HttpServer, HttpServerConfig, RateLimitConfig, NDJSON_CONTENT_TYPE};
use citeaudit::observability::MetricsRegistry;

// =============================================================================
// Helper Functions
// =============================================================================

fn router_with_limit(max_requests: usize) -> Router {
    router_with(RateLimitConfig {
        max_requests,
        window_secs: 60,
        trust_forwarded_for: true,
        ..Default::default()
    })
}

fn router_with(rate_limit: RateLimitConfig) -> Router {
    let collaborators = Collaborators {
        extractor: Arc::new(ScriptedExtractor::returning(vec![
            Citation::new("Vaswani et al. (2017)", "Attention Is All You Need")
                .with_year("2017")
                .with_intent("Transformers replace recurrence"),
            Citation::new("Smith (2031)", "A Paper From The Future").with_year("2031"),
        ])),
        primary: Arc::new(ScriptedLookup::new("Primary").found(
            "Attention Is All You Need",
            "2017",
            "We propose the Transformer.",
        )),
        secondary: Arc::new(ScriptedLookup::new("Secondary")),
        consistency: Arc::new(ScriptedConsistency::agreeing()),
        web: Arc::new(ScriptedWebVerifier::inconclusive()),
    };
    let metrics = Arc::new(MetricsRegistry::new());
    let orchestrator = AuditOrchestrator::new(collaborators, Duration::from_secs(5), Arc::clone(&metrics));
    let fact_checker = FactChecker::new(
        Arc::new(ScriptedClaimChecker::answering(FactCheckAnswer {
            verdict: Some("False".to_string()),
            confidence: Some(0.9),
            evidence: Some("The tower stands in Paris.".to_string()),
            source: Some("UNESCO".to_string()),
        })),
        Duration::from_secs(5),
        metrics,
    );
    HttpServer::build_router(
        &HttpServerConfig::default(),
        &rate_limit,
        Arc::new(orchestrator),
        Arc::new(fact_checker),
    )
}

fn router() -> Router {
    router_with_limit(10)
}

fn audit_request(caller: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/audit")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", caller)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// =============================================================================
// Health and Metrics
// =============================================================================

#[tokio::test]
async fn test_health_at_root_and_health_path() {
    for path in ["/", "/health", "/observability/health"] {
        let response = router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}

#[tokio::test]
async fn test_metrics_reflect_audits() {
    let app = router();
    let response = app
        .clone()
        .oneshot(audit_request("10.0.0.1", json!({"text": "See Vaswani et al. (2017)."})))
        .await
        .unwrap();
    body_text(response).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/observability/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let metrics = body_json(response).await;
    assert_eq!(metrics["audits_started"], 1);
    assert_eq!(metrics["citations_processed"], 2);
    assert_eq!(metrics["web_fallbacks"], 1);
}

// =============================================================================
// Audit Endpoint
// =============================================================================

#[tokio::test]
async fn test_audit_streams_ndjson() {
    let response = router()
        .oneshot(audit_request("10.0.0.1", json!({"text": "See Vaswani et al. (2017)."})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], NDJSON_CONTENT_TYPE);

    let text = body_text(response).await;
    assert!(text.ends_with('\n'));
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    let real = lines
        .iter()
        .find(|l| l["citation_text"] == "Vaswani et al. (2017)")
        .unwrap();
    assert_eq!(real["status"], "REAL");
    assert_eq!(real["source"], "Primary");

    let unknown = lines
        .iter()
        .find(|l| l["citation_text"] == "Smith (2031)")
        .unwrap();
    assert_eq!(unknown["status"], "UNVERIFIED");
    assert_eq!(unknown["source"], "Google Search");
    for key in ["citation_text", "status", "source", "metadata", "message", "confidence"] {
        assert!(unknown.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_blank_text_is_400() {
    let response = router()
        .oneshot(audit_request("10.0.0.1", json!({"text": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("non-whitespace"));
}

#[tokio::test]
async fn test_overlong_text_is_400() {
    let response = router()
        .oneshot(audit_request("10.0.0.1", json!({"text": "a".repeat(5001)})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let response = router()
        .oneshot(audit_request("10.0.0.1", json!({"content": "wrong field"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

// =============================================================================
// Fact-check Endpoint
// =============================================================================

fn fact_check_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/fact-check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_fact_check_returns_verdict() {
    let app = router();
    let response = app
        .clone()
        .oneshot(fact_check_request(
            json!({"text": "The Eiffel Tower is in Rome.", "source_filter": "authoritative"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "verdict": "False",
            "confidence": 0.9,
            "evidence": "The tower stands in Paris.",
            "source": "UNESCO"
        })
    );

    let response = app
        .oneshot(Request::builder().uri("/observability/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["fact_checks"], 1);
}

#[tokio::test]
async fn test_fact_check_blank_claim_is_400() {
    let response = router()
        .oneshot(fact_check_request(json!({"text": " "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 400);
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limit_per_caller() {
    let app = router_with_limit(2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(audit_request("203.0.113.9", json!({"text": "See Smith (2031)."})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await;
    }

    let response = app
        .clone()
        .oneshot(audit_request("203.0.113.9", json!({"text": "See Smith (2031)."})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);
    assert_eq!(body_json(response).await["code"], 429);

    // Another caller has its own window.
    let response = app
        .oneshot(audit_request("198.51.100.4", json!({"text": "See Smith (2031)."})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_applies_before_validation() {
    let app = router_with_limit(1);

    let response = app
        .clone()
        .oneshot(audit_request("192.0.2.1", json!({"text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(audit_request("192.0.2.1", json!({"text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_header_rotation_does_not_bypass_limit() {
    let app = router_with(RateLimitConfig {
        max_requests: 2,
        ..Default::default()
    });
    let peer: SocketAddr = "10.9.9.9:52000".parse().unwrap();

    let mut statuses = Vec::new();
    for i in 0..5 {
        let mut request = audit_request(&format!("198.51.100.{}", i), json!({"text": "See Smith (2031)."}));
        request.extensions_mut().insert(ConnectInfo(peer));
        let response = app.clone().oneshot(request).await.unwrap();
        statuses.push(response.status());
        body_text(response).await;
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}
