//! # Verification Dispatch
//!
//! Runs one citation through resolution and then either the consistency
//! check (a record was found) or the web fallback (nothing was found).

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use super::citation::{clamp_confidence, AuditResult, AuditStatus, Citation};
use super::errors::{with_timeout, AuditError, AuditOutcome, TaskStage};
use super::lookup::{
    ConsistencyEvaluator, ConsistencyReport, LookupOutcome, WebFallbackVerifier, WebVerdict,
    WEB_FALLBACK_SOURCE,
};
use super::resolver::CitationResolver;
use crate::observability::MetricsRegistry;

/// Map a consistency report onto a verdict for the found path.
///
/// A missing status means REAL and a missing confidence means 1.0. A status
/// outside the known set is UNVERIFIED.
pub fn consistency_verdict(report: &ConsistencyReport) -> (AuditStatus, f64) {
    let status = match report.status.as_deref() {
        None => AuditStatus::Real,
        Some(raw) => AuditStatus::parse(raw).unwrap_or(AuditStatus::Unverified),
    };
    (status, clamp_confidence(report.confidence, 1.0))
}

/// Map a web verdict for the not-found path. Anything unrecognized, missing
/// included, is UNVERIFIED; a missing confidence means 0.0.
pub fn web_verdict(verdict: &WebVerdict) -> (AuditStatus, f64) {
    let status = verdict
        .verdict
        .as_deref()
        .and_then(AuditStatus::parse)
        .unwrap_or(AuditStatus::Unverified);
    (status, clamp_confidence(verdict.confidence, 0.0))
}

/// Verifies a single citation end to end. Cheap to clone; every
/// collaborator is shared behind an `Arc`.
#[derive(Clone)]
pub struct CitationVerifier {
    resolver: CitationResolver,
    consistency: Arc<dyn ConsistencyEvaluator>,
    web: Arc<dyn WebFallbackVerifier>,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl CitationVerifier {
    pub fn new(
        resolver: CitationResolver,
        consistency: Arc<dyn ConsistencyEvaluator>,
        web: Arc<dyn WebFallbackVerifier>,
        timeout: Duration,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            resolver,
            consistency,
            web,
            timeout,
            metrics,
        }
    }

    /// Produce the verdict for one citation. No retries; any collaborator
    /// failure is returned as this citation's error.
    pub async fn verify(&self, citation: &Citation) -> AuditOutcome<AuditResult> {
        debug!(title = %citation.title, stage = %TaskStage::LookingUp, "citation task");
        let winner = self.resolver.resolve(citation).await?;

        match winner.outcome {
            LookupOutcome::Found(record) => {
                debug!(title = %citation.title, stage = %TaskStage::ConsistencyCheck, "citation task");
                self.metrics.increment_consistency_checks();
                let report = with_timeout(
                    TaskStage::ConsistencyCheck,
                    self.timeout,
                    self.consistency
                        .check(&citation.combined_claim(), &record.abstract_text),
                    |e| AuditError::Consistency(e.to_string()),
                )
                .await?;

                let (status, confidence) = consistency_verdict(&report);
                Ok(AuditResult {
                    citation_text: citation.raw_text.clone(),
                    status,
                    source: winner.provider,
                    metadata: Value::Object(record.metadata),
                    message: report.reason.unwrap_or_default(),
                    confidence,
                })
            }
            LookupOutcome::NotFound => {
                debug!(title = %citation.title, stage = %TaskStage::WebFallback, "citation task");
                self.metrics.increment_web_fallbacks();
                let verdict = with_timeout(
                    TaskStage::WebFallback,
                    self.timeout,
                    self.web
                        .verify(&citation.title, &citation.author, &citation.intent),
                    |e| AuditError::WebFallback(e.to_string()),
                )
                .await?;

                let (status, confidence) = web_verdict(&verdict);
                Ok(AuditResult {
                    citation_text: citation.raw_text.clone(),
                    status,
                    source: WEB_FALLBACK_SOURCE.to_string(),
                    metadata: json!({ "actual_paper_info": verdict.actual_paper_info }),
                    message: verdict.reason.unwrap_or_default(),
                    confidence,
                })
            }
        }
    }
}
