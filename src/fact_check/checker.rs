//! # Single-claim Fact Checking
//!
//! Judges one free-standing statement against a chosen family of sources.
//! A failed or timed-out check is still answered, with an `Unverifiable`
//! verdict that carries the failure reason.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::verdict::{FactCheckAnswer, FactCheckResult, SourceFilter};
use crate::audit::{validate_text, ValidationError};
use crate::observability::MetricsRegistry;
use crate::providers::ProviderError;

/// Judges a claim against sources of the requested kind
#[async_trait]
pub trait ClaimChecker: Send + Sync {
    async fn check_claim(
        &self,
        claim: &str,
        filter: SourceFilter,
    ) -> Result<FactCheckAnswer, ProviderError>;
}

/// Fact-check service. Cheap to clone.
#[derive(Clone)]
pub struct FactChecker {
    checker: Arc<dyn ClaimChecker>,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl FactChecker {
    pub fn new(checker: Arc<dyn ClaimChecker>, timeout: Duration, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            checker,
            timeout,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Check `claim`. Only input validation can fail; collaborator failures
    /// are folded into the returned verdict.
    pub async fn verify_claim(
        &self,
        claim: &str,
        filter: SourceFilter,
    ) -> Result<FactCheckResult, ValidationError> {
        validate_text(claim)?;
        self.metrics.increment_fact_checks();

        let answer = match tokio::time::timeout(self.timeout, self.checker.check_claim(claim, filter)).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("Timed out after {:?}", self.timeout)),
        };

        match answer {
            Ok(answer) => {
                let result = FactCheckResult::from_answer(answer);
                info!(filter = %filter, verdict = ?result.verdict, "claim checked");
                Ok(result)
            }
            Err(e) => {
                self.metrics.increment_fact_check_failures();
                warn!(filter = %filter, error = %e, "fact check failed");
                Ok(FactCheckResult::failed(e))
            }
        }
    }
}
