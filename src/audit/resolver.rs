//! # Citation Resolver
//!
//! Fallback policy across the two lookup providers.
//!
//! The primary provider is always queried first. The secondary is consulted
//! only when the primary has no record or its year disagrees with the
//! citation, and it replaces the primary only when that strictly improves
//! the answer. A year mismatch on both sides keeps the primary.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::citation::{years_match, Citation};
use super::errors::{with_timeout, AuditError, AuditOutcome, TaskStage};
use super::lookup::{LookupOutcome, PrimaryLookup, SecondaryLookup, SourceLookupResult};
use crate::observability::MetricsRegistry;

/// Whether the secondary provider has to be asked, given the primary answer.
pub fn needs_secondary(citation_year: &str, primary: &SourceLookupResult) -> bool {
    match &primary.outcome {
        LookupOutcome::NotFound => true,
        LookupOutcome::Found(record) => !years_match(citation_year, &record.year),
    }
}

/// Tie-break between the primary answer and the (optional) secondary answer.
///
/// Returns `true` when the secondary should replace the primary.
pub fn prefer_secondary(
    citation_year: &str,
    primary: &SourceLookupResult,
    secondary: &SourceLookupResult,
) -> bool {
    let LookupOutcome::Found(found) = &secondary.outcome else {
        return false;
    };
    match &primary.outcome {
        LookupOutcome::NotFound => true,
        LookupOutcome::Found(record) => {
            !years_match(citation_year, &record.year) && years_match(citation_year, &found.year)
        }
    }
}

/// Picks the winning lookup result for a citation
#[derive(Clone)]
pub struct CitationResolver {
    primary: Arc<dyn PrimaryLookup>,
    secondary: Arc<dyn SecondaryLookup>,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl CitationResolver {
    pub fn new(
        primary: Arc<dyn PrimaryLookup>,
        secondary: Arc<dyn SecondaryLookup>,
        timeout: Duration,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            primary,
            secondary,
            timeout,
            metrics,
        }
    }

    /// Resolve a citation to the winning lookup result.
    ///
    /// The winner carries the name of the provider that produced it.
    pub async fn resolve(&self, citation: &Citation) -> AuditOutcome<SourceLookupResult> {
        let year = citation.year_str();

        self.metrics.increment_primary_lookups();
        let primary_name = self.primary.name().to_string();
        let primary = with_timeout(
            TaskStage::LookingUp,
            self.timeout,
            self.primary.lookup(
                &citation.title,
                &citation.author,
                citation.year.as_deref(),
                citation.doi.as_deref(),
            ),
            |e| AuditError::lookup(primary_name, e),
        )
        .await?;

        if !needs_secondary(year, &primary) {
            debug!(provider = %primary.provider, "primary lookup accepted");
            return Ok(primary);
        }

        self.metrics.increment_secondary_lookups();
        let secondary_name = self.secondary.name().to_string();
        let secondary = with_timeout(
            TaskStage::LookingUp,
            self.timeout,
            self.secondary.lookup(&citation.title, &citation.author),
            |e| AuditError::lookup(secondary_name, e),
        )
        .await?;

        if prefer_secondary(year, &primary, &secondary) {
            self.metrics.increment_secondary_adopted();
            debug!(provider = %secondary.provider, "secondary lookup adopted");
            Ok(secondary)
        } else {
            debug!(
                provider = %primary.provider,
                primary_found = primary.is_found(),
                secondary_found = secondary.is_found(),
                "primary lookup kept"
            );
            Ok(primary)
        }
    }
}
