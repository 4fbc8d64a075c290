//! # Collaborator Interfaces
//!
//! The audit core talks to five remote collaborators. Each is a trait so the
//! HTTP-backed implementations in `providers` and the scripted ones in
//! `audit::mock` are interchangeable.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::citation::Citation;
use crate::providers::ProviderError;

/// Label reported as `source` when the web fallback produced the verdict.
pub const WEB_FALLBACK_SOURCE: &str = "Google Search";

/// A paper record returned by a lookup provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaperRecord {
    /// Publication year, normalized to a string; may be empty
    pub year: String,
    /// Real abstract; may be empty
    pub abstract_text: String,
    /// Provider fields passed through unmodified
    pub metadata: Map<String, Value>,
}

/// Found/not-found result of a single lookup call
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(PaperRecord),
    NotFound,
}

/// Outcome of one lookup, tagged with the provider that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLookupResult {
    pub provider: String,
    pub outcome: LookupOutcome,
}

impl SourceLookupResult {
    pub fn found(provider: impl Into<String>, record: PaperRecord) -> Self {
        Self {
            provider: provider.into(),
            outcome: LookupOutcome::Found(record),
        }
    }

    pub fn not_found(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            outcome: LookupOutcome::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Found(_))
    }

    pub fn record(&self) -> Option<&PaperRecord> {
        match &self.outcome {
            LookupOutcome::Found(record) => Some(record),
            LookupOutcome::NotFound => None,
        }
    }

    /// Normalized year, empty when not found
    pub fn year(&self) -> &str {
        self.record().map(|r| r.year.as_str()).unwrap_or("")
    }
}

/// Primary academic-metadata source, queried with every bibliographic field
#[async_trait]
pub trait PrimaryLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(
        &self,
        title: &str,
        author: &str,
        year: Option<&str>,
        doi: Option<&str>,
    ) -> Result<SourceLookupResult, ProviderError>;
}

/// Secondary academic-metadata source, queried by title and author only
#[async_trait]
pub trait SecondaryLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, title: &str, author: &str) -> Result<SourceLookupResult, ProviderError>;
}

/// Turns free-form text into structured citation claims
#[async_trait]
pub trait CitationExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<Citation>, ProviderError>;
}

/// Raw answer of a consistency check. Missing fields are defaulted by the
/// verifier, not by the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConsistencyReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "explanation")]
    pub reason: Option<String>,
}

/// Compares a claim against a real abstract
#[async_trait]
pub trait ConsistencyEvaluator: Send + Sync {
    async fn check(
        &self,
        claim: &str,
        abstract_text: &str,
    ) -> Result<ConsistencyReport, ProviderError>;
}

/// Raw answer of the web fallback
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebVerdict {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub actual_paper_info: Value,
}

/// Coarse verification used when no structured source has a record
#[async_trait]
pub trait WebFallbackVerifier: Send + Sync {
    async fn verify(
        &self,
        title: &str,
        author: &str,
        intent: &str,
    ) -> Result<WebVerdict, ProviderError>;
}
