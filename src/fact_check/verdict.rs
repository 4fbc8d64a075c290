//! Fact-check request and verdict types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::audit::citation::clamp_confidence;

/// Source used when the check itself failed
pub const SYSTEM_ERROR_SOURCE: &str = "System Error";

/// Which kind of sources a claim is judged against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    /// Peer-reviewed journals, preprint servers and university sites
    Academic,
    /// Established news organizations
    News,
    /// Public discussion on social platforms
    Social,
    /// Government, intergovernmental and legal sources
    Authoritative,
    /// Unrecognized filters also land here
    #[default]
    #[serde(other)]
    All,
}

impl SourceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFilter::Academic => "academic",
            SourceFilter::News => "news",
            SourceFilter::Social => "social",
            SourceFilter::Authoritative => "authoritative",
            SourceFilter::All => "all",
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Ok(SourceFilter::Academic),
            "news" => Ok(SourceFilter::News),
            "social" => Ok(SourceFilter::Social),
            "authoritative" => Ok(SourceFilter::Authoritative),
            "all" => Ok(SourceFilter::All),
            other => Err(format!(
                "unknown source filter '{}' (expected academic, news, social, authoritative or all)",
                other
            )),
        }
    }
}

/// Outcome of a single-claim fact check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactVerdict {
    True,
    False,
    Unverifiable,
}

impl FactVerdict {
    /// Parse a collaborator-supplied verdict, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(FactVerdict::True),
            "false" => Some(FactVerdict::False),
            "unverifiable" => Some(FactVerdict::Unverifiable),
            _ => None,
        }
    }
}

/// Raw answer of a claim checker. Missing fields are defaulted when the
/// answer is turned into a [`FactCheckResult`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FactCheckAnswer {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Verdict returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub verdict: FactVerdict,
    pub confidence: f64,
    pub evidence: String,
    pub source: String,
}

impl FactCheckResult {
    /// Unrecognized or missing verdicts become `Unverifiable`; a missing
    /// confidence means 0.0.
    pub fn from_answer(answer: FactCheckAnswer) -> Self {
        Self {
            verdict: answer
                .verdict
                .as_deref()
                .and_then(FactVerdict::parse)
                .unwrap_or(FactVerdict::Unverifiable),
            confidence: clamp_confidence(answer.confidence, 0.0),
            evidence: answer.evidence.unwrap_or_default(),
            source: answer.source.unwrap_or_default(),
        }
    }

    /// Answer given when the check could not be carried out
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self {
            verdict: FactVerdict::Unverifiable,
            confidence: 0.0,
            evidence: format!("Verification failed. ({})", reason),
            source: SYSTEM_ERROR_SOURCE.to_string(),
        }
    }
}
