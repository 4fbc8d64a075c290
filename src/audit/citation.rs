//! # Citation Data Model
//!
//! Citations as produced by the extractor, and the per-citation verdict
//! emitted on the result stream.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of citations audited per request. Excess is dropped.
pub const MAX_CITATIONS: usize = 10;

/// Maximum length of an audit request body, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// One bibliographic reference extracted from user text, plus the claims
/// the text attributes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Verbatim citation text as it appears in the input
    #[serde(default, alias = "original_text", alias = "citation_text")]
    pub raw_text: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: String,

    /// Free-form year, e.g. "2023" or "2023 (preprint)"
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub doi: Option<String>,

    /// Short summary of what the text uses this citation for
    #[serde(default, alias = "claimed_intent")]
    pub intent: String,

    /// Specific factual claims attributed to the cited work
    #[serde(default, alias = "specific_claims")]
    pub claims: Vec<String>,
}

impl Citation {
    /// Create a citation with only its raw text and title set
    pub fn new(raw_text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            title: title.into(),
            author: String::new(),
            year: None,
            doi: None,
            intent: String::new(),
            claims: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    pub fn with_claims<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claims = claims.into_iter().map(Into::into).collect();
        self
    }

    /// Intent summary followed by every claim, space separated.
    ///
    /// This is the text handed to the consistency check.
    pub fn combined_claim(&self) -> String {
        let mut combined = self.intent.clone();
        for claim in &self.claims {
            combined.push(' ');
            combined.push_str(claim);
        }
        combined
    }

    /// Year as a string slice, empty when absent
    pub fn year_str(&self) -> &str {
        self.year.as_deref().unwrap_or("")
    }
}

/// Extractors occasionally emit years and DOIs as numbers or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Only the digit characters of a year field.
pub fn year_digits(year: &str) -> String {
    year.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Year comparison over digits only. A side with no digits is unknown, and
/// unknown matches anything.
pub fn years_match(claimed: &str, found: &str) -> bool {
    let claimed = year_digits(claimed);
    let found = year_digits(found);
    claimed.is_empty() || found.is_empty() || claimed == found
}

/// Final verdict for one citation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    /// The cited work exists and supports the claim
    Real,
    /// The cited work does not exist
    Fake,
    /// The cited work exists but says something else
    Mismatch,
    /// Nothing conclusive could be established
    Unverified,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Real => "REAL",
            AuditStatus::Fake => "FAKE",
            AuditStatus::Mismatch => "MISMATCH",
            AuditStatus::Unverified => "UNVERIFIED",
        }
    }

    /// Parse a collaborator-supplied status, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REAL" => Some(AuditStatus::Real),
            "FAKE" => Some(AuditStatus::Fake),
            "MISMATCH" => Some(AuditStatus::Mismatch),
            "UNVERIFIED" => Some(AuditStatus::Unverified),
            _ => None,
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for a single citation, emitted once on the result stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Copy of the citation's raw text
    pub citation_text: String,
    pub status: AuditStatus,
    /// Which collaborator produced the final answer
    pub source: String,
    pub metadata: Value,
    pub message: String,
    pub confidence: f64,
}

/// Clamp a collaborator confidence into [0.0, 1.0]; NaN becomes `fallback`.
pub fn clamp_confidence(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_nan() => fallback,
        Some(v) => v.clamp(0.0, 1.0),
        None => fallback,
    }
}
