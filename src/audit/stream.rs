//! # Result Stream Protocol
//!
//! Newline-delimited JSON. Each line is exactly one of:
//!
//! - `{citation_text, status, source, metadata, message, confidence}`
//! - `{"error": "..."}` for an extraction failure or one failed citation
//! - `{"info": "..."}` only when no citations were found

use serde::{Deserialize, Serialize};

use super::citation::AuditResult;

/// Message sent when extraction produced no citations
pub const NO_CITATIONS_MESSAGE: &str = "No citations found in the provided text.";

/// One line of the result stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditLine {
    Result(AuditResult),
    Error { error: String },
    Info { info: String },
}

impl AuditLine {
    pub fn error(message: impl Into<String>) -> Self {
        AuditLine::Error {
            error: message.into(),
        }
    }

    pub fn no_citations() -> Self {
        AuditLine::Info {
            info: NO_CITATIONS_MESSAGE.to_string(),
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, AuditLine::Result(_))
    }

    pub fn as_result(&self) -> Option<&AuditResult> {
        match self {
            AuditLine::Result(result) => Some(result),
            _ => None,
        }
    }

    /// Serialize as a single JSON line, newline included.
    pub fn to_ndjson(&self) -> String {
        // Infallible for these variants; the fallback is still valid JSON.
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {}\"}}", e));
        line.push('\n');
        line
    }
}

impl From<AuditResult> for AuditLine {
    fn from(result: AuditResult) -> Self {
        AuditLine::Result(result)
    }
}
