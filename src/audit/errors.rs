//! # Audit Errors

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use super::citation::MAX_TEXT_CHARS;

/// Result type for audit operations
pub type AuditOutcome<T> = Result<T, AuditError>;

/// Where a citation task currently is.
///
/// `Pending -> LookingUp -> (ConsistencyCheck | WebFallback) -> Emitted`,
/// never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Pending,
    Extracting,
    LookingUp,
    ConsistencyCheck,
    WebFallback,
    Emitted,
}

impl TaskStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStage::Pending => "pending",
            TaskStage::Extracting => "extracting",
            TaskStage::LookingUp => "looking_up",
            TaskStage::ConsistencyCheck => "consistency_check",
            TaskStage::WebFallback => "web_fallback",
            TaskStage::Emitted => "emitted",
        }
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures inside the audit pipeline.
///
/// Extraction failures end the whole run; every other variant is scoped to
/// a single citation and becomes one `{"error": ...}` line.
#[derive(Debug, Clone, Error)]
pub enum AuditError {
    #[error("Citation extraction failed: {0}")]
    Extraction(String),

    #[error("{provider} lookup failed: {message}")]
    Lookup { provider: String, message: String },

    #[error("Consistency check failed: {0}")]
    Consistency(String),

    #[error("Web verification failed: {0}")]
    WebFallback(String),

    #[error("Timed out after {limit:?} during {stage}")]
    Timeout { stage: TaskStage, limit: Duration },

    #[error("Verification task failed: {0}")]
    TaskFailed(String),
}

impl AuditError {
    pub fn lookup(provider: impl Into<String>, message: impl ToString) -> Self {
        AuditError::Lookup {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}

/// Await a collaborator call, bounded by `limit`.
///
/// Collaborator errors go through `on_err`; expiry becomes a `Timeout` tagged
/// with the stage the call belongs to.
pub(crate) async fn with_timeout<T, E, F>(
    stage: TaskStage,
    limit: Duration,
    call: F,
    on_err: impl FnOnce(E) -> AuditError,
) -> AuditOutcome<T>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(on_err(e)),
        Err(_) => Err(AuditError::Timeout {
            stage,
            limit,
        }),
    }
}

/// Rejections raised before any processing begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Text must contain at least one non-whitespace character")]
    EmptyText,

    #[error("Text is {len} characters long (max: {max})")]
    TooLong { len: usize, max: usize },
}

/// Check an audit request body against the input limits.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_TEXT_CHARS,
        });
    }
    Ok(())
}
