//! # Audit Orchestrator
//!
//! Fans the extracted citations out into independent verification tasks and
//! yields one line per task in completion order.
//!
//! The tasks live in a `JoinSet` owned by the returned stream. Whoever
//! consumes the stream sees each verdict as soon as its task finishes, and
//! dropping the stream (e.g. the HTTP client went away) aborts every task
//! still in flight.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::citation::{AuditResult, Citation, MAX_CITATIONS};
use super::errors::{validate_text, with_timeout, AuditError, AuditOutcome, TaskStage, ValidationError};
use super::lookup::{
    CitationExtractor, ConsistencyEvaluator, PrimaryLookup, SecondaryLookup, WebFallbackVerifier,
};
use super::resolver::CitationResolver;
use super::stream::AuditLine;
use super::verifier::CitationVerifier;
use crate::observability::MetricsRegistry;

/// Lazily produced, finite sequence of result lines
pub type AuditStream = BoxStream<'static, AuditLine>;

/// The remote collaborators an orchestrator is built from
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn CitationExtractor>,
    pub primary: Arc<dyn PrimaryLookup>,
    pub secondary: Arc<dyn SecondaryLookup>,
    pub consistency: Arc<dyn ConsistencyEvaluator>,
    pub web: Arc<dyn WebFallbackVerifier>,
}

/// The audit service. Constructed once and shared by reference (or `Arc`)
/// with whatever serves requests.
#[derive(Clone)]
pub struct AuditOrchestrator {
    extractor: Arc<dyn CitationExtractor>,
    verifier: CitationVerifier,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl AuditOrchestrator {
    /// Build an orchestrator. `timeout` bounds every single collaborator call.
    pub fn new(collaborators: Collaborators, timeout: Duration, metrics: Arc<MetricsRegistry>) -> Self {
        let resolver = CitationResolver::new(
            collaborators.primary,
            collaborators.secondary,
            timeout,
            Arc::clone(&metrics),
        );
        let verifier = CitationVerifier::new(
            resolver,
            collaborators.consistency,
            collaborators.web,
            timeout,
            Arc::clone(&metrics),
        );
        Self {
            extractor: collaborators.extractor,
            verifier,
            timeout,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Validate `text` and, if it passes, start an audit run.
    ///
    /// Nothing is extracted or streamed for rejected input.
    pub fn start(&self, text: impl Into<String>) -> Result<AuditStream, ValidationError> {
        let text = text.into();
        if let Err(e) = validate_text(&text) {
            self.metrics.increment_audits_rejected();
            return Err(e);
        }
        self.metrics.increment_audits_started();
        Ok(self.run(text))
    }

    /// Run an audit over already validated text.
    pub fn run(&self, text: impl Into<String>) -> AuditStream {
        let span = info_span!("audit", request_id = %Uuid::new_v4());
        let state = RunState::Extract {
            orchestrator: self.clone(),
            text: text.into(),
            span,
        };
        stream::unfold(state, RunState::advance).boxed()
    }

    async fn extract(&self, text: &str) -> AuditOutcome<Vec<Citation>> {
        with_timeout(
            TaskStage::Extracting,
            self.timeout,
            self.extractor.extract(text),
            |e| AuditError::Extraction(e.to_string()),
        )
        .await
    }

    /// Extract, cap and spawn. Produces the first line of the run.
    async fn begin(self, text: String, span: Span) -> Option<(AuditLine, RunState)> {
        let mut citations = match self.extract(&text).instrument(span.clone()).await {
            Ok(citations) => citations,
            Err(e) => {
                self.metrics.record_extraction_failure(&e);
                span.in_scope(|| warn!(error = %e, "extraction failed"));
                return Some((AuditLine::error(e.to_string()), RunState::Done));
            }
        };

        let dropped = citations.len().saturating_sub(MAX_CITATIONS);
        citations.truncate(MAX_CITATIONS);
        self.metrics.add_citations_dropped(dropped as u64);
        span.in_scope(|| info!(citations = citations.len(), dropped, "citations extracted"));

        if citations.is_empty() {
            return Some((AuditLine::no_citations(), RunState::Done));
        }

        self.metrics.add_citations_processed(citations.len() as u64);
        let mut tasks = JoinSet::new();
        for citation in citations {
            let verifier = self.verifier.clone();
            let task_span = info_span!(parent: &span, "citation", title = %citation.title);
            tasks.spawn(
                async move {
                    debug!(stage = %TaskStage::Pending, "citation task");
                    verifier.verify(&citation).await
                }
                .instrument(task_span),
            );
        }

        next_line(tasks, self.metrics, span).await
    }
}

/// Progress of one run, driven by the stream
enum RunState {
    Extract {
        orchestrator: AuditOrchestrator,
        text: String,
        span: Span,
    },
    Drain {
        tasks: JoinSet<AuditOutcome<AuditResult>>,
        metrics: Arc<MetricsRegistry>,
        span: Span,
    },
    Done,
}

impl RunState {
    async fn advance(self) -> Option<(AuditLine, RunState)> {
        match self {
            RunState::Extract {
                orchestrator,
                text,
                span,
            } => orchestrator.begin(text, span).await,
            RunState::Drain {
                tasks,
                metrics,
                span,
            } => next_line(tasks, metrics, span).await,
            RunState::Done => None,
        }
    }
}

/// Wait for whichever task finishes first. `None` once all have emitted.
async fn next_line(
    mut tasks: JoinSet<AuditOutcome<AuditResult>>,
    metrics: Arc<MetricsRegistry>,
    span: Span,
) -> Option<(AuditLine, RunState)> {
    let joined = tasks.join_next().await?;
    let line = completed_line(joined, &metrics, &span);
    Some((
        line,
        RunState::Drain {
            tasks,
            metrics,
            span,
        },
    ))
}

/// Turn a finished task into its stream line
fn completed_line(
    joined: Result<AuditOutcome<AuditResult>, JoinError>,
    metrics: &MetricsRegistry,
    span: &Span,
) -> AuditLine {
    let outcome = joined.unwrap_or_else(|e| Err(AuditError::TaskFailed(e.to_string())));
    match outcome {
        Ok(result) => {
            span.in_scope(|| {
                debug!(
                    stage = %TaskStage::Emitted,
                    status = %result.status,
                    source = %result.source,
                    "citation task"
                )
            });
            AuditLine::Result(result)
        }
        Err(e) => {
            metrics.record_task_failure(&e);
            span.in_scope(|| warn!(error = %e, "citation task failed"));
            AuditLine::error(e.to_string())
        }
    }
}
