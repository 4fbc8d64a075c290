//! # Citation Audit Pipeline
//!
//! Extracts citation claims from free-form text, resolves each citation
//! against two academic-metadata providers, checks the claim against the
//! real abstract (or falls back to a web check when no record exists), and
//! streams one verdict per citation as soon as it is ready.

pub mod citation;
pub mod errors;
pub mod lookup;
pub mod mock;
pub mod orchestrator;
pub mod resolver;
pub mod stream;
pub mod verifier;

pub use citation::{
    years_match, AuditResult, AuditStatus, Citation, MAX_CITATIONS, MAX_TEXT_CHARS,
};
pub use errors::{validate_text, AuditError, AuditOutcome, TaskStage, ValidationError};
pub use lookup::{
    CitationExtractor, ConsistencyEvaluator, ConsistencyReport, LookupOutcome, PaperRecord,
    PrimaryLookup, SecondaryLookup, SourceLookupResult, WebFallbackVerifier, WebVerdict,
    WEB_FALLBACK_SOURCE,
};
pub use orchestrator::{AuditOrchestrator, AuditStream, Collaborators};
pub use resolver::CitationResolver;
pub use stream::AuditLine;
pub use verifier::CitationVerifier;
