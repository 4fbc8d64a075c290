//! # Fact Checking
//!
//! Verifies one standalone claim against a chosen family of sources and
//! answers with a `True` / `False` / `Unverifiable` verdict.

pub mod checker;
pub mod mock;
pub mod verdict;

pub use checker::{ClaimChecker, FactChecker};
pub use verdict::{FactCheckAnswer, FactCheckResult, FactVerdict, SourceFilter, SYSTEM_ERROR_SOURCE};
