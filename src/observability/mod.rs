//! Observability for the audit service
//!
//! - Structured logging through `tracing` (pretty or JSON)
//! - Atomic pipeline counters
//!
//! # Usage
//!
//! ```ignore
//! use citeaudit::observability::{logging, LogFormat, MetricsRegistry};
//!
//! logging::init(LogFormat::Json);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_audits_started();
//! ```

pub mod logging;
mod metrics;

pub use logging::LogFormat;
pub use metrics::{MetricsRegistry, MetricsSnapshot};
