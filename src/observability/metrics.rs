//! Metrics registry for the audit service
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::audit::AuditError;

/// Operational counters for audits, lookups and the HTTP gate.
///
/// # Thread Safety
///
/// All counters use atomic operations with Relaxed ordering; readers only
/// need eventually consistent values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Audit runs that passed validation
    audits_started: AtomicU64,
    /// Requests rejected by input validation
    audits_rejected: AtomicU64,
    /// Requests rejected by the per-caller rate limit
    rate_limited: AtomicU64,
    /// Runs whose extraction step failed
    extraction_failures: AtomicU64,
    /// Citations handed to a verification task
    citations_processed: AtomicU64,
    /// Citations dropped by the per-request cap
    citations_dropped: AtomicU64,
    primary_lookups: AtomicU64,
    secondary_lookups: AtomicU64,
    /// Times the secondary provider replaced the primary as winner
    secondary_adopted: AtomicU64,
    consistency_checks: AtomicU64,
    web_fallbacks: AtomicU64,
    /// Citation tasks that ended in an error line
    task_failures: AtomicU64,
    /// Collaborator calls that hit the remote timeout
    timeouts: AtomicU64,
    /// Single-claim fact checks answered
    fact_checks: AtomicU64,
    /// Fact checks answered with the fallback verdict
    fact_check_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Request gate

    pub fn increment_audits_started(&self) {
        self.audits_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_audits_rejected(&self) {
        self.audits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    // Orchestration

    pub fn increment_extraction_failures(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_citations_processed(&self, count: u64) {
        self.citations_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_citations_dropped(&self, count: u64) {
        self.citations_dropped.fetch_add(count, Ordering::Relaxed);
    }

    // Resolution

    pub fn increment_primary_lookups(&self) {
        self.primary_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_secondary_lookups(&self) {
        self.secondary_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_secondary_adopted(&self) {
        self.secondary_adopted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_consistency_checks(&self) {
        self.consistency_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_web_fallbacks(&self) {
        self.web_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed citation task, and its timeout if that was the cause
    pub fn record_task_failure(&self, error: &AuditError) {
        self.task_failures.fetch_add(1, Ordering::Relaxed);
        if matches!(error, AuditError::Timeout { .. }) {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    // Fact checks

    pub fn increment_fact_checks(&self) {
        self.fact_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fact_check_failures(&self) {
        self.fact_check_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed extraction, and its timeout if that was the cause
    pub fn record_extraction_failure(&self, error: &AuditError) {
        self.increment_extraction_failures();
        if matches!(error, AuditError::Timeout { .. }) {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            audits_started: self.audits_started.load(Ordering::Relaxed),
            audits_rejected: self.audits_rejected.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            citations_processed: self.citations_processed.load(Ordering::Relaxed),
            citations_dropped: self.citations_dropped.load(Ordering::Relaxed),
            primary_lookups: self.primary_lookups.load(Ordering::Relaxed),
            secondary_lookups: self.secondary_lookups.load(Ordering::Relaxed),
            secondary_adopted: self.secondary_adopted.load(Ordering::Relaxed),
            consistency_checks: self.consistency_checks.load(Ordering::Relaxed),
            web_fallbacks: self.web_fallbacks.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            fact_checks: self.fact_checks.load(Ordering::Relaxed),
            fact_check_failures: self.fact_check_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub audits_started: u64,
    pub audits_rejected: u64,
    pub rate_limited: u64,
    pub extraction_failures: u64,
    pub citations_processed: u64,
    pub citations_dropped: u64,
    pub primary_lookups: u64,
    pub secondary_lookups: u64,
    pub secondary_adopted: u64,
    pub consistency_checks: u64,
    pub web_fallbacks: u64,
    pub task_failures: u64,
    pub timeouts: u64,
    pub fact_checks: u64,
    pub fact_check_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::TaskStage;
    use std::time::Duration;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();

        assert_eq!(snapshot.audits_started, 0);
        assert_eq!(snapshot.citations_processed, 0);
        assert_eq!(snapshot.timeouts, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_audits_started();
        registry.increment_audits_started();
        registry.increment_audits_rejected();
        registry.add_citations_processed(10);
        registry.add_citations_dropped(5);
        registry.increment_primary_lookups();
        registry.increment_secondary_lookups();
        registry.increment_secondary_adopted();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.audits_started, 2);
        assert_eq!(snapshot.audits_rejected, 1);
        assert_eq!(snapshot.citations_processed, 10);
        assert_eq!(snapshot.citations_dropped, 5);
        assert_eq!(snapshot.primary_lookups, 1);
        assert_eq!(snapshot.secondary_lookups, 1);
        assert_eq!(snapshot.secondary_adopted, 1);
    }

    #[test]
    fn test_timeouts_counted_with_failures() {
        let registry = MetricsRegistry::new();

        registry.record_task_failure(&AuditError::Consistency("bad gateway".into()));
        registry.record_task_failure(&AuditError::Timeout {
            stage: TaskStage::LookingUp,
            limit: Duration::from_secs(20),
        });
        registry.record_extraction_failure(&AuditError::Timeout {
            stage: TaskStage::Extracting,
            limit: Duration::from_secs(20),
        });

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.task_failures, 2);
        assert_eq!(snapshot.extraction_failures, 1);
        assert_eq!(snapshot.timeouts, 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_web_fallbacks();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["web_fallbacks"], 1);
        assert_eq!(json["consistency_checks"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_consistency_checks();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().consistency_checks, 1000);
    }
}
