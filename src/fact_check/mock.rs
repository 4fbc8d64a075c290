//! Scripted in-memory claim checker

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::checker::ClaimChecker;
use super::verdict::{FactCheckAnswer, SourceFilter};
use crate::providers::{ProviderError, ProviderResult};

/// Answers every claim the same way, optionally after a delay
#[derive(Debug)]
pub struct ScriptedClaimChecker {
    reply: Result<FactCheckAnswer, String>,
    delay: Duration,
    calls: AtomicUsize,
    filters: Mutex<Vec<SourceFilter>>,
}

impl ScriptedClaimChecker {
    pub fn answering(answer: FactCheckAnswer) -> Self {
        Self::with_reply(Ok(answer))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Err(message.to_string()))
    }

    fn with_reply(reply: Result<FactCheckAnswer, String>) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            filters: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Filters received so far, in call order
    pub fn filters_seen(&self) -> Vec<SourceFilter> {
        self.filters.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ClaimChecker for ScriptedClaimChecker {
    async fn check_claim(&self, _claim: &str, filter: SourceFilter) -> ProviderResult<FactCheckAnswer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.filters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(filter);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone().map_err(ProviderError::Other)
    }
}
