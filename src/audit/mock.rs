//! Scripted in-memory collaborators.
//!
//! Every collaborator answers from a per-key script (title for lookups and
//! web checks, abstract text for consistency checks) with an optional delay,
//! and counts how often it was called and how many calls ran to completion.
//! A step can also be scripted to panic, standing in for a collaborator bug.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::citation::Citation;
use super::lookup::{
    CitationExtractor, ConsistencyEvaluator, ConsistencyReport, LookupOutcome, PaperRecord,
    PrimaryLookup, SecondaryLookup, SourceLookupResult, WebFallbackVerifier, WebVerdict,
};
use crate::providers::{ProviderError, ProviderResult};

#[derive(Debug, Clone)]
struct Step<T> {
    reply: Result<T, String>,
    delay: Duration,
    panic: Option<String>,
}

impl<T> Step<T> {
    fn reply(value: T) -> Self {
        Self {
            reply: Ok(value),
            delay: Duration::ZERO,
            panic: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            delay: Duration::ZERO,
            panic: None,
        }
    }

    fn panic(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            reply: Err(message.clone()),
            delay: Duration::ZERO,
            panic: Some(message),
        }
    }
}

#[derive(Debug)]
struct Script<T> {
    default: Step<T>,
    by_key: HashMap<String, Step<T>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl<T: Clone> Script<T> {
    fn new(default: Step<T>) -> Self {
        Self {
            default,
            by_key: HashMap::new(),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn set(&mut self, key: &str, step: Step<T>) {
        let delay = self.by_key.get(key).map(|s| s.delay).unwrap_or_default();
        self.by_key.insert(key.to_string(), Step { delay, ..step });
    }

    fn delay(&mut self, key: &str, delay: Duration) {
        let default = self.default.clone();
        self.by_key.entry(key.to_string()).or_insert(default).delay = delay;
    }

    async fn play(&self, key: &str) -> ProviderResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());

        let step = self.by_key.get(key).unwrap_or(&self.default).clone();
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        if let Some(message) = step.panic {
            panic!("{}", message);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        step.reply.map_err(ProviderError::Other)
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Lookup provider keyed by citation title. Unknown titles are not found.
///
/// Implements both [`PrimaryLookup`] and [`SecondaryLookup`].
#[derive(Debug)]
pub struct ScriptedLookup {
    name: String,
    script: Script<LookupOutcome>,
}

impl ScriptedLookup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Script::new(Step::reply(LookupOutcome::NotFound)),
        }
    }

    /// Record for `title` with the given year and abstract, and a `title`
    /// metadata field
    pub fn found(self, title: &str, year: &str, abstract_text: &str) -> Self {
        let mut metadata = Map::new();
        metadata.insert("title".to_string(), Value::String(title.to_string()));
        self.found_record(
            title,
            PaperRecord {
                year: year.to_string(),
                abstract_text: abstract_text.to_string(),
                metadata,
            },
        )
    }

    pub fn found_record(mut self, title: &str, record: PaperRecord) -> Self {
        self.script.set(title, Step::reply(LookupOutcome::Found(record)));
        self
    }

    pub fn failing(mut self, title: &str, message: &str) -> Self {
        self.script.set(title, Step::fail(message));
        self
    }

    /// Panics instead of answering for `title`
    pub fn panicking(mut self, title: &str, message: &str) -> Self {
        self.script.set(title, Step::panic(message));
        self
    }

    pub fn delayed(mut self, title: &str, delay: Duration) -> Self {
        self.script.delay(title, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.script.completed.load(Ordering::SeqCst)
    }

    /// Titles queried so far, in call order
    pub fn queried(&self) -> Vec<String> {
        self.script.seen()
    }

    async fn answer(&self, title: &str) -> ProviderResult<SourceLookupResult> {
        let outcome = self.script.play(title).await?;
        Ok(SourceLookupResult {
            provider: self.name.clone(),
            outcome,
        })
    }
}

#[async_trait]
impl PrimaryLookup for ScriptedLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(
        &self,
        title: &str,
        _author: &str,
        _year: Option<&str>,
        _doi: Option<&str>,
    ) -> ProviderResult<SourceLookupResult> {
        self.answer(title).await
    }
}

#[async_trait]
impl SecondaryLookup for ScriptedLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, title: &str, _author: &str) -> ProviderResult<SourceLookupResult> {
        self.answer(title).await
    }
}

/// Extractor returning a fixed citation list, or failing
#[derive(Debug)]
pub struct ScriptedExtractor {
    script: Script<Vec<Citation>>,
}

impl ScriptedExtractor {
    pub fn returning(citations: Vec<Citation>) -> Self {
        Self {
            script: Script::new(Step::reply(citations)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Script::new(Step::fail(message)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.script.default.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CitationExtractor for ScriptedExtractor {
    async fn extract(&self, _text: &str) -> ProviderResult<Vec<Citation>> {
        self.script.play("").await
    }
}

/// Consistency evaluator keyed by abstract text
#[derive(Debug)]
pub struct ScriptedConsistency {
    script: Script<ConsistencyReport>,
    claims: Mutex<Vec<String>>,
}

impl ScriptedConsistency {
    /// Answers every abstract with `report` unless scripted otherwise
    pub fn new(report: ConsistencyReport) -> Self {
        Self {
            script: Script::new(Step::reply(report)),
            claims: Mutex::new(Vec::new()),
        }
    }

    /// Answers REAL with full confidence unless scripted otherwise
    pub fn agreeing() -> Self {
        Self::new(ConsistencyReport {
            status: Some("REAL".to_string()),
            confidence: Some(1.0),
            reason: Some("Abstract supports the claim.".to_string()),
        })
    }

    pub fn reply_for(mut self, abstract_text: &str, report: ConsistencyReport) -> Self {
        self.script.set(abstract_text, Step::reply(report));
        self
    }

    pub fn failing_for(mut self, abstract_text: &str, message: &str) -> Self {
        self.script.set(abstract_text, Step::fail(message));
        self
    }

    pub fn panicking_for(mut self, abstract_text: &str, message: &str) -> Self {
        self.script.set(abstract_text, Step::panic(message));
        self
    }

    pub fn delayed_for(mut self, abstract_text: &str, delay: Duration) -> Self {
        self.script.delay(abstract_text, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    /// Claim strings received so far, in call order
    pub fn claims_seen(&self) -> Vec<String> {
        self.claims.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ConsistencyEvaluator for ScriptedConsistency {
    async fn check(&self, claim: &str, abstract_text: &str) -> ProviderResult<ConsistencyReport> {
        self.claims
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(claim.to_string());
        self.script.play(abstract_text).await
    }
}

/// Web fallback keyed by citation title
#[derive(Debug)]
pub struct ScriptedWebVerifier {
    script: Script<WebVerdict>,
}

impl ScriptedWebVerifier {
    pub fn new(verdict: WebVerdict) -> Self {
        Self {
            script: Script::new(Step::reply(verdict)),
        }
    }

    /// Answers UNVERIFIED with no paper info unless scripted otherwise
    pub fn inconclusive() -> Self {
        Self::new(WebVerdict {
            verdict: Some("UNVERIFIED".to_string()),
            confidence: Some(0.0),
            reason: Some("No trace of this work found.".to_string()),
            actual_paper_info: Value::Null,
        })
    }

    pub fn reply_for(mut self, title: &str, verdict: WebVerdict) -> Self {
        self.script.set(title, Step::reply(verdict));
        self
    }

    pub fn failing_for(mut self, title: &str, message: &str) -> Self {
        self.script.set(title, Step::fail(message));
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebFallbackVerifier for ScriptedWebVerifier {
    async fn verify(&self, title: &str, _author: &str, _intent: &str) -> ProviderResult<WebVerdict> {
        self.script.play(title).await
    }
}
