//! # Remote Collaborators
//!
//! Concrete implementations of the audit pipeline's collaborator traits:
//!
//! - Semantic Scholar as the primary lookup
//! - OpenAlex as the secondary lookup
//! - Gemini for citation extraction, claim consistency, the web fallback
//!   and single-claim fact checks
//!
//! All of them share one `reqwest::Client`.

pub mod config;
pub mod consistency;
pub mod errors;
pub mod extractor;
pub mod fact_check;
pub mod gemini;
pub mod http;
pub mod openalex;
pub mod semantic_scholar;
pub mod web_search;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::audit::Collaborators;
use crate::fact_check::ClaimChecker;

pub use config::ProvidersConfig;
pub use consistency::GeminiConsistencyEvaluator;
pub use errors::{ProviderError, ProviderResult};
pub use extractor::GeminiExtractor;
pub use fact_check::GeminiClaimChecker;
pub use gemini::GeminiClient;
pub use openalex::OpenAlexLookup;
pub use semantic_scholar::SemanticScholarLookup;
pub use web_search::GeminiWebVerifier;

/// Everything the services need from the outside world
#[derive(Clone)]
pub struct ProviderSet {
    /// Collaborators of the citation audit
    pub collaborators: Collaborators,
    /// Backend of the single-claim fact check
    pub claims: Arc<dyn ClaimChecker>,
}

/// Build the production collaborators from the process environment.
pub fn build_collaborators(config: &ProvidersConfig, timeout: Duration) -> ProviderResult<ProviderSet> {
    build_collaborators_with(config, timeout, |name| std::env::var(name).ok())
}

/// Build the production collaborators, resolving credentials through `env`.
pub fn build_collaborators_with<F>(
    config: &ProvidersConfig,
    timeout: Duration,
    env: F,
) -> ProviderResult<ProviderSet>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    let gemini_key = lookup(&config.gemini_api_key_env)
        .ok_or_else(|| ProviderError::MissingApiKey(config.gemini_api_key_env.clone()))?;
    let semantic_scholar_key = config.semantic_scholar_api_key_env.as_deref().and_then(lookup);
    if config.semantic_scholar_api_key_env.is_some() && semantic_scholar_key.is_none() {
        warn!("Semantic Scholar API key variable is configured but unset; using the shared rate limit");
    }

    let client = http::http_client(timeout)?;
    let gemini = GeminiClient::new(
        client.clone(),
        &config.gemini_url,
        &config.gemini_model,
        gemini_key,
    );

    info!(
        model = %config.gemini_model,
        semantic_scholar = %config.semantic_scholar_url,
        openalex = %config.openalex_url,
        "Collaborators configured"
    );

    let collaborators = Collaborators {
        extractor: Arc::new(GeminiExtractor::new(gemini.clone())),
        primary: Arc::new(SemanticScholarLookup::new(
            client.clone(),
            &config.semantic_scholar_url,
            semantic_scholar_key,
        )),
        secondary: Arc::new(OpenAlexLookup::new(
            client,
            &config.openalex_url,
            config.openalex_mailto.clone(),
        )),
        consistency: Arc::new(GeminiConsistencyEvaluator::new(gemini.clone())),
        web: Arc::new(GeminiWebVerifier::new(gemini.clone())),
    };

    Ok(ProviderSet {
        collaborators,
        claims: Arc::new(GeminiClaimChecker::new(gemini)),
    })
}
