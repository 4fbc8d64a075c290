//! LLM-backed semantic consistency check between a claim and an abstract

use async_trait::async_trait;

use super::errors::ProviderResult;
use super::gemini::GeminiClient;
use crate::audit::{ConsistencyEvaluator, ConsistencyReport};

const CONSISTENCY_PROMPT: &str = r#"You are a forensic fact-checker for academic citations.
Compare the CLAIM someone attributes to a paper with the paper's real ABSTRACT.

Rules:
1. "REAL" if the abstract supports the claim or is compatible with it.
2. "MISMATCH" if the abstract contradicts the claim, or the claim attributes findings, numbers or conclusions the abstract does not contain.
3. "UNVERIFIED" if the abstract is missing or too vague to judge.
4. Be pedantic about specific numbers, dates and effect directions.

Respond with a JSON object:
{"status": "REAL" | "MISMATCH" | "UNVERIFIED", "confidence": 0.0-1.0, "reason": "one sentence"}
"#;

/// Placeholder sent when a provider had a record but no abstract
const NO_ABSTRACT: &str = "(no abstract available)";

/// Consistency evaluator backed by Gemini
#[derive(Debug, Clone)]
pub struct GeminiConsistencyEvaluator {
    gemini: GeminiClient,
}

impl GeminiConsistencyEvaluator {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

fn build_prompt(claim: &str, abstract_text: &str) -> String {
    let abstract_text = if abstract_text.trim().is_empty() {
        NO_ABSTRACT
    } else {
        abstract_text
    };
    format!(
        "{}\nCLAIM:\n{}\n\nABSTRACT:\n{}\n",
        CONSISTENCY_PROMPT, claim, abstract_text
    )
}

#[async_trait]
impl ConsistencyEvaluator for GeminiConsistencyEvaluator {
    async fn check(&self, claim: &str, abstract_text: &str) -> ProviderResult<ConsistencyReport> {
        let prompt = build_prompt(claim, abstract_text);
        self.gemini.generate_json(&prompt, false).await
    }
}
