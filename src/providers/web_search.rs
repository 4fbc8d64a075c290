//! Web-search fallback verification
//!
//! Used only when neither lookup provider has a record. Gemini answers with
//! Google Search grounding enabled.

use async_trait::async_trait;

use super::errors::ProviderResult;
use super::gemini::GeminiClient;
use crate::audit::{WebFallbackVerifier, WebVerdict};

const WEB_PROMPT: &str = r#"You are a forensic citation checker with web search access.
Neither Semantic Scholar nor OpenAlex has a record of the paper below. Search the web to decide whether it exists and whether it is about the stated INTENT.

Verdicts:
- "REAL": the paper exists and matches the intent
- "MISMATCH": the paper exists but is about something else
- "FAKE": no such paper can be found; it is likely fabricated
- "UNVERIFIED": the evidence is inconclusive

Respond with a JSON object only:
{"verdict": "...", "confidence": 0.0-1.0, "reason": "one sentence", "actual_paper_info": {"title": "...", "authors": "...", "year": "...", "url": "..."} or {}}
"#;

/// Web fallback backed by Gemini with search grounding
#[derive(Debug, Clone)]
pub struct GeminiWebVerifier {
    gemini: GeminiClient,
}

impl GeminiWebVerifier {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

fn build_prompt(title: &str, author: &str, intent: &str) -> String {
    format!(
        "{}\nTITLE: {}\nAUTHOR: {}\nINTENT: {}\n",
        WEB_PROMPT, title, author, intent
    )
}

#[async_trait]
impl WebFallbackVerifier for GeminiWebVerifier {
    async fn verify(&self, title: &str, author: &str, intent: &str) -> ProviderResult<WebVerdict> {
        let prompt = build_prompt(title, author, intent);
        self.gemini.generate_json(&prompt, true).await
    }
}
