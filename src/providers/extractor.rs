//! LLM-backed citation extraction

use async_trait::async_trait;
use serde::Deserialize;

use super::errors::ProviderResult;
use super::gemini::GeminiClient;
use crate::audit::{Citation, CitationExtractor};

const EXTRACTION_PROMPT: &str = r#"You are a citation forensics assistant. Find every academic citation in the TEXT below.

For each citation return an object with:
- "raw_text": the citation exactly as written in the text
- "title": the cited work's title, as best as can be inferred
- "author": the first author's name
- "year": the year as written, or "" if absent
- "doi": the DOI if present, else null
- "intent": one sentence on what the text uses this citation to support
- "claims": the specific factual claims the text attributes to the cited work

Respond with a JSON array of these objects and nothing else. Respond with [] if the text contains no citations.

TEXT:
"#;

/// Either a bare array or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractionAnswer {
    List(Vec<Citation>),
    Wrapped { citations: Vec<Citation> },
}

impl ExtractionAnswer {
    fn into_citations(self) -> Vec<Citation> {
        match self {
            ExtractionAnswer::List(citations) => citations,
            ExtractionAnswer::Wrapped { citations } => citations,
        }
    }
}

/// Extracts citations with a single Gemini call
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    gemini: GeminiClient,
}

impl GeminiExtractor {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

#[async_trait]
impl CitationExtractor for GeminiExtractor {
    async fn extract(&self, text: &str) -> ProviderResult<Vec<Citation>> {
        let prompt = format!("{}{}", EXTRACTION_PROMPT, text);
        let answer: ExtractionAnswer = self.gemini.generate_json(&prompt, false).await?;
        Ok(answer
            .into_citations()
            .into_iter()
            .filter(|c| !c.raw_text.trim().is_empty())
            .collect())
    }
}
