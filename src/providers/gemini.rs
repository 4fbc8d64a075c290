//! # Gemini Client
//!
//! Thin `generateContent` wrapper shared by the extractor, the consistency
//! evaluator and the web verifier. Answers are expected to be JSON, possibly
//! wrapped in a Markdown code fence or surrounded by prose.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::{ProviderError, ProviderResult};
use super::http::ensure_success;

pub const GEMINI: &str = "Gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini REST client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Generate text for a single-turn prompt.
    ///
    /// With `web_search` the model may ground its answer with Google Search;
    /// the API then refuses a JSON response type, so the caller has to dig
    /// the JSON out of free text.
    pub async fn generate(&self, prompt: &str, web_search: bool) -> ProviderResult<String> {
        let generation_config = if web_search {
            json!({ "temperature": 0.0 })
        } else {
            json!({ "temperature": 0.0, "responseMimeType": "application/json" })
        };
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config,
            tools: web_search.then(|| json!([{ "google_search": {} }])),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: GenerateResponse = ensure_success(GEMINI, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::malformed(GEMINI, e))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::malformed(GEMINI, "empty candidate"));
        }
        Ok(text)
    }

    /// Generate and parse a JSON answer into `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        web_search: bool,
    ) -> ProviderResult<T> {
        let text = self.generate(prompt, web_search).await?;
        parse_json_answer(&text)
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence regex"))
}

/// Strip a Markdown code fence if the answer has one.
pub fn strip_code_fence(text: &str) -> &str {
    match fence_regex().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Parse a model answer as JSON: fenced block first, then the outermost
/// `{...}` or `[...]` span.
pub fn parse_json_answer<T: DeserializeOwned>(text: &str) -> ProviderResult<T> {
    let cleaned = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (cleaned.find(open), cleaned.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str(&cleaned[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }
    let preview: String = cleaned.chars().take(120).collect();
    Err(ProviderError::malformed(
        GEMINI,
        format!("answer is not JSON: {}", preview),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        verdict: String,
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_json_answer_from_prose() {
        let text = "Based on my search, here is the result:\n{\"verdict\": \"FAKE\"}\nHope this helps.";
        let answer: Answer = parse_json_answer(text).unwrap();
        assert_eq!(answer.verdict, "FAKE");
    }

    #[test]
    fn test_parse_json_answer_rejects_garbage() {
        let err = parse_json_answer::<Answer>("I could not find anything.").unwrap_err();
        assert!(err.to_string().contains("answer is not JSON"));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: json!({"temperature": 0.0}),
            tools: Some(json!([{ "google_search": {} }])),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert!(value.get("generationConfig").is_some());
        assert!(value["tools"][0].get("google_search").is_some());
    }
}
