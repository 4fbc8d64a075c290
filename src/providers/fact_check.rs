//! LLM-backed single-claim fact checker

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use super::errors::ProviderResult;
use super::gemini::GeminiClient;
use crate::fact_check::{ClaimChecker, FactCheckAnswer, SourceFilter};

const BASE_ROLE: &str = "You are a forensic fact-checking assistant.";

const RULES: &str = r#"RULES:
1. Opinions and value judgements are "Unverifiable".
2. Be pedantic about specific dates, numbers and names.
3. If the claim is too obscure to judge from the requested kind of source, answer "Unverifiable".

Respond with a JSON object:
{"verdict": "True" | "False" | "Unverifiable", "confidence": 0.0-1.0, "evidence": "one sentence confirming or correcting the claim", "source": "name of a specific source of the requested kind"}
"#;

/// Role instructions narrowing which sources count as evidence
fn role_prompt(filter: SourceFilter) -> String {
    let role = match filter {
        SourceFilter::Academic => {
            "Act as a research scientist. Only accept peer-reviewed journals, preprint servers such as arXiv, and university sites as evidence. Ignore tabloids and social media."
        }
        SourceFilter::News => {
            "Act as a news editor. Verify against reputable news organizations such as Reuters, AP and the BBC, favoring recent reporting."
        }
        SourceFilter::Social => {
            "Act as a social media analyst. Judge the claim by public discussion on platforms such as X, Reddit and TikTok, and account for internet culture and memes."
        }
        SourceFilter::Authoritative => {
            "Act as a government auditor. Verify against official government data, the WHO, the UN and legal statutes."
        }
        SourceFilter::All => "Verify the claim against any trustworthy source.",
    };
    format!("{} {}", BASE_ROLE, role)
}

fn build_prompt(claim: &str, filter: SourceFilter, today: NaiveDate) -> String {
    format!(
        "{}\nToday's date: {}\nSource kind: {}\n\n{}\nVerify this statement: {}\n",
        role_prompt(filter),
        today.format("%Y-%m-%d"),
        filter,
        RULES,
        claim
    )
}

/// Claim checker backed by Gemini, answering from the model's own knowledge
#[derive(Debug, Clone)]
pub struct GeminiClaimChecker {
    gemini: GeminiClient,
}

impl GeminiClaimChecker {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

#[async_trait]
impl ClaimChecker for GeminiClaimChecker {
    async fn check_claim(&self, claim: &str, filter: SourceFilter) -> ProviderResult<FactCheckAnswer> {
        let prompt = build_prompt(claim, filter, Local::now().date_naive());
        self.gemini.generate_json(&prompt, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gemini::parse_json_answer;

    #[test]
    fn test_prompt_carries_date_filter_and_claim() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let prompt = build_prompt("The Eiffel Tower is in Rome.", SourceFilter::Authoritative, today);

        assert!(prompt.contains("Today's date: 2024-03-09"));
        assert!(prompt.contains("government auditor"));
        assert!(prompt.contains("Source kind: authoritative"));
        assert!(prompt.ends_with("Verify this statement: The Eiffel Tower is in Rome.\n"));
    }

    #[test]
    fn test_each_filter_has_its_own_role() {
        let filters = [
            SourceFilter::Academic,
            SourceFilter::News,
            SourceFilter::Social,
            SourceFilter::Authoritative,
            SourceFilter::All,
        ];
        let roles: std::collections::HashSet<String> = filters.iter().map(|f| role_prompt(*f)).collect();
        assert_eq!(roles.len(), filters.len());
    }

    #[test]
    fn test_fenced_answer_parses() {
        let answer: FactCheckAnswer = parse_json_answer(
            "```json\n{\"verdict\": \"False\", \"confidence\": 0.95, \"evidence\": \"It is in Paris.\", \"source\": \"UNESCO\"}\n```",
        )
        .unwrap();
        assert_eq!(answer.verdict.as_deref(), Some("False"));
        assert_eq!(answer.source.as_deref(), Some("UNESCO"));
    }
}
