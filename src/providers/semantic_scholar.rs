//! # Semantic Scholar Lookup
//!
//! Primary lookup provider. A DOI is resolved directly; otherwise, or when
//! the DOI is unknown, the title is searched and the best resembling hit is
//! taken, preferring one whose year matches the citation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::errors::{ProviderError, ProviderResult};
use super::http::{ensure_success, titles_resemble};
use crate::audit::{years_match, PaperRecord, PrimaryLookup, SourceLookupResult};

pub const SEMANTIC_SCHOLAR: &str = "Semantic Scholar";

const FIELDS: &str = "title,year,abstract,authors,venue,url,externalIds,citationCount";
const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

/// Semantic Scholar Graph API client
#[derive(Debug, Clone)]
pub struct SemanticScholarLookup {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarLookup {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    async fn by_doi(&self, doi: &str) -> ProviderResult<Option<Map<String, Value>>> {
        let url = format!("{}/graph/v1/paper/DOI:{}", self.base_url, doi.trim());
        let response = self.get(url).query(&[("fields", FIELDS)]).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let paper = ensure_success(SEMANTIC_SCHOLAR, response)
            .await?
            .json::<Map<String, Value>>()
            .await
            .map_err(|e| ProviderError::malformed(SEMANTIC_SCHOLAR, e))?;
        Ok(Some(paper))
    }

    async fn by_title(&self, title: &str, year: &str) -> ProviderResult<Option<Map<String, Value>>> {
        let url = format!("{}/graph/v1/paper/search", self.base_url);
        let response = self
            .get(url)
            .query(&[("query", title), ("limit", SEARCH_LIMIT), ("fields", FIELDS)])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let search: SearchResponse = ensure_success(SEMANTIC_SCHOLAR, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::malformed(SEMANTIC_SCHOLAR, e))?;
        Ok(pick_hit(search.data, title, year))
    }
}

/// First resembling hit whose year matches, else the first resembling hit.
fn pick_hit(
    hits: Vec<Map<String, Value>>,
    title: &str,
    year: &str,
) -> Option<Map<String, Value>> {
    let mut candidates: Vec<Map<String, Value>> = hits
        .into_iter()
        .filter(|paper| {
            paper
                .get("title")
                .and_then(Value::as_str)
                .is_some_and(|found| titles_resemble(title, found))
        })
        .collect();
    let index = candidates
        .iter()
        .position(|paper| years_match(year, &paper_year(paper)))
        .unwrap_or(0);
    if candidates.is_empty() {
        None
    } else {
        Some(candidates.swap_remove(index))
    }
}

fn paper_year(paper: &Map<String, Value>) -> String {
    match paper.get("year") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Normalize a paper object into a record; the object minus its abstract is
/// kept as metadata.
fn into_record(mut paper: Map<String, Value>) -> PaperRecord {
    let year = paper_year(&paper);
    let abstract_text = match paper.remove("abstract") {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };
    PaperRecord {
        year,
        abstract_text,
        metadata: paper,
    }
}

#[async_trait]
impl PrimaryLookup for SemanticScholarLookup {
    fn name(&self) -> &str {
        SEMANTIC_SCHOLAR
    }

    async fn lookup(
        &self,
        title: &str,
        _author: &str,
        year: Option<&str>,
        doi: Option<&str>,
    ) -> ProviderResult<SourceLookupResult> {
        if let Some(doi) = doi.filter(|d| !d.trim().is_empty()) {
            if let Some(paper) = self.by_doi(doi).await? {
                debug!(doi, "resolved by DOI");
                return Ok(SourceLookupResult::found(SEMANTIC_SCHOLAR, into_record(paper)));
            }
        }
        if title.trim().is_empty() {
            return Ok(SourceLookupResult::not_found(SEMANTIC_SCHOLAR));
        }
        match self.by_title(title, year.unwrap_or("")).await? {
            Some(paper) => Ok(SourceLookupResult::found(SEMANTIC_SCHOLAR, into_record(paper))),
            None => Ok(SourceLookupResult::not_found(SEMANTIC_SCHOLAR)),
        }
    }
}
