//! # OpenAlex Lookup
//!
//! Secondary lookup provider, queried by title and author only. OpenAlex
//! ships abstracts as an inverted index (word -> positions), which is
//! rebuilt into plain text here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::{ProviderError, ProviderResult};
use super::http::{author_surname, ensure_success, titles_resemble};
use crate::audit::{PaperRecord, SecondaryLookup, SourceLookupResult};

pub const OPENALEX: &str = "OpenAlex";

const SELECT: &str = "id,doi,display_name,publication_year,authorships,primary_location,cited_by_count,abstract_inverted_index";
const PER_PAGE: &str = "5";

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<Map<String, Value>>,
}

/// OpenAlex works API client
#[derive(Debug, Clone)]
pub struct OpenAlexLookup {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexLookup {
    pub fn new(client: Client, base_url: impl Into<String>, mailto: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mailto,
        }
    }
}

/// Rebuild abstract text from `{"word": [positions...]}`.
pub fn rebuild_abstract(index: &Map<String, Value>) -> String {
    let mut words: BTreeMap<u64, &str> = BTreeMap::new();
    for (word, positions) in index {
        let Some(positions) = positions.as_array() else {
            continue;
        };
        for position in positions.iter().filter_map(Value::as_u64) {
            words.insert(position, word.as_str());
        }
    }
    words.into_values().collect::<Vec<_>>().join(" ")
}

fn work_title(work: &Map<String, Value>) -> &str {
    work.get("display_name")
        .or_else(|| work.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn has_author(work: &Map<String, Value>, surname: &str) -> bool {
    work.get("authorships")
        .and_then(Value::as_array)
        .map(|authorships| {
            authorships.iter().any(|a| {
                a.pointer("/author/display_name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(surname))
            })
        })
        .unwrap_or(false)
}

/// First resembling work by the cited author, else the first resembling work.
fn pick_work(
    works: Vec<Map<String, Value>>,
    title: &str,
    author: &str,
) -> Option<Map<String, Value>> {
    let mut candidates: Vec<Map<String, Value>> = works
        .into_iter()
        .filter(|work| titles_resemble(title, work_title(work)))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let index = author_surname(author)
        .and_then(|surname| candidates.iter().position(|w| has_author(w, &surname)))
        .unwrap_or(0);
    Some(candidates.swap_remove(index))
}

/// Normalize a work into a record; the work minus its inverted index is
/// kept as metadata.
fn into_record(mut work: Map<String, Value>) -> PaperRecord {
    let year = match work.get("publication_year") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let abstract_text = match work.remove("abstract_inverted_index") {
        Some(Value::Object(index)) => rebuild_abstract(&index),
        _ => String::new(),
    };
    PaperRecord {
        year,
        abstract_text,
        metadata: work,
    }
}

#[async_trait]
impl SecondaryLookup for OpenAlexLookup {
    fn name(&self) -> &str {
        OPENALEX
    }

    async fn lookup(&self, title: &str, author: &str) -> ProviderResult<SourceLookupResult> {
        if title.trim().is_empty() {
            return Ok(SourceLookupResult::not_found(OPENALEX));
        }
        // Commas separate filters in OpenAlex syntax.
        let filter = format!("title.search:{}", title.replace(',', " "));
        let mut query = vec![
            ("filter", filter.as_str()),
            ("per-page", PER_PAGE),
            ("select", SELECT),
        ];
        if let Some(mailto) = &self.mailto {
            query.push(("mailto", mailto.as_str()));
        }

        let response = self
            .client
            .get(format!("{}/works", self.base_url))
            .query(&query)
            .send()
            .await?;
        let works: WorksResponse = ensure_success(OPENALEX, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::malformed(OPENALEX, e))?;

        Ok(match pick_work(works.results, title, author) {
            Some(work) => SourceLookupResult::found(OPENALEX, into_record(work)),
            None => SourceLookupResult::not_found(OPENALEX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_rebuild_abstract_orders_by_position() {
        let index = object(json!({
            "models": [2],
            "Large": [0],
            "language": [1],
            "hallucinate": [3],
            "often": [4, 6],
            "and": [5]
        }));
        assert_eq!(
            rebuild_abstract(&index),
            "Large language models hallucinate often and often"
        );
    }

    #[test]
    fn test_rebuild_abstract_skips_malformed_entries() {
        let index = object(json!({"ok": [0], "bad": "nope", "worse": [-1]}));
        assert_eq!(rebuild_abstract(&index), "ok");
    }

    #[test]
    fn test_pick_work_prefers_cited_author() {
        let works = vec![
            object(json!({
                "display_name": "Attention Is All You Need",
                "authorships": [{"author": {"display_name": "Someone Else"}}]
            })),
            object(json!({
                "display_name": "Attention Is All You Need",
                "authorships": [{"author": {"display_name": "Ashish Vaswani"}}]
            })),
        ];
        let picked = pick_work(works, "Attention is all you need", "Vaswani et al.").unwrap();
        assert_eq!(
            picked["authorships"][0]["author"]["display_name"],
            "Ashish Vaswani"
        );
    }

    #[test]
    fn test_into_record() {
        let record = into_record(object(json!({
            "id": "https://openalex.org/W1",
            "display_name": "Paper",
            "publication_year": 2019,
            "abstract_inverted_index": {"Hello": [0], "world": [1]}
        })));
        assert_eq!(record.year, "2019");
        assert_eq!(record.abstract_text, "Hello world");
        assert!(!record.metadata.contains_key("abstract_inverted_index"));
        assert_eq!(record.metadata["id"], "https://openalex.org/W1");
    }
}
