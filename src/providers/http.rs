//! Shared HTTP plumbing for the remote collaborators

use std::time::Duration;

use reqwest::{Client, Response};

use super::errors::{ProviderError, ProviderResult};

const USER_AGENT: &str = concat!("citeaudit/", env!("CARGO_PKG_VERSION"));

/// Longest response body quoted in an error message
const MAX_ERROR_BODY: usize = 200;

/// One client per process; `timeout` caps every request end to end.
pub fn http_client(timeout: Duration) -> ProviderResult<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Pass successful responses through, turn anything else into
/// `ProviderError::Status` with a truncated body.
pub async fn ensure_success(service: &'static str, response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        service,
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    })
}

/// Lowercased alphanumeric words
fn title_tokens(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Whether a provider's title plausibly names the cited work.
///
/// Search endpoints always return their closest hit; a hit only counts as a
/// record when most of the cited title's words appear in it.
pub fn titles_resemble(cited: &str, found: &str) -> bool {
    let cited = title_tokens(cited);
    let found = title_tokens(found);
    if cited.is_empty() || found.is_empty() {
        return false;
    }
    if cited == found {
        return true;
    }
    let hits = cited.iter().filter(|w| found.contains(w)).count();
    hits * 10 >= cited.len() * 8
}

/// Lowercased surname of the first listed author, if one can be picked out.
/// Initials ("A.") and "et al." are skipped.
pub fn author_surname(author: &str) -> Option<String> {
    let cleaned = author
        .replace("et al.", " ")
        .replace("et al", " ")
        .replace(',', " ");
    let first_author = cleaned
        .split(|c| c == '&' || c == ';')
        .next()
        .unwrap_or("")
        .split(" and ")
        .next()
        .unwrap_or("");
    first_author
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic) && !w.ends_with('.'))
        .last()
        .map(str::to_lowercase)
}
