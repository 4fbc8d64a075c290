//! Remote Collaborator Configuration
//!
//! Endpoints and credential sources for the lookup providers and the LLM.
//! Secrets are never stored in the file, only the names of the environment
//! variables holding them.

use serde::{Deserialize, Serialize};

/// Collaborator endpoints and credential sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Semantic Scholar Graph API base URL
    #[serde(default = "default_semantic_scholar_url")]
    pub semantic_scholar_url: String,

    /// Env var holding an optional Semantic Scholar API key
    #[serde(default)]
    pub semantic_scholar_api_key_env: Option<String>,

    /// OpenAlex API base URL
    #[serde(default = "default_openalex_url")]
    pub openalex_url: String,

    /// Contact address for the OpenAlex polite pool
    #[serde(default)]
    pub openalex_mailto: Option<String>,

    /// Gemini API base URL
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Env var holding the Gemini API key (required)
    #[serde(default = "default_gemini_api_key_env")]
    pub gemini_api_key_env: String,
}

fn default_semantic_scholar_url() -> String {
    "https://api.semanticscholar.org".to_string()
}

fn default_openalex_url() -> String {
    "https://api.openalex.org".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            semantic_scholar_url: default_semantic_scholar_url(),
            semantic_scholar_api_key_env: None,
            openalex_url: default_openalex_url(),
            openalex_mailto: None,
            gemini_url: default_gemini_url(),
            gemini_model: default_gemini_model(),
            gemini_api_key_env: default_gemini_api_key_env(),
        }
    }
}
