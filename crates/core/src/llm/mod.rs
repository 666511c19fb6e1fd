pub mod chain;
pub mod error;
pub mod gemini;
pub mod sanitize;

use crate::llm::error::GenerationError;
use std::fmt;

pub use chain::{FallbackChain, GenerationResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_API_VERSION: &str = "v1beta";

/// Preference order: newest high-throughput model, then the stable GA model, then the legacy surface.
const DEFAULT_CATALOGUE: &[(&str, &str)] = &[
    ("v1beta", "gemini-2.0-flash"),
    ("v1beta", "gemini-1.5-flash"),
    ("v1", "gemini-1.5-flash"),
    ("v1beta", "gemini-1.5-pro"),
    ("v1beta", "gemini-pro"),
];

/// One (endpoint, model) pair the chain may try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCandidate {
    /// API root including the version segment, e.g. `https://host/v1beta`.
    pub endpoint_base: String,
    pub model_id: String,
}

impl GenerationCandidate {
    pub fn new(base_url: &str, api_version: &str, model_id: &str) -> Self {
        Self {
            endpoint_base: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                api_version.trim_matches('/')
            ),
            model_id: model_id.to_string(),
        }
    }

    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint_base.trim_end_matches('/'),
            self.model_id
        )
    }

    /// `v1beta/gemini-2.0-flash`; never contains the credential.
    pub fn label(&self) -> String {
        let version = self
            .endpoint_base
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        format!("{version}/{}", self.model_id)
    }
}

impl fmt::Display for GenerationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

pub fn default_candidates(base_url: &str) -> Vec<GenerationCandidate> {
    DEFAULT_CATALOGUE
        .iter()
        .map(|(version, model)| GenerationCandidate::new(base_url, version, model))
        .collect()
}

/// Parses `v1beta:gemini-2.0-flash,v1:gemini-1.5-flash`. A bare model name uses `v1beta`.
pub fn parse_candidates(list: &str, base_url: &str) -> anyhow::Result<Vec<GenerationCandidate>> {
    let mut out = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (version, model) = match entry.split_once(':') {
            Some((version, model)) => (version.trim(), model.trim()),
            None => (DEFAULT_API_VERSION, entry),
        };
        anyhow::ensure!(
            !version.is_empty() && !model.is_empty(),
            "invalid generation candidate {entry:?}; expected api_version:model"
        );
        out.push(GenerationCandidate::new(base_url, version, model));
    }
    anyhow::ensure!(!out.is_empty(), "GENERATION_CANDIDATES must list at least one candidate");
    Ok(out)
}

/// A content-generation service reachable through several (endpoint, model) candidates.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Exactly one attempt against `candidate`; no retries.
    async fn generate(
        &self,
        candidate: &GenerationCandidate,
        prompt: &str,
    ) -> Result<String, GenerationError>;
}
