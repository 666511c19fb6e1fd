use crate::llm::error::GenerationError;
use crate::llm::sanitize::strip_code_fences;
use crate::llm::{GenerationBackend, GenerationCandidate};

const RAW_LOG_CHARS: usize = 200;

/// Terminal result of one pass over the candidate list.
#[derive(Debug, Clone)]
pub enum GenerationResult {
    Success {
        /// Fence-stripped, non-blank text.
        text: String,
        candidate: GenerationCandidate,
        /// Failures of the candidates tried before the winner, in order.
        failed_attempts: Vec<GenerationError>,
    },
    Failure {
        /// Every failed attempt, in order. Empty only when no candidates were configured.
        attempts: Vec<GenerationError>,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn last_reason(&self) -> Option<String> {
        let attempts = match self {
            GenerationResult::Success { failed_attempts, .. } => failed_attempts,
            GenerationResult::Failure { attempts } => attempts,
        };
        attempts.last().map(|e| e.to_string())
    }
}

/// Ordered fail-fast-per-candidate search. The order is configuration; the chain never reorders.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<GenerationCandidate>,
}

impl FallbackChain {
    pub fn new(candidates: Vec<GenerationCandidate>) -> Self {
        Self { candidates }
    }

    pub async fn run(&self, backend: &dyn GenerationBackend, prompt: &str) -> GenerationResult {
        let mut failures: Vec<GenerationError> = Vec::new();
        let total = self.candidates.len();

        for (idx, candidate) in self.candidates.iter().enumerate() {
            let label = candidate.label();
            tracing::info!(
                attempt = idx + 1,
                total,
                provider = backend.provider_name(),
                candidate = %label,
                "trying generation candidate"
            );

            let err = match backend.generate(candidate, prompt).await {
                Ok(raw) => {
                    let text = strip_code_fences(&raw);
                    if !text.trim().is_empty() {
                        tracing::info!(
                            candidate = %label,
                            chars = text.len(),
                            skipped = failures.len(),
                            "generation succeeded"
                        );
                        return GenerationResult::Success {
                            text,
                            candidate: candidate.clone(),
                            failed_attempts: failures,
                        };
                    }
                    GenerationError::provider(&label, "generated text is empty after removing code fences")
                        .with_raw_output(raw)
                }
                Err(err) => err,
            };

            tracing::warn!(
                attempt = idx + 1,
                total,
                candidate = %label,
                kind = ?err.kind,
                error = %err.detail,
                raw = err.raw_excerpt(RAW_LOG_CHARS).as_deref().unwrap_or(""),
                "generation candidate failed; moving on"
            );
            failures.push(err);
        }

        tracing::error!(
            attempts = failures.len(),
            last_error = failures.last().map(|e| e.detail.as_str()).unwrap_or("no candidates configured"),
            "all generation candidates failed"
        );
        GenerationResult::Failure { attempts: failures }
    }
}
