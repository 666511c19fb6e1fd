use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service answered with a structured error (quota, unknown model, bad version).
    Provider,
    /// The call itself failed: timeout, DNS, unreadable or malformed body.
    Transport,
}

#[derive(Debug, Clone)]
pub struct GenerationError {
    pub kind: ErrorKind,
    pub candidate: String,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl GenerationError {
    pub fn provider(candidate: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Provider,
            candidate: candidate.into(),
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn transport(candidate: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            candidate: candidate.into(),
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    /// At most `max_chars` characters of the raw output, marked with `…` when cut.
    pub fn raw_excerpt(&self, max_chars: usize) -> Option<String> {
        let raw = self.raw_output.as_deref()?;
        let mut chars = raw.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            Some(format!("{head}…"))
        } else {
            Some(head)
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation error (candidate={}, kind={:?}): {}",
            self.candidate, self.kind, self.detail
        )
    }
}

impl std::error::Error for GenerationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_excerpt_truncates_on_char_boundaries() {
        let err = GenerationError::provider("v1beta/m", "blocked").with_raw_output("가나다라마");
        assert_eq!(err.raw_excerpt(3).as_deref(), Some("가나다…"));
        assert_eq!(err.raw_excerpt(5).as_deref(), Some("가나다라마"));
        assert!(GenerationError::transport("v1/m", "timeout").raw_excerpt(10).is_none());
    }
}
