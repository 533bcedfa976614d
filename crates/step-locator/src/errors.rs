use thiserror::Error;

/// Failures during element resolution.
///
/// "Element not found" is deliberately not a variant: an exhausted cascade
/// returns `Ok(None)` and the caller decides whether that is fatal for its
/// step.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// The page or frame went away mid-resolution (navigation, frame teardown).
    #[error("document context lost: {0}")]
    MissingContext(String),

    /// The overall resolution budget elapsed before any stage could finish.
    #[error("resolution budget of {budget_ms}ms exhausted for '{term}'")]
    Timeout { term: String, budget_ms: u64 },

    #[error("internal resolver error: {0}")]
    Internal(String),
}

impl LocatorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn severity(&self) -> &'static str {
        match self {
            Self::MissingContext(_) => "error",
            Self::Timeout { .. } => "warn",
            Self::Internal(_) => "error",
        }
    }
}
