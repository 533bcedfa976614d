use page_bridge::BridgeError;
use step_locator::LocatorError;
use thiserror::Error;

/// Step-level failures. Messages are self-contained so a test report can
/// show them without extra context lookup.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("element not found: {target}")]
    ElementNotFound { target: String },

    #[error("{0}")]
    AssertionFailed(String),

    #[error("timed out after {budget_ms}ms: {what}")]
    TimeoutExceeded { what: String, budget_ms: u64 },

    /// A post-interaction settle could not confirm the expected downstream
    /// state, even after any direct-URL fallback.
    #[error("navigation not confirmed: {0}")]
    Navigation(String),

    #[error("step interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("internal step error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TimeoutExceeded { .. } => true,
            Self::Bridge(err) => err.is_retryable(),
            _ => false,
        }
    }

    pub fn severity(&self) -> &'static str {
        match self {
            Self::AssertionFailed(_) | Self::ElementNotFound { .. } => "error",
            Self::TimeoutExceeded { .. } | Self::Interrupted(_) => "warn",
            Self::Navigation(_) | Self::Bridge(_) | Self::Internal(_) => "error",
        }
    }
}

impl From<LocatorError> for ActionError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::Timeout { term, budget_ms } => Self::TimeoutExceeded {
                what: format!("resolving '{term}'"),
                budget_ms,
            },
            LocatorError::MissingContext(msg) => Self::Internal(format!("context lost: {msg}")),
            LocatorError::Internal(msg) => Self::Internal(msg),
        }
    }
}
