//! Error types for the page/frame capability boundary.

use thiserror::Error;

/// Failures raised by a page/frame backend.
///
/// `StaleFrame` is the only variant callers treat as fatal to the current
/// resolution; everything else is a per-candidate miss.
#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    /// The frame's backing document is gone (navigation, detach, reload)
    #[error("Stale frame: {0}")]
    StaleFrame(String),

    /// A handle refers to an element that no longer exists
    #[error("Stale handle: {0}")]
    StaleHandle(String),

    /// The selector could not be evaluated by this backend
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// An interaction was refused by the page (detached node, covered, ...)
    #[error("Interaction failed: {0}")]
    Interaction(String),

    /// Navigation did not complete
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Transport/protocol failure between engine and browser
    #[error("Bridge I/O error: {0}")]
    Io(String),
}

impl BridgeError {
    /// Check if the operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::Interaction(_) | BridgeError::Io(_) | BridgeError::Navigation(_)
        )
    }
}
