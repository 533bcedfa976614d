use std::fmt;
use std::sync::Arc;

use page_bridge::{ElementHandle, FrameContext, SelectorMethod};
use serde::{Deserialize, Serialize};

/// One candidate lookup produced by the strategy generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStrategy {
    /// Stable kind label, e.g. `exact-id`, `text-exact`, `login-href`.
    /// Kinds starting with `text` get the longer per-strategy wait.
    pub kind: String,
    pub selector: String,
    pub method: SelectorMethod,
}

impl FallbackStrategy {
    pub fn css(kind: &str, selector: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            selector: selector.into(),
            method: SelectorMethod::Css,
        }
    }

    pub fn xpath(kind: &str, selector: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            selector: selector.into(),
            method: SelectorMethod::Xpath,
        }
    }

    /// Text-match strategies are slower to stabilize on dynamic pages and
    /// get a longer wait in the cascade.
    pub fn is_text_kind(&self) -> bool {
        self.kind.starts_with("text") || self.kind.starts_with("button-text")
    }
}

impl fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.kind, self.method.name(), self.selector)
    }
}

/// An element the resolver located, together with the frame that owns it.
///
/// Holds the backend handle for the lifetime of the value and releases it on
/// drop, so callers can never leak a handle by early-returning.
pub struct ResolvedElement {
    handle: Option<ElementHandle>,
    frame: Arc<dyn FrameContext>,
    /// Kind label of the strategy that matched.
    pub strategy: String,
    /// The selector that matched.
    pub selector: String,
}

impl ResolvedElement {
    pub fn new(
        handle: ElementHandle,
        frame: Arc<dyn FrameContext>,
        strategy: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            handle: Some(handle),
            frame,
            strategy: strategy.into(),
            selector: selector.into(),
        }
    }

    pub fn handle(&self) -> ElementHandle {
        // Only `None` after drop, which the borrow checker rules out.
        self.handle.expect("handle taken")
    }

    pub fn frame(&self) -> &Arc<dyn FrameContext> {
        &self.frame
    }
}

impl Drop for ResolvedElement {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.frame.release(handle);
        }
    }
}

impl fmt::Debug for ResolvedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedElement")
            .field("handle", &self.handle)
            .field("strategy", &self.strategy)
            .field("selector", &self.selector)
            .finish()
    }
}
