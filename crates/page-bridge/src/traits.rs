//! Capability traits implemented by browser backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BridgeError;
use crate::types::{
    CapturedTarget, ElementDescription, ElementHandle, IframeInfo, Rect, SelectorMethod,
    StyleSummary,
};

/// One document scope (a page's main document or a specific iframe).
///
/// All queries are zero-wait; polling and timeouts live in the caller where
/// the budgets are known. Handles returned by `query`/`query_all` are owned
/// by the caller and must be passed to [`FrameContext::release`].
#[async_trait]
pub trait FrameContext: Send + Sync {
    /// Query the first element matching `selector`, without waiting.
    async fn query(
        &self,
        method: SelectorMethod,
        selector: &str,
    ) -> Result<Option<ElementHandle>, BridgeError>;

    /// Query up to `limit` matching elements, in document order.
    async fn query_all(
        &self,
        method: SelectorMethod,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<ElementHandle>, BridgeError>;

    async fn describe(&self, handle: ElementHandle) -> Result<ElementDescription, BridgeError>;

    async fn computed_style(&self, handle: ElementHandle) -> Result<StyleSummary, BridgeError>;

    /// `None` means the element takes no layout space.
    async fn bounding_box(&self, handle: ElementHandle) -> Result<Option<Rect>, BridgeError>;

    async fn text_content(&self, handle: ElementHandle) -> Result<String, BridgeError>;

    async fn input_value(&self, handle: ElementHandle) -> Result<String, BridgeError>;

    async fn is_disabled(&self, handle: ElementHandle) -> Result<bool, BridgeError>;

    /// Full visible text of the frame's document.
    async fn inner_text(&self) -> Result<String, BridgeError>;

    async fn click(&self, handle: ElementHandle) -> Result<(), BridgeError>;

    /// JavaScript-level `.click()`, the fallback when the native click is
    /// refused (overlay in the way, node moved mid-click).
    async fn js_click(&self, handle: ElementHandle) -> Result<(), BridgeError>;

    async fn hover(&self, handle: ElementHandle) -> Result<(), BridgeError>;

    /// Type into an input; `submit` presses Enter afterwards.
    async fn type_text(
        &self,
        handle: ElementHandle,
        text: &str,
        submit: bool,
    ) -> Result<(), BridgeError>;

    async fn set_input_files(
        &self,
        handle: ElementHandle,
        paths: &[String],
    ) -> Result<(), BridgeError>;

    /// Native `<select>` selection by option value.
    async fn select_value(&self, handle: ElementHandle, value: &str) -> Result<(), BridgeError>;

    async fn scroll_into_view(&self, handle: ElementHandle) -> Result<(), BridgeError>;

    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<(), BridgeError>;

    async fn drag_and_drop(
        &self,
        source: ElementHandle,
        target: ElementHandle,
    ) -> Result<(), BridgeError>;

    /// Evaluate a script in the frame; escape hatch for capabilities the
    /// typed surface does not cover.
    async fn evaluate(&self, script: &str) -> Result<Value, BridgeError>;

    /// Dispose a handle. Synchronous and infallible so RAII guards can call
    /// it from `Drop`.
    fn release(&self, handle: ElementHandle);
}

/// Page-scoped operations (URL, navigation, frame management, the
/// interactive-capture escape hatch).
#[async_trait]
pub trait PageContext: Send + Sync {
    async fn url(&self) -> Result<String, BridgeError>;

    async fn title(&self) -> Result<String, BridgeError>;

    async fn navigate(&self, url: &str) -> Result<(), BridgeError>;

    /// Wait until a navigation triggered by a prior interaction settles.
    /// Returns `false` when no navigation happened within `timeout`; that is
    /// a normal outcome, not an error.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<bool, BridgeError>;

    fn main_frame(&self) -> Arc<dyn FrameContext>;

    /// Enumerate iframes in the main document. Handles belong to the main
    /// frame's handle space.
    async fn iframes(&self) -> Result<Vec<IframeInfo>, BridgeError>;

    /// Enter the document of the given iframe element; `None` when the frame
    /// has no reachable document yet.
    async fn enter_iframe(
        &self,
        handle: ElementHandle,
    ) -> Result<Option<Arc<dyn FrameContext>>, BridgeError>;

    /// Whether a human can see the session (visible browser, not headless).
    fn is_interactive(&self) -> bool;

    /// Interactive capture: overlay the page, wait for the operator to click
    /// the intended element, report what was clicked. `None` on timeout.
    async fn await_user_pick(
        &self,
        timeout: Duration,
    ) -> Result<Option<CapturedTarget>, BridgeError>;
}
