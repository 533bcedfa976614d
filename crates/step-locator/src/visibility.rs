//! Interactability gate applied after every non-immediate strategy match.

use page_bridge::{BridgeError, ElementHandle, FrameContext};

/// True iff the element is rendered: `display != none`,
/// `visibility != hidden`, `opacity > 0`, and a positive-area bounding box.
pub async fn is_visible(
    frame: &dyn FrameContext,
    handle: ElementHandle,
) -> Result<bool, BridgeError> {
    let style = frame.computed_style(handle).await?;
    if style.display.eq_ignore_ascii_case("none")
        || style.visibility.eq_ignore_ascii_case("hidden")
        || style.opacity <= 0.0
    {
        return Ok(false);
    }
    let rect = match frame.bounding_box(handle).await? {
        Some(rect) => rect,
        None => return Ok(false),
    };
    Ok(rect.width > 0.0 && rect.height > 0.0)
}
