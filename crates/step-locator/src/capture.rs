//! Human-in-the-loop element capture.
//!
//! Last-resort recovery for visible sessions: the page overlays a picker,
//! the operator clicks the intended element, and the resolver synthesizes a
//! selector from the captured target's identifying attributes.

use std::sync::Arc;
use std::time::Duration;

use page_bridge::{BridgeError, ElementHandle, FrameContext, PageContext, SelectorMethod};
use tracing::{debug, info};

/// Ask the operator to pick the element, then re-query the synthesized
/// selector in the main frame. Returns the frame that was queried alongside
/// the handle, so the handle is only ever released or interacted with
/// through its own frame, and the selector for log provenance.
pub async fn capture_from_user(
    page: &dyn PageContext,
    timeout: Duration,
) -> Result<Option<(ElementHandle, Arc<dyn FrameContext>, String)>, BridgeError> {
    if !page.is_interactive() {
        debug!("session not interactive, skipping capture");
        return Ok(None);
    }
    let target = match page.await_user_pick(timeout).await? {
        Some(target) => target,
        None => {
            debug!("no element picked within {:?}", timeout);
            return Ok(None);
        }
    };
    let selector = target.to_selector();
    info!(%selector, "operator picked an element");
    let frame = page.main_frame();
    Ok(frame
        .query(SelectorMethod::Css, &selector)
        .await?
        .map(|handle| (handle, frame, selector)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_bridge::mock::{MockElement, MockPage};
    use page_bridge::CapturedTarget;

    #[tokio::test]
    async fn resolves_picked_target_by_testid() {
        let page = MockPage::new("https://app.test/");
        page.set_interactive(true);
        page.push(
            MockElement::new("button")
                .attr("data-testid", "confirm")
                .text("Confirm"),
        );
        page.set_user_pick(CapturedTarget {
            tag: "button".into(),
            id: None,
            data_testid: Some("confirm".into()),
            classes: vec![],
        });

        let (handle, frame, selector) = capture_from_user(&page, Duration::from_millis(50))
            .await
            .unwrap()
            .expect("capture should resolve");
        assert_eq!(selector, "[data-testid=\"confirm\"]");
        frame.release(handle);
    }

    #[tokio::test]
    async fn headless_session_skips_capture() {
        let page = MockPage::new("https://app.test/");
        page.set_user_pick(CapturedTarget {
            tag: "button".into(),
            id: Some("x".into()),
            data_testid: None,
            classes: vec![],
        });
        let result = capture_from_user(&page, Duration::from_millis(10))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
