//! Bounded DOM summaries for assisted recovery.
//!
//! Best effort by contract: any backend error is logged and swallowed, and
//! the output is capped so suggestion payloads stay cheap.

use page_bridge::{FrameContext, PageContext, SelectorMethod};
use tracing::debug;

const MAX_LINE: usize = 120;
const MAX_TOTAL: usize = 2048;

const CONTAINER_PROBES: [&str; 8] = [
    "div[id*=\"gallery\" i]",
    "div[class*=\"gallery\" i]",
    "div[id*=\"modal\" i]",
    "div[class*=\"modal\" i]",
    "div[class*=\"popup\" i]",
    "div[id*=\"popup\" i]",
    "div[class*=\"trash\" i]",
    "span[class*=\"modal\" i]",
];

/// Summarize the interactive elements of `frame` as truncated pseudo-HTML
/// lines, prefixed with the page title and URL.
pub async fn capture(page: &dyn PageContext, frame: &dyn FrameContext, failed_selector: &str) -> String {
    let mut out = String::new();

    let url = page.url().await.unwrap_or_default();
    let title = page.title().await.unwrap_or_default();
    out.push_str(&format!("Page: {title}\nURL: {url}\nFailed selector: {failed_selector}\n"));

    append_group(frame, &mut out, "Buttons", "button", 10).await;
    append_group(frame, &mut out, "Inputs", "input", 5).await;
    append_group(frame, &mut out, "Images", "img", 5).await;
    append_group(frame, &mut out, "Links", "a", 5).await;
    append_containers(frame, &mut out).await;

    if out.len() > MAX_TOTAL {
        let mut end = MAX_TOTAL;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }
    out
}

async fn append_group(
    frame: &dyn FrameContext,
    out: &mut String,
    label: &str,
    selector: &str,
    limit: usize,
) {
    if out.len() >= MAX_TOTAL {
        return;
    }
    let handles = match frame.query_all(SelectorMethod::Css, selector, limit).await {
        Ok(handles) => handles,
        Err(err) => {
            debug!(selector, %err, "snippet group query failed");
            return;
        }
    };
    if handles.is_empty() {
        return;
    }
    out.push_str(&format!("{label}:\n"));
    for handle in handles {
        if out.len() < MAX_TOTAL {
            match frame.describe(handle).await {
                Ok(desc) => {
                    out.push_str("  ");
                    out.push_str(&desc.to_snippet_line(MAX_LINE));
                    out.push('\n');
                }
                Err(err) => debug!(%err, "snippet describe failed"),
            }
        }
        frame.release(handle);
    }
}

async fn append_containers(frame: &dyn FrameContext, out: &mut String) {
    let mut remaining = 5usize;
    let mut header_written = false;
    for probe in CONTAINER_PROBES {
        if remaining == 0 || out.len() >= MAX_TOTAL {
            break;
        }
        let handles = match frame.query_all(SelectorMethod::Css, probe, remaining).await {
            Ok(handles) => handles,
            Err(err) => {
                debug!(probe, %err, "snippet container query failed");
                continue;
            }
        };
        for handle in handles {
            if remaining > 0 && out.len() < MAX_TOTAL {
                if let Ok(desc) = frame.describe(handle).await {
                    if !header_written {
                        out.push_str("Containers:\n");
                        header_written = true;
                    }
                    out.push_str("  ");
                    out.push_str(&desc.to_snippet_line(MAX_LINE));
                    out.push('\n');
                    remaining -= 1;
                }
            }
            frame.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_bridge::mock::{MockElement, MockPage};

    #[tokio::test]
    async fn captures_groups_and_releases_handles() {
        let page = MockPage::new("https://shop.test/cart");
        page.set_title("Cart");
        for i in 0..12 {
            page.push(MockElement::new("button").id(format!("b{i}")).text("Go"));
        }
        page.push(MockElement::new("input").id("qty").input_type("number"));
        page.push(MockElement::new("a").href("/checkout").text("Checkout"));
        page.push(MockElement::new("div").class("modal-overlay"));

        let frame = page.mock_main();
        let snippet = capture(&page, frame.as_ref(), "#missing").await;

        assert!(snippet.starts_with("Page: Cart\nURL: https://shop.test/cart\n"));
        assert!(snippet.contains("Buttons:"));
        // Capped at 10 of the 12 buttons.
        assert!(snippet.contains("b9"));
        assert!(!snippet.contains("b10"));
        assert!(snippet.contains("Inputs:"));
        assert!(snippet.contains("Links:"));
        assert!(snippet.contains("Containers:"));
        assert!(snippet.len() <= MAX_TOTAL);
        assert_eq!(frame.outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn total_cap_respects_char_boundaries() {
        let page = MockPage::new("https://shop.test/menu");
        // "Page: caf" is 9 bytes, then two-byte chars: every char boundary
        // sits at an odd offset, so the even cap lands mid-char.
        page.set_title(format!("caf{}", "é".repeat(1500)));
        let frame = page.mock_main();
        let snippet = capture(&page, frame.as_ref(), "#missing").await;
        assert!(snippet.len() <= MAX_TOTAL);
        assert!(snippet.ends_with('é'));
        assert_eq!(frame.outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn empty_page_still_yields_header() {
        let page = MockPage::new("https://app.test/");
        let frame = page.mock_main();
        let snippet = capture(&page, frame.as_ref(), ".gone").await;
        assert!(snippet.contains("Failed selector: .gone"));
        assert_eq!(frame.outstanding_handles(), 0);
    }
}
