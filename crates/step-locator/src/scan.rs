//! Broad heuristic scan for authentication entry points.
//!
//! Late-stage recovery: when every selector strategy has missed, walk the
//! page's interactive elements and compare their text, href, id and class
//! against login-related keywords.

use page_bridge::{BridgeError, ElementDescription, ElementHandle, FrameContext, SelectorMethod};
use tracing::debug;

const LOGIN_KEYWORDS: [&str; 6] = ["login", "log in", "sign in", "signin", "sign-in", "auth"];
const SCAN_TAGS: [&str; 3] = ["a", "button", "input"];
const SCAN_LIMIT: usize = 40;

/// True when the step's descriptive term expresses login intent.
pub fn is_login_intent(term: &str) -> bool {
    let lower = term.to_lowercase();
    LOGIN_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn description_matches(desc: &ElementDescription) -> bool {
    let mut haystacks = vec![desc.text.to_lowercase()];
    if let Some(href) = &desc.href {
        haystacks.push(href.to_lowercase());
    }
    if let Some(id) = &desc.id {
        haystacks.push(id.to_lowercase());
    }
    if !desc.classes.is_empty() {
        haystacks.push(desc.classes.join(" ").to_lowercase());
    }
    if let Some(value) = &desc.value {
        haystacks.push(value.to_lowercase());
    }
    haystacks
        .iter()
        .any(|h| LOGIN_KEYWORDS.iter().any(|kw| h.contains(kw)))
}

/// Scan interactive elements for a login match. Returns the first matching
/// handle; every non-matching handle is released before returning.
pub async fn find_login_element(
    frame: &dyn FrameContext,
) -> Result<Option<ElementHandle>, BridgeError> {
    for tag in SCAN_TAGS {
        let handles = frame.query_all(SelectorMethod::Css, tag, SCAN_LIMIT).await?;
        let mut found = None;
        for handle in handles {
            if found.is_some() {
                frame.release(handle);
                continue;
            }
            match frame.describe(handle).await {
                Ok(desc) if description_matches(&desc) => {
                    debug!(tag, text = %desc.text, "login scan matched");
                    found = Some(handle);
                }
                Ok(_) => frame.release(handle),
                Err(err) => {
                    debug!(%err, "login scan describe failed");
                    frame.release(handle);
                }
            }
        }
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}
