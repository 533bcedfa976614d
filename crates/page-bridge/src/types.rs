//! Data types crossing the capability boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a selector string is to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorMethod {
    Css,
    Xpath,
}

impl SelectorMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorMethod::Css => "css",
            SelectorMethod::Xpath => "xpath",
        }
    }
}

/// Opaque reference to a live DOM node within one frame context.
///
/// Whoever obtains a handle owns it and must hand it to
/// [`crate::FrameContext::release`] on every exit path; the locator crate
/// wraps handles in an RAII guard to enforce this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Compact structural summary of one element, as reported by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDescription {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub href: Option<String>,
    pub text: String,
    pub value: Option<String>,
    pub disabled: bool,
    /// Remaining attributes (data-testid, aria-label, src, ...).
    pub attrs: BTreeMap<String, String>,
}

impl ElementDescription {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|s| s.as_str())
    }

    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    /// Render as one truncated pseudo-HTML line for DOM snippets.
    pub fn to_snippet_line(&self, max_len: usize) -> String {
        let mut line = format!("<{}", self.tag);
        if let Some(id) = &self.id {
            line.push_str(&format!(" id=\"{}\"", id));
        }
        if !self.classes.is_empty() {
            line.push_str(&format!(" class=\"{}\"", self.class_attr()));
        }
        if let Some(name) = &self.name {
            line.push_str(&format!(" name=\"{}\"", name));
        }
        if let Some(ty) = &self.input_type {
            line.push_str(&format!(" type=\"{}\"", ty));
        }
        if let Some(href) = &self.href {
            line.push_str(&format!(" href=\"{}\"", href));
        }
        for (key, value) in &self.attrs {
            line.push_str(&format!(" {}=\"{}\"", key, value));
        }
        line.push('>');
        line.push_str(self.text.trim());
        line.push_str(&format!("</{}>", self.tag));
        if line.len() > max_len {
            let mut end = max_len.saturating_sub(1);
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            line.truncate(end);
            line.push('…');
        }
        line
    }
}

/// Computed-style subset consulted by the visibility gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSummary {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
}

impl Default for StyleSummary {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
        }
    }
}

/// Bounding box in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One iframe on the page, as enumerated by [`crate::PageContext::iframes`].
#[derive(Debug, Clone)]
pub struct IframeInfo {
    pub handle: ElementHandle,
    pub src: String,
    pub class_attr: String,
    pub area: f64,
}

impl IframeInfo {
    /// Advertising iframes are never picked by the largest-iframe fallback.
    pub fn looks_like_ad(&self) -> bool {
        let haystack = format!("{} {}", self.src, self.class_attr).to_lowercase();
        ["ad", "ads", "advert", "banner", "doubleclick", "sponsor"]
            .iter()
            .any(|kw| {
                haystack
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|word| word == *kw)
            })
    }
}

/// The element a human operator clicked during interactive capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedTarget {
    pub tag: String,
    pub id: Option<String>,
    pub data_testid: Option<String>,
    pub classes: Vec<String>,
}

impl CapturedTarget {
    /// Synthesize a selector from the captured target; id wins, then
    /// data-testid, then tag + first class, then bare tag.
    pub fn to_selector(&self) -> String {
        if let Some(id) = self.id.as_deref().filter(|s| !s.is_empty()) {
            return format!("#{}", id);
        }
        if let Some(testid) = self.data_testid.as_deref().filter(|s| !s.is_empty()) {
            return format!("[data-testid=\"{}\"]", testid);
        }
        if let Some(class) = self.classes.first().filter(|s| !s.is_empty()) {
            return format!("{}.{}", self.tag, class);
        }
        self.tag.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_target_selector_priority() {
        let mut target = CapturedTarget {
            tag: "button".to_string(),
            id: Some("go".to_string()),
            data_testid: Some("go-btn".to_string()),
            classes: vec!["primary".to_string()],
        };
        assert_eq!(target.to_selector(), "#go");
        target.id = None;
        assert_eq!(target.to_selector(), "[data-testid=\"go-btn\"]");
        target.data_testid = None;
        assert_eq!(target.to_selector(), "button.primary");
        target.classes.clear();
        assert_eq!(target.to_selector(), "button");
    }

    #[test]
    fn iframe_ad_detection_uses_whole_words() {
        let ad = IframeInfo {
            handle: ElementHandle(1),
            src: "https://ads.example.com/frame".to_string(),
            class_attr: String::new(),
            area: 100.0,
        };
        assert!(ad.looks_like_ad());

        // "upload" contains "ad" as a substring but is not an ad frame.
        let content = IframeInfo {
            handle: ElementHandle(2),
            src: "https://example.com/upload".to_string(),
            class_attr: "content-frame".to_string(),
            area: 100.0,
        };
        assert!(!content.looks_like_ad());
    }

    #[test]
    fn snippet_line_truncates() {
        let desc = ElementDescription {
            tag: "button".to_string(),
            id: Some("submit".to_string()),
            text: "Save all pending changes and continue to the next page".to_string(),
            ..Default::default()
        };
        let line = desc.to_snippet_line(40);
        assert!(line.len() <= 40 + '…'.len_utf8());
        assert!(line.starts_with("<button id=\"submit\">"));
    }

    #[test]
    fn snippet_line_truncates_on_char_boundary() {
        // Two-byte chars after the 8-byte "<button>" prefix put every char
        // boundary at an even offset, so a cut at 19 lands mid-char.
        let desc = ElementDescription {
            tag: "button".to_string(),
            text: "é".repeat(40),
            ..Default::default()
        };
        let line = desc.to_snippet_line(20);
        assert!(line.len() <= 20 + '…'.len_utf8());
        assert!(line.ends_with('…'));
    }
}
