//! Selector-hint extraction from raw step targets.
//!
//! Authors can steer resolution with an explicit selector, either as a
//! whole-target prefix (`css://.cart-badge`, `xpath://button`) or as a
//! parenthetical embedded in prose (`the save button (id: saveBtn)`).
//! Anything left over is kept as the descriptive term the fallback
//! generator works from. Parsing is pure and never fails; unrecognized
//! input is simply treated as prose.

use page_bridge::SelectorMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorHint {
    pub method: Option<SelectorMethod>,
    /// Hint value exactly as written; xpath values may still need
    /// [`normalize_xpath`] before being sent to a backend.
    pub value: Option<String>,
    /// Descriptive text remaining after hint extraction, trimmed.
    pub term: String,
}

impl SelectorHint {
    pub fn parse(target: &str) -> Self {
        let target = target.trim();

        if let Some(rest) = target.strip_prefix("xpath://") {
            return Self {
                method: Some(SelectorMethod::Xpath),
                value: Some(rest.trim().to_string()),
                term: String::new(),
            };
        }
        if let Some(rest) = target.strip_prefix("css://") {
            return Self {
                method: Some(SelectorMethod::Css),
                value: Some(rest.trim().to_string()),
                term: String::new(),
            };
        }

        if let Some((method, value, remainder)) = extract_parenthetical(target) {
            return Self {
                method: Some(method),
                value: Some(value),
                term: remainder,
            };
        }

        Self {
            method: None,
            value: None,
            term: target.to_string(),
        }
    }

    pub fn explicit(&self) -> Option<(SelectorMethod, &str)> {
        match (self.method, self.value.as_deref()) {
            (Some(method), Some(value)) => Some((method, value)),
            _ => None,
        }
    }

    /// The hint value as a runnable selector, with xpath axes restored.
    pub fn runnable(&self) -> Option<(SelectorMethod, String)> {
        let (method, value) = self.explicit()?;
        let selector = match method {
            SelectorMethod::Xpath => normalize_xpath(value),
            SelectorMethod::Css => value.to_string(),
        };
        Some((method, selector))
    }
}

/// Prefix-form xpath values arrive without their leading axis when written
/// as `xpath://button`; restore it so the backend sees a runnable query.
pub fn normalize_xpath(value: &str) -> String {
    let value = value.trim();
    if value.starts_with("//") || value.starts_with('(') || value.starts_with('/') {
        value.to_string()
    } else {
        format!("//{value}")
    }
}

fn extract_parenthetical(target: &str) -> Option<(SelectorMethod, String, String)> {
    let open = target.find('(')?;
    let close = target[open..].find(')')? + open;
    let inner = target[open + 1..close].trim();

    let (method, value) = if let Some(rest) = inner.strip_prefix("css:") {
        (SelectorMethod::Css, rest.trim().to_string())
    } else if let Some(rest) = inner.strip_prefix("xpath:") {
        (SelectorMethod::Xpath, rest.trim().to_string())
    } else if let Some(rest) = inner.strip_prefix("id:") {
        (SelectorMethod::Css, format!("#{}", rest.trim()))
    } else {
        return None;
    };

    if value.is_empty() || value == "#" {
        return None;
    }

    let mut remainder = String::with_capacity(target.len());
    remainder.push_str(&target[..open]);
    remainder.push_str(&target[close + 1..]);
    Some((method, value, remainder.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xpath_prefix_keeps_raw_value() {
        let hint = SelectorHint::parse("xpath://button");
        assert_eq!(hint.explicit(), Some((SelectorMethod::Xpath, "button")));
        assert!(hint.term.is_empty());
        assert_eq!(
            hint.runnable(),
            Some((SelectorMethod::Xpath, "//button".to_string()))
        );
    }

    #[test]
    fn xpath_full_paths_are_not_doubled() {
        assert_eq!(normalize_xpath("/html/body/div[1]"), "/html/body/div[1]");
        assert_eq!(normalize_xpath("//div[@id='x']"), "//div[@id='x']");
        assert_eq!(normalize_xpath("button[@id='x']"), "//button[@id='x']");
    }

    #[test]
    fn css_prefix() {
        let hint = SelectorHint::parse("css://.cart-badge");
        assert_eq!(hint.explicit(), Some((SelectorMethod::Css, ".cart-badge")));
    }

    #[test]
    fn parenthetical_id_becomes_css() {
        let hint = SelectorHint::parse("the save button (id: saveBtn)");
        assert_eq!(hint.explicit(), Some((SelectorMethod::Css, "#saveBtn")));
        assert_eq!(hint.term, "the save button");
    }

    #[test]
    fn parenthetical_css_keeps_remainder() {
        let hint = SelectorHint::parse("cart icon (css: .cart-count) in header");
        assert_eq!(hint.explicit(), Some((SelectorMethod::Css, ".cart-count")));
        assert_eq!(hint.term, "cart icon  in header");
    }

    #[test]
    fn plain_prose_passes_through() {
        let hint = SelectorHint::parse("  Submit Order  ");
        assert_eq!(hint.explicit(), None);
        assert_eq!(hint.term, "Submit Order");
    }

    #[test]
    fn unrecognized_parenthetical_is_kept_as_prose() {
        let hint = SelectorHint::parse("the button (top right)");
        assert_eq!(hint.explicit(), None);
        assert_eq!(hint.term, "the button (top right)");
    }
}
