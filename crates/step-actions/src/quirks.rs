//! Post-click settle heuristics for known multi-step flows.
//!
//! Some flows only count as done once a downstream control renders (adding
//! to a cart should surface a checkout control, a "continue" step should
//! surface a finish control). Rules are plain data keyed by term and URL
//! patterns; site-specific behavior is added by registering rules, not by
//! branching in the click handler.

use std::time::Duration;

use page_bridge::SelectorMethod;

#[derive(Debug, Clone)]
pub struct QuirkRule {
    /// Stable identifier, used in logs.
    pub id: &'static str,
    /// Substring the step's descriptive term must contain (lowercase).
    pub term_pattern: &'static str,
    /// Substring the page URL must contain, if any.
    pub url_pattern: Option<&'static str>,
    /// The downstream control whose appearance confirms the flow advanced.
    pub settle_selector: &'static str,
    pub settle_method: SelectorMethod,
    pub settle_timeout: Duration,
    /// Path to navigate to directly when the settle wait fails.
    pub fallback_path: Option<&'static str>,
}

impl QuirkRule {
    pub fn applies(&self, term: &str, url: &str) -> bool {
        if !term.to_lowercase().contains(self.term_pattern) {
            return false;
        }
        match self.url_pattern {
            Some(pattern) => url.to_lowercase().contains(pattern),
            None => true,
        }
    }
}

pub struct QuirkRegistry {
    rules: Vec<QuirkRule>,
}

impl QuirkRegistry {
    /// Rules for the flows the engine has shipped against.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                QuirkRule {
                    id: "cart-to-checkout",
                    term_pattern: "cart",
                    url_pattern: None,
                    settle_selector: "[id*=\"checkout\" i]",
                    settle_method: SelectorMethod::Css,
                    settle_timeout: Duration::from_secs(5),
                    fallback_path: Some("/cart"),
                },
                QuirkRule {
                    id: "continue-to-finish",
                    term_pattern: "continue",
                    url_pattern: Some("checkout"),
                    settle_selector: "[id*=\"finish\" i]",
                    settle_method: SelectorMethod::Css,
                    settle_timeout: Duration::from_secs(5),
                    fallback_path: Some("/checkout-step-two"),
                },
            ],
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rules(rules: Vec<QuirkRule>) -> Self {
        Self { rules }
    }

    pub fn register(&mut self, rule: QuirkRule) {
        self.rules.push(rule);
    }

    /// First rule matching the term/URL pair; registration order decides ties.
    pub fn matching(&self, term: &str, url: &str) -> Option<&QuirkRule> {
        self.rules.iter().find(|rule| rule.applies(term, url))
    }
}

impl Default for QuirkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
