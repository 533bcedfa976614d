//! Parsed test-step model.
//!
//! Produced by the out-of-scope natural-language parser; immutable input to
//! the action handlers. The engine performs no language interpretation of its
//! own beyond the descriptive-term heuristics in the locator.

use serde::{Deserialize, Serialize};

/// Enumerated step action, dispatched with an exhaustive `match` so a new
/// action cannot be added without wiring a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Click,
    Type,
    Navigate,
    Wait,
    Select,
    DragAndDrop,
    Assertion,
    Upload,
    Scroll,
    Hover,
    SwitchToIframe,
    SwitchToMainContent,
    Skip,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Navigate => "navigate",
            ActionKind::Wait => "wait",
            ActionKind::Select => "select",
            ActionKind::DragAndDrop => "dragAndDrop",
            ActionKind::Assertion => "assertion",
            ActionKind::Upload => "upload",
            ActionKind::Scroll => "scroll",
            ActionKind::Hover => "hover",
            ActionKind::SwitchToIframe => "switchToIframe",
            ActionKind::SwitchToMainContent => "switchToMainContent",
            ActionKind::Skip => "skip",
        }
    }

    /// Whether this action needs the resolver to locate a target element.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            ActionKind::Click
                | ActionKind::Type
                | ActionKind::Select
                | ActionKind::DragAndDrop
                | ActionKind::Upload
                | ActionKind::Hover
        )
    }
}

/// Typed assertion kind, matching the comparison table of the assertion
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionKind {
    Url,
    PageText,
    ElementText,
    ElementVisible,
    ElementValue,
    Enabled,
    Disabled,
}

impl AssertionKind {
    pub fn name(&self) -> &'static str {
        match self {
            AssertionKind::Url => "url",
            AssertionKind::PageText => "pageText",
            AssertionKind::ElementText => "elementText",
            AssertionKind::ElementVisible => "elementVisible",
            AssertionKind::ElementValue => "elementValue",
            AssertionKind::Enabled => "enabled",
            AssertionKind::Disabled => "disabled",
        }
    }

    /// Parse the legacy flat `assertionType` string.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "url" => Some(AssertionKind::Url),
            "pageText" | "page_text" => Some(AssertionKind::PageText),
            "elementText" | "element_text" => Some(AssertionKind::ElementText),
            "elementVisible" | "element_visible" => Some(AssertionKind::ElementVisible),
            "elementValue" | "element_value" => Some(AssertionKind::ElementValue),
            "enabled" => Some(AssertionKind::Enabled),
            "disabled" => Some(AssertionKind::Disabled),
            _ => None,
        }
    }
}

/// Comparison mode for an assertion's actual-vs-expected check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssertionCondition {
    Equals,
    Contains,
    /// Explicit visibility expectation; honors `expected_text` "true"/"false".
    IsVisible,
}

/// Structured assertion payload attached to an assertion step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAssertion {
    #[serde(rename = "type")]
    pub kind: AssertionKind,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub expected_text: Option<String>,
    #[serde(default)]
    pub condition: Option<AssertionCondition>,
}

/// One parsed test step, as handed over by the step parser.
///
/// `target` carries either a literal selector or a descriptive phrase
/// ("Login button"); the resolver decides which. `index` disambiguates when a
/// strategy matches several elements. The legacy flat `assertion_type` /
/// `expected_text` pair is honored when the structured `assertion` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTestStep {
    pub action: ActionKind,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub assertion: Option<StepAssertion>,
    #[serde(default)]
    pub assertion_type: Option<String>,
    #[serde(default)]
    pub expected_text: Option<String>,
    #[serde(default)]
    pub original_step: String,
    #[serde(default)]
    pub index: usize,
    /// Press Enter after typing; set by the parser for "... and press enter".
    #[serde(default)]
    pub submit: bool,
}

impl ParsedTestStep {
    /// Minimal constructor used by tests and examples.
    pub fn new(action: ActionKind, target: impl Into<Option<String>>) -> Self {
        let target = target.into();
        let original_step = target.clone().unwrap_or_default();
        Self {
            action,
            target,
            value: None,
            assertion: None,
            assertion_type: None,
            expected_text: None,
            original_step,
            index: 0,
            submit: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_assertion(mut self, assertion: StepAssertion) -> Self {
        self.assertion = Some(assertion);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_submit(mut self) -> Self {
        self.submit = true;
        self
    }
}
