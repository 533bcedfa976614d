//! Typed assertion evaluation.
//!
//! Comparison semantics per kind:
//!
//! | kind           | subject              | default          | contains    |
//! |----------------|----------------------|------------------|-------------|
//! | url            | page URL             | exact            | substring   |
//! | pageText       | frame inner text     | ci substring     | ci substring|
//! | elementText    | element text content | ci exact (norm)  | ci substring|
//! | elementValue   | element value        | ci exact (norm)  | ci substring|
//! | elementVisible | visibility check     | must be visible  | honors "true"/"false" |
//! | enabled/disabled | disabled property  | boolean          | n/a         |
//!
//! When no typed assertion is present but the caller supplied an expected
//! string, a page-text substring check runs before failing. Every failure
//! message names the kind, selector, expected and actual values.

use stepwright_core_types::{AssertionCondition, AssertionKind, ParsedTestStep, StepAssertion};
use step_locator::visibility::is_visible;
use step_locator::{ElementResolver, ResolveRequest};
use tracing::debug;

use crate::errors::ActionError;
use crate::types::StepCtx;

/// Collapse whitespace and lowercase for tolerant text comparison.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn fail(kind: &str, selector: &str, expected: &str, actual: &str) -> ActionError {
    ActionError::AssertionFailed(format!(
        "assertion '{kind}' failed for '{selector}': expected '{expected}', got '{actual}'"
    ))
}

/// Evaluate the step's assertion. Returns a human-readable pass detail.
pub async fn run_assertion(
    resolver: &ElementResolver,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<String, ActionError> {
    if let Some(assertion) = &step.assertion {
        return evaluate(resolver, ctx, step, assertion).await;
    }

    // Legacy flat pair, with the step target as the selector.
    if let Some(kind) = step
        .assertion_type
        .as_deref()
        .and_then(AssertionKind::parse)
    {
        let assertion = StepAssertion {
            kind,
            selector: step.target.clone(),
            expected_text: step.expected_text.clone(),
            condition: None,
        };
        return evaluate(resolver, ctx, step, &assertion).await;
    }

    // Last resort: a bare expected string becomes a page-text check.
    if let Some(expected) = step.expected_text.as_deref().or(step.target.as_deref()) {
        debug!(expected, "untyped assertion, falling back to page text");
        let page_text = ctx.frame.inner_text().await?;
        if normalize(&page_text).contains(&normalize(expected)) {
            return Ok(format!("page text contains '{expected}'"));
        }
        return Err(fail("pageText", "<page>", expected, &truncate(&page_text)));
    }

    Err(ActionError::Internal(
        "assertion step carries no assertion payload".to_string(),
    ))
}

async fn evaluate(
    resolver: &ElementResolver,
    ctx: &StepCtx,
    step: &ParsedTestStep,
    assertion: &StepAssertion,
) -> Result<String, ActionError> {
    let expected = assertion.expected_text.clone().unwrap_or_default();
    let selector = assertion
        .selector
        .clone()
        .or_else(|| step.target.clone())
        .unwrap_or_default();
    let contains = matches!(assertion.condition, Some(AssertionCondition::Contains));
    let kind = assertion.kind.name();

    match assertion.kind {
        AssertionKind::Url => {
            let actual = ctx.page.url().await?;
            let ok = if contains {
                actual.contains(&expected)
            } else {
                actual == expected
            };
            if ok {
                Ok(format!("url check passed: {actual}"))
            } else {
                Err(fail(kind, "<url>", &expected, &actual))
            }
        }
        AssertionKind::PageText => {
            let actual = ctx.frame.inner_text().await?;
            if normalize(&actual).contains(&normalize(&expected)) {
                Ok(format!("page text contains '{expected}'"))
            } else {
                Err(fail(kind, "<page>", &expected, &truncate(&actual)))
            }
        }
        AssertionKind::ElementText => {
            let element = resolve(resolver, ctx, step, &selector).await?;
            let actual = element.frame().text_content(element.handle()).await?;
            text_compare(kind, &selector, &expected, &actual, contains)
        }
        AssertionKind::ElementValue => {
            let element = resolve(resolver, ctx, step, &selector).await?;
            let actual = element.frame().input_value(element.handle()).await?;
            text_compare(kind, &selector, &expected, &actual, contains)
        }
        AssertionKind::ElementVisible => {
            // "false" (or an explicit isVisible condition with expected
            // "false") asserts absence/invisibility.
            let expect_visible = !expected.trim().eq_ignore_ascii_case("false");
            let actual_visible = match try_resolve(resolver, ctx, step, &selector).await? {
                Some(element) => is_visible(element.frame().as_ref(), element.handle()).await?,
                None => false,
            };
            if actual_visible == expect_visible {
                Ok(format!(
                    "visibility check passed: '{selector}' visible={actual_visible}"
                ))
            } else {
                Err(fail(
                    kind,
                    &selector,
                    &format!("visible={expect_visible}"),
                    &format!("visible={actual_visible}"),
                ))
            }
        }
        AssertionKind::Enabled | AssertionKind::Disabled => {
            let expect_disabled = assertion.kind == AssertionKind::Disabled;
            let element = resolve(resolver, ctx, step, &selector).await?;
            let actual_disabled = element.frame().is_disabled(element.handle()).await?;
            if actual_disabled == expect_disabled {
                Ok(format!(
                    "'{selector}' disabled={actual_disabled} as expected"
                ))
            } else {
                Err(fail(
                    kind,
                    &selector,
                    &format!("disabled={expect_disabled}"),
                    &format!("disabled={actual_disabled}"),
                ))
            }
        }
    }
}

fn text_compare(
    kind: &str,
    selector: &str,
    expected: &str,
    actual: &str,
    contains: bool,
) -> Result<String, ActionError> {
    let norm_expected = normalize(expected);
    let norm_actual = normalize(actual);
    let ok = if contains {
        norm_actual.contains(&norm_expected)
    } else {
        norm_actual == norm_expected
    };
    if ok {
        Ok(format!("'{selector}' {kind} check passed"))
    } else {
        Err(fail(kind, selector, expected, actual))
    }
}

async fn resolve(
    resolver: &ElementResolver,
    ctx: &StepCtx,
    step: &ParsedTestStep,
    selector: &str,
) -> Result<step_locator::ResolvedElement, ActionError> {
    try_resolve(resolver, ctx, step, selector)
        .await?
        .ok_or_else(|| ActionError::ElementNotFound {
            target: selector.to_string(),
        })
}

async fn try_resolve(
    resolver: &ElementResolver,
    ctx: &StepCtx,
    step: &ParsedTestStep,
    selector: &str,
) -> Result<Option<step_locator::ResolvedElement>, ActionError> {
    let request = ResolveRequest::new(selector)
        .with_original_step(step.original_step.clone())
        .with_index(step.index);
    Ok(resolver
        .resolve(ctx.page.as_ref(), &ctx.frame, &ctx.flags, &request)
        .await?)
}

fn truncate(text: &str) -> String {
    const MAX: usize = 120;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}
