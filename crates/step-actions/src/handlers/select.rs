use page_bridge::SelectorMethod;
use step_locator::visibility::is_visible;
use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Select execution:
/// 1. resolve the control
/// 2. native `<select>`: select by value, retrying once after a click when
///    the first attempt is refused
/// 3. anything else is treated as a custom dropdown: click it open, then
///    probe a fixed list of option selectors until one is clickable
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let target = engine.required_target(step)?;
    let value = step
        .value
        .clone()
        .ok_or_else(|| ActionError::Internal("select step has no option value".to_string()))?;

    let element = engine.resolve_required(ctx, step, target).await?;
    let desc = element.frame().describe(element.handle()).await?;

    if desc.tag.eq_ignore_ascii_case("select") {
        if let Err(first) = element.frame().select_value(element.handle(), &value).await {
            ctx.log(&format!("select refused, clicking and retrying: {first}"), None);
            element.frame().click(element.handle()).await?;
            element
                .frame()
                .select_value(element.handle(), &value)
                .await
                .map_err(|_| ActionError::ElementNotFound {
                    target: format!("option '{}' in '{}'", value, element.selector),
                })?;
        }
        return Ok(Handled::done(format!(
            "selected '{}' in '{}'",
            value, element.selector
        )));
    }

    // Custom dropdown: open it, then hunt for the option.
    element.frame().click(element.handle()).await?;
    let frame = element.frame().clone();
    let opener = element.selector.clone();
    drop(element);

    let probes: [(SelectorMethod, String); 7] = [
        (SelectorMethod::Css, format!("[data-value=\"{value}\"]")),
        (SelectorMethod::Css, format!("option[value=\"{value}\"]")),
        (SelectorMethod::Css, format!("li[data-value=\"{value}\"]")),
        (SelectorMethod::Xpath, format!("//li[contains(text(),'{value}')]")),
        (SelectorMethod::Xpath, format!("//option[contains(text(),'{value}')]")),
        (SelectorMethod::Xpath, format!("//div[contains(text(),'{value}')]")),
        (SelectorMethod::Xpath, format!("//span[contains(text(),'{value}')]")),
    ];
    for (method, selector) in &probes {
        if let Ok(Some(handle)) = frame.query(*method, selector).await {
            if is_visible(frame.as_ref(), handle).await.unwrap_or(false) {
                let clicked = frame.click(handle).await;
                frame.release(handle);
                clicked?;
                return Ok(Handled::done(format!(
                    "picked '{value}' from custom dropdown '{opener}'"
                )));
            }
            frame.release(handle);
        }
    }

    Err(ActionError::ElementNotFound {
        target: format!("option '{value}' for dropdown '{opener}'"),
    })
}
