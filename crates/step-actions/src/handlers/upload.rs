use page_bridge::SelectorMethod;
use step_locator::ResolvedElement;
use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Upload execution: resolve the given target, or fall back to the page's
/// first `input[type="file"]`, then set the files from the comma-separated
/// step value.
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let paths: Vec<String> = step
        .value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if paths.is_empty() {
        return Err(ActionError::Internal(
            "upload step has no file paths in value".to_string(),
        ));
    }

    let element = match step.target.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(target) => match engine.resolve_optional(ctx, step, target).await? {
            Some(element) => element,
            None => file_input_fallback(ctx, target).await?,
        },
        None => file_input_fallback(ctx, "<none>").await?,
    };

    element
        .frame()
        .set_input_files(element.handle(), &paths)
        .await?;

    Ok(Handled::done(format!(
        "uploaded {} file(s) via '{}'",
        paths.len(),
        element.selector
    )))
}

async fn file_input_fallback(ctx: &StepCtx, target: &str) -> Result<ResolvedElement, ActionError> {
    let selector = "input[type=\"file\"]";
    match ctx.frame.query(SelectorMethod::Css, selector).await? {
        Some(handle) => Ok(ResolvedElement::new(
            handle,
            ctx.frame.clone(),
            "file-input-fallback",
            selector,
        )),
        None => Err(ActionError::ElementNotFound {
            target: format!("{target} (and no file input on page)"),
        }),
    }
}
