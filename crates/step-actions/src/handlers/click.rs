use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Click execution:
/// 1. resolve the target through the full cascade
/// 2. scroll it into view
/// 3. race the click against a navigation wait, so a click that triggers a
///    full page load is not missed
/// 4. fall back to a script-level click if the native click is refused
/// 5. apply any matching post-click settle rule
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let target = engine.required_target(step)?;
    let element = engine.resolve_required(ctx, step, target).await?;
    element.frame().scroll_into_view(element.handle()).await?;

    let (click_result, nav_result) = tokio::join!(
        element.frame().click(element.handle()),
        ctx.page.wait_for_navigation(engine.config().nav_wait)
    );
    let mut navigated = nav_result.unwrap_or(false);

    if let Err(err) = click_result {
        ctx.log(&format!("native click failed, trying script click: {err}"), None);
        element.frame().js_click(element.handle()).await?;
        navigated = ctx
            .page
            .wait_for_navigation(engine.config().nav_wait)
            .await
            .unwrap_or(false)
            || navigated;
    }

    let strategy = element.strategy.clone();
    let selector = element.selector.clone();
    drop(element);

    engine.settle_after_click(ctx, target).await?;

    Ok(Handled::done(format!(
        "clicked '{selector}' via {strategy} (navigated={navigated})"
    )))
}
