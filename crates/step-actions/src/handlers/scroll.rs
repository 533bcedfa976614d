use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Scroll execution: centers the resolved target and lets it settle; any
/// resolution miss or error degrades to a generic half-viewport scroll
/// rather than failing the step.
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    if let Some(target) = step.target.as_deref().filter(|t| !t.trim().is_empty()) {
        match engine.resolve_optional(ctx, step, target).await {
            Ok(Some(element)) => {
                element.frame().scroll_into_view(element.handle()).await?;
                tokio::time::sleep(engine.config().scroll_settle).await;
                return Ok(Handled::done(format!(
                    "scrolled '{}' into view",
                    element.selector
                )));
            }
            Ok(None) => ctx.log(&format!("scroll target '{target}' not found, using generic scroll"), None),
            Err(err) => ctx.log(&format!("scroll resolution failed ({err}), using generic scroll"), None),
        }
    }

    ctx.frame
        .scroll_by(0.0, engine.config().scroll_fallback_px)
        .await?;
    Ok(Handled::done(format!(
        "scrolled by {}px",
        engine.config().scroll_fallback_px
    )))
}
