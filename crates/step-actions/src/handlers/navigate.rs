use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let url = engine.required_target(step)?;
    ctx.page.navigate(url).await?;
    let confirmed = ctx
        .page
        .wait_for_navigation(engine.config().nav_wait)
        .await?;
    Ok(Handled::done(format!(
        "navigated to {url} (confirmed={confirmed})"
    )))
}
