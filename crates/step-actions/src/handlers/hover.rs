use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let target = engine.required_target(step)?;
    let element = engine.resolve_required(ctx, step, target).await?;
    element.frame().hover(element.handle()).await?;
    Ok(Handled::done(format!("hovered '{}'", element.selector)))
}
