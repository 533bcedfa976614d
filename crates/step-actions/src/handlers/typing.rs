use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Type execution:
/// 1. resolve the input
/// 2. type the step's value, pressing Enter when the step submits
/// 3. record the submission on the page-scoped flags, so a later submit-ish
///    step can take the sentinel shortcut
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let target = engine.required_target(step)?;
    let value = step
        .value
        .clone()
        .or_else(|| step.expected_text.clone())
        .ok_or_else(|| ActionError::Internal("type step has no value to enter".to_string()))?;

    let element = engine.resolve_required(ctx, step, target).await?;
    element
        .frame()
        .type_text(element.handle(), &value, step.submit)
        .await?;

    if step.submit {
        ctx.flags.mark_form_submitted();
        ctx.log("form submitted, page flag set", None);
    }

    Ok(Handled::done(format!(
        "typed {} chars into '{}' (submit={})",
        value.chars().count(),
        element.selector,
        step.submit
    )))
}
