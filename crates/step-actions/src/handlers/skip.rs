use stepwright_core_types::ParsedTestStep;

use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// No-op handler for steps intentionally excluded from execution; only the
/// reason is logged.
pub(crate) async fn execute(
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let reason = step
        .value
        .clone()
        .or_else(|| step.target.clone())
        .unwrap_or_else(|| "intentionally skipped".to_string());
    ctx.log(&format!("skipping step: {reason}"), None);
    Ok(Handled::done(format!("skipped: {reason}")))
}
