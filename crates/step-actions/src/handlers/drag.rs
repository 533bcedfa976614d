use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

/// Drag-and-drop: the step target names the source, the step value names the
/// destination. Both resolve through the full cascade.
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let source_target = engine.required_target(step)?;
    let dest_target = step
        .value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ActionError::Internal("dragAndDrop step has no destination in value".to_string())
        })?;

    let source = engine.resolve_required(ctx, step, source_target).await?;
    let dest = engine
        .resolve_with(ctx, step, dest_target, 0)
        .await?
        .ok_or_else(|| ActionError::ElementNotFound {
            target: dest_target.to_string(),
        })?;

    source
        .frame()
        .drag_and_drop(source.handle(), dest.handle())
        .await?;

    Ok(Handled::done(format!(
        "dragged '{}' onto '{}'",
        source.selector, dest.selector
    )))
}
