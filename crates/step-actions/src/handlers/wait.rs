use std::time::Duration;

use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

fn numeric_ms(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}

/// Wait execution, in order of preference:
/// 1. a numeric value or target is a fixed pause in milliseconds
/// 2. a non-numeric target waits for that element to become resolvable
/// 3. neither: the engine's default pause
pub(crate) async fn execute(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    if let Some(ms) = numeric_ms(step.value.as_deref()).or_else(|| numeric_ms(step.target.as_deref()))
    {
        let pause = Duration::from_millis(ms).min(ctx.remaining());
        tokio::time::sleep(pause).await;
        return Ok(Handled::done(format!("paused {}ms", pause.as_millis())));
    }

    if let Some(target) = step.target.as_deref().filter(|t| !t.trim().is_empty()) {
        let element = engine.resolve_required(ctx, step, target).await?;
        return Ok(Handled::done(format!(
            "'{}' appeared via {}",
            element.selector, element.strategy
        )));
    }

    let pause = engine.config().default_pause.min(ctx.remaining());
    tokio::time::sleep(pause).await;
    Ok(Handled::done(format!(
        "paused {}ms (default)",
        pause.as_millis()
    )))
}
