use std::sync::Arc;
use std::time::Instant;

use page_bridge::{ElementHandle, FrameContext, SelectorMethod};
use step_locator::hint::{normalize_xpath, SelectorHint};
use stepwright_core_types::ParsedTestStep;

use crate::engine::StepEngine;
use crate::errors::ActionError;
use crate::types::{Handled, StepCtx};

const HEURISTIC_SELECTORS: [&str; 3] = [
    "iframe[id*=\"iframe\" i]",
    "iframe[class*=\"iframe\" i]",
    "iframe[src*=\"embed\" i]",
];

/// Iframe-switch execution:
/// 1. try the step's selector as an explicit CSS/XPath iframe lookup
/// 2. try a fixed list of heuristic iframe selectors
/// 3. fall back to the largest non-advertising iframe by area
/// 4. once entered, briefly wait for the frame's body
///
/// Finding no iframe is not an error: the step completes with no frame
/// switch and subsequent steps stay on the current frame.
pub(crate) async fn switch_to_iframe(
    engine: &StepEngine,
    ctx: &StepCtx,
    step: &ParsedTestStep,
) -> Result<Handled, ActionError> {
    let target = step.target.clone().unwrap_or_default();

    if !target.trim().is_empty() {
        let hint = SelectorHint::parse(&target);
        let explicit = hint.runnable().or_else(|| selector_like(&target));
        if let Some((method, selector)) = explicit {
            if let Some(handle) = ctx.frame.query(method, &selector).await? {
                if let Some(frame) = enter(engine, ctx, handle).await? {
                    return Ok(Handled::switched(
                        format!("entered iframe matching '{selector}'"),
                        frame,
                    ));
                }
            }
        }
    }

    for selector in HEURISTIC_SELECTORS {
        if let Some(handle) = ctx.frame.query(SelectorMethod::Css, selector).await? {
            if let Some(frame) = enter(engine, ctx, handle).await? {
                return Ok(Handled::switched(
                    format!("entered iframe via heuristic '{selector}'"),
                    frame,
                ));
            }
        }
    }

    // Largest non-ad iframe by bounding-box area.
    let infos = ctx.page.iframes().await?;
    let main = ctx.page.main_frame();
    let mut best: Option<(f64, ElementHandle)> = None;
    for info in infos {
        if info.looks_like_ad() {
            main.release(info.handle);
            continue;
        }
        match best {
            Some((area, _)) if area >= info.area => main.release(info.handle),
            Some((_, loser)) => {
                main.release(loser);
                best = Some((info.area, info.handle));
            }
            None => best = Some((info.area, info.handle)),
        }
    }
    if let Some((area, handle)) = best {
        let entered = ctx.page.enter_iframe(handle).await;
        main.release(handle);
        if let Some(frame) = entered? {
            wait_for_body(engine, &frame).await;
            return Ok(Handled::switched(
                format!("entered largest iframe ({area:.0}px^2)"),
                frame,
            ));
        }
    }

    ctx.log("no iframe found, staying on current frame", None);
    Ok(Handled::done("no iframe found".to_string()))
}

pub(crate) async fn switch_to_main(ctx: &StepCtx) -> Result<Handled, ActionError> {
    Ok(Handled::switched(
        "switched back to main content".to_string(),
        ctx.page.main_frame(),
    ))
}

fn selector_like(input: &str) -> Option<(SelectorMethod, String)> {
    let input = input.trim();
    if input.contains("//") {
        return Some((SelectorMethod::Xpath, normalize_xpath(input)));
    }
    if input.contains('#') || input.contains('.') || input.contains('[') {
        return Some((SelectorMethod::Css, input.to_string()));
    }
    None
}

async fn enter(
    engine: &StepEngine,
    ctx: &StepCtx,
    handle: ElementHandle,
) -> Result<Option<Arc<dyn FrameContext>>, ActionError> {
    let entered = ctx.page.enter_iframe(handle).await;
    ctx.frame.release(handle);
    let frame = entered?;
    if let Some(frame) = &frame {
        wait_for_body(engine, frame).await;
    }
    Ok(frame)
}

/// Give the entered document a moment to produce a body; a missing body is
/// logged, not fatal.
async fn wait_for_body(engine: &StepEngine, frame: &Arc<dyn FrameContext>) {
    let deadline = Instant::now() + engine.config().iframe_body_wait;
    loop {
        if let Ok(Some(body)) = frame.query(SelectorMethod::Css, "body").await {
            frame.release(body);
            return;
        }
        if Instant::now() >= deadline {
            tracing::debug!("iframe body never appeared");
            return;
        }
        tokio::time::sleep(engine.config().poll_interval).await;
    }
}
