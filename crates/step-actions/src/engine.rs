//! Step dispatch.
//!
//! [`StepEngine::execute`] matches on the step's action kind and hands off to
//! the corresponding handler. The match is exhaustive, so adding an action
//! without a handler fails at compile time.

use std::time::Duration;

use tracing::warn;

use step_locator::{ElementResolver, LocatorError, ResolveRequest, ResolvedElement};
use stepwright_core_types::{ActionKind, ParsedTestStep};

use crate::assertions;
use crate::errors::ActionError;
use crate::handlers;
use crate::quirks::{QuirkRegistry, QuirkRule};
use crate::types::{Handled, PendingReport, StepCtx, StepOutcome};

/// Engine-level timings, separate from the resolver's own cascade budget.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window raced against a click for a triggered page load.
    pub nav_wait: Duration,
    pub poll_interval: Duration,
    /// Pause for a wait step with no duration and no target.
    pub default_pause: Duration,
    /// How long an entered iframe gets to produce a body.
    pub iframe_body_wait: Duration,
    /// Settle pause after scrolling a target into view.
    pub scroll_settle: Duration,
    /// Generic fallback scroll distance in pixels.
    pub scroll_fallback_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nav_wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            default_pause: Duration::from_secs(1),
            iframe_body_wait: Duration::from_secs(2),
            scroll_settle: Duration::from_millis(300),
            scroll_fallback_px: 400.0,
        }
    }
}

impl EngineConfig {
    /// Millisecond-scale timings for in-memory backends.
    pub fn fast() -> Self {
        Self {
            nav_wait: Duration::from_millis(20),
            poll_interval: Duration::from_millis(5),
            default_pause: Duration::from_millis(5),
            iframe_body_wait: Duration::from_millis(30),
            scroll_settle: Duration::from_millis(1),
            scroll_fallback_px: 400.0,
        }
    }
}

pub struct StepEngine {
    resolver: ElementResolver,
    quirks: QuirkRegistry,
    config: EngineConfig,
}

impl StepEngine {
    pub fn new(resolver: ElementResolver) -> Self {
        Self {
            resolver,
            quirks: QuirkRegistry::builtin(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_quirks(mut self, quirks: QuirkRegistry) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(&self) -> &ElementResolver {
        &self.resolver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn quirks(&self) -> &QuirkRegistry {
        &self.quirks
    }

    /// Execute one step against the context's active frame.
    pub async fn execute(
        &self,
        ctx: &StepCtx,
        step: &ParsedTestStep,
    ) -> Result<StepOutcome, ActionError> {
        if ctx.is_cancelled() {
            return Err(ActionError::Interrupted(format!(
                "'{}' step cancelled before start",
                step.action.name()
            )));
        }
        if ctx.is_timeout() {
            return Err(ActionError::TimeoutExceeded {
                what: format!("'{}' step deadline reached before start", step.action.name()),
                budget_ms: ctx.budget.as_millis() as u64,
            });
        }

        let pending = PendingReport::start(ctx.step_id, step.action, step.index);
        ctx.log(
            &format!("executing {} step", step.action.name()),
            Some(serde_json::json!({ "target": step.target, "original": step.original_step })),
        );

        let handled = match step.action {
            ActionKind::Click => handlers::click::execute(self, ctx, step).await,
            ActionKind::Type => handlers::typing::execute(self, ctx, step).await,
            ActionKind::Navigate => handlers::navigate::execute(self, ctx, step).await,
            ActionKind::Wait => handlers::wait::execute(self, ctx, step).await,
            ActionKind::Select => handlers::select::execute(self, ctx, step).await,
            ActionKind::DragAndDrop => handlers::drag::execute(self, ctx, step).await,
            ActionKind::Assertion => assertions::run_assertion(&self.resolver, ctx, step)
                .await
                .map(Handled::done),
            ActionKind::Upload => handlers::upload::execute(self, ctx, step).await,
            ActionKind::Scroll => handlers::scroll::execute(self, ctx, step).await,
            ActionKind::Hover => handlers::hover::execute(self, ctx, step).await,
            ActionKind::SwitchToIframe => handlers::iframe::switch_to_iframe(self, ctx, step).await,
            ActionKind::SwitchToMainContent => handlers::iframe::switch_to_main(ctx).await,
            ActionKind::Skip => handlers::skip::execute(ctx, step).await,
        };

        match handled {
            Ok(handled) => {
                let report = pending.finish(handled.detail);
                ctx.log(&format!("{} step done: {}", step.action.name(), report.detail), None);
                Ok(StepOutcome {
                    report,
                    frame_switch: handled.frame_switch,
                })
            }
            Err(err) => {
                warn!(action = step.action.name(), %err, "step failed");
                ctx.log(&format!("{} step failed: {err}", step.action.name()), None);
                Err(err)
            }
        }
    }

    pub(crate) fn required_target<'a>(
        &self,
        step: &'a ParsedTestStep,
    ) -> Result<&'a str, ActionError> {
        step.target
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ActionError::Internal(format!("'{}' step has no target", step.action.name()))
            })
    }

    pub(crate) async fn resolve_required(
        &self,
        ctx: &StepCtx,
        step: &ParsedTestStep,
        target: &str,
    ) -> Result<ResolvedElement, ActionError> {
        self.resolve_with(ctx, step, target, step.index)
            .await?
            .ok_or_else(|| ActionError::ElementNotFound {
                target: target.to_string(),
            })
    }

    pub(crate) async fn resolve_optional(
        &self,
        ctx: &StepCtx,
        step: &ParsedTestStep,
        target: &str,
    ) -> Result<Option<ResolvedElement>, ActionError> {
        self.resolve_with(ctx, step, target, step.index).await
    }

    pub(crate) async fn resolve_with(
        &self,
        ctx: &StepCtx,
        step: &ParsedTestStep,
        target: &str,
        index: usize,
    ) -> Result<Option<ResolvedElement>, ActionError> {
        let request = ResolveRequest::new(target)
            .with_original_step(step.original_step.clone())
            .with_index(index);
        Ok(self
            .resolver
            .resolve(ctx.page.as_ref(), &ctx.frame, &ctx.flags, &request)
            .await?)
    }

    /// Apply the matching post-click settle rule, if any: wait for the
    /// downstream control, fall back to a direct URL if the rule has one,
    /// fail with a navigation error when neither confirms.
    pub(crate) async fn settle_after_click(
        &self,
        ctx: &StepCtx,
        term: &str,
    ) -> Result<(), ActionError> {
        let url = ctx.page.url().await.unwrap_or_default();
        let Some(rule) = self.quirks.matching(term, &url) else {
            return Ok(());
        };
        ctx.log(&format!("post-click settle rule '{}' active", rule.id), None);

        if self.await_settle(ctx, rule).await? {
            return Ok(());
        }

        let Some(path) = rule.fallback_path else {
            return Err(ActionError::Navigation(format!(
                "settle control '{}' never appeared after '{term}'",
                rule.settle_selector
            )));
        };
        let direct = format!("{}{}", origin_of(&url), path);
        ctx.log(&format!("settle failed, navigating directly to {direct}"), None);
        ctx.page.navigate(&direct).await?;
        ctx.page.wait_for_navigation(self.config.nav_wait).await?;

        if self.await_settle(ctx, rule).await? {
            Ok(())
        } else {
            Err(ActionError::Navigation(format!(
                "settle control '{}' still absent after direct navigation to {direct}",
                rule.settle_selector
            )))
        }
    }

    async fn await_settle(&self, ctx: &StepCtx, rule: &QuirkRule) -> Result<bool, ActionError> {
        match step_locator::resolver::wait_for_visible(
            &ctx.frame,
            rule.settle_method,
            rule.settle_selector,
            rule.settle_timeout,
            self.config.poll_interval,
        )
        .await
        {
            Ok(element) => {
                drop(element);
                Ok(true)
            }
            Err(LocatorError::Timeout { .. }) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }
}

/// `scheme://host[:port]` portion of a URL, without the trailing path.
pub(crate) fn origin_of(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        match rest.find('/') {
            Some(p) => url[..scheme_end + 3 + p].to_string(),
            None => url.to_string(),
        }
    } else {
        url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_extraction() {
        assert_eq!(origin_of("https://shop.test/cart/items"), "https://shop.test");
        assert_eq!(origin_of("https://shop.test"), "https://shop.test");
        assert_eq!(origin_of("http://localhost:3000/a/b"), "http://localhost:3000");
    }
}
