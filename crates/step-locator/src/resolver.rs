//! The resolution cascade.
//!
//! `resolve` runs a fixed sequence of stages, each individually time-boxed
//! and all of them under one wall-clock ceiling:
//!
//! 1. hint extraction
//! 2. smart-wait pre-pass over the first few strategies (visibility-gated)
//! 3. one zero-wait lookup of the primary selector (no visibility gate)
//! 4. assisted recovery via the suggestion client, re-verified by locating
//! 5. the full strategy cascade with per-kind waits
//! 6. heuristic login scan
//! 7. interactive capture (visible sessions only)
//! 8. submission shortcut against the page-scoped submitted flag
//!
//! "Not found" is `Ok(None)`; errors are reserved for a lost document
//! context or resolver-internal faults.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing::{debug, info, warn};

use page_bridge::{BridgeError, ElementHandle, FrameContext, PageContext, SelectorMethod};
use stepwright_core_types::{noop_log, PageFlags, StepLog};

use crate::assist::{call_with_retry, RetryPolicy, SuggestionClient, SuggestionRequest};
use crate::capture::capture_from_user;
use crate::errors::LocatorError;
use crate::hint::SelectorHint;
use crate::scan::{find_login_element, is_login_intent};
use crate::snippet;
use crate::strategies;
use crate::types::{FallbackStrategy, ResolvedElement};
use crate::visibility::is_visible;

/// Timeouts for each cascade stage. Defaults match interactive-browser
/// latencies; tests shrink them.
///
/// `total_budget` caps the automated stages only. Interactive capture waits
/// on a human and runs on its own `capture_wait` clock, so a resolution that
/// reaches it can exceed the budget.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Wall-clock ceiling across all stages.
    pub total_budget: Duration,
    /// Budget for the smart-wait pre-pass.
    pub smart_wait: Duration,
    /// How many leading strategies the pre-pass sweeps.
    pub smart_wait_strategies: usize,
    /// Wait for a suggested selector before falling back to alternatives.
    pub assist_verify: Duration,
    /// Per-strategy wait for text-based candidates.
    pub text_strategy_wait: Duration,
    /// Per-strategy wait for attribute-based candidates.
    pub attr_strategy_wait: Duration,
    pub poll_interval: Duration,
    /// How long interactive capture waits for the operator.
    pub capture_wait: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            total_budget: Duration::from_secs(20),
            smart_wait: Duration::from_secs(3),
            smart_wait_strategies: 15,
            assist_verify: Duration::from_secs(5),
            text_strategy_wait: Duration::from_secs(5),
            attr_strategy_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
            capture_wait: Duration::from_secs(30),
        }
    }
}

impl ResolverConfig {
    /// Millisecond-scale timeouts for in-memory backends.
    pub fn fast() -> Self {
        Self {
            total_budget: Duration::from_millis(500),
            smart_wait: Duration::from_millis(40),
            smart_wait_strategies: 15,
            assist_verify: Duration::from_millis(40),
            text_strategy_wait: Duration::from_millis(20),
            attr_strategy_wait: Duration::from_millis(10),
            poll_interval: Duration::from_millis(5),
            capture_wait: Duration::from_millis(50),
        }
    }
}

/// One resolution request, carrying provenance for diagnostics.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Raw target: an explicit selector, a hinted phrase, or plain prose.
    pub selector: String,
    /// Human-readable phrase describing the target.
    pub descriptive_term: String,
    /// Source text of the step, for logs and suggestion payloads.
    pub original_step: String,
    /// Selectors already tried by earlier steps against this target.
    pub previous_attempts: Vec<String>,
    /// Skip assisted recovery.
    pub disable_fallbacks: bool,
    /// Zero-based pick among multiple matches.
    pub index: usize,
}

impl ResolveRequest {
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            descriptive_term: target.clone(),
            original_step: target.clone(),
            selector: target,
            previous_attempts: Vec::new(),
            disable_fallbacks: false,
            index: 0,
        }
    }

    pub fn with_previous_attempts(mut self, attempts: Vec<String>) -> Self {
        self.previous_attempts = attempts;
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.descriptive_term = term.into();
        self
    }

    pub fn with_original_step(mut self, step: impl Into<String>) -> Self {
        self.original_step = step.into();
        self
    }

    pub fn without_fallbacks(mut self) -> Self {
        self.disable_fallbacks = true;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

pub struct ElementResolver {
    config: ResolverConfig,
    assist: Option<Arc<dyn SuggestionClient>>,
    retry: RetryPolicy,
    log: StepLog,
}

impl ElementResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            assist: None,
            retry: RetryPolicy::default(),
            log: noop_log(),
        }
    }

    pub fn with_assist(mut self, client: Arc<dyn SuggestionClient>) -> Self {
        self.assist = Some(client);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_log(mut self, log: StepLog) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Run the cascade. `Ok(None)` means the page has no such element; the
    /// caller decides whether that is fatal.
    pub async fn resolve(
        &self,
        page: &dyn PageContext,
        frame: &Arc<dyn FrameContext>,
        flags: &PageFlags,
        request: &ResolveRequest,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        let started = Instant::now();
        let hint = SelectorHint::parse(&request.selector);

        let primary = hint.runnable().or_else(|| looks_like_selector(&hint.term));
        let term = if hint.term.is_empty() {
            request.descriptive_term.clone()
        } else {
            hint.term.clone()
        };
        let generator_input = match &primary {
            Some((_, selector)) => selector.clone(),
            None => term.clone(),
        };
        let plan = strategies::generate(&generator_input);

        (self.log)(
            &format!("resolving '{}' ({} strategies)", term, plan.len()),
            Some(json!({
                "selector": request.selector,
                "index": request.index,
                "previousAttempts": request.previous_attempts,
            })),
        );

        // 2. Smart-wait pre-pass: many frameworks hydrate just after paint.
        let head = &plan[..plan.len().min(self.config.smart_wait_strategies)];
        if let Some(found) = self
            .sweep_until(frame, head, request.index, self.config.smart_wait)
            .await?
        {
            info!(strategy = %found.strategy, "resolved in smart-wait pre-pass");
            return Ok(Some(found));
        }

        // 3. Immediate lookup, no visibility gate: an exact selector is the
        // common case and a hidden-but-present node still counts here.
        if let Some((method, selector)) = &primary {
            match probe_nth(frame.as_ref(), *method, selector, request.index).await {
                Ok(Some(handle)) => {
                    (self.log)(&format!("immediate lookup hit: {selector}"), None);
                    return Ok(Some(ResolvedElement::new(
                        handle,
                        frame.clone(),
                        "immediate",
                        selector.clone(),
                    )));
                }
                Ok(None) => {}
                Err(err) => self.bridge_miss(err)?,
            }
        }

        // 4. Assisted recovery. Failures here are logged, never fatal.
        if !request.disable_fallbacks {
            if let Some(client) = &self.assist {
                if let Some(found) = self
                    .assisted_recovery(page, frame, client, request, &generator_input)
                    .await?
                {
                    return Ok(Some(found));
                }
            }
        }

        // 5. Full cascade, budget-checked before each candidate.
        for strategy in &plan {
            if started.elapsed() >= self.config.total_budget {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "resolution budget exhausted mid-cascade"
                );
                return self.submission_shortcut(frame, flags, &term).await;
            }
            let per_wait = if strategy.is_text_kind() {
                self.config.text_strategy_wait
            } else {
                self.config.attr_strategy_wait
            };
            let remaining = self.config.total_budget.saturating_sub(started.elapsed());
            if let Some(found) = self
                .wait_for_strategy(frame, strategy, request.index, per_wait.min(remaining))
                .await?
            {
                (self.log)(
                    &format!("fallback strategy '{}' matched", found.strategy),
                    Some(json!({ "selector": found.selector })),
                );
                return Ok(Some(found));
            }
        }

        // 6. Login heuristics.
        if is_login_intent(&term) {
            match find_login_element(frame.as_ref()).await {
                Ok(Some(handle)) => {
                    (self.log)("login scan matched", None);
                    return Ok(Some(ResolvedElement::new(
                        handle,
                        frame.clone(),
                        "login-scan",
                        term.clone(),
                    )));
                }
                Ok(None) => {}
                Err(err) => debug!(%err, "login scan failed"),
            }
        }

        // 7. Interactive capture. The handle lives in the frame the picker
        // queried, which is not necessarily the frame being resolved against.
        match capture_from_user(page, self.config.capture_wait).await {
            Ok(Some((handle, picked_frame, selector))) => {
                (self.log)(&format!("operator capture resolved: {selector}"), None);
                return Ok(Some(ResolvedElement::new(
                    handle,
                    picked_frame,
                    "interactive-capture",
                    selector,
                )));
            }
            Ok(None) => {}
            Err(err) => debug!(%err, "interactive capture failed"),
        }

        // 8 + 9.
        self.submission_shortcut(frame, flags, &term).await
    }

    /// A submit-ish step right after a successful form submission often has
    /// no surviving target node; hand back the document body as a sentinel.
    async fn submission_shortcut(
        &self,
        frame: &Arc<dyn FrameContext>,
        flags: &PageFlags,
        term: &str,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        let lower = term.to_lowercase();
        let submit_intent = lower.contains("submit") || is_login_intent(&lower);
        if submit_intent && flags.form_submitted() {
            match probe_once(frame.as_ref(), SelectorMethod::Css, "body").await {
                Ok(Some(handle)) => {
                    (self.log)("form already submitted, returning body sentinel", None);
                    return Ok(Some(ResolvedElement::new(
                        handle,
                        frame.clone(),
                        "submitted-sentinel",
                        "body",
                    )));
                }
                Ok(None) => {}
                Err(err) => self.bridge_miss(err)?,
            }
        }
        (self.log)(&format!("no element found for '{term}'"), None);
        Ok(None)
    }

    /// Cycle through `head`, zero-wait each, visibility-gated, until `budget`
    /// elapses.
    async fn sweep_until(
        &self,
        frame: &Arc<dyn FrameContext>,
        head: &[FallbackStrategy],
        index: usize,
        budget: Duration,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        if head.is_empty() {
            return Ok(None);
        }
        let deadline = Instant::now() + budget;
        loop {
            for strategy in head {
                match self.probe_strategy(frame, strategy, index).await? {
                    Some(found) => return Ok(Some(found)),
                    None => continue,
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Poll one strategy, visibility-gated, until it matches or `budget`
    /// elapses.
    async fn wait_for_strategy(
        &self,
        frame: &Arc<dyn FrameContext>,
        strategy: &FallbackStrategy,
        index: usize,
        budget: Duration,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        let deadline = Instant::now() + budget;
        loop {
            if let Some(found) = self.probe_strategy(frame, strategy, index).await? {
                return Ok(Some(found));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// One visibility-gated probe of a strategy; releases rejected handles.
    async fn probe_strategy(
        &self,
        frame: &Arc<dyn FrameContext>,
        strategy: &FallbackStrategy,
        index: usize,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        let handle = match probe_nth(frame.as_ref(), strategy.method, &strategy.selector, index)
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                self.bridge_miss(err)?;
                return Ok(None);
            }
        };
        let handle = match handle {
            Some(handle) => handle,
            None => return Ok(None),
        };
        match is_visible(frame.as_ref(), handle).await {
            Ok(true) => Ok(Some(ResolvedElement::new(
                handle,
                frame.clone(),
                strategy.kind.clone(),
                strategy.selector.clone(),
            ))),
            Ok(false) => {
                frame.release(handle);
                Ok(None)
            }
            Err(err) => {
                frame.release(handle);
                self.bridge_miss(err)?;
                Ok(None)
            }
        }
    }

    async fn assisted_recovery(
        &self,
        page: &dyn PageContext,
        frame: &Arc<dyn FrameContext>,
        client: &Arc<dyn SuggestionClient>,
        request: &ResolveRequest,
        failed_selector: &str,
    ) -> Result<Option<ResolvedElement>, LocatorError> {
        let dom_snippet = snippet::capture(page, frame.as_ref(), failed_selector).await;
        let suggestion_request = SuggestionRequest {
            failed_selector: failed_selector.to_string(),
            descriptive_term: request.descriptive_term.clone(),
            page_url: page.url().await.unwrap_or_default(),
            dom_snippet,
            original_step: request.original_step.clone(),
        };

        let response = match call_with_retry(self.retry, "selector suggestion", || {
            client.suggest(&suggestion_request)
        })
        .await
        {
            Ok(response) => response,
            Err(err) => {
                (self.log)(&format!("assisted recovery unavailable: {err}"), None);
                return Ok(None);
            }
        };

        // Confidence is informational only; verification below is what
        // actually accepts or rejects the suggestion.
        (self.log)(
            &format!("suggested selector: {}", response.suggested_selector),
            Some(json!({
                "strategy": response.suggested_strategy.name(),
                "confidence": response.confidence,
                "reasoning": response.reasoning,
            })),
        );

        let suggested = FallbackStrategy {
            kind: "assist-suggested".to_string(),
            selector: response.suggested_selector.clone(),
            method: response.suggested_strategy,
        };
        if let Some(found) = self
            .wait_for_strategy(frame, &suggested, request.index, self.config.assist_verify)
            .await?
        {
            return Ok(Some(found));
        }

        for alternative in &response.alternative_selectors {
            let (method, selector) = looks_like_selector(alternative)
                .unwrap_or((SelectorMethod::Css, alternative.clone()));
            let strategy = FallbackStrategy {
                kind: "assist-alternative".to_string(),
                selector,
                method,
            };
            if let Some(found) = self.probe_strategy(frame, &strategy, request.index).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// A lost document context aborts the cascade; anything else is a miss.
    fn bridge_miss(&self, err: BridgeError) -> Result<(), LocatorError> {
        match err {
            BridgeError::StaleFrame(msg) => Err(LocatorError::MissingContext(msg)),
            other => {
                debug!(%other, "probe error treated as miss");
                Ok(())
            }
        }
    }
}

/// Poll a selector until it is present and visible, for callers outside the
/// cascade (explicit wait steps, post-click settles).
pub async fn wait_for_visible(
    frame: &Arc<dyn FrameContext>,
    method: SelectorMethod,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<ResolvedElement, LocatorError> {
    let deadline = Instant::now() + timeout;
    loop {
        match probe_once(frame.as_ref(), method, selector).await {
            Ok(Some(handle)) => match is_visible(frame.as_ref(), handle).await {
                Ok(true) => {
                    return Ok(ResolvedElement::new(
                        handle,
                        frame.clone(),
                        "wait",
                        selector.to_string(),
                    ))
                }
                Ok(false) | Err(_) => frame.release(handle),
            },
            Ok(None) => {}
            Err(BridgeError::StaleFrame(msg)) => return Err(LocatorError::MissingContext(msg)),
            Err(err) => debug!(%err, "wait probe error"),
        }
        if Instant::now() >= deadline {
            return Err(LocatorError::Timeout {
                term: selector.to_string(),
                budget_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(poll).await;
    }
}

fn looks_like_selector(input: &str) -> Option<(SelectorMethod, String)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.contains("//") {
        return Some((SelectorMethod::Xpath, crate::hint::normalize_xpath(input)));
    }
    if input.contains('#') || input.contains('.') || input.contains('[') {
        return Some((SelectorMethod::Css, input.to_string()));
    }
    None
}

async fn probe_once(
    frame: &dyn FrameContext,
    method: SelectorMethod,
    selector: &str,
) -> Result<Option<ElementHandle>, BridgeError> {
    frame.query(method, selector).await
}

/// Zero-wait query honoring a match index; surplus handles are released.
async fn probe_nth(
    frame: &dyn FrameContext,
    method: SelectorMethod,
    selector: &str,
    index: usize,
) -> Result<Option<ElementHandle>, BridgeError> {
    if index == 0 {
        return probe_once(frame, method, selector).await;
    }
    let handles = frame.query_all(method, selector, index + 1).await?;
    let mut picked = None;
    for (i, handle) in handles.into_iter().enumerate() {
        if i == index && picked.is_none() {
            picked = Some(handle);
        } else {
            frame.release(handle);
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::{AssistError, SuggestionResponse};
    use async_trait::async_trait;
    use page_bridge::mock::{MockElement, MockPage};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn resolver() -> ElementResolver {
        ElementResolver::new(ResolverConfig::fast())
    }

    fn frame_of(page: &MockPage) -> Arc<dyn FrameContext> {
        page.main_frame()
    }

    #[tokio::test]
    async fn explicit_id_hint_resolves() {
        let page = MockPage::new("https://app.test/");
        page.push(MockElement::new("button").id("myBtn").text("Open Modal"));
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let found = resolver()
            .resolve(&page, &frame, &flags, &ResolveRequest::new("(id: myBtn)"))
            .await
            .unwrap()
            .expect("should resolve");
        assert_eq!(found.selector, "#myBtn");
        drop(found);
        assert_eq!(page.mock_main().outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn hidden_element_resolves_via_ungated_immediate_lookup() {
        let page = MockPage::new("https://app.test/");
        page.push(MockElement::new("div").id("tray").hidden());
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let found = resolver()
            .resolve(&page, &frame, &flags, &ResolveRequest::new("css://#tray"))
            .await
            .unwrap()
            .expect("hidden-but-present should still resolve");
        assert_eq!(found.strategy, "immediate");
    }

    #[tokio::test]
    async fn login_term_matches_href_pattern_not_text() {
        let page = MockPage::new("https://app.test/");
        page.push(MockElement::new("a").href("/login").text("Sign In"));
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let found = resolver()
            .resolve(&page, &frame, &flags, &ResolveRequest::new("Login"))
            .await
            .unwrap()
            .expect("should resolve via login pattern");
        assert!(found.strategy.starts_with("login-"), "got {}", found.strategy);
    }

    #[tokio::test]
    async fn missing_element_returns_none_within_budget() {
        let page = MockPage::new("https://app.test/");
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let started = Instant::now();
        let found = resolver()
            .resolve(
                &page,
                &frame,
                &flags,
                &ResolveRequest::new("#does-not-exist").without_fallbacks(),
            )
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(page.mock_main().outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn index_picks_nth_match_and_releases_surplus() {
        let page = MockPage::new("https://app.test/");
        page.push(MockElement::new("button").class("item").text("A"));
        page.push(MockElement::new("button").class("item").text("B"));
        page.push(MockElement::new("button").class("item").text("C"));
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let found = resolver()
            .resolve(
                &page,
                &frame,
                &flags,
                &ResolveRequest::new("css://.item").with_index(1),
            )
            .await
            .unwrap()
            .expect("nth should resolve");
        let text = frame.text_content(found.handle()).await.unwrap();
        assert_eq!(text, "B");
        drop(found);
        assert_eq!(page.mock_main().outstanding_handles(), 0);
    }

    struct FlakyAssist {
        calls: AtomicU32,
    }

    #[async_trait]
    impl SuggestionClient for FlakyAssist {
        async fn suggest(
            &self,
            _request: &SuggestionRequest,
        ) -> Result<SuggestionResponse, AssistError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 2 {
                return Err(AssistError::Transport("cold start".into()));
            }
            Ok(SuggestionResponse {
                suggested_selector: "#surprise".to_string(),
                suggested_strategy: SelectorMethod::Css,
                confidence: Some(0.3),
                reasoning: None,
                alternative_selectors: vec!["[data-testid=\"surprise\"]".to_string()],
            })
        }
    }

    #[tokio::test]
    async fn assisted_suggestion_is_verified_before_acceptance() {
        let page = MockPage::new("https://app.test/");
        page.push(
            MockElement::new("button")
                .attr("data-testid", "surprise")
                .text("Do it"),
        );
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let client = Arc::new(FlakyAssist {
            calls: AtomicU32::new(0),
        });
        let resolver = ElementResolver::new(ResolverConfig::fast())
            .with_assist(client.clone())
            .with_retry(RetryPolicy {
                max_retries: 3,
                base_delay: Duration::from_millis(1),
            });

        // Suggested "#surprise" does not exist; the alternative does.
        let found = resolver
            .resolve(&page, &frame, &flags, &ResolveRequest::new("#nothing-here"))
            .await
            .unwrap()
            .expect("alternative selector should resolve");
        assert_eq!(found.strategy, "assist-alternative");
        assert!(client.calls.load(Ordering::SeqCst) >= 2);
    }

    struct DeadAssist;

    #[async_trait]
    impl SuggestionClient for DeadAssist {
        async fn suggest(
            &self,
            _request: &SuggestionRequest,
        ) -> Result<SuggestionResponse, AssistError> {
            Err(AssistError::Transport("service down".into()))
        }
    }

    #[tokio::test]
    async fn assist_failure_is_non_fatal() {
        let page = MockPage::new("https://app.test/");
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let resolver = ElementResolver::new(ResolverConfig::fast())
            .with_assist(Arc::new(DeadAssist))
            .with_retry(RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
            });

        // The suggestion service is down; the cascade still finishes and
        // reports a plain miss instead of an error.
        let found = resolver
            .resolve(&page, &frame, &flags, &ResolveRequest::new("#nope"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn submission_shortcut_returns_body_sentinel() {
        let page = MockPage::new("https://app.test/welcome");
        let frame = frame_of(&page);
        let flags = PageFlags::default();
        flags.mark_form_submitted();

        let found = resolver()
            .resolve(
                &page,
                &frame,
                &flags,
                &ResolveRequest::new("Submit").without_fallbacks(),
            )
            .await
            .unwrap()
            .expect("sentinel expected");
        assert_eq!(found.strategy, "submitted-sentinel");
        assert_eq!(found.selector, "body");
    }

    #[tokio::test]
    async fn interactive_capture_is_used_when_session_is_visible() {
        let page = MockPage::new("https://app.test/");
        page.set_interactive(true);
        page.push(MockElement::new("button").id("odd-one").text("?"));
        page.set_user_pick(page_bridge::CapturedTarget {
            tag: "button".into(),
            id: Some("odd-one".into()),
            data_testid: None,
            classes: vec![],
        });
        let frame = frame_of(&page);
        let flags = PageFlags::default();

        let found = resolver()
            .resolve(
                &page,
                &frame,
                &flags,
                &ResolveRequest::new("the weird button").without_fallbacks(),
            )
            .await
            .unwrap()
            .expect("capture should resolve");
        assert_eq!(found.strategy, "interactive-capture");
        assert_eq!(found.selector, "#odd-one");
    }

    #[tokio::test]
    async fn capture_binds_handle_to_the_frame_it_was_queried_in() {
        let page = MockPage::new("https://app.test/");
        page.set_interactive(true);
        page.push(MockElement::new("button").id("outside").text("Continue"));
        page.add_iframe(MockElement::new("iframe").id("widget").rect(600.0, 400.0), |frame| {
            frame.push(MockElement::new("body"));
        });
        page.set_user_pick(page_bridge::CapturedTarget {
            tag: "button".into(),
            id: Some("outside".into()),
            data_testid: None,
            classes: vec![],
        });
        let flags = PageFlags::default();

        // Resolve against the iframe's document; the pick lands in main.
        let infos = page.iframes().await.unwrap();
        let inner = page
            .enter_iframe(infos[0].handle)
            .await
            .unwrap()
            .expect("iframe document");
        page.mock_main().release(infos[0].handle);

        let found = resolver()
            .resolve(
                &page,
                &inner,
                &flags,
                &ResolveRequest::new("that continue button").without_fallbacks(),
            )
            .await
            .unwrap()
            .expect("capture should resolve");
        assert_eq!(found.strategy, "interactive-capture");
        // Interactions must go through the frame that owns the handle.
        let text = found.frame().text_content(found.handle()).await.unwrap();
        assert_eq!(text, "Continue");
        drop(found);
        assert_eq!(page.mock_main().outstanding_handles(), 0);
    }

    #[tokio::test]
    async fn wait_for_visible_times_out_with_typed_error() {
        let page = MockPage::new("https://app.test/");
        let frame = frame_of(&page);
        let err = wait_for_visible(
            &frame,
            SelectorMethod::Css,
            "#never",
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LocatorError::Timeout { .. }));
        assert!(err.is_retryable());
    }
}
