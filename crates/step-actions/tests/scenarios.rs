//! End-to-end step execution against the in-memory bridge.

use std::sync::Arc;
use std::time::Duration;

use page_bridge::mock::{MockElement, MockEvent, MockPage};
use page_bridge::SelectorMethod;
use step_locator::{ElementResolver, ResolverConfig};
use step_actions::engine::EngineConfig;
use step_actions::{ActionError, QuirkRegistry, QuirkRule, StepCtx, StepEngine};
use stepwright_core_types::{
    ActionKind, AssertionCondition, AssertionKind, PageFlags, ParsedTestStep, StepAssertion,
};

fn engine() -> StepEngine {
    StepEngine::new(ElementResolver::new(ResolverConfig::fast()))
        .with_config(EngineConfig::fast())
        .with_quirks(QuirkRegistry::empty())
}

fn ctx_for(page: &Arc<MockPage>) -> StepCtx {
    StepCtx::new(page.clone(), Arc::new(PageFlags::new()))
}

#[tokio::test]
async fn click_with_id_hint_resolves_directly() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    page.push(MockElement::new("button").id("myBtn").text("Open Modal"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Click, "(id: myBtn)".to_string());
    let outcome = engine().execute(&ctx, &step).await.unwrap();

    assert!(outcome.report.detail.contains("#myBtn"));
    assert!(page.events().contains(&MockEvent::Click("button#myBtn".into())));
    assert_eq!(page.mock_main().outstanding_handles(), 0);
}

#[tokio::test]
async fn click_login_resolves_via_href_pattern() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    page.push(MockElement::new("a").href("/login").text("Sign In"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Click, "Login".to_string());
    let outcome = engine().execute(&ctx, &step).await.unwrap();

    assert!(
        outcome.report.detail.contains("login-"),
        "expected a login-pattern strategy, got: {}",
        outcome.report.detail
    );
    assert!(page.events().contains(&MockEvent::Click("a".into())));
}

#[tokio::test]
async fn url_assertion_contains_passes_and_exact_fails() {
    let page = Arc::new(MockPage::new("https://app.test/dashboard/home"));
    let ctx = ctx_for(&page);
    let eng = engine();

    let contains = ParsedTestStep::new(ActionKind::Assertion, None).with_assertion(StepAssertion {
        kind: AssertionKind::Url,
        selector: None,
        expected_text: Some("/dashboard".to_string()),
        condition: Some(AssertionCondition::Contains),
    });
    eng.execute(&ctx, &contains).await.unwrap();

    let exact = ParsedTestStep::new(ActionKind::Assertion, None).with_assertion(StepAssertion {
        kind: AssertionKind::Url,
        selector: None,
        expected_text: Some("/dashboard".to_string()),
        condition: None,
    });
    let err = eng.execute(&ctx, &exact).await.unwrap_err();
    assert!(matches!(err, ActionError::AssertionFailed(_)));
    assert!(err.to_string().contains("/dashboard"));
}

#[tokio::test]
async fn missing_element_fails_the_click_without_hanging() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Click, "#does-not-exist".to_string());
    let started = std::time::Instant::now();
    let err = engine().execute(&ctx, &step).await.unwrap_err();

    assert!(matches!(err, ActionError::ElementNotFound { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(page.mock_main().outstanding_handles(), 0);
}

#[tokio::test]
async fn element_text_contains_is_case_insensitive_exact_is_not_forgiving() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    page.push(MockElement::new("h1").id("title").text("Welcome, Alice!"));
    let ctx = ctx_for(&page);
    let eng = engine();

    let contains = ParsedTestStep::new(ActionKind::Assertion, None).with_assertion(StepAssertion {
        kind: AssertionKind::ElementText,
        selector: Some("#title".to_string()),
        expected_text: Some("welcome".to_string()),
        condition: Some(AssertionCondition::Contains),
    });
    eng.execute(&ctx, &contains).await.unwrap();

    let exact = ParsedTestStep::new(ActionKind::Assertion, None).with_assertion(StepAssertion {
        kind: AssertionKind::ElementText,
        selector: Some("#title".to_string()),
        expected_text: Some("welcome".to_string()),
        condition: None,
    });
    assert!(matches!(
        eng.execute(&ctx, &exact).await,
        Err(ActionError::AssertionFailed(_))
    ));
}

#[tokio::test]
async fn type_with_submit_enables_the_sentinel_shortcut() {
    let page = Arc::new(MockPage::new("https://app.test/login"));
    page.push(MockElement::new("input").id("user").input_type("text"));
    let ctx = ctx_for(&page);
    let eng = engine();

    let type_step = ParsedTestStep::new(ActionKind::Type, "(id: user)".to_string())
        .with_value("alice")
        .with_submit();
    eng.execute(&ctx, &type_step).await.unwrap();
    assert!(ctx.flags.form_submitted());

    // The submit control is gone after the form submission; the resolver
    // falls through to the body sentinel instead of failing.
    let click_step = ParsedTestStep::new(ActionKind::Click, "Submit".to_string());
    eng.execute(&ctx, &click_step).await.unwrap();
    assert!(page.events().contains(&MockEvent::Click("body".into())));
}

#[tokio::test]
async fn click_settle_rule_confirms_downstream_control() {
    let page = Arc::new(MockPage::new("https://shop.test/inventory"));
    page.push(
        MockElement::new("button")
            .id("go-to-cart")
            .text("Cart")
            .reveals("checkout-btn"),
    );
    page.push(MockElement::new("button").id("checkout-btn").hidden());
    let ctx = ctx_for(&page);

    let mut quirks = QuirkRegistry::empty();
    quirks.register(QuirkRule {
        id: "cart-to-checkout",
        term_pattern: "cart",
        url_pattern: None,
        settle_selector: "[id*=\"checkout\" i]",
        settle_method: SelectorMethod::Css,
        settle_timeout: Duration::from_millis(100),
        fallback_path: Some("/cart"),
    });
    let eng = StepEngine::new(ElementResolver::new(ResolverConfig::fast()))
        .with_config(EngineConfig::fast())
        .with_quirks(quirks);

    let step = ParsedTestStep::new(ActionKind::Click, "cart".to_string());
    eng.execute(&ctx, &step).await.unwrap();
    assert_eq!(page.current_url(), "https://shop.test/inventory");
}

#[tokio::test]
async fn click_settle_rule_falls_back_to_direct_url_then_fails() {
    let page = Arc::new(MockPage::new("https://shop.test/inventory"));
    page.push(MockElement::new("button").id("go-to-cart").text("Cart"));
    let ctx = ctx_for(&page);

    let mut quirks = QuirkRegistry::empty();
    quirks.register(QuirkRule {
        id: "cart-to-checkout",
        term_pattern: "cart",
        url_pattern: None,
        settle_selector: "[id*=\"checkout\" i]",
        settle_method: SelectorMethod::Css,
        settle_timeout: Duration::from_millis(30),
        fallback_path: Some("/cart"),
    });
    let eng = StepEngine::new(ElementResolver::new(ResolverConfig::fast()))
        .with_config(EngineConfig::fast())
        .with_quirks(quirks);

    let step = ParsedTestStep::new(ActionKind::Click, "cart".to_string());
    let err = eng.execute(&ctx, &step).await.unwrap_err();

    assert!(matches!(err, ActionError::Navigation(_)));
    // The direct-URL fallback was attempted before giving up.
    assert_eq!(page.current_url(), "https://shop.test/cart");
}

#[tokio::test]
async fn native_select_picks_by_value() {
    let page = Arc::new(MockPage::new("https://shop.test/"));
    page.push(
        MockElement::new("select")
            .id("size")
            .option("s", "Small")
            .option("l", "Large"),
    );
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Select, "(id: size)".to_string()).with_value("l");
    engine().execute(&ctx, &step).await.unwrap();
    assert!(page.events().iter().any(|e| matches!(
        e,
        MockEvent::Select { value, .. } if value == "l"
    )));
}

#[tokio::test]
async fn custom_dropdown_opens_then_clicks_the_option() {
    let page = Arc::new(MockPage::new("https://shop.test/"));
    page.push(
        MockElement::new("div")
            .id("size-picker")
            .text("Size")
            .reveals("opt-xl"),
    );
    page.push(
        MockElement::new("li")
            .id("opt-xl")
            .attr("data-value", "xl")
            .text("XL")
            .hidden(),
    );
    let ctx = ctx_for(&page);

    let step =
        ParsedTestStep::new(ActionKind::Select, "(id: size-picker)".to_string()).with_value("xl");
    engine().execute(&ctx, &step).await.unwrap();

    let events = page.events();
    assert!(events.contains(&MockEvent::Click("div#size-picker".into())));
    assert!(events.contains(&MockEvent::Click("li#opt-xl".into())));
}

#[tokio::test]
async fn select_with_unknown_option_reports_the_option() {
    let page = Arc::new(MockPage::new("https://shop.test/"));
    page.push(MockElement::new("select").id("size").option("s", "Small"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Select, "(id: size)".to_string()).with_value("xl");
    let err = engine().execute(&ctx, &step).await.unwrap_err();
    assert!(err.to_string().contains("xl"));
}

#[tokio::test]
async fn iframe_switch_falls_back_to_largest_non_ad_frame() {
    let page = Arc::new(MockPage::new("https://shop.test/pay"));
    page.add_iframe(
        MockElement::new("iframe")
            .class("ad-banner")
            .attr("src", "https://ads.test/banner")
            .rect(900.0, 600.0),
        |frame| frame.push(MockElement::new("body")),
    );
    page.add_iframe(
        MockElement::new("iframe")
            .class("payment")
            .attr("src", "https://pay.test/form")
            .rect(600.0, 400.0),
        |frame| {
            frame.push(MockElement::new("body"));
            frame.push(MockElement::new("input").id("card"));
        },
    );
    let ctx = ctx_for(&page);
    let eng = engine();

    let switch = ParsedTestStep::new(ActionKind::SwitchToIframe, "payment frame".to_string());
    let outcome = eng.execute(&ctx, &switch).await.unwrap();
    let inner = outcome.frame_switch.expect("should switch frames");

    // The ad frame is bigger but excluded; type into the payment frame.
    let inner_ctx = ctx.with_frame(inner);
    let type_step =
        ParsedTestStep::new(ActionKind::Type, "(id: card)".to_string()).with_value("4242");
    eng.execute(&inner_ctx, &type_step).await.unwrap();
    assert!(page.events().iter().any(|e| matches!(
        e,
        MockEvent::Type { element, .. } if element == "input#card"
    )));

    let back = ParsedTestStep::new(ActionKind::SwitchToMainContent, None);
    let outcome = eng.execute(&inner_ctx, &back).await.unwrap();
    assert!(outcome.frame_switch.is_some());
    assert_eq!(page.mock_main().outstanding_handles(), 0);
}

#[tokio::test]
async fn scroll_degrades_to_generic_scroll() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Scroll, "#not-there".to_string());
    engine().execute(&ctx, &step).await.unwrap();
    assert!(page
        .events()
        .contains(&MockEvent::ScrollBy(0.0, 400.0)));
}

#[tokio::test]
async fn wait_step_with_numeric_value_pauses() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Wait, None).with_value("10");
    let outcome = engine().execute(&ctx, &step).await.unwrap();
    assert!(outcome.report.detail.contains("10ms"));
}

#[tokio::test]
async fn upload_falls_back_to_the_file_input() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    page.push(MockElement::new("input").id("attach").input_type("file"));
    let ctx = ctx_for(&page);

    let step = ParsedTestStep::new(ActionKind::Upload, None).with_value("/tmp/a.png, /tmp/b.png");
    engine().execute(&ctx, &step).await.unwrap();
    assert!(page.events().iter().any(|e| matches!(
        e,
        MockEvent::Upload { paths, .. } if paths.len() == 2
    )));
}

#[tokio::test]
async fn cancelled_and_expired_contexts_refuse_to_run() {
    let page = Arc::new(MockPage::new("https://app.test/"));
    page.push(MockElement::new("button").id("go"));
    let eng = engine();
    let step = ParsedTestStep::new(ActionKind::Click, "(id: go)".to_string());

    let cancelled = ctx_for(&page);
    cancelled.cancel.cancel();
    assert!(matches!(
        eng.execute(&cancelled, &step).await,
        Err(ActionError::Interrupted(_))
    ));

    let expired = ctx_for(&page).with_budget(Duration::ZERO);
    assert!(matches!(
        eng.execute(&expired, &step).await,
        Err(ActionError::TimeoutExceeded { .. })
    ));
}
