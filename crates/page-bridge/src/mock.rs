//! In-memory bridge implementation.
//!
//! Backs the whole engine's test suite: a flat element list per frame plus a
//! small evaluator for the selector grammar the strategy generator emits.
//! Selectors outside that grammar match nothing rather than erroring, the
//! same way a real backend reports zero matches for a valid-but-miss query.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::errors::BridgeError;
use crate::traits::{FrameContext, PageContext};
use crate::types::{
    CapturedTarget, ElementDescription, ElementHandle, IframeInfo, Rect, SelectorMethod,
    StyleSummary,
};

/// One element in a mock frame. Builder-style construction.
#[derive(Debug, Clone)]
pub struct MockElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub href: Option<String>,
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub attrs: BTreeMap<String, String>,
    pub style: StyleSummary,
    pub rect: Rect,
    /// Select options as (value, label) pairs.
    pub options: Vec<(String, String)>,
    /// Clicking this element queues a navigation to the given URL.
    pub navigate_on_click: Option<String>,
    /// Clicking this element un-hides the element with the given id.
    pub reveal_on_click: Option<String>,
    /// Native click is refused; only `js_click` succeeds.
    pub native_click_fails: bool,
}

impl MockElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            name: None,
            input_type: None,
            href: None,
            text: String::new(),
            value: String::new(),
            disabled: false,
            attrs: BTreeMap::new(),
            style: StyleSummary::default(),
            rect: Rect::new(0.0, 0.0, 120.0, 32.0),
            options: Vec::new(),
            navigate_on_click: None,
            reveal_on_click: None,
            native_click_fails: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn input_type(mut self, ty: impl Into<String>) -> Self {
        self.input_type = Some(ty.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.style.display = display.into();
        self
    }

    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.style.visibility = visibility.into();
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = opacity;
        self
    }

    pub fn rect(mut self, width: f64, height: f64) -> Self {
        self.rect = Rect::new(0.0, 0.0, width, height);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.style.display = "none".to_string();
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push((value.into(), label.into()));
        self
    }

    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.navigate_on_click = Some(url.into());
        self
    }

    pub fn reveals(mut self, id: impl Into<String>) -> Self {
        self.reveal_on_click = Some(id.into());
        self
    }

    pub fn refuse_native_click(mut self) -> Self {
        self.native_click_fails = true;
        self
    }

    fn attr_value(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(self.classes.join(" "))
                }
            }
            "name" => self.name.clone(),
            "type" => self.input_type.clone(),
            "href" => self.href.clone(),
            "value" => Some(self.value.clone()),
            other => self.attrs.get(other).cloned(),
        }
    }
}

/// Interactions recorded by the mock, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Click(String),
    JsClick(String),
    Hover(String),
    Type {
        element: String,
        text: String,
        submit: bool,
    },
    Select {
        element: String,
        value: String,
    },
    ScrollIntoView(String),
    ScrollBy(f64, f64),
    DragAndDrop(String, String),
    Upload {
        element: String,
        paths: Vec<String>,
    },
    Navigate(String),
}

#[derive(Default)]
struct HandleTable {
    next: u64,
    live: HashMap<u64, usize>,
    allocated: u64,
    released: u64,
}

impl HandleTable {
    fn allocate(&mut self, index: usize) -> ElementHandle {
        self.next += 1;
        self.allocated += 1;
        self.live.insert(self.next, index);
        ElementHandle(self.next)
    }

    fn resolve(&self, handle: ElementHandle) -> Option<usize> {
        self.live.get(&handle.0).copied()
    }

    fn release(&mut self, handle: ElementHandle) {
        if self.live.remove(&handle.0).is_some() {
            self.released += 1;
        }
    }
}

struct PageShared {
    url: RwLock<String>,
    title: RwLock<String>,
    body_text: RwLock<Option<String>>,
    pending_nav: Mutex<Option<String>>,
    events: Mutex<Vec<MockEvent>>,
}

/// One mock document scope.
pub struct MockFrame {
    elements: RwLock<Vec<MockElement>>,
    handles: Mutex<HandleTable>,
    shared: Arc<PageShared>,
}

impl MockFrame {
    fn new(shared: Arc<PageShared>) -> Self {
        Self {
            elements: RwLock::new(Vec::new()),
            handles: Mutex::new(HandleTable::default()),
            shared,
        }
    }

    pub fn push(&self, element: MockElement) {
        self.elements.write().push(element);
    }

    /// Handles allocated but not yet released; the resolver's ownership
    /// discipline keeps this at zero after every step.
    pub fn outstanding_handles(&self) -> usize {
        self.handles.lock().live.len()
    }

    pub fn released_handles(&self) -> u64 {
        self.handles.lock().released
    }

    fn element_label(el: &MockElement) -> String {
        match &el.id {
            Some(id) => format!("{}#{}", el.tag, id),
            None => el.tag.clone(),
        }
    }

    fn with_element<T>(
        &self,
        handle: ElementHandle,
        f: impl FnOnce(&MockElement) -> T,
    ) -> Result<T, BridgeError> {
        let handles = self.handles.lock();
        let index = handles
            .resolve(handle)
            .ok_or_else(|| BridgeError::StaleHandle(format!("handle {}", handle.0)))?;
        let elements = self.elements.read();
        let element = elements
            .get(index)
            .ok_or_else(|| BridgeError::StaleHandle(format!("handle {}", handle.0)))?;
        Ok(f(element))
    }

    fn with_element_mut<T>(
        &self,
        handle: ElementHandle,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> Result<T, BridgeError> {
        let handles = self.handles.lock();
        let index = handles
            .resolve(handle)
            .ok_or_else(|| BridgeError::StaleHandle(format!("handle {}", handle.0)))?;
        let mut elements = self.elements.write();
        let element = elements
            .get_mut(index)
            .ok_or_else(|| BridgeError::StaleHandle(format!("handle {}", handle.0)))?;
        Ok(f(element))
    }

    fn record(&self, event: MockEvent) {
        self.shared.events.lock().push(event);
    }

    fn matching_indices(&self, method: SelectorMethod, selector: &str, limit: usize) -> Vec<usize> {
        let elements = self.elements.read();
        let mut out = Vec::new();
        match method {
            SelectorMethod::Css => {
                if let Some(parts) = selector::parse_css(selector) {
                    for (i, el) in elements.iter().enumerate() {
                        if selector::css_matches(el, &parts) {
                            out.push(i);
                            if out.len() >= limit {
                                break;
                            }
                        }
                    }
                }
            }
            SelectorMethod::Xpath => {
                if let Some(parts) = selector::parse_xpath(selector) {
                    for (i, el) in elements.iter().enumerate() {
                        if selector::xpath_matches(el, &parts) {
                            out.push(i);
                            if out.len() >= limit {
                                break;
                            }
                        }
                    }
                }
            }
        }
        out
    }

    fn reveal(&self, id: &str) {
        let mut elements = self.elements.write();
        for el in elements.iter_mut() {
            if el.id.as_deref() == Some(id) {
                el.style = StyleSummary::default();
                if el.rect.area() <= 0.0 {
                    el.rect = Rect::new(0.0, 0.0, 120.0, 32.0);
                }
            }
        }
    }
}

#[async_trait]
impl FrameContext for MockFrame {
    async fn query(
        &self,
        method: SelectorMethod,
        selector: &str,
    ) -> Result<Option<ElementHandle>, BridgeError> {
        let indices = self.matching_indices(method, selector, 1);
        Ok(indices
            .first()
            .map(|&index| self.handles.lock().allocate(index)))
    }

    async fn query_all(
        &self,
        method: SelectorMethod,
        selector: &str,
        limit: usize,
    ) -> Result<Vec<ElementHandle>, BridgeError> {
        let indices = self.matching_indices(method, selector, limit);
        let mut handles = self.handles.lock();
        Ok(indices.into_iter().map(|i| handles.allocate(i)).collect())
    }

    async fn describe(&self, handle: ElementHandle) -> Result<ElementDescription, BridgeError> {
        self.with_element(handle, |el| ElementDescription {
            tag: el.tag.clone(),
            id: el.id.clone(),
            classes: el.classes.clone(),
            name: el.name.clone(),
            input_type: el.input_type.clone(),
            href: el.href.clone(),
            text: el.text.clone(),
            value: Some(el.value.clone()),
            disabled: el.disabled,
            attrs: el.attrs.clone(),
        })
    }

    async fn computed_style(&self, handle: ElementHandle) -> Result<StyleSummary, BridgeError> {
        self.with_element(handle, |el| el.style.clone())
    }

    async fn bounding_box(&self, handle: ElementHandle) -> Result<Option<Rect>, BridgeError> {
        self.with_element(handle, |el| Some(el.rect))
    }

    async fn text_content(&self, handle: ElementHandle) -> Result<String, BridgeError> {
        self.with_element(handle, |el| el.text.clone())
    }

    async fn input_value(&self, handle: ElementHandle) -> Result<String, BridgeError> {
        self.with_element(handle, |el| el.value.clone())
    }

    async fn is_disabled(&self, handle: ElementHandle) -> Result<bool, BridgeError> {
        self.with_element(handle, |el| el.disabled)
    }

    async fn inner_text(&self) -> Result<String, BridgeError> {
        if let Some(text) = self.shared.body_text.read().clone() {
            return Ok(text);
        }
        let elements = self.elements.read();
        Ok(elements
            .iter()
            .map(|el| el.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn click(&self, handle: ElementHandle) -> Result<(), BridgeError> {
        let (label, nav, reveal, refused) = self.with_element(handle, |el| {
            (
                Self::element_label(el),
                el.navigate_on_click.clone(),
                el.reveal_on_click.clone(),
                el.native_click_fails,
            )
        })?;
        if refused {
            return Err(BridgeError::Interaction(format!(
                "native click refused on {}",
                label
            )));
        }
        self.record(MockEvent::Click(label));
        if let Some(url) = nav {
            *self.shared.pending_nav.lock() = Some(url);
        }
        if let Some(id) = reveal {
            self.reveal(&id);
        }
        Ok(())
    }

    async fn js_click(&self, handle: ElementHandle) -> Result<(), BridgeError> {
        let (label, nav, reveal) = self.with_element(handle, |el| {
            (
                Self::element_label(el),
                el.navigate_on_click.clone(),
                el.reveal_on_click.clone(),
            )
        })?;
        self.record(MockEvent::JsClick(label));
        if let Some(url) = nav {
            *self.shared.pending_nav.lock() = Some(url);
        }
        if let Some(id) = reveal {
            self.reveal(&id);
        }
        Ok(())
    }

    async fn hover(&self, handle: ElementHandle) -> Result<(), BridgeError> {
        let label = self.with_element(handle, Self::element_label)?;
        self.record(MockEvent::Hover(label));
        Ok(())
    }

    async fn type_text(
        &self,
        handle: ElementHandle,
        text: &str,
        submit: bool,
    ) -> Result<(), BridgeError> {
        let label = self.with_element_mut(handle, |el| {
            el.value = text.to_string();
            Self::element_label(el)
        })?;
        self.record(MockEvent::Type {
            element: label,
            text: text.to_string(),
            submit,
        });
        Ok(())
    }

    async fn set_input_files(
        &self,
        handle: ElementHandle,
        paths: &[String],
    ) -> Result<(), BridgeError> {
        let label = self.with_element(handle, Self::element_label)?;
        self.record(MockEvent::Upload {
            element: label,
            paths: paths.to_vec(),
        });
        Ok(())
    }

    async fn select_value(&self, handle: ElementHandle, value: &str) -> Result<(), BridgeError> {
        let result = self.with_element_mut(handle, |el| {
            if el.tag != "select" {
                return Err(BridgeError::Interaction(format!(
                    "{} is not a select",
                    Self::element_label(el)
                )));
            }
            if !el.options.iter().any(|(v, _)| v == value) {
                return Err(BridgeError::Interaction(format!(
                    "option '{}' not found in {}",
                    value,
                    Self::element_label(el)
                )));
            }
            el.value = value.to_string();
            Ok(Self::element_label(el))
        })?;
        let label = result?;
        self.record(MockEvent::Select {
            element: label,
            value: value.to_string(),
        });
        Ok(())
    }

    async fn scroll_into_view(&self, handle: ElementHandle) -> Result<(), BridgeError> {
        let label = self.with_element(handle, Self::element_label)?;
        self.record(MockEvent::ScrollIntoView(label));
        Ok(())
    }

    async fn scroll_by(&self, dx: f64, dy: f64) -> Result<(), BridgeError> {
        self.record(MockEvent::ScrollBy(dx, dy));
        Ok(())
    }

    async fn drag_and_drop(
        &self,
        source: ElementHandle,
        target: ElementHandle,
    ) -> Result<(), BridgeError> {
        let from = self.with_element(source, Self::element_label)?;
        let to = self.with_element(target, Self::element_label)?;
        self.record(MockEvent::DragAndDrop(from, to));
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, BridgeError> {
        Ok(Value::Null)
    }

    fn release(&self, handle: ElementHandle) {
        self.handles.lock().release(handle);
    }
}

/// In-memory page with a main frame and optional iframes.
pub struct MockPage {
    shared: Arc<PageShared>,
    main: Arc<MockFrame>,
    iframes: Mutex<Vec<(usize, Arc<MockFrame>)>>,
    interactive: RwLock<bool>,
    user_pick: Mutex<Option<CapturedTarget>>,
}

impl MockPage {
    pub fn new(url: impl Into<String>) -> Self {
        let shared = Arc::new(PageShared {
            url: RwLock::new(url.into()),
            title: RwLock::new(String::new()),
            body_text: RwLock::new(None),
            pending_nav: Mutex::new(None),
            events: Mutex::new(Vec::new()),
        });
        let main = Arc::new(MockFrame::new(shared.clone()));
        main.push(MockElement::new("body").rect(1280.0, 720.0));
        Self {
            shared,
            main,
            iframes: Mutex::new(Vec::new()),
            interactive: RwLock::new(false),
            user_pick: Mutex::new(None),
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.shared.title.write() = title.into();
    }

    pub fn set_body_text(&self, text: impl Into<String>) {
        *self.shared.body_text.write() = Some(text.into());
    }

    pub fn set_interactive(&self, interactive: bool) {
        *self.interactive.write() = interactive;
    }

    pub fn set_user_pick(&self, target: CapturedTarget) {
        *self.user_pick.lock() = Some(target);
    }

    pub fn push(&self, element: MockElement) {
        self.main.push(element);
    }

    /// Add an iframe element to the main document together with its inner
    /// document. Remember to give the child frame a `body` element if the
    /// iframe handler's body wait should succeed.
    pub fn add_iframe(&self, element: MockElement, build: impl FnOnce(&MockFrame)) {
        let child = Arc::new(MockFrame::new(self.shared.clone()));
        build(&child);
        let index = {
            let mut elements = self.main.elements.write();
            elements.push(element);
            elements.len() - 1
        };
        self.iframes.lock().push((index, child));
    }

    pub fn mock_main(&self) -> Arc<MockFrame> {
        self.main.clone()
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.shared.events.lock().clone()
    }

    pub fn current_url(&self) -> String {
        self.shared.url.read().clone()
    }
}

#[async_trait]
impl PageContext for MockPage {
    async fn url(&self) -> Result<String, BridgeError> {
        Ok(self.shared.url.read().clone())
    }

    async fn title(&self) -> Result<String, BridgeError> {
        Ok(self.shared.title.read().clone())
    }

    async fn navigate(&self, url: &str) -> Result<(), BridgeError> {
        *self.shared.url.write() = url.to_string();
        *self.shared.pending_nav.lock() = Some(url.to_string());
        self.shared
            .events
            .lock()
            .push(MockEvent::Navigate(url.to_string()));
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<bool, BridgeError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(url) = self.shared.pending_nav.lock().take() {
                *self.shared.url.write() = url;
                return Ok(true);
            }
            if std::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn main_frame(&self) -> Arc<dyn FrameContext> {
        self.main.clone()
    }

    async fn iframes(&self) -> Result<Vec<IframeInfo>, BridgeError> {
        let frames = self.iframes.lock();
        let elements = self.main.elements.read();
        let mut handles = self.main.handles.lock();
        let mut out = Vec::new();
        for (index, _) in frames.iter() {
            if let Some(el) = elements.get(*index) {
                out.push(IframeInfo {
                    handle: handles.allocate(*index),
                    src: el.attrs.get("src").cloned().unwrap_or_default(),
                    class_attr: el.classes.join(" "),
                    area: el.rect.area(),
                });
            }
        }
        Ok(out)
    }

    async fn enter_iframe(
        &self,
        handle: ElementHandle,
    ) -> Result<Option<Arc<dyn FrameContext>>, BridgeError> {
        let index = match self.main.handles.lock().resolve(handle) {
            Some(index) => index,
            None => return Err(BridgeError::StaleHandle(format!("handle {}", handle.0))),
        };
        let frames = self.iframes.lock();
        Ok(frames
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, frame)| frame.clone() as Arc<dyn FrameContext>))
    }

    fn is_interactive(&self) -> bool {
        *self.interactive.read()
    }

    async fn await_user_pick(
        &self,
        timeout: Duration,
    ) -> Result<Option<CapturedTarget>, BridgeError> {
        if let Some(pick) = self.user_pick.lock().take() {
            return Ok(Some(pick));
        }
        tokio::time::sleep(timeout.min(Duration::from_millis(20))).await;
        Ok(self.user_pick.lock().take())
    }
}

mod selector {
    //! Evaluator for the selector grammar the strategy generator emits.
    //! Combinators (descendant, `>`), pseudo-classes and comma lists are
    //! deliberately unsupported; an unparseable selector matches nothing.

    use super::MockElement;

    #[derive(Debug, PartialEq)]
    pub(super) enum AttrOp {
        Exact,
        Contains,
    }

    #[derive(Debug, PartialEq)]
    pub(super) enum CssCond {
        Id(String),
        Class(String),
        Attr {
            name: String,
            op: AttrOp,
            value: String,
            case_insensitive: bool,
        },
    }

    #[derive(Debug, PartialEq)]
    pub(super) struct CssParts {
        pub tag: Option<String>,
        pub conds: Vec<CssCond>,
    }

    fn is_ident_char(c: char) -> bool {
        c.is_alphanumeric() || c == '-' || c == '_'
    }

    pub(super) fn parse_css(selector: &str) -> Option<CssParts> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        let mut chars = selector.chars().peekable();
        let mut tag = String::new();
        while let Some(&c) = chars.peek() {
            if is_ident_char(c) {
                tag.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let mut conds = Vec::new();
        while let Some(&c) = chars.peek() {
            match c {
                '#' | '.' => {
                    chars.next();
                    let mut ident = String::new();
                    while let Some(&c2) = chars.peek() {
                        if is_ident_char(c2) {
                            ident.push(c2);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if ident.is_empty() {
                        return None;
                    }
                    conds.push(if c == '#' {
                        CssCond::Id(ident)
                    } else {
                        CssCond::Class(ident)
                    });
                }
                '[' => {
                    chars.next();
                    let mut inner = String::new();
                    let mut closed = false;
                    for c2 in chars.by_ref() {
                        if c2 == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c2);
                    }
                    if !closed {
                        return None;
                    }
                    conds.push(parse_attr_cond(&inner)?);
                }
                _ => return None,
            }
        }
        if tag.is_empty() && conds.is_empty() {
            return None;
        }
        Some(CssParts {
            tag: if tag.is_empty() {
                None
            } else {
                Some(tag.to_lowercase())
            },
            conds,
        })
    }

    fn parse_attr_cond(inner: &str) -> Option<CssCond> {
        let mut body = inner.trim();
        let mut case_insensitive = false;
        // `[attr*="v" i]` flag
        if body.ends_with(" i") || body.ends_with(" I") {
            case_insensitive = true;
            body = body[..body.len() - 2].trim_end();
        }
        let (name, op, raw_value) = if let Some(pos) = body.find("*=") {
            (&body[..pos], AttrOp::Contains, &body[pos + 2..])
        } else if let Some(pos) = body.find('=') {
            (&body[..pos], AttrOp::Exact, &body[pos + 1..])
        } else {
            // Bare presence test, e.g. `[disabled]`, is matched as exact-empty.
            return Some(CssCond::Attr {
                name: body.trim().to_lowercase(),
                op: AttrOp::Contains,
                value: String::new(),
                case_insensitive: true,
            });
        };
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        let value = unquote(raw_value.trim());
        Some(CssCond::Attr {
            name,
            op,
            value,
            case_insensitive,
        })
    }

    fn unquote(raw: &str) -> String {
        let bytes = raw.as_bytes();
        if bytes.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[bytes.len() - 1] == bytes[0]
        {
            raw[1..raw.len() - 1].to_string()
        } else {
            raw.to_string()
        }
    }

    pub(super) fn css_matches(el: &MockElement, parts: &CssParts) -> bool {
        if let Some(tag) = &parts.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        parts.conds.iter().all(|cond| match cond {
            CssCond::Id(id) => el.id.as_deref() == Some(id.as_str()),
            CssCond::Class(class) => el.classes.iter().any(|c| c == class),
            CssCond::Attr {
                name,
                op,
                value,
                case_insensitive,
            } => {
                let actual = match el.attr_value(name) {
                    Some(v) => v,
                    None => return false,
                };
                let (actual, expected) = if *case_insensitive {
                    (actual.to_lowercase(), value.to_lowercase())
                } else {
                    (actual, value.clone())
                };
                match op {
                    AttrOp::Exact => actual == expected,
                    AttrOp::Contains => actual.contains(&expected),
                }
            }
        })
    }

    #[derive(Debug, PartialEq)]
    pub(super) enum XpathPred {
        TextEquals(String),
        TextContains(String),
        AttrEquals(String, String),
        AttrContains(String, String),
    }

    #[derive(Debug, PartialEq)]
    pub(super) struct XpathParts {
        /// `None` for the `*` wildcard.
        pub tag: Option<String>,
        pub preds: Vec<XpathPred>,
    }

    /// Collapse whitespace runs (including `&nbsp;`) into single spaces.
    pub(super) fn normalize_space(text: &str) -> String {
        text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(super) fn parse_xpath(selector: &str) -> Option<XpathParts> {
        let rest = selector.trim().strip_prefix("//")?;
        let (node, preds_raw) = match rest.find('[') {
            Some(pos) => {
                let inner = rest[pos..].strip_prefix('[')?.strip_suffix(']')?;
                (&rest[..pos], Some(inner))
            }
            None => (rest, None),
        };
        let tag = match node.trim() {
            "" => return None,
            "*" => None,
            other => Some(other.to_lowercase()),
        };
        let mut preds = Vec::new();
        if let Some(raw) = preds_raw {
            for part in raw.split(" and ") {
                preds.push(parse_xpath_pred(part.trim())?);
            }
        }
        Some(XpathParts { tag, preds })
    }

    fn parse_xpath_pred(pred: &str) -> Option<XpathPred> {
        if let Some(rest) = pred
            .strip_prefix("normalize-space(text())=")
            .or_else(|| pred.strip_prefix("normalize-space()="))
        {
            return Some(XpathPred::TextEquals(unquote(rest.trim())));
        }
        if let Some(rest) = pred.strip_prefix("contains(") {
            let rest = rest.strip_suffix(')')?;
            let (subject, value) = rest.split_once(',')?;
            let subject = subject.trim();
            let value = unquote(value.trim());
            if subject == "text()" || subject == "normalize-space(text())" {
                return Some(XpathPred::TextContains(value));
            }
            if let Some(attr) = subject.strip_prefix('@') {
                return Some(XpathPred::AttrContains(attr.to_lowercase(), value));
            }
            return None;
        }
        if let Some(rest) = pred.strip_prefix('@') {
            let (attr, value) = rest.split_once('=')?;
            return Some(XpathPred::AttrEquals(
                attr.trim().to_lowercase(),
                unquote(value.trim()),
            ));
        }
        None
    }

    pub(super) fn xpath_matches(el: &MockElement, parts: &XpathParts) -> bool {
        if let Some(tag) = &parts.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        let text = normalize_space(&el.text);
        parts.preds.iter().all(|pred| match pred {
            XpathPred::TextEquals(expected) => text == normalize_space(expected),
            XpathPred::TextContains(expected) => text.contains(&normalize_space(expected)),
            XpathPred::AttrEquals(name, expected) => {
                el.attr_value(name).as_deref() == Some(expected.as_str())
            }
            XpathPred::AttrContains(name, expected) => el
                .attr_value(name)
                .map(|v| v.contains(expected))
                .unwrap_or(false),
        })
    }

}
