//! In-memory `BrowserPage` for driving the engine without Chrome

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use kodegen_browser_actions::executor::ActionSettings;
use kodegen_browser_actions::page::{
    BrowserPage, CandidateQuery, DriverError, DriverResult, ElementCandidate, ElementRef, Point,
    Rect, WaitPolicy,
};
use kodegen_browser_actions::{BrowserSession, ToolRegistry};

pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub tag: String,
    pub role: String,
    pub name: String,
    pub text: String,
    pub selectors: Vec<String>,
    pub rect: Rect,
    pub interactive: bool,
    pub fillable: bool,
    pub detached: bool,
}

impl FakeElement {
    fn new(tag: &str, role: &str, text: &str) -> Self {
        Self {
            tag: tag.to_string(),
            role: role.to_string(),
            name: text.to_string(),
            text: text.to_string(),
            selectors: vec![tag.to_string()],
            rect: Rect { x: 10.0, y: 10.0, width: 100.0, height: 30.0 },
            interactive: false,
            fillable: false,
            detached: false,
        }
    }

    pub fn button(text: &str) -> Self {
        Self {
            interactive: true,
            ..Self::new("button", "button", text)
        }
    }

    pub fn link(text: &str) -> Self {
        Self {
            interactive: true,
            ..Self::new("a", "link", text)
        }
    }

    pub fn text(tag: &str, text: &str) -> Self {
        Self::new(tag, "", text)
    }

    pub fn input(id: &str) -> Self {
        let mut input = Self::new("input", "textbox", "");
        input.selectors.push(format!("#{}", id));
        input.fillable = true;
        input
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn at(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Rect { x, y, width, height };
        self
    }

    /// Still returned by queries, but gone once an action touches it
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Navigate(String, WaitPolicy),
    ClickElement(String),
    Focus(String),
    ClickAt(Point),
    Key(char),
    Fill { selector: String, text: String },
    Wheel { at: Point, delta_x: f64, delta_y: f64 },
    Drag { from: Point, to: Point },
    Screenshot,
}

#[derive(Default)]
struct State {
    elements: Vec<FakeElement>,
    events: Vec<PageEvent>,
    url: Option<String>,
    redirect_to: Option<String>,
    markup: String,
    values: Vec<(usize, String)>,
    stall_queries: bool,
    fail_queries: bool,
    navigation_delay: Duration,
}

pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub fn new(elements: Vec<FakeElement>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                elements,
                markup: "<html><body></body></html>".to_string(),
                ..State::default()
            }),
        })
    }

    pub fn set_markup(&self, markup: &str) {
        self.state.lock().unwrap().markup = markup.to_string();
    }

    pub fn redirect_to(&self, url: &str) {
        self.state.lock().unwrap().redirect_to = Some(url.to_string());
    }

    /// Queries never return until the caller's deadline fires
    pub fn stall_queries(&self) {
        self.state.lock().unwrap().stall_queries = true;
    }

    /// Every navigation takes `delay` before it lands
    pub fn slow_navigation(&self, delay: Duration) {
        self.state.lock().unwrap().navigation_delay = delay;
    }

    /// Queries fail with a protocol error
    pub fn fail_queries(&self) {
        self.state.lock().unwrap().fail_queries = true;
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn value_of(&self, index: usize) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .values
            .iter()
            .rev()
            .find(|(i, _)| *i == index)
            .map(|(_, v)| v.clone())
    }

    fn record(&self, event: PageEvent) {
        self.state.lock().unwrap().events.push(event);
    }

    fn element_ref(index: usize) -> ElementRef {
        ElementRef::new(format!("[data-kodegen-ref=\"{}\"]", index))
    }

    fn index_of(element: &ElementRef) -> Option<usize> {
        element
            .selector()
            .trim_start_matches("[data-kodegen-ref=\"")
            .trim_end_matches("\"]")
            .parse()
            .ok()
    }

    fn lookup(&self, element: &ElementRef) -> DriverResult<FakeElement> {
        let state = self.state.lock().unwrap();
        Self::index_of(element)
            .and_then(|i| state.elements.get(i).cloned())
            .filter(|e| !e.detached)
            .ok_or_else(|| DriverError::Detached(element.to_string()))
    }

    fn candidate(index: usize, element: &FakeElement) -> ElementCandidate {
        let selector_hint = element
            .selectors
            .iter()
            .find(|s| s.starts_with('#'))
            .cloned()
            .unwrap_or_else(|| Self::element_ref(index).to_string());
        ElementCandidate {
            element: Self::element_ref(index),
            tag: element.tag.clone(),
            role: element.role.clone(),
            name: element.name.clone(),
            text: element.text.clone(),
            selector_hint,
            rect: element.rect,
        }
    }

    /// Tag words, `#id`, `.class` and `[attr]` parse; anything else does not
    fn parses(selector: &str) -> bool {
        let selector = selector.trim();
        !selector.is_empty()
            && !selector.contains(char::is_whitespace)
            && selector
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '#' | '.' | '[' | '*'))
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> DriverResult<()> {
        self.record(PageEvent::Navigate(url.to_string(), wait));
        let delay = self.state.lock().unwrap().navigation_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        let landed = state.redirect_to.take().unwrap_or_else(|| url.to_string());
        state.url = Some(landed);
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<Option<String>> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn evaluate(&self, _script: &str) -> DriverResult<Value> {
        Ok(Value::Null)
    }

    async fn content(&self) -> DriverResult<String> {
        Ok(self.state.lock().unwrap().markup.clone())
    }

    async fn query(&self, query: &CandidateQuery) -> DriverResult<Vec<ElementCandidate>> {
        let (stall, fail) = {
            let state = self.state.lock().unwrap();
            (state.stall_queries, state.fail_queries)
        };
        if stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if fail {
            return Err(DriverError::Protocol("websocket closed".into()));
        }

        let state = self.state.lock().unwrap();
        if let CandidateQuery::Css(selector) = query {
            let known = state.elements.iter().any(|e| e.selectors.contains(selector));
            if !known && !Self::parses(selector) {
                return Err(DriverError::InvalidSelector {
                    selector: selector.clone(),
                    reason: "not a valid selector".into(),
                });
            }
        }

        Ok(state
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| match query {
                CandidateQuery::Interactive => e.interactive,
                CandidateQuery::Role(role) => e.role == role.as_str(),
                CandidateQuery::Text(needle) => {
                    let needle = squash(needle);
                    !e.text.trim().is_empty() && (needle.is_empty() || squash(&e.text).contains(&needle))
                }
                CandidateQuery::Css(selector) => e.selectors.contains(selector),
            })
            .map(|(i, e)| Self::candidate(i, e))
            .collect())
    }

    async fn click_element(&self, element: &ElementRef) -> DriverResult<()> {
        self.lookup(element)?;
        self.record(PageEvent::ClickElement(element.to_string()));
        Ok(())
    }

    async fn focus_element(&self, element: &ElementRef) -> DriverResult<()> {
        self.lookup(element)?;
        self.record(PageEvent::Focus(element.to_string()));
        Ok(())
    }

    async fn element_center(&self, element: &ElementRef) -> DriverResult<Point> {
        Ok(self.lookup(element)?.rect.center())
    }

    async fn click_at(&self, point: Point) -> DriverResult<()> {
        self.record(PageEvent::ClickAt(point));
        Ok(())
    }

    async fn type_char(&self, ch: char) -> DriverResult<()> {
        self.record(PageEvent::Key(ch));
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> DriverResult<()> {
        let found = {
            let state = self.state.lock().unwrap();
            let known = state.elements.iter().any(|e| e.selectors.iter().any(|s| s == selector));
            if !known && !Self::parses(selector) {
                return Err(DriverError::InvalidSelector {
                    selector: selector.to_string(),
                    reason: "not a valid selector".into(),
                });
            }
            state
                .elements
                .iter()
                .enumerate()
                .find(|(_, e)| !e.detached && e.selectors.iter().any(|s| s == selector))
                .map(|(i, e)| (i, e.fillable))
        };

        match found {
            None => Err(DriverError::NoMatch(selector.to_string())),
            Some((_, false)) => Err(DriverError::NotFillable {
                selector: selector.to_string(),
                reason: "not an input, textarea or contenteditable element".into(),
            }),
            Some((index, true)) => {
                self.state.lock().unwrap().values.push((index, text.to_string()));
                self.record(PageEvent::Fill {
                    selector: selector.to_string(),
                    text: text.to_string(),
                });
                Ok(())
            }
        }
    }

    async fn wheel(&self, at: Point, delta_x: f64, delta_y: f64) -> DriverResult<()> {
        self.record(PageEvent::Wheel { at, delta_x, delta_y });
        Ok(())
    }

    async fn drag(&self, from: Point, to: Point) -> DriverResult<()> {
        self.record(PageEvent::Drag { from, to });
        Ok(())
    }

    async fn screenshot_png(&self) -> DriverResult<Vec<u8>> {
        self.record(PageEvent::Screenshot);
        Ok(PNG_MAGIC.to_vec())
    }

    async fn viewport(&self) -> DriverResult<Rect> {
        Ok(Rect { x: 0.0, y: 0.0, width: 1280.0, height: 720.0 })
    }
}

/// Collapse whitespace runs and lowercase, as the in-page text filter does
fn squash(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Settings with no typing delay and screenshots under `screenshot_dir`
pub fn settings(screenshot_dir: &std::path::Path) -> ActionSettings {
    ActionSettings {
        type_delay: Duration::ZERO,
        screenshot_dir: screenshot_dir.to_path_buf(),
        ..ActionSettings::default()
    }
}

pub fn session(page: Arc<FakePage>, screenshot_dir: &std::path::Path) -> BrowserSession {
    BrowserSession::new(page, settings(screenshot_dir))
}

pub fn registry(page: Arc<FakePage>, screenshot_dir: &std::path::Path) -> ToolRegistry {
    ToolRegistry::for_session(session(page, screenshot_dir))
}
