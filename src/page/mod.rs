//! Browser-session boundary consumed by the engine
//!
//! Everything the resolver, executor and page-state accessor need from a live
//! page goes through [`BrowserPage`]. `ChromePage` implements it over
//! chromiumoxide; tests implement it over an in-memory document.

mod chrome;
mod scripts;

pub use chrome::ChromePage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in viewport CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered bounding box of an element in viewport CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Elements with zero (or negative) extent on either axis are not rendered
    pub fn is_rendered(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Opaque page-scoped selector addressing exactly one live element
///
/// Only meaningful for the page that produced it, and only until that page
/// re-renders the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn selector(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// ARIA roles the resolver and accessor query by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    Button,
    Link,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Button => "button",
            AriaRole::Link => "link",
        }
    }
}

/// What a [`BrowserPage::query`] call collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateQuery {
    /// Anchors, buttons, submit/button inputs, explicit interactive roles, click handlers
    Interactive,
    /// Elements exposing the role, explicit or implicit
    Role(AriaRole),
    /// Elements owning a text node; the needle is a hint the page may pre-filter on
    Text(String),
    /// Literal CSS selector
    Css(String),
}

/// One element returned by a query, in document order
///
/// Implementations return candidates unfiltered by size or name; matching
/// rules live with the callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCandidate {
    pub element: ElementRef,
    pub tag: String,
    pub role: String,
    /// Accessible name (aria-label, labelled-by, value, text content, title)
    pub name: String,
    /// Rendered text, trimmed
    pub text: String,
    /// `#id`, `tag[name="…"]`, or the element ref when nothing better exists
    pub selector_hint: String,
    pub rect: Rect,
}

/// Navigation completion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    #[default]
    Load,
    DomContentLoaded,
    None,
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No element matches selector '{0}'")]
    NoMatch(String),

    #[error("Element {0} is no longer attached to the document")]
    Detached(String),

    #[error("Element {selector} cannot be filled: {reason}")]
    NotFillable { selector: String, reason: String },

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {0}ms")]
    Timeout(u128),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Live page primitives
///
/// Implementations must be cheap to share (`Arc<dyn BrowserPage>`) and must not
/// cache page state between calls.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> DriverResult<()>;

    /// Current URL after redirects, if the page reports one
    async fn current_url(&self) -> DriverResult<Option<String>>;

    async fn evaluate(&self, script: &str) -> DriverResult<serde_json::Value>;

    /// Serialized document markup
    async fn content(&self) -> DriverResult<String>;

    async fn query(&self, query: &CandidateQuery) -> DriverResult<Vec<ElementCandidate>>;

    /// Scroll into view and click the element's clickable point
    async fn click_element(&self, element: &ElementRef) -> DriverResult<()>;

    async fn focus_element(&self, element: &ElementRef) -> DriverResult<()>;

    /// Clickable point of the element after scrolling it into view
    async fn element_center(&self, element: &ElementRef) -> DriverResult<Point>;

    async fn click_at(&self, point: Point) -> DriverResult<()>;

    /// One key press for one character, delivered to the focused element
    async fn type_char(&self, ch: char) -> DriverResult<()>;

    /// Assign the value of the first element matching `selector` directly
    async fn fill(&self, selector: &str, text: &str) -> DriverResult<()>;

    async fn wheel(&self, at: Point, delta_x: f64, delta_y: f64) -> DriverResult<()>;

    async fn drag(&self, from: Point, to: Point) -> DriverResult<()>;

    /// PNG bytes of the current viewport
    async fn screenshot_png(&self) -> DriverResult<Vec<u8>>;

    /// Visible viewport in CSS pixels
    async fn viewport(&self) -> DriverResult<Rect>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_rendering_boundary() {
        let one = Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 };
        let flat = Rect { x: 0.0, y: 0.0, width: 0.0, height: 20.0 };
        let thin = Rect { x: 0.0, y: 0.0, width: 20.0, height: 0.0 };
        assert!(one.is_rendered());
        assert!(!flat.is_rendered());
        assert!(!thin.is_rendered());
    }

    #[test]
    fn rect_center() {
        let rect = Rect { x: 10.0, y: 20.0, width: 100.0, height: 40.0 };
        assert_eq!(rect.center(), Point::new(60.0, 40.0));
    }
}
