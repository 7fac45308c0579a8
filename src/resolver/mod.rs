//! Element resolution: target description in, one live element (or point) out
//!
//! Text targets go through an ordered cascade of strategies. The first
//! strategy with a match wins, and within a strategy the first match in
//! document order wins. Nothing is cached: every call queries the page again.

pub mod matcher;
mod strategies;

pub use strategies::{CssStrategy, ExactTextStrategy, ResolutionStrategy, RoleStrategy};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::page::{AriaRole, BrowserPage, DriverError, ElementCandidate, ElementRef, Point};

/// What the caller wants to act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDescriptor {
    Text { value: String },
    Css { value: String },
    Coordinates { x: i64, y: i64 },
}

impl TargetDescriptor {
    pub fn text(value: impl Into<String>) -> Self {
        TargetDescriptor::Text {
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        TargetDescriptor::Css {
            value: value.into(),
        }
    }

    pub fn coordinates(x: i64, y: i64) -> Self {
        TargetDescriptor::Coordinates { x, y }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDescriptor::Text { value } | TargetDescriptor::Css { value } => {
                f.write_str(value)
            }
            TargetDescriptor::Coordinates { x, y } => write!(f, "({}, {})", x, y),
        }
    }
}

/// Which strategy produced a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    RoleButton,
    RoleLink,
    TextMatch,
    CssSelector,
    Coordinates,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoleButton => "role-button",
            Strategy::RoleLink => "role-link",
            Strategy::TextMatch => "text-match",
            Strategy::CssSelector => "css-selector",
            Strategy::Coordinates => "coordinates",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handle points at
#[derive(Debug, Clone, PartialEq)]
pub enum HandleTarget {
    Element(Box<ElementCandidate>),
    Point(Point),
}

/// Exactly one live element or point, valid for a single action
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHandle {
    target: HandleTarget,
    strategy: Strategy,
}

impl ResolvedHandle {
    pub fn element(candidate: ElementCandidate, strategy: Strategy) -> Self {
        Self {
            target: HandleTarget::Element(Box::new(candidate)),
            strategy,
        }
    }

    pub fn at_point(point: Point) -> Self {
        Self {
            target: HandleTarget::Point(point),
            strategy: Strategy::Coordinates,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn target(&self) -> &HandleTarget {
        &self.target
    }

    /// The live element, unless the handle is a bare point
    pub fn element_ref(&self) -> Option<&ElementRef> {
        match &self.target {
            HandleTarget::Element(candidate) => Some(&candidate.element),
            HandleTarget::Point(_) => None,
        }
    }

    pub fn candidate(&self) -> Option<&ElementCandidate> {
        match &self.target {
            HandleTarget::Element(candidate) => Some(candidate),
            HandleTarget::Point(_) => None,
        }
    }

    pub fn point(&self) -> Option<Point> {
        match &self.target {
            HandleTarget::Element(_) => None,
            HandleTarget::Point(point) => Some(*point),
        }
    }

    /// Short human-readable description, e.g. `<button> "Submit"`
    pub fn describe(&self) -> String {
        match &self.target {
            HandleTarget::Element(c) if !c.name.is_empty() => format!("<{}> \"{}\"", c.tag, c.name),
            HandleTarget::Element(c) => format!("<{}> {}", c.tag, c.selector_hint),
            HandleTarget::Point(p) => format!("point ({}, {})", p.x, p.y),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("No element matched target '{target}' (tried: {})", join(.tried))]
    NotFound { target: String, tried: Vec<Strategy> },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Could not query the page for target '{target}': {source}")]
    Driver {
        target: String,
        #[source]
        source: DriverError,
    },
}

fn join(tried: &[Strategy]) -> String {
    tried
        .iter()
        .map(Strategy::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ordered strategy cascade
pub struct Resolver {
    text_cascade: Vec<Box<dyn ResolutionStrategy>>,
    selector: CssStrategy,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// role-button, role-link, text-match, then the value as a selector
    pub fn new() -> Self {
        Self::with_cascade(vec![
            Box::new(RoleStrategy::new(AriaRole::Button)),
            Box::new(RoleStrategy::new(AriaRole::Link)),
            Box::new(ExactTextStrategy),
            Box::new(CssStrategy::lenient()),
        ])
    }

    pub fn with_cascade(text_cascade: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self {
            text_cascade,
            selector: CssStrategy::strict(),
        }
    }

    /// Strategies tried for text targets, in order
    pub fn cascade(&self) -> Vec<Strategy> {
        self.text_cascade.iter().map(|s| s.strategy()).collect()
    }

    pub async fn resolve(
        &self,
        page: &dyn BrowserPage,
        target: &TargetDescriptor,
    ) -> Result<ResolvedHandle, ResolutionError> {
        match target {
            TargetDescriptor::Coordinates { x, y } => {
                Ok(ResolvedHandle::at_point(Point::new(*x as f64, *y as f64)))
            }
            TargetDescriptor::Css { value } => {
                let found = self.selector.attempt(page, value).await.map_err(|err| match err {
                    DriverError::InvalidSelector { selector, reason } => {
                        ResolutionError::InvalidSelector { selector, reason }
                    }
                    source => ResolutionError::Driver {
                        target: value.clone(),
                        source,
                    },
                })?;
                found.ok_or_else(|| ResolutionError::NotFound {
                    target: value.clone(),
                    tried: vec![Strategy::CssSelector],
                })
            }
            TargetDescriptor::Text { value } => {
                for strategy in &self.text_cascade {
                    let attempt = strategy.attempt(page, value).await.map_err(|source| {
                        ResolutionError::Driver {
                            target: value.clone(),
                            source,
                        }
                    })?;
                    if let Some(handle) = attempt {
                        debug!(
                            "Resolved '{}' via {} to {}",
                            value,
                            handle.strategy(),
                            handle.describe()
                        );
                        return Ok(handle);
                    }
                }
                Err(ResolutionError::NotFound {
                    target: value.clone(),
                    tried: self.cascade(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_tags_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Strategy::RoleButton).unwrap(),
            "\"role-button\""
        );
        assert_eq!(Strategy::CssSelector.to_string(), "css-selector");
    }

    #[test]
    fn default_cascade_order() {
        assert_eq!(
            Resolver::new().cascade(),
            vec![
                Strategy::RoleButton,
                Strategy::RoleLink,
                Strategy::TextMatch,
                Strategy::CssSelector
            ]
        );
    }

    #[test]
    fn not_found_names_target_and_strategies() {
        let err = ResolutionError::NotFound {
            target: "Checkout".into(),
            tried: vec![Strategy::RoleButton, Strategy::TextMatch],
        };
        assert_eq!(
            err.to_string(),
            "No element matched target 'Checkout' (tried: role-button, text-match)"
        );
    }

    #[test]
    fn descriptor_parses_from_tagged_json() {
        let parsed: TargetDescriptor =
            serde_json::from_value(serde_json::json!({"kind": "coordinates", "x": 4, "y": 9}))
                .unwrap();
        assert_eq!(parsed, TargetDescriptor::coordinates(4, 9));
        assert_eq!(parsed.to_string(), "(4, 9)");
    }
}
