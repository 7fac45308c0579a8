//! Read-only queries against the live document
//!
//! Every call observes the page fresh. Size and text-matching rules are
//! applied here, over raw candidates, so they hold for any `BrowserPage`.

mod markup;

pub use markup::{TRUNCATION_MARKER, truncate_markup};

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::page::{BrowserPage, CandidateQuery, ElementCandidate, Rect};
use crate::resolver::matcher::{contains_ignore_case, normalize};
use crate::utils::{ActionError, ActionResult, bounded};

/// Integer viewport coordinates of an element's centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
}

impl From<&Rect> for Coordinates {
    fn from(rect: &Rect) -> Self {
        let center = rect.center();
        Self {
            x: center.x.round() as i64,
            y: center.y.round() as i64,
        }
    }
}

/// One visible interactive element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveElementSummary {
    pub text: String,
    pub role: String,
    pub selector_or_id: String,
    pub coordinates: Coordinates,
}

impl From<ElementCandidate> for InteractiveElementSummary {
    fn from(candidate: ElementCandidate) -> Self {
        let text = if candidate.text.is_empty() {
            candidate.name
        } else {
            normalize(&candidate.text)
        };
        Self {
            text,
            role: candidate.role,
            selector_or_id: candidate.selector_hint,
            coordinates: Coordinates::from(&candidate.rect),
        }
    }
}

/// One element whose rendered text contains the search string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    pub tag: String,
    pub text: String,
    pub selector_hint: String,
    pub coordinates: Coordinates,
}

impl From<ElementCandidate> for TextMatch {
    fn from(candidate: ElementCandidate) -> Self {
        Self {
            tag: candidate.tag,
            text: normalize(&candidate.text),
            selector_hint: candidate.selector_hint,
            coordinates: Coordinates::from(&candidate.rect),
        }
    }
}

/// PageState accessor bound to one page
#[derive(Clone)]
pub struct PageState {
    page: Arc<dyn BrowserPage>,
    limit: Duration,
}

impl PageState {
    pub fn new(page: Arc<dyn BrowserPage>, limit: Duration) -> Self {
        Self { page, limit }
    }

    /// Visible interactive elements in document order; empty on any failure
    pub async fn list_interactive_elements(&self) -> Vec<InteractiveElementSummary> {
        let candidates =
            match bounded(self.limit, self.page.query(&CandidateQuery::Interactive)).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("Listing interactive elements failed: {}", e);
                    return Vec::new();
                }
            };

        let total = candidates.len();
        let visible: Vec<InteractiveElementSummary> = candidates
            .into_iter()
            .filter(|c| c.rect.is_rendered())
            .map(InteractiveElementSummary::from)
            .collect();
        debug!("{} of {} interactive elements are rendered", visible.len(), total);
        visible
    }

    /// Serialized markup, cut at `max_length` characters
    pub async fn get_markup(&self, max_length: usize) -> ActionResult<String> {
        let markup = bounded(self.limit, self.page.content())
            .await
            .map_err(|e| ActionError::execution("get_markup", "document", e))?;
        Ok(truncate_markup(&markup, max_length))
    }

    /// Rendered elements whose text contains `text`, ignoring case; empty on any failure
    pub async fn find_elements_containing_text(&self, text: &str) -> Vec<TextMatch> {
        if normalize(text).is_empty() {
            return Vec::new();
        }

        let query = CandidateQuery::Text(text.to_string());
        let candidates = match bounded(self.limit, self.page.query(&query)).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Text search for '{}' failed: {}", text, e);
                return Vec::new();
            }
        };

        candidates
            .into_iter()
            .filter(|c| c.rect.is_rendered() && contains_ignore_case(&c.text, text))
            .map(TextMatch::from)
            .collect()
    }
}
