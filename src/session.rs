//! Everything the tools need to act on one page

use std::sync::Arc;

use crate::executor::{ActionExecutor, ActionSettings};
use crate::page::BrowserPage;
use crate::page_state::PageState;
use crate::resolver::Resolver;

/// One page plus the components acting on it
///
/// Holds shared references only; the page itself belongs to whoever opened
/// it (usually a `BrowserManager`).
#[derive(Clone)]
pub struct BrowserSession {
    page: Arc<dyn BrowserPage>,
    settings: ActionSettings,
    executor: ActionExecutor,
    state: PageState,
}

impl BrowserSession {
    pub fn new(page: Arc<dyn BrowserPage>, settings: ActionSettings) -> Self {
        Self::with_resolver(page, Arc::new(Resolver::new()), settings)
    }

    /// Session with a custom resolution cascade
    pub fn with_resolver(
        page: Arc<dyn BrowserPage>,
        resolver: Arc<Resolver>,
        settings: ActionSettings,
    ) -> Self {
        let executor = ActionExecutor::new(page.clone(), resolver, settings.clone());
        let state = PageState::new(page.clone(), settings.action_timeout);
        Self {
            page,
            settings,
            executor,
            state,
        }
    }

    pub fn page(&self) -> &Arc<dyn BrowserPage> {
        &self.page
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }
}
