//! Browser navigation tool - loads URLs and waits for page ready

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::info;

use super::{Tool, require_text};
use crate::outcome::ActionOutcome;
use crate::page::{DriverError, WaitPolicy};
use crate::session::BrowserSession;
use crate::utils::{ActionError, ActionResult, bounded, validate_navigation_timeout, wait_for_selector};

pub const BROWSER_NAVIGATE: &str = "browser_navigate";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BrowserNavigateArgs {
    /// Absolute http(s) URL
    pub url: String,

    /// When navigation counts as finished (default: load)
    #[serde(default)]
    pub wait_until: Option<WaitPolicy>,

    /// CSS selector to wait for after the page loads, for client-rendered pages
    #[serde(default)]
    pub wait_for_selector: Option<String>,

    /// Navigation deadline in milliseconds (max 300000)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone)]
pub struct BrowserNavigateTool {
    session: BrowserSession,
}

impl BrowserNavigateTool {
    pub fn new(session: BrowserSession) -> Self {
        Self { session }
    }
}

fn validate_url(raw: &str) -> ActionResult<String> {
    let raw = require_text("url", raw)?;
    let parsed = url::Url::parse(raw)
        .map_err(|e| ActionError::validation(format!("Invalid URL '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ActionError::validation(format!(
            "URL must start with http:// or https:// (got {}://)",
            other
        ))),
    }
}

#[async_trait]
impl Tool for BrowserNavigateTool {
    type Args = BrowserNavigateArgs;

    fn name() -> &'static str {
        BROWSER_NAVIGATE
    }

    fn description() -> &'static str {
        "Navigate to a URL and wait for the page to load. \
         Returns the final URL, which may differ from the requested one after redirects."
    }

    fn read_only() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome> {
        let url = validate_url(&args.url)?;
        let timeout = match args.timeout_ms {
            Some(ms) => validate_navigation_timeout(Some(ms), ms)?,
            None => self.session.settings().navigation_timeout,
        };
        let wait = args.wait_until.unwrap_or_default();
        let selector = args
            .wait_for_selector
            .as_deref()
            .map(|s| require_text("wait_for_selector", s))
            .transpose()?;
        let page = self.session.page();
        let started = Instant::now();

        bounded(timeout, page.navigate(&url, wait))
            .await
            .map_err(|e| ActionError::execution("navigate", url.as_str(), e))?;

        // The selector wait shares the navigation deadline
        if let Some(selector) = selector {
            let remaining = timeout.saturating_sub(started.elapsed());
            wait_for_selector(page.as_ref(), selector, remaining)
                .await
                .map_err(|e| match e {
                    DriverError::Timeout(_) => DriverError::Timeout(timeout.as_millis()),
                    other => other,
                })
                .map_err(|e| ActionError::execution("wait_for_selector", selector, e))?;
        }

        let final_url = bounded(self.session.settings().action_timeout, page.current_url())
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.clone());

        info!("Navigated to {}", final_url);
        let message = if final_url != url {
            format!("Navigated to {} (redirected from {})", final_url, url)
        } else {
            format!("Navigated to {}", final_url)
        };
        Ok(ActionOutcome::success(message))
    }
}
