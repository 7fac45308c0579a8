//! Browser lifecycle for one session
//!
//! Uses `Mutex<Option<BrowserWrapper>>`:
//! - lazy launch on first use
//! - health check on every access, with relaunch after a crash
//! - explicit shutdown that closes Chrome and removes its profile
//!
//! Must use `tokio::sync::Mutex`: the lock is held across `.await`.
//!
//! Each manager owns its own browser, so independent sessions never share
//! a page or a profile directory.

use anyhow::Result;
use chromiumoxide::page::Page;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult, BrowserWrapper, create_blank_page, launch_browser};
use crate::page::ChromePage;

pub struct BrowserManager {
    config: BrowserConfig,
    browser: Mutex<Option<BrowserWrapper>>,
}

impl BrowserManager {
    /// Browser is launched lazily, on the first `open_page()`
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            browser: Mutex::new(None),
        }
    }

    /// Ensure a healthy browser is running, relaunching after a crash
    ///
    /// Health is checked with the `Browser.getVersion` CDP command.
    pub async fn get_or_launch(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;

        if let Some(wrapper) = guard.as_ref() {
            match wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed, reusing existing browser");
                    return Ok(());
                }
                Err(e) => {
                    warn!("Browser health check failed: {}. Triggering recovery...", e);
                    if let Some(mut crashed) = guard.take() {
                        // Best-effort: the process may already be gone
                        let _ = crashed.browser_mut().close().await;
                        let _ = crashed.browser_mut().wait().await;
                        crashed.cleanup_temp_dir();
                    }
                }
            }
        }

        info!("Launching browser (first time or after recovery)");
        *guard = Some(launch_browser(&self.config).await?);
        Ok(())
    }

    /// Open a fresh tab and wrap it for the engine
    pub async fn open_page(&self) -> BrowserResult<ChromePage> {
        self.get_or_launch()
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        let guard = self.browser.lock().await;
        let wrapper = guard
            .as_ref()
            .ok_or_else(|| BrowserError::PageCreationFailed("Browser not available".into()))?;
        let page: Page = create_blank_page(wrapper)
            .await
            .map_err(|e| BrowserError::PageCreationFailed(format!("{e:#}")))?;

        Ok(ChromePage::new(page))
    }

    /// Close the browser and remove its profile; a no-op when nothing runs
    ///
    /// Both `close()` and `wait()` are needed: dropping the wrapper only aborts
    /// the handler task and would leave a zombie Chrome behind.
    pub async fn shutdown(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;

        if let Some(mut wrapper) = guard.take() {
            info!("Shutting down browser");

            if let Err(e) = wrapper.browser_mut().close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = wrapper.browser_mut().wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
            wrapper.cleanup_temp_dir();
        }

        Ok(())
    }

    pub async fn is_browser_running(&self) -> bool {
        self.browser.lock().await.is_some()
    }

    /// Whether a browser is still held, without awaiting the lock
    fn launched_without_shutdown(&mut self) -> bool {
        self.browser.get_mut().is_some()
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        if self.launched_without_shutdown() {
            warn!(
                "BrowserManager dropped without shutdown(): only the CDP handler is aborted, \
                 Chrome and its profile directory may be left behind"
            );
        }
    }
}
