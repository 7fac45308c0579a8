//! Browser process ownership
//!
//! Pairs a chromiumoxide `Browser` with its event handler task and the
//! profile directory it was launched with.

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::BrowserConfig;
use crate::browser_setup::LaunchOptions;

/// Wrapper for Browser and its event handler task
///
/// The handler MUST be aborted when the browser goes away, or it keeps
/// polling a dead websocket.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    pub(crate) fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Remove the profile directory
    ///
    /// MUST be called after `browser.wait()` so Chrome has released its file
    /// handles. Blocking, since it may also run from `Drop`.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        info!("Dropping BrowserWrapper - aborting handler task");
        self.handler.abort();

        if let Some(path) = &self.user_data_dir {
            warn!(
                "BrowserWrapper dropped without explicit cleanup. \
                Temp directory will be orphaned: {}. \
                Call BrowserManager::shutdown() before dropping to ensure proper cleanup.",
                path.display()
            );
        }
    }
}

/// Launch a browser for one session, in its own profile directory
///
/// Every call gets a fresh `kodegen_browser_<uuid>` profile under the temp
/// dir, so concurrent sessions never contend for Chrome's profile lock.
pub async fn launch_browser(config: &BrowserConfig) -> Result<BrowserWrapper> {
    let user_data_dir =
        std::env::temp_dir().join(format!("kodegen_browser_{}", uuid::Uuid::new_v4()));
    info!("Launching browser with profile {}", user_data_dir.display());

    let options = LaunchOptions {
        headless: config.headless,
        disable_security: config.disable_security,
        window_width: config.window.width,
        window_height: config.window.height,
        user_data_dir: user_data_dir.clone(),
    };
    let (browser, handler) = crate::browser_setup::launch_browser(options).await?;

    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}

/// Open a new `about:blank` tab
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> Result<Page> {
    let page = wrapper
        .browser()
        .new_page("about:blank")
        .await
        .context("Failed to create blank page")?;

    info!("Created blank page");
    Ok(page)
}
