//! Element resolution and action execution for browser-driving agents
//!
//! A planner names a target loosely ("the Submit button", a CSS selector, a
//! viewport point); the crate resolves it against the live page, performs one
//! action, and reports the result as a string the planner can read.

mod browser;
pub mod browser_setup;
pub mod executor;
mod manager;
pub mod outcome;
pub mod page;
pub mod page_state;
pub mod resolver;
mod session;
pub mod tools;
mod utils;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::constants::{
    DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_MARKUP_MAX_LENGTH, DEFAULT_NAVIGATION_TIMEOUT_MS,
    DEFAULT_SCREENSHOT_DIR, DEFAULT_TYPE_DELAY_MS, MAX_TYPE_DELAY_MS,
};
use crate::utils::{MAX_INTERACTION_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub actions: ActionsConfig,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

/// Deadlines, delays and output locations for actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Per-call deadline for element interactions
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Delay between simulated key presses
    #[serde(default = "default_type_delay_ms")]
    pub type_delay_ms: u64,

    /// Created on first screenshot
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,

    #[serde(default = "default_markup_max_length")]
    pub markup_max_length: usize,
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false  // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ACTION_TIMEOUT_MS
}

fn default_navigation_timeout_ms() -> u64 {
    DEFAULT_NAVIGATION_TIMEOUT_MS
}

fn default_type_delay_ms() -> u64 {
    DEFAULT_TYPE_DELAY_MS
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCREENSHOT_DIR)
}

fn default_markup_max_length() -> usize {
    DEFAULT_MARKUP_MAX_LENGTH
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            type_delay_ms: default_type_delay_ms(),
            screenshot_dir: default_screenshot_dir(),
            markup_max_length: default_markup_max_length(),
        }
    }
}

impl ActionsConfig {
    /// Reject limits the tools would refuse as per-call arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_INTERACTION_TIMEOUT_MS {
            anyhow::bail!(
                "actions.timeout_ms must be between 1 and {}ms, got {}ms",
                MAX_INTERACTION_TIMEOUT_MS,
                self.timeout_ms
            );
        }
        if self.navigation_timeout_ms == 0 || self.navigation_timeout_ms > MAX_NAVIGATION_TIMEOUT_MS {
            anyhow::bail!(
                "actions.navigation_timeout_ms must be between 1 and {}ms, got {}ms",
                MAX_NAVIGATION_TIMEOUT_MS,
                self.navigation_timeout_ms
            );
        }
        if self.type_delay_ms > MAX_TYPE_DELAY_MS {
            anyhow::bail!(
                "actions.type_delay_ms cannot exceed {}ms, got {}ms",
                MAX_TYPE_DELAY_MS,
                self.type_delay_ms
            );
        }
        if self.markup_max_length == 0 {
            anyhow::bail!("actions.markup_max_length must be greater than 0");
        }
        Ok(())
    }
}

/// Load config from a YAML file; a missing file yields the defaults
pub fn load_yaml_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let config_path = path.as_ref();

    if config_path.exists() {
        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", config_path.display()))?;
        config
            .actions
            .validate()
            .with_context(|| format!("Invalid config {}", config_path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

pub use browser::{
    BrowserError, BrowserResult, BrowserWrapper, download_managed_browser,
    find_browser_executable, launch_browser,
};
pub use executor::{ActionExecutor, ActionSettings};
pub use manager::BrowserManager;
pub use outcome::{ActionOutcome, FAILURE_PREFIX};
pub use page::{BrowserPage, ChromePage, DriverError, WaitPolicy};
pub use page_state::{InteractiveElementSummary, PageState, TextMatch};
pub use resolver::{ResolutionError, ResolvedHandle, Resolver, Strategy, TargetDescriptor};
pub use session::BrowserSession;
pub use tools::{ToolRegistry, ToolSchema};
pub use utils::{ActionError, ActionResult};
