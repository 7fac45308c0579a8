//! Shared configuration constants for browser actions
//!
//! Default values used throughout the codebase to ensure consistency and
//! avoid magic numbers.

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Per-call deadline for element interactions
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Page load deadline for `browser_navigate`
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Delay between simulated key presses
pub const DEFAULT_TYPE_DELAY_MS: u64 = 50;

/// Upper bound for a caller-supplied typing delay
pub const MAX_TYPE_DELAY_MS: u64 = 1_000;

/// Markup returned by `browser_get_markup` when the caller gives no limit
pub const DEFAULT_MARKUP_MAX_LENGTH: usize = 20_000;

/// Directory screenshots land in, relative to the working directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";

/// Per-axis scroll clamp in CSS pixels
pub const MAX_SCROLL_DELTA: f64 = 10_000.0;
