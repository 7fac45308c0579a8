//! Action executor: one concrete browser interaction per call
//!
//! Every public operation returns an [`ActionOutcome`]; failures are folded
//! into it rather than propagated. Each browser call is bounded by the
//! configured action timeout. There are no retries.

mod screenshot;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ActionsConfig;
use crate::outcome::ActionOutcome;
use crate::page::{BrowserPage, DriverError, DriverResult, Point};
use crate::resolver::{HandleTarget, ResolutionError, ResolvedHandle, Resolver, Strategy, TargetDescriptor};
use crate::utils::constants::{
    DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_MARKUP_MAX_LENGTH, DEFAULT_NAVIGATION_TIMEOUT_MS,
    DEFAULT_SCREENSHOT_DIR, DEFAULT_TYPE_DELAY_MS, MAX_SCROLL_DELTA,
};
use crate::utils::{ActionError, ActionResult, bounded};

/// Timeouts, delays and paths every action reads
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSettings {
    pub action_timeout: Duration,
    pub navigation_timeout: Duration,
    pub type_delay: Duration,
    pub screenshot_dir: PathBuf,
    pub markup_max_length: usize,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            type_delay: Duration::from_millis(DEFAULT_TYPE_DELAY_MS),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            markup_max_length: DEFAULT_MARKUP_MAX_LENGTH,
        }
    }
}

impl From<&ActionsConfig> for ActionSettings {
    fn from(config: &ActionsConfig) -> Self {
        Self {
            action_timeout: Duration::from_millis(config.timeout_ms),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            type_delay: Duration::from_millis(config.type_delay_ms),
            screenshot_dir: config.screenshot_dir.clone(),
            markup_max_length: config.markup_max_length,
        }
    }
}

#[derive(Clone)]
pub struct ActionExecutor {
    page: Arc<dyn BrowserPage>,
    resolver: Arc<Resolver>,
    settings: ActionSettings,
}

impl ActionExecutor {
    pub fn new(page: Arc<dyn BrowserPage>, resolver: Arc<Resolver>, settings: ActionSettings) -> Self {
        Self {
            page,
            resolver,
            settings,
        }
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    /// Same executor with a per-call action timeout
    pub fn with_timeout(&self, action_timeout: Duration) -> Self {
        let mut executor = self.clone();
        executor.settings.action_timeout = action_timeout;
        executor
    }

    pub async fn click(&self, target: &TargetDescriptor) -> ActionOutcome {
        self.try_click(target).await.into()
    }

    pub async fn click_at(&self, x: f64, y: f64) -> ActionOutcome {
        self.try_click_at(x, y).await.into()
    }

    /// Key-by-key input, `delay` apart; focuses (or clicks) `target` first when given
    pub async fn type_text(
        &self,
        target: Option<&TargetDescriptor>,
        text: &str,
        delay: Duration,
    ) -> ActionOutcome {
        self.try_type_text(target, text, delay).await.into()
    }

    /// Direct value assignment on the first element matching `selector`
    pub async fn fill(&self, selector: &str, text: &str) -> ActionOutcome {
        self.try_fill(selector, text).await.into()
    }

    pub async fn scroll(&self, delta_x: f64, delta_y: f64) -> ActionOutcome {
        self.try_scroll(delta_x, delta_y).await.into()
    }

    pub async fn drag_and_drop(
        &self,
        source: &TargetDescriptor,
        destination: &TargetDescriptor,
    ) -> ActionOutcome {
        self.try_drag_and_drop(source, destination).await.into()
    }

    /// Capture the viewport into the screenshot directory
    pub async fn screenshot(&self, name_hint: Option<&str>) -> ActionOutcome {
        self.try_screenshot(name_hint).await.into()
    }

    async fn resolve(&self, target: &TargetDescriptor) -> ActionResult<ResolvedHandle> {
        let limit = self.settings.action_timeout;
        match tokio::time::timeout(limit, self.resolver.resolve(self.page.as_ref(), target)).await {
            Ok(resolved) => Ok(resolved?),
            Err(_) => Err(ResolutionError::Driver {
                target: target.to_string(),
                source: DriverError::Timeout(limit.as_millis()),
            }
            .into()),
        }
    }

    async fn press(&self, handle: &ResolvedHandle) -> DriverResult<()> {
        let limit = self.settings.action_timeout;
        match handle.target() {
            HandleTarget::Element(candidate) => {
                bounded(limit, self.page.click_element(&candidate.element)).await
            }
            HandleTarget::Point(point) => bounded(limit, self.page.click_at(*point)).await,
        }
    }

    /// Viewport point a drag starts or ends at
    async fn anchor(&self, handle: &ResolvedHandle) -> DriverResult<Point> {
        match handle.target() {
            HandleTarget::Element(candidate) => {
                bounded(
                    self.settings.action_timeout,
                    self.page.element_center(&candidate.element),
                )
                .await
            }
            HandleTarget::Point(point) => Ok(*point),
        }
    }

    async fn try_click(&self, target: &TargetDescriptor) -> ActionResult<ActionOutcome> {
        let handle = self.resolve(target).await?;
        self.press(&handle)
            .await
            .map_err(|e| ActionError::execution("click", target.to_string(), e))?;

        info!("Clicked '{}' via {}", target, handle.strategy());
        Ok(
            ActionOutcome::success(format!("Clicked '{}' ({})", target, handle.describe()))
                .with_strategy(handle.strategy()),
        )
    }

    async fn try_click_at(&self, x: f64, y: f64) -> ActionResult<ActionOutcome> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ActionError::validation("Coordinates must be finite numbers"));
        }
        let point = Point::new(x, y);
        bounded(self.settings.action_timeout, self.page.click_at(point))
            .await
            .map_err(|e| ActionError::execution("click", format!("({}, {})", x, y), e))?;

        Ok(ActionOutcome::success(format!("Clicked at ({}, {})", x, y))
            .with_strategy(Strategy::Coordinates))
    }

    async fn try_type_text(
        &self,
        target: Option<&TargetDescriptor>,
        text: &str,
        delay: Duration,
    ) -> ActionResult<ActionOutcome> {
        let label = target.map_or_else(|| "focused element".to_string(), |t| t.to_string());

        let strategy = match target {
            Some(target) => {
                let handle = self.resolve(target).await?;
                let focused = match handle.target() {
                    HandleTarget::Element(candidate) => {
                        bounded(
                            self.settings.action_timeout,
                            self.page.focus_element(&candidate.element),
                        )
                        .await
                    }
                    HandleTarget::Point(_) => self.press(&handle).await,
                };
                focused.map_err(|e| ActionError::execution("type_text", label.clone(), e))?;
                Some(handle.strategy())
            }
            None => None,
        };

        let mut typed = 0usize;
        for ch in text.chars() {
            if typed > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            bounded(self.settings.action_timeout, self.page.type_char(ch))
                .await
                .map_err(|e| ActionError::execution("type_text", label.clone(), e))?;
            typed += 1;
        }
        debug!("Typed {} characters into {}", typed, label);

        let outcome = ActionOutcome::success(format!("Typed {} characters into '{}'", typed, label));
        Ok(match strategy {
            Some(strategy) => outcome.with_strategy(strategy),
            None => outcome,
        })
    }

    async fn try_fill(&self, selector: &str, text: &str) -> ActionResult<ActionOutcome> {
        bounded(self.settings.action_timeout, self.page.fill(selector, text))
            .await
            .map_err(|e| match e {
                DriverError::InvalidSelector { selector, reason } => {
                    ActionError::from(ResolutionError::InvalidSelector { selector, reason })
                }
                DriverError::NoMatch(_) => ActionError::from(ResolutionError::NotFound {
                    target: selector.to_string(),
                    tried: vec![Strategy::CssSelector],
                }),
                other => ActionError::execution("fill", selector, other),
            })?;

        Ok(ActionOutcome::success(format!(
            "Filled '{}' with {} characters",
            selector,
            text.chars().count()
        ))
        .with_strategy(Strategy::CssSelector))
    }

    async fn try_scroll(&self, delta_x: f64, delta_y: f64) -> ActionResult<ActionOutcome> {
        if !delta_x.is_finite() || !delta_y.is_finite() {
            return Err(ActionError::validation("Scroll deltas must be finite numbers"));
        }
        let dx = delta_x.clamp(-MAX_SCROLL_DELTA, MAX_SCROLL_DELTA);
        let dy = delta_y.clamp(-MAX_SCROLL_DELTA, MAX_SCROLL_DELTA);

        if dx == 0.0 && dy == 0.0 {
            warn!("Scroll requested with zero deltas; page left as is");
            return Ok(ActionOutcome::success("Nothing to scroll: both deltas are 0"));
        }
        if dx != delta_x || dy != delta_y {
            debug!(
                "Clamped scroll ({}, {}) to ({}, {})",
                delta_x, delta_y, dx, dy
            );
        }

        let viewport = bounded(self.settings.action_timeout, self.page.viewport())
            .await
            .map_err(|e| ActionError::execution("scroll", "viewport", e))?;
        bounded(
            self.settings.action_timeout,
            self.page.wheel(viewport.center(), dx, dy),
        )
        .await
        .map_err(|e| ActionError::execution("scroll", "viewport", e))?;

        Ok(ActionOutcome::success(format!("Scrolled {}", describe_scroll(dx, dy))))
    }

    async fn try_drag_and_drop(
        &self,
        source: &TargetDescriptor,
        destination: &TargetDescriptor,
    ) -> ActionResult<ActionOutcome> {
        let from_handle = self.resolve(source).await?;
        let to_handle = self.resolve(destination).await?;

        let from = self
            .anchor(&from_handle)
            .await
            .map_err(|e| ActionError::execution("drag_and_drop", source.to_string(), e))?;
        let to = self
            .anchor(&to_handle)
            .await
            .map_err(|e| ActionError::execution("drag_and_drop", destination.to_string(), e))?;

        bounded(self.settings.action_timeout, self.page.drag(from, to))
            .await
            .map_err(|e| {
                ActionError::execution("drag_and_drop", format!("{} -> {}", source, destination), e)
            })?;

        info!(
            "Dragged '{}' ({}) onto '{}' ({})",
            source,
            from_handle.strategy(),
            destination,
            to_handle.strategy()
        );
        Ok(ActionOutcome::success(format!(
            "Dragged '{}' onto '{}' (destination via {})",
            source,
            destination,
            to_handle.strategy()
        ))
        .with_strategy(from_handle.strategy()))
    }

    async fn try_screenshot(&self, name_hint: Option<&str>) -> ActionResult<ActionOutcome> {
        let bytes = bounded(self.settings.action_timeout, self.page.screenshot_png())
            .await
            .map_err(|e| ActionError::execution("screenshot", "viewport", e))?;
        let path = screenshot::save_png(&self.settings.screenshot_dir, name_hint, &bytes).await?;

        let path = path.display().to_string();
        info!("Saved screenshot ({} bytes) to {}", bytes.len(), path);
        Ok(ActionOutcome::success(format!("Screenshot captured ({} bytes)", bytes.len()))
            .with_artifact(path))
    }
}

/// e.g. "down by 300px" or "up by 40px and right by 10px"
fn describe_scroll(dx: f64, dy: f64) -> String {
    let mut parts = Vec::new();
    if dy != 0.0 {
        let direction = if dy > 0.0 { "down" } else { "up" };
        parts.push(format!("{} by {}px", direction, dy.abs()));
    }
    if dx != 0.0 {
        let direction = if dx > 0.0 { "right" } else { "left" };
        parts.push(format!("{} by {}px", direction, dx.abs()));
    }
    parts.join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_direction_wording() {
        assert_eq!(describe_scroll(0.0, 300.0), "down by 300px");
        assert_eq!(describe_scroll(10.0, -40.0), "up by 40px and right by 10px");
        assert_eq!(describe_scroll(-5.5, 0.0), "left by 5.5px");
    }

    #[test]
    fn settings_follow_config() {
        let config = ActionsConfig {
            timeout_ms: 1200,
            type_delay_ms: 0,
            ..ActionsConfig::default()
        };
        let settings = ActionSettings::from(&config);
        assert_eq!(settings.action_timeout, Duration::from_millis(1200));
        assert!(settings.type_delay.is_zero());
        assert_eq!(settings.markup_max_length, DEFAULT_MARKUP_MAX_LENGTH);
    }
}
