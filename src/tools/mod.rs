//! Browser automation tools and the registry that dispatches to them
//!
//! Each action kind is one [`Tool`] with a typed, schema-described argument
//! struct. [`ToolRegistry`] erases them behind a single
//! `dispatch(name, json) -> String` entry point; every failure comes back as
//! a string starting with `"Error: "`.

mod click;
mod drag_and_drop;
mod fill;
mod find_text;
mod get_markup;
mod list_elements;
mod navigate;
mod screenshot;
mod scroll;
mod task_complete;
mod type_text;

pub use click::{BROWSER_CLICK, BrowserClickArgs, BrowserClickTool};
pub use drag_and_drop::{BROWSER_DRAG_AND_DROP, BrowserDragAndDropArgs, BrowserDragAndDropTool};
pub use fill::{BROWSER_FILL, BrowserFillArgs, BrowserFillTool};
pub use find_text::{BROWSER_FIND_TEXT, BrowserFindTextArgs, BrowserFindTextTool};
pub use get_markup::{BROWSER_GET_MARKUP, BrowserGetMarkupArgs, BrowserGetMarkupTool};
pub use list_elements::{BROWSER_LIST_ELEMENTS, BrowserListElementsArgs, BrowserListElementsTool};
pub use navigate::{BROWSER_NAVIGATE, BrowserNavigateArgs, BrowserNavigateTool};
pub use screenshot::{BROWSER_SCREENSHOT, BrowserScreenshotArgs, BrowserScreenshotTool};
pub use scroll::{BROWSER_SCROLL, BrowserScrollArgs, BrowserScrollTool};
pub use task_complete::{BROWSER_TASK_COMPLETE, BrowserTaskCompleteArgs, BrowserTaskCompleteTool};
pub use type_text::{BROWSER_TYPE_TEXT, BrowserTypeTextArgs, BrowserTypeTextTool};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::outcome::ActionOutcome;
use crate::resolver::TargetDescriptor;
use crate::session::BrowserSession;
use crate::utils::{ActionError, ActionResult};

/// One planner-visible action
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;

    fn name() -> &'static str;

    fn description() -> &'static str;

    /// Whether the tool leaves the page untouched
    fn read_only() -> bool;

    /// Whether the planner loop should stop after this tool
    fn terminal() -> bool {
        false
    }

    async fn execute(&self, args: Self::Args) -> ActionResult<ActionOutcome>;
}

/// Name, description and argument schema of a registered tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub read_only: bool,
    pub terminal: bool,
    pub input_schema: Value,
}

/// Schema of a tool type, no instance needed
pub fn schema_of<T: Tool>() -> ToolSchema {
    ToolSchema {
        name: T::name(),
        description: T::description(),
        read_only: T::read_only(),
        terminal: T::terminal(),
        input_schema: schemars::schema_for!(T::Args).to_value(),
    }
}

/// Schemas of every tool `ToolRegistry::for_session` registers, in the same order
pub fn browser_tool_schemas() -> Vec<ToolSchema> {
    vec![
        schema_of::<BrowserNavigateTool>(),
        schema_of::<BrowserListElementsTool>(),
        schema_of::<BrowserClickTool>(),
        schema_of::<BrowserFillTool>(),
        schema_of::<BrowserTypeTextTool>(),
        schema_of::<BrowserScrollTool>(),
        schema_of::<BrowserDragAndDropTool>(),
        schema_of::<BrowserScreenshotTool>(),
        schema_of::<BrowserGetMarkupTool>(),
        schema_of::<BrowserFindTextTool>(),
        schema_of::<BrowserTaskCompleteTool>(),
    ]
}

#[async_trait]
trait ErasedTool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    fn name(&self) -> &'static str;

    fn terminal(&self) -> bool;

    async fn call(&self, args: Value) -> ActionResult<ActionOutcome>;
}

struct Registered<T>(T);

#[async_trait]
impl<T: Tool> ErasedTool for Registered<T> {
    fn schema(&self) -> ToolSchema {
        schema_of::<T>()
    }

    fn name(&self) -> &'static str {
        T::name()
    }

    fn terminal(&self) -> bool {
        T::terminal()
    }

    async fn call(&self, args: Value) -> ActionResult<ActionOutcome> {
        // Tools without arguments may be called with no args at all
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let parsed: T::Args = serde_json::from_value(args)
            .map_err(|e| ActionError::validation(format!("{} arguments: {}", T::name(), e)))?;
        self.0.execute(parsed).await
    }
}

/// Registered tools for one page, dispatched one at a time
pub struct ToolRegistry {
    tools: Vec<Box<dyn ErasedTool>>,
    serial: Mutex<()>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            serial: Mutex::new(()),
        }
    }

    /// Every browser tool, bound to `session`
    pub fn for_session(session: BrowserSession) -> Self {
        let mut registry = Self::new();
        registry.register(BrowserNavigateTool::new(session.clone()));
        registry.register(BrowserListElementsTool::new(session.clone()));
        registry.register(BrowserClickTool::new(session.clone()));
        registry.register(BrowserFillTool::new(session.clone()));
        registry.register(BrowserTypeTextTool::new(session.clone()));
        registry.register(BrowserScrollTool::new(session.clone()));
        registry.register(BrowserDragAndDropTool::new(session.clone()));
        registry.register(BrowserScreenshotTool::new(session.clone()));
        registry.register(BrowserGetMarkupTool::new(session.clone()));
        registry.register(BrowserFindTextTool::new(session));
        registry.register(BrowserTaskCompleteTool);
        registry
    }

    /// Add a tool; a tool with the same name is replaced
    pub fn register<T: Tool>(&mut self, tool: T) -> &mut Self {
        if let Some(pos) = self.tools.iter().position(|t| t.name() == T::name()) {
            warn!("Replacing already registered tool {}", T::name());
            self.tools.remove(pos);
        }
        self.tools.push(Box::new(Registered(tool)));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.find(name).is_some_and(|t| t.terminal())
    }

    /// Run one tool and render its outcome for the planner
    pub async fn dispatch(&self, name: &str, args: Value) -> String {
        self.dispatch_outcome(name, args).await.to_string()
    }

    pub async fn dispatch_outcome(&self, name: &str, args: Value) -> ActionOutcome {
        let Some(tool) = self.find(name) else {
            warn!("Unknown tool requested: {}", name);
            return ActionError::validation(format!(
                "Unknown tool '{}'. Available tools: {}",
                name,
                self.names().join(", ")
            ))
            .into();
        };

        let _turn = self.serial.lock().await;
        match tool.call(args).await {
            Ok(outcome) => {
                if outcome.success {
                    info!(tool = name, strategy = ?outcome.strategy_used, "Tool succeeded");
                    debug!(tool = name, "{}", outcome.message);
                } else {
                    warn!(tool = name, "{}", outcome.message);
                }
                outcome
            }
            Err(err) => {
                warn!(tool = name, kind = err.kind(), "{}", err);
                err.into()
            }
        }
    }

    fn find(&self, name: &str) -> Option<&dyn ErasedTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }
}

/// Loose element target accepted by the pointer and keyboard tools
///
/// Exactly one form must be given: `target` text, a `selector`, or both
/// `x` and `y`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TargetArgs {
    /// Visible text or accessible name, e.g. "Submit" or "Sign in"
    #[serde(default, alias = "text")]
    pub target: Option<String>,

    /// CSS selector, used as-is
    #[serde(default)]
    pub selector: Option<String>,

    /// Viewport x coordinate in CSS pixels
    #[serde(default)]
    pub x: Option<f64>,

    /// Viewport y coordinate in CSS pixels
    #[serde(default)]
    pub y: Option<f64>,
}

impl TargetArgs {
    pub fn is_empty(&self) -> bool {
        self.target.is_none() && self.selector.is_none() && self.x.is_none() && self.y.is_none()
    }

    /// Validate and convert into a descriptor
    pub fn to_descriptor(&self) -> ActionResult<TargetDescriptor> {
        let forms = [
            self.target.is_some(),
            self.selector.is_some(),
            self.x.is_some() || self.y.is_some(),
        ]
        .iter()
        .filter(|given| **given)
        .count();
        if forms != 1 {
            return Err(ActionError::validation(
                "Give exactly one of: target text, selector, or x and y",
            ));
        }

        if let Some(text) = &self.target {
            return Ok(TargetDescriptor::text(require_text("target", text)?));
        }
        if let Some(selector) = &self.selector {
            return Ok(TargetDescriptor::css(require_text("selector", selector)?));
        }
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                Ok(TargetDescriptor::coordinates(x.round() as i64, y.round() as i64))
            }
            (Some(_), Some(_)) => Err(ActionError::validation(
                "Coordinates must be finite numbers",
            )),
            _ => Err(ActionError::validation("Coordinates need both x and y")),
        }
    }

    /// `None` when no target field is set at all
    pub fn to_optional_descriptor(&self) -> ActionResult<Option<TargetDescriptor>> {
        if self.is_empty() {
            Ok(None)
        } else {
            self.to_descriptor().map(Some)
        }
    }
}

/// Reject blank strings; returns the value trimmed
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> ActionResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(value: Value) -> TargetArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn target_forms_map_to_descriptors() {
        assert_eq!(
            target(serde_json::json!({"target": " Submit "})).to_descriptor().unwrap(),
            TargetDescriptor::text("Submit")
        );
        assert_eq!(
            target(serde_json::json!({"selector": "#go"})).to_descriptor().unwrap(),
            TargetDescriptor::css("#go")
        );
        assert_eq!(
            target(serde_json::json!({"x": 10.4, "y": 20.6})).to_descriptor().unwrap(),
            TargetDescriptor::coordinates(10, 21)
        );
    }

    #[test]
    fn ambiguous_or_partial_targets_are_rejected() {
        assert!(target(serde_json::json!({"target": "a", "selector": "b"})).to_descriptor().is_err());
        assert!(target(serde_json::json!({"x": 1.0})).to_descriptor().is_err());
        assert!(target(serde_json::json!({"target": "   "})).to_descriptor().is_err());
        assert!(target(serde_json::json!({})).to_descriptor().is_err());
    }

    #[test]
    fn text_is_accepted_for_target() {
        assert_eq!(
            target(serde_json::json!({"text": "Log in"})).to_descriptor().unwrap(),
            TargetDescriptor::text("Log in")
        );
    }

    #[test]
    fn every_tool_has_an_object_schema() {
        let schemas = browser_tool_schemas();
        assert_eq!(schemas.len(), 11);
        for schema in &schemas {
            assert!(schema.name.starts_with("browser_"));
            assert!(schema.input_schema.is_object(), "{}", schema.name);
        }
        let terminal: Vec<_> = schemas.iter().filter(|s| s.terminal).map(|s| s.name).collect();
        assert_eq!(terminal, vec![BROWSER_TASK_COMPLETE]);
    }

    #[test]
    fn empty_target_is_optional() {
        assert_eq!(TargetArgs::default().to_optional_descriptor().unwrap(), None);
    }
}
