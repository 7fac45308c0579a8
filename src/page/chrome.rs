//! [`BrowserPage`] over a chromiumoxide `Page`

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::error::CdpError;
use chromiumoxide::layout::Point as CdpPoint;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide_cdp::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide_cdp::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide_cdp::cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};

use super::scripts::{COLLECT_CANDIDATES, FILL_VALUE, VIEWPORT};
use super::{
    BrowserPage, CandidateQuery, DriverError, DriverResult, ElementCandidate, ElementRef, Point,
    Rect, WaitPolicy,
};

/// Shape returned by the in-page helper scripts
#[derive(Debug, Deserialize)]
struct ScriptReply<T> {
    ok: bool,
    items: Option<T>,
    error: Option<String>,
    message: Option<String>,
}

/// Live Chrome page
///
/// Cheap to clone: chromiumoxide pages share one CDP session handle.
#[derive(Clone, Debug)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// Underlying chromiumoxide page
    pub fn inner(&self) -> &Page {
        &self.page
    }

    async fn call_function<T: DeserializeOwned>(
        &self,
        declaration: &str,
        args: Vec<Value>,
    ) -> DriverResult<T> {
        let mut builder = CallFunctionOnParams::builder()
            .function_declaration(declaration)
            .return_by_value(true)
            .await_promise(true);
        for arg in args {
            builder = builder.argument(CallArgument::builder().value(arg).build());
        }
        let call = builder
            .build()
            .map_err(|e| DriverError::Evaluation(format!("Failed to build call params: {}", e)))?;

        let result = self
            .page
            .evaluate_function(call)
            .await
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;

        let value = result.value().cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| DriverError::Evaluation(format!("Unexpected script result: {}", e)))
    }

    async fn mouse(
        &self,
        kind: DispatchMouseEventType,
        at: Point,
        pressed: bool,
    ) -> DriverResult<()> {
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y);
        if pressed {
            builder = builder.button(MouseButton::Left).buttons(1).click_count(1);
        }
        let params = builder.build().map_err(DriverError::Protocol)?;
        self.page.execute(params).await.map_err(protocol)?;
        Ok(())
    }

    async fn key(&self, kind: DispatchKeyEventType, ch: char) -> DriverResult<()> {
        let (key, text) = match ch {
            '\n' | '\r' => ("Enter".to_string(), "\r".to_string()),
            '\t' => ("Tab".to_string(), "\t".to_string()),
            other => (other.to_string(), other.to_string()),
        };
        let mut builder = DispatchKeyEventParams::builder().r#type(kind.clone()).key(key);
        if matches!(kind, DispatchKeyEventType::KeyDown) {
            builder = builder.text(text);
        }
        let params = builder.build().map_err(DriverError::Protocol)?;
        self.page.execute(params).await.map_err(protocol)?;
        Ok(())
    }

    async fn find(&self, element: &ElementRef) -> DriverResult<chromiumoxide::element::Element> {
        self.page
            .find_element(element.selector())
            .await
            .map_err(|_| DriverError::Detached(element.to_string()))
    }
}

fn protocol(err: CdpError) -> DriverError {
    DriverError::Protocol(err.to_string())
}

fn script_failure(selector: &str, error: Option<String>, message: Option<String>) -> DriverError {
    let reason = message.unwrap_or_else(|| "unknown script failure".to_string());
    match error.as_deref() {
        Some("invalid-selector") => DriverError::InvalidSelector {
            selector: selector.to_string(),
            reason,
        },
        Some("not-found") => DriverError::NoMatch(selector.to_string()),
        Some("not-fillable") => DriverError::NotFillable {
            selector: selector.to_string(),
            reason,
        },
        _ => DriverError::Evaluation(reason),
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> DriverResult<()> {
        debug!("Navigating to {} (wait: {:?})", url, wait);
        match wait {
            WaitPolicy::Load => {
                self.page
                    .goto(url)
                    .await
                    .map_err(|e| DriverError::Navigation(e.to_string()))?;
                self.page
                    .wait_for_navigation()
                    .await
                    .map_err(|e| DriverError::Navigation(e.to_string()))?;
            }
            WaitPolicy::DomContentLoaded => {
                self.page
                    .goto(url)
                    .await
                    .map_err(|e| DriverError::Navigation(e.to_string()))?;
            }
            WaitPolicy::None => {
                self.page
                    .execute(NavigateParams::new(url))
                    .await
                    .map_err(|e| DriverError::Navigation(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<Option<String>> {
        self.page.url().await.map_err(protocol)
    }

    async fn evaluate(&self, script: &str) -> DriverResult<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn content(&self) -> DriverResult<String> {
        self.page.content().await.map_err(protocol)
    }

    async fn query(&self, query: &CandidateQuery) -> DriverResult<Vec<ElementCandidate>> {
        let (mode, arg) = match query {
            CandidateQuery::Interactive => ("interactive", Value::Null),
            CandidateQuery::Role(role) => ("role", json!(role.as_str())),
            CandidateQuery::Text(needle) => ("text", json!(needle)),
            CandidateQuery::Css(selector) => ("css", json!(selector)),
        };

        let reply: ScriptReply<Vec<ElementCandidate>> = self
            .call_function(COLLECT_CANDIDATES, vec![json!(mode), arg])
            .await?;

        if !reply.ok {
            let selector = match query {
                CandidateQuery::Css(selector) => selector.as_str(),
                _ => mode,
            };
            return Err(script_failure(selector, reply.error, reply.message));
        }

        let items = reply.items.unwrap_or_default();
        trace!("Query {:?} returned {} candidates", query, items.len());
        Ok(items)
    }

    async fn click_element(&self, element: &ElementRef) -> DriverResult<()> {
        let point = self.element_center(element).await?;
        self.click_at(point).await
    }

    async fn focus_element(&self, element: &ElementRef) -> DriverResult<()> {
        let handle = self.find(element).await?;
        handle.focus().await.map_err(protocol)?;
        Ok(())
    }

    async fn element_center(&self, element: &ElementRef) -> DriverResult<Point> {
        let handle = self.find(element).await?;
        handle.scroll_into_view().await.map_err(protocol)?;
        let point = handle
            .clickable_point()
            .await
            .map_err(|e| DriverError::Protocol(format!("element is not visible: {}", e)))?;
        Ok(Point::new(point.x, point.y))
    }

    async fn click_at(&self, point: Point) -> DriverResult<()> {
        self.page
            .click(CdpPoint { x: point.x, y: point.y })
            .await
            .map_err(protocol)?;
        Ok(())
    }

    async fn type_char(&self, ch: char) -> DriverResult<()> {
        self.key(DispatchKeyEventType::KeyDown, ch).await?;
        self.key(DispatchKeyEventType::KeyUp, ch).await
    }

    async fn fill(&self, selector: &str, text: &str) -> DriverResult<()> {
        let reply: ScriptReply<Value> = self
            .call_function(FILL_VALUE, vec![json!(selector), json!(text)])
            .await?;
        if reply.ok {
            Ok(())
        } else {
            Err(script_failure(selector, reply.error, reply.message))
        }
    }

    async fn wheel(&self, at: Point, delta_x: f64, delta_y: f64) -> DriverResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(at.x)
            .y(at.y)
            .delta_x(delta_x)
            .delta_y(delta_y)
            .build()
            .map_err(DriverError::Protocol)?;
        self.page.execute(params).await.map_err(protocol)?;
        Ok(())
    }

    async fn drag(&self, from: Point, to: Point) -> DriverResult<()> {
        let midway = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        self.mouse(DispatchMouseEventType::MouseMoved, from, false).await?;
        self.mouse(DispatchMouseEventType::MousePressed, from, true).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, midway, true).await?;
        self.mouse(DispatchMouseEventType::MouseMoved, to, true).await?;
        self.mouse(DispatchMouseEventType::MouseReleased, to, true).await
    }

    async fn screenshot_png(&self) -> DriverResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        self.page.screenshot(params).await.map_err(protocol)
    }

    async fn viewport(&self) -> DriverResult<Rect> {
        let value = self.evaluate(VIEWPORT).await?;
        serde_json::from_value(value)
            .map_err(|e| DriverError::Evaluation(format!("Unexpected viewport value: {}", e)))
    }
}
