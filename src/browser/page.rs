//! Thin driver over a chromiumoxide [`Page`]: locate a visible element for a
//! strategy, click through real CDP mouse events, and probe for a selector.
//!
//! Element lookup runs inside the page as JavaScript so text-based
//! strategies work the same way attribute-based ones do.

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::Page;
use tokio::time::Instant;

use crate::error::{RangepilotError, Result};
use crate::range::strategy::Strategy;

/// Viewport coordinates of an element's center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub struct PageDriver<'a> {
    page: &'a Page,
    poll_interval: Duration,
}

impl<'a> PageDriver<'a> {
    pub fn new(page: &'a Page, poll_interval: Duration) -> Self {
        Self {
            page,
            poll_interval,
        }
    }

    /// Poll for a visible element matching `strategy` until `timeout`.
    /// Returns the element's center, scrolled into view, or `None` if
    /// nothing visible turned up in time.
    pub async fn locate_visible(&self, strategy: &Strategy, timeout: Duration) -> Option<Point> {
        let js = locate_js(strategy);
        let deadline = Instant::now() + timeout;

        loop {
            match self.eval(&js).await {
                Ok(value) => {
                    let x = value.get("x").and_then(|v| v.as_f64());
                    let y = value.get("y").and_then(|v| v.as_f64());
                    if let (Some(x), Some(y)) = (x, y) {
                        return Some(Point { x, y });
                    }
                }
                Err(e) => {
                    tracing::debug!(%strategy, error = %e, "locate probe failed");
                }
            }

            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Click at viewport coordinates. Move the mouse to the target first so
    /// the browser updates its hit-test target, then press and release;
    /// without the move CDP may not dispatch the click to the right element.
    pub async fn click_at(&self, point: Point) -> Result<()> {
        self.dispatch(
            DispatchMouseEventParams::builder()
                .r#type(DispatchMouseEventType::MouseMoved)
                .x(point.x)
                .y(point.y)
                .build()
                .map_err(RangepilotError::Other)?,
        )
        .await?;

        self.dispatch(
            DispatchMouseEventParams::builder()
                .r#type(DispatchMouseEventType::MousePressed)
                .x(point.x)
                .y(point.y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(RangepilotError::Other)?,
        )
        .await?;

        self.dispatch(
            DispatchMouseEventParams::builder()
                .r#type(DispatchMouseEventType::MouseReleased)
                .x(point.x)
                .y(point.y)
                .button(MouseButton::Left)
                .click_count(1)
                .build()
                .map_err(RangepilotError::Other)?,
        )
        .await?;

        Ok(())
    }

    /// Poll until `selector` matches something, or `timeout` elapses
    pub async fn selector_present(&self, selector: &str, timeout: Duration) -> bool {
        let js = format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        );
        let deadline = Instant::now() + timeout;

        loop {
            match self.eval(&js).await {
                Ok(value) if value.as_bool() == Some(true) => return true,
                Ok(_) => {}
                Err(e) => tracing::debug!(selector, error = %e, "presence probe failed"),
            }

            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn dispatch(&self, params: DispatchMouseEventParams) -> Result<()> {
        self.page
            .execute(params)
            .await
            .map(|_| ())
            .map_err(|e| RangepilotError::CdpError(e.to_string()))
    }

    async fn eval(&self, js: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| RangepilotError::JavaScriptError(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}

/// Escape a Rust string into a JS string literal
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Candidate-collection expression for one strategy
fn candidates_js(strategy: &Strategy) -> String {
    match strategy {
        Strategy::Css(css) => {
            format!("document.querySelectorAll({})", js_string(css))
        }
        Strategy::CssText { css, text } => format!(
            "Array.from(document.querySelectorAll({})).filter((el) => (el.textContent || '').trim().includes({}))",
            js_string(css),
            js_string(text),
        ),
        Strategy::Text(text) => format!(
            "Array.from(document.querySelectorAll('div, button, span, a')).filter((el) => (el.textContent || '').trim() === {})",
            js_string(text),
        ),
    }
}

/// Probe that returns the center of the first visible candidate, after
/// scrolling it into view, or null
fn locate_js(strategy: &Strategy) -> String {
    format!(
        r#"(function() {{
    function visible(el) {{
        if (!el) return false;
        const style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') return false;
        const rect = el.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }}
    for (const el of {candidates}) {{
        if (!visible(el)) continue;
        el.scrollIntoView({{ behavior: 'instant', block: 'center', inline: 'center' }});
        const rect = el.getBoundingClientRect();
        return {{ x: rect.left + rect.width / 2, y: rect.top + rect.height / 2 }};
    }}
    return null;
}})()"#,
        candidates = candidates_js(strategy)
    )
}
