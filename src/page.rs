use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::element::Element;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const READY_STATE_JS: &str = "document.readyState";

/// The blank document a fresh tab starts on is already `complete`; it must not
/// be mistaken for the document being navigated to.
const NAVIGATED_READY_STATE_JS: &str =
    "location.href === 'about:blank' ? 'loading' : document.readyState";

/// Document readiness levels, in the order the browser passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    fn parse(state: &str) -> Self {
        match state {
            "complete" => ReadyState::Complete,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Loading,
        }
    }
}

/// Wrapper around a chromiumoxide Page with a simplified, agent-friendly API.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self { inner, default_timeout }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to `url` and return once DOMContentLoaded has fired.
    /// Does not wait for subresources or network idle.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let attempt = async {
            let response = self.inner.execute(NavigateParams::new(url)).await?;
            if let Some(error_text) = response.result.error_text.as_deref() {
                return Err(Error::NavigationError(format!("{url}: {error_text}")));
            }
            let probe = if url == "about:blank" {
                READY_STATE_JS
            } else {
                NAVIGATED_READY_STATE_JS
            };
            while self.evaluate_ready_state(probe).await < ReadyState::Interactive {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Ok::<(), Error>(())
        };

        tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| Error::Timeout(format!("navigation to {url} after {timeout:?}")))?
    }

    /// Poll `document.readyState` until it reaches `target`.
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_for_ready_state(&self, target: ReadyState, timeout: Duration) -> bool {
        let reached = async {
            while self.ready_state().await < target {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, reached).await.is_ok()
    }

    /// Current document readiness. Evaluation failures during a navigation
    /// count as still loading.
    pub async fn ready_state(&self) -> ReadyState {
        self.evaluate_ready_state(READY_STATE_JS).await
    }

    async fn evaluate_ready_state(&self, expression: &str) -> ReadyState {
        match self.inner.evaluate(expression).await {
            Ok(result) => result
                .into_value::<String>()
                .map(|s| ReadyState::parse(&s))
                .unwrap_or(ReadyState::Loading),
            Err(_) => ReadyState::Loading,
        }
    }

    /// Override the user agent for every request made by this page.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.inner
            .execute(SetUserAgentOverrideParams::new(user_agent))
            .await?;
        Ok(())
    }

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Dispatch a mouse click at viewport coordinates.
    pub async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.inner.click(Point { x, y }).await?;
        Ok(())
    }

    /// Wait for an element matching the given CSS selector to appear in the DOM.
    /// Polls every 100ms up to the configured default timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<Element> {
        let timeout = self.default_timeout;
        let start = std::time::Instant::now();

        loop {
            match self.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "selector `{selector}` after {timeout:?}"
                    )));
                }
            }
        }
    }

    // ── Observations ────────────────────────────────────────────────

    /// Capture the whole scrollable page as JPEG and write it to `path`.
    pub async fn save_full_page_jpeg(&self, path: impl AsRef<Path>, quality: u8) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(i64::from(quality))
            .full_page(true)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))?;
        Ok(())
    }

    /// Evaluate a JavaScript expression without caring about the return value.
    pub async fn evaluate_void(&self, expression: &str) -> Result<()> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(Element::new(el))
    }

    /// Find all elements matching the given CSS selector, in document order.
    /// An empty result is not an error.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self.inner.find_elements(selector).await?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}
