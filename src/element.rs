use chromiumoxide::element::Element as CrElement;

use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Element, providing a simplified API.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await?;
        Ok(())
    }

    pub async fn focus(&self) -> Result<()> {
        self.inner.focus().await?;
        Ok(())
    }

    /// Type text into whatever has focus; call `focus` first.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.type_str(text).await?;
        Ok(())
    }

    pub async fn scroll_into_view(&self) -> Result<()> {
        self.inner.scroll_into_view().await?;
        Ok(())
    }

    /// Whether this element is the document's active element.
    pub async fn has_focus(&self) -> Result<bool> {
        self.eval_bool("function() { return document.activeElement === this; }")
            .await
    }

    /// False once the node has left the document or the document itself is gone.
    pub async fn is_attached(&self) -> bool {
        self.eval_bool("function() { return this.isConnected; }")
            .await
            .unwrap_or(false)
    }

    async fn eval_bool(&self, function: &str) -> Result<bool> {
        let returns = self.inner.call_js_fn(function, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    /// Centre of the element's box in viewport coordinates.
    pub async fn center(&self) -> Result<(f64, f64)> {
        let point = self
            .inner
            .clickable_point()
            .await
            .map_err(|e| Error::ElementNotFound(format!("element has no visible box: {e}")))?;
        Ok((point.x, point.y))
    }

    /// Get the value of an attribute on this element.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.inner.attribute(name).await?)
    }

    /// Read a live DOM property as a string. Missing, null and non-string
    /// values come back as an empty string.
    pub async fn property_string(&self, name: &str) -> Result<String> {
        let value = self.inner.property(name).await?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        })
    }

    /// Find a child element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))?;
        Ok(Element::new(el))
    }

    /// Find all descendants matching the given CSS selector, in document order.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self.inner.find_elements(selector).await?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}
