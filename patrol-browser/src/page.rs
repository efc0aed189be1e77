use crate::error::BrowserError;
use crate::keys::Key;
use crate::Result;
use std::time::Duration;
use tracing::debug;
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One browser tab.
///
/// Wraps the CDP page with the interaction surface the scenarios need:
/// navigation, fill/click/keyboard, bounded waits, and viewport queries.
pub struct Page {
    inner: chromiumoxide::Page,
}

impl Page {
    pub fn new(inner: chromiumoxide::Page) -> Self {
        Self { inner }
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("goto {}", url);
        self.inner.goto(url).await?;
        self.inner.wait_for_navigation().await?;
        Ok(())
    }

    pub async fn reload(&self) -> Result<()> {
        self.inner.reload().await?;
        self.inner.wait_for_navigation().await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<Url> {
        let raw = self
            .inner
            .url()
            .await?
            .ok_or_else(|| BrowserError::InvalidUrl("page has no URL".to_string()))?;
        Url::parse(&raw).map_err(|e| BrowserError::InvalidUrl(e.to_string()))
    }

    /// Path component of the current URL.
    pub async fn current_path(&self) -> Result<String> {
        Ok(self.current_url().await?.path().to_string())
    }

    pub async fn title(&self) -> Result<String> {
        self.eval_value::<String>("document.title").await
    }

    /// Rendered HTML of the page.
    pub async fn content(&self) -> Result<String> {
        Ok(self.inner.content().await?)
    }

    pub async fn clear_local_storage(&self) -> Result<()> {
        self.inner.evaluate("localStorage.clear()").await?;
        Ok(())
    }

    /// Set an input's value the way a user-visible fill does: through the
    /// native value setter, followed by `input` and `change` events so the
    /// page's own validation observes the edit.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const setter = Object.getOwnPropertyDescriptor(
                    window.HTMLInputElement.prototype, 'value').set;
                setter.call(el, {val});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = js_string(selector),
            val = js_string(value),
        );

        if self.eval_value::<bool>(&expr).await? {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(selector.to_string()))
        }
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    pub async fn focus(&self, selector: &str) -> Result<()> {
        let element = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element.focus().await?;
        Ok(())
    }

    /// Type text into the focused element, one key at a time.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    /// Press a key against the page's focused element.
    pub async fn press(&self, key: Key) -> Result<()> {
        for event in key.events() {
            self.inner.execute(event).await?;
        }
        Ok(())
    }

    pub async fn value_of(&self, selector: &str) -> Result<String> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? el.value : null; }})()",
            sel = js_string(selector),
        );
        self.eval_value::<Option<String>>(&expr)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))
    }

    pub async fn class_of(&self, selector: &str) -> Result<String> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? el.className : null; }})()",
            sel = js_string(selector),
        );
        self.eval_value::<Option<String>>(&expr)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))
    }

    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none';
            }})()"#,
            sel = js_string(selector),
        );
        self.eval_value::<bool>(&expr).await
    }

    /// True if any part of the element intersects the viewport.
    pub async fn is_in_viewport(&self, selector: &str) -> Result<bool> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const height = window.innerHeight || document.documentElement.clientHeight;
                const width = window.innerWidth || document.documentElement.clientWidth;
                return rect.bottom > 0 && rect.right > 0 && rect.top < height && rect.left < width;
            }})()"#,
            sel = js_string(selector),
        );
        self.eval_value::<bool>(&expr).await
    }

    pub async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.scrollIntoView({{ block: 'center' }});
                return true;
            }})()"#,
            sel = js_string(selector),
        );
        if self.eval_value::<bool>(&expr).await? {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(selector.to_string()))
        }
    }

    /// True if the given text is present in the page's rendered body.
    pub async fn has_text(&self, text: &str) -> Result<bool> {
        let expr = format!(
            "document.body ? document.body.innerText.includes({}) : false",
            js_string(text),
        );
        self.eval_value::<bool>(&expr).await
    }

    /// Wait until the page URL contains `fragment`.
    pub async fn wait_for_url_contains(&self, fragment: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(url) = self.current_url().await
                && url.as_str().contains(fragment)
            {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::timeout(
                    format!("URL containing '{}'", fragment),
                    timeout.as_millis() as u64,
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until the element is present and visible.
    pub async fn wait_until_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_visible(selector).await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::timeout(
                    format!("visible element '{}'", selector),
                    timeout.as_millis() as u64,
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until the given text is visible somewhere on the page.
    pub async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.has_text(text).await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::timeout(
                    format!("text '{}'", text),
                    timeout.as_millis() as u64,
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until the element's class list contains one of `markers`.
    pub async fn wait_for_class(
        &self,
        selector: &str,
        markers: &[&str],
        timeout: Duration,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(class) = self.class_of(selector).await
                && markers.iter().any(|marker| class.contains(marker))
            {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::timeout(
                    format!("'{}' to carry one of {:?}", selector, markers),
                    timeout.as_millis() as u64,
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn eval_value<T: serde::de::DeserializeOwned>(&self, expr: &str) -> Result<T> {
        let result = self.inner.evaluate(expr).await?;
        result
            .into_value::<T>()
            .map_err(|e| BrowserError::Js(e.to_string()))
    }
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).expect("strings always serialize")
}
