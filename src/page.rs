//! Low-level page operations: the browser capability surface.
//!
//! `Page` wraps a chromiumoxide tab and exposes exactly the capabilities the
//! flow model consumes: navigation, label-relative field access, clicking,
//! visibility and text queries. Nothing here caches page state — every query
//! re-reads the live DOM, so the flow model above can never observe stale
//! values.
//!
//! All dynamic strings (labels, selectors, values) are embedded into
//! evaluated scripts via JSON encoding, which prevents injection through
//! backticks, quotes, or newlines.

use crate::error::{HarnessError, Result};
use crate::wait::{try_wait_until, WaitConfig, WaitOutcome};
use chromiumoxide::page::Page as ChromePage;
use tracing::debug;

/// Returns a JS expression that resolves a field input relative to its
/// visible label text, following the application's markup: a label element
/// whose parent contains the `.input__control` input.
fn labeled_input_lookup(label_json: &str) -> String {
    format!(
        "const labelEl = Array.from(document.querySelectorAll('span'))\
           .find((el) => el.textContent.trim() === {label_json});\
         const input = labelEl && labelEl.parentElement\
           ? labelEl.parentElement.querySelector('.input__control') : null;"
    )
}

/// A browser tab bound to one scenario.
///
/// Created by [`BrowserSession::new_page`](crate::browser::BrowserSession::new_page);
/// scenarios never construct pages directly.
#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
}

impl Page {
    pub(crate) fn new(page: ChromePage) -> Self {
        Self { inner: page }
    }

    /// Navigates to an absolute URL and waits for the document to be ready.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the page fails to load, or
    /// `WaitTimeout` if it never reaches `readyState === "complete"`.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("navigating to {}", url);

        self.inner
            .goto(url)
            .await
            .map_err(|e| HarnessError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(WaitConfig::default()).await
    }

    /// Waits for the document load to complete.
    ///
    /// Called automatically by `navigate()`. A document that never becomes
    /// ready is an infrastructural failure, so the timeout here is converted
    /// into an error rather than reported as a wait outcome.
    pub async fn wait_for_load(&self, config: WaitConfig) -> Result<()> {
        let outcome = try_wait_until(
            || async {
                let ready: String = self.evaluate("document.readyState").await?;
                Ok(ready == "complete")
            },
            config,
        )
        .await?;

        if outcome.succeeded {
            Ok(())
        } else {
            Err(HarnessError::WaitTimeout {
                condition: "document ready".to_string(),
                timeout: config.timeout,
            })
        }
    }

    /// Executes JavaScript in the page context and returns the result.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails or the result cannot be
    /// deserialized into `T`.
    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| HarnessError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| HarnessError::ScriptExecutionFailed(e.to_string()))
    }

    /// Returns true if the first element matching `selector` is rendered
    /// and visible. Absence is `false`, never an error.
    pub async fn selector_visible(&self, selector: &str) -> Result<bool> {
        let sel = encode(selector)?;
        let script = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return false; \
               const style = window.getComputedStyle(el); \
               return style.display !== 'none' && style.visibility !== 'hidden' \
                 && el.getClientRects().length > 0; \
             }})()"
        );

        self.evaluate(&script).await
    }

    /// Polls until the element matching `selector` is visible.
    ///
    /// Timing out is a normal outcome; callers that require the element
    /// (page-state constructors) convert it into `WaitTimeout` themselves.
    pub async fn wait_visible(
        &self,
        selector: &str,
        config: WaitConfig,
    ) -> Result<WaitOutcome<bool>> {
        try_wait_until(|| self.selector_visible(selector), config).await
    }

    /// Returns the trimmed text of the first *visible* element matching
    /// `selector`, or `None` if no visible match exists.
    pub async fn visible_text(&self, selector: &str) -> Result<Option<String>> {
        let sel = encode(selector)?;
        let script = format!(
            "(() => {{ \
               const match = Array.from(document.querySelectorAll({sel})).find((el) => {{ \
                 const style = window.getComputedStyle(el); \
                 return style.display !== 'none' && style.visibility !== 'hidden' \
                   && el.getClientRects().length > 0; \
               }}); \
               return match ? match.textContent.trim() : null; \
             }})()"
        );

        self.evaluate(&script).await
    }

    /// Writes `value` into the input identified by its visible label text.
    ///
    /// Uses the native value setter and dispatches an `input` event so
    /// framework-controlled inputs observe the change.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the label or its input does not exist.
    pub async fn set_labeled_field(&self, label: &str, value: &str) -> Result<()> {
        let label_json = encode(label)?;
        let value_json = encode(value)?;
        let lookup = labeled_input_lookup(&label_json);
        let script = format!(
            "(() => {{ \
               {lookup} \
               if (!input) return false; \
               const setter = Object.getOwnPropertyDescriptor( \
                 window.HTMLInputElement.prototype, 'value').set; \
               setter.call(input, {value_json}); \
               input.dispatchEvent(new Event('input', {{ bubbles: true }})); \
               return true; \
             }})()"
        );

        let found: bool = self.evaluate(&script).await?;
        if found {
            Ok(())
        } else {
            Err(HarnessError::ElementNotFound {
                locator: format!("field labeled '{label}'"),
            })
        }
    }

    /// Erases the input identified by its visible label text without
    /// submitting: select-all then delete. Idempotent — clearing an
    /// already-empty field is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the label or its input does not exist.
    pub async fn clear_labeled_field(&self, label: &str) -> Result<()> {
        let label_json = encode(label)?;
        let lookup = labeled_input_lookup(&label_json);
        let script = format!(
            "(() => {{ \
               {lookup} \
               if (!input) return false; \
               input.focus(); \
               input.select(); \
               const setter = Object.getOwnPropertyDescriptor( \
                 window.HTMLInputElement.prototype, 'value').set; \
               setter.call(input, ''); \
               input.dispatchEvent(new Event('input', {{ bubbles: true }})); \
               return true; \
             }})()"
        );

        let found: bool = self.evaluate(&script).await?;
        if found {
            Ok(())
        } else {
            Err(HarnessError::ElementNotFound {
                locator: format!("field labeled '{label}'"),
            })
        }
    }

    /// Returns the current value of the input identified by its label.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the label or its input does not exist.
    pub async fn labeled_field_value(&self, label: &str) -> Result<String> {
        let label_json = encode(label)?;
        let lookup = labeled_input_lookup(&label_json);
        let script =
            format!("(() => {{ {lookup} return input ? input.value : null; }})()");

        let value: Option<String> = self.evaluate(&script).await?;
        value.ok_or_else(|| HarnessError::ElementNotFound {
            locator: format!("field labeled '{label}'"),
        })
    }

    /// Clicks the button whose trimmed text equals `caption`.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if no such button exists.
    pub async fn click_button(&self, caption: &str) -> Result<()> {
        let caption_json = encode(caption)?;
        let script = format!(
            "(() => {{ \
               const button = Array.from(document.querySelectorAll('button')) \
                 .find((el) => el.textContent.trim() === {caption_json}); \
               if (!button) return false; \
               button.click(); \
               return true; \
             }})()"
        );

        let found: bool = self.evaluate(&script).await?;
        if found {
            Ok(())
        } else {
            Err(HarnessError::ElementNotFound {
                locator: format!("button '{caption}'"),
            })
        }
    }

    /// Clicks the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if no element matches.
    pub async fn click(&self, selector: &str) -> Result<()> {
        let sel = encode(selector)?;
        let script = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return false; \
               el.click(); \
               return true; \
             }})()"
        );

        let found: bool = self.evaluate(&script).await?;
        if found {
            Ok(())
        } else {
            Err(HarnessError::ElementNotFound {
                locator: selector.to_string(),
            })
        }
    }

    /// Returns the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Closes the page.
    pub async fn close(self) -> Result<()> {
        self.inner.close().await.map_err(HarnessError::ChromiumOxide)
    }
}

/// JSON-encodes a string for safe embedding in an evaluated script.
fn encode(raw: &str) -> Result<String> {
    serde_json::to_string(raw).map_err(|e| HarnessError::ScriptExecutionFailed(e.to_string()))
}
