//! Browser session lifecycle and process control.
//!
//! `BrowserSession` launches and owns the Chrome process for one or more
//! scenarios. Each scenario must drive its own page — concurrent scenarios
//! sharing a page would interleave their navigation.
//!
//! # Resource Safety
//!
//! `BrowserSession` relies on chromiumoxide's Drop to kill the Chrome process
//! even if a scenario panics, but explicit cleanup via `close()` is preferred
//! for graceful shutdown.

use crate::error::{HarnessError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Configuration for launching a browser session.
///
/// Defaults are tuned for headless CI runs; `visible()` helps when debugging
/// a flaky scenario locally.
#[derive(Debug, Clone)]
pub struct BrowserSessionConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Browser window size (default: 1920x1080).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,
}

impl BrowserSessionConfig {
    /// Creates a new config with defaults for headless runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables visible mode for debugging.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Adds additional Chrome arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args.extend(args);
        self
    }

    /// Converts to chromiumoxide `BrowserConfig`.
    #[allow(clippy::result_large_err)]
    fn to_browser_config(&self) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();

        if self.headless {
            config = config.arg("--headless");
        }

        config = config.arg(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));

        // Unique user data directory so parallel sessions don't collide on
        // Chrome's ProcessSingleton lock.
        let temp_dir = std::env::temp_dir();
        let unique_id = uuid::Uuid::new_v4();
        let user_data_dir = temp_dir.join(format!("checkout-e2e-{unique_id}"));
        config = config.arg(format!("--user-data-dir={}", user_data_dir.display()));

        for arg in &self.args {
            config = config.arg(arg.clone());
        }

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| HarnessError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for BrowserSessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            args: vec![
                // Required in containerized CI where user namespaces are
                // unavailable. Never run against untrusted content.
                "--no-sandbox".to_string(),
                // Prevents /dev/shm exhaustion in containers.
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A managed browser instance.
///
/// Wraps the Chrome process, handles lifecycle, and creates pages for
/// scenarios to navigate.
///
/// # Example
///
/// ```ignore
/// let session = BrowserSession::launch(BrowserSessionConfig::default()).await?;
/// let page = session.new_page().await?;
/// page.navigate("http://localhost:8080/").await?;
/// // scenario runs...
/// session.close().await?;
/// ```
pub struct BrowserSession {
    inner: Arc<Mutex<Option<Browser>>>,
}

impl BrowserSession {
    /// Launches a new browser instance with the given configuration.
    ///
    /// Spawns a Chrome process and establishes a CDP connection.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(config: BrowserSessionConfig) -> Result<Self> {
        debug!("launching browser with config: {:?}", config);

        let browser_config = config.to_browser_config()?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| HarnessError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // Drive the CDP event handler; required for chromiumoxide to make
        // progress on any page operation.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {}", e);
                }
            }
        });

        debug!("browser launched");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
        })
    }

    /// Creates a new browser page (tab).
    ///
    /// Each scenario owns exactly one page; pages have independent state.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the session has been closed.
    pub async fn new_page(&self) -> Result<Page> {
        let browser = self.inner.lock().await;

        let browser = browser.as_ref().ok_or(HarnessError::AlreadyClosed)?;

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarnessError::ConnectionFailed(e.to_string()))?;

        Ok(Page::new(chrome_page))
    }

    /// Closes the session and kills the Chrome process.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully.
    pub async fn close(self) -> Result<()> {
        let mut browser_guard = self.inner.lock().await;

        if let Some(mut browser) = browser_guard.take() {
            debug!("closing browser gracefully");
            browser
                .close()
                .await
                .map_err(|e| HarnessError::ConnectionFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Returns true if the session has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Can't await in Drop; chromiumoxide's Browser::drop kills the
        // Chrome process if close() was never called.
        warn!("BrowserSession dropped without explicit close() - forcing shutdown via Drop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chrome to be installed
    async fn session_launch_and_close() {
        let session = BrowserSession::launch(BrowserSessionConfig::default())
            .await
            .expect("failed to launch browser");

        assert!(!session.is_closed().await);

        session.close().await.expect("failed to close browser");
    }

    #[tokio::test]
    #[ignore]
    async fn session_create_page() {
        let session = BrowserSession::launch(BrowserSessionConfig::default())
            .await
            .expect("failed to launch");

        let page = session.new_page().await.expect("failed to create page");

        page.navigate("about:blank")
            .await
            .expect("failed to navigate");

        session.close().await.expect("failed to close");
    }
}
