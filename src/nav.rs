//! Navigation entry point for one scenario.
//!
//! `Navigator` is pure sequencing: it reopens the application at its landing
//! address and hands back a fresh [`StartPage`]. All further transitions are
//! driven through the page-state objects themselves. It holds nothing beyond
//! the page handle and the deployment address, and must not be shared
//! between scenarios — each scenario owns an isolated page.

use crate::error::Result;
use crate::flow::StartPage;
use crate::page::Page;
use crate::server::AppServer;
use tracing::debug;

/// Sequences page-state transitions for one scenario.
pub struct Navigator {
    page: Page,
    server: Box<dyn AppServer>,
}

impl Navigator {
    /// Binds a scenario's page to a deployment.
    pub fn new(page: Page, server: impl AppServer + 'static) -> Self {
        Self {
            page,
            server: Box::new(server),
        }
    }

    /// Opens the application at its landing address and waits for the
    /// landing page to render.
    ///
    /// Always the entry point: every scenario starts with a fresh
    /// navigation, never by reusing a previous screen.
    pub async fn open_start(&self) -> Result<StartPage<'_>> {
        self.server.health_check().await?;

        let url = self.server.base_url();
        debug!("opening landing page at {}", url);
        self.page.navigate(url).await?;

        StartPage::attach(&self.page).await
    }

    /// The underlying page handle, for driver-level assertions in tests.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Releases the page at the end of the scenario.
    pub async fn close(self) -> Result<()> {
        self.page.close().await
    }
}
