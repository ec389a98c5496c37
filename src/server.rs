//! Application-under-test address abstraction.
//!
//! The harness does not deploy the checkout application; it consumes a base
//! URL from anything implementing [`AppServer`]. Deployments managed by an
//! outer runner (docker-compose, CI services) implement the trait; for an
//! already-running instance, [`ExternalServer`] wraps a plain URL.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// A reachable deployment of the checkout application.
///
/// Object-safe so orchestrators can hold `Box<dyn AppServer>` and stay
/// agnostic about who started the deployment.
#[async_trait]
pub trait AppServer: Send + Sync {
    /// Returns the base URL of the deployment, without a trailing slash
    /// (e.g. `http://localhost:8080`).
    fn base_url(&self) -> &str;

    /// Checks that the deployment is responsive before navigation, to fail
    /// fast when it is down. Defaults to assuming health.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Joins a path onto the base URL.
    fn url(&self, path: &str) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl fmt::Debug for dyn AppServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServer")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// An externally managed deployment identified only by its URL.
#[derive(Debug, Clone)]
pub struct ExternalServer {
    base_url: String,
}

impl ExternalServer {
    /// Wraps the URL of an already-running deployment.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AppServer for ExternalServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_server_url_joining() {
        let server = ExternalServer::new("http://localhost:8080");
        assert_eq!(server.url("/pay"), "http://localhost:8080/pay");
        assert_eq!(server.url("pay"), "http://localhost:8080/pay");

        let with_slash = ExternalServer::new("http://localhost:8080/");
        assert_eq!(with_slash.url("/pay"), "http://localhost:8080/pay");
    }
}
