//! Error types for the checkout verification harness.
//!
//! The taxonomy deliberately excludes "a wait timed out while polling": a
//! timeout is a normal, expected outcome encoded in
//! [`WaitOutcome`](crate::wait::WaitOutcome) and interpreted by the caller.
//! The variants here are infrastructural failures — a broken browser session,
//! a missing element, a dead database connection — which abort the scenario
//! because retrying cannot fix them.

use std::time::Duration;
use thiserror::Error;

/// The main error type for all harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Failed to launch the browser process.
    ///
    /// This typically occurs when Chrome/Chromium is not installed,
    /// or when there are permission issues with the executable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to establish Chrome DevTools Protocol connection.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL failed or timed out.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A page failed to reach a state that the flow model requires.
    ///
    /// Page-state constructors block until their defining marker renders;
    /// a marker that never appears means the application is broken or
    /// unreachable, not that an assertion failed.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before giving up
        timeout: Duration,
    },

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// A locator resolved to nothing on the live page.
    ///
    /// Raised by write operations (fill, clear, click) whose target must
    /// exist. Read operations report absence as `false`/`None` instead.
    #[error("element not found: {locator}")]
    ElementNotFound {
        /// The label or selector that failed to resolve
        locator: String,
    },

    /// An operation was attempted on a closed browser session.
    #[error("browser session is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// The backend query collaborator itself failed (connection loss,
    /// malformed statement). Distinct from "no rows yet", which is valid.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
