//! Typed failure taxonomy for the fetch workflow.
//!
//! Nothing here is caught or retried inside the workflow; errors propagate
//! to the CLI layer, which reports them and exits non-zero.

use std::path::PathBuf;

/// Errors raised while driving the browser and collecting downloads.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Browser session failed to start: {0}")]
    SessionStart(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found on {url}: {locator}")]
    LocatorNotFound { locator: String, url: String },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No completed download appeared in {} within {waited_secs}s", dir.display())]
    DownloadTimeout { dir: PathBuf, waited_secs: u64 },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Convenience result type.
pub type FetchResult<T> = Result<T, FetchError>;
