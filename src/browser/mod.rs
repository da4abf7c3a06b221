//! Browser abstraction for the fetch workflow.
//!
//! Defines the `Driver` and `Session` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide). The workflow
//! only ever needs three capabilities: navigate, click a link, close.

pub mod chromium;

use crate::error::FetchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stable way to find one link on the download page.
///
/// Links are matched by an href fragment under the page's `main` content
/// rather than by positional paths.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    /// CSS selector for the element.
    pub css: &'static str,
    /// Human-readable description used in logs and errors.
    pub describe: &'static str,
}

/// The link a click resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickedLink {
    /// The href attribute of the clicked anchor.
    pub href: String,
    /// The anchor's visible text.
    pub text: String,
}

/// A browser engine that can open controllable sessions.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Launch the browser and open a blank page, ready to navigate.
    async fn open(&self) -> FetchResult<Box<dyn Session>>;
}

/// One live browser page under our control.
#[async_trait]
pub trait Session: Send {
    /// Load a URL, bounded by the configured navigation timeout.
    async fn navigate(&mut self, url: &str) -> FetchResult<()>;

    /// Find the link matching `locator` and click it.
    ///
    /// Returns `LocatorNotFound` without side effects when no element
    /// matches.
    async fn click_link(&mut self, locator: &Locator) -> FetchResult<ClickedLink>;

    /// Release the browser. Consumes the session so it can close only once.
    async fn close(self: Box<Self>) -> FetchResult<()>;
}
