//! Chromium-backed driver using chromiumoxide.

use super::{ClickedLink, Driver, Locator, Session};
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. GOATHERD_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("GOATHERD_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.goatherd/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".goatherd/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".goatherd/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".goatherd/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".goatherd/chromium/chrome-linux64/chrome"),
                home.join(".goatherd/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Driver that launches a fresh Chromium per session.
pub struct ChromiumDriver {
    download_dir: PathBuf,
    nav_timeout: Duration,
    headless: bool,
}

impl ChromiumDriver {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            nav_timeout: config.nav_timeout,
            headless: config.headless,
        }
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn open(&self) -> FetchResult<Box<dyn Session>> {
        let chrome_path = find_chromium().ok_or_else(|| {
            FetchError::SessionStart(
                "Chromium not found. Install Chrome/Chromium or set GOATHERD_CHROMIUM_PATH."
                    .to_string(),
            )
        })?;

        // Chrome rejects relative download paths.
        let download_dir =
            self.download_dir
                .canonicalize()
                .map_err(|e| FetchError::Filesystem {
                    path: self.download_dir.clone(),
                    source: e,
                })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        builder = if self.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(FetchError::SessionStart)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::SessionStart(format!("failed to launch Chromium: {e}")))?;

        // Drive the CDP event loop for the life of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        browser
            .execute(
                SetDownloadBehaviorParams::builder()
                    .behavior(SetDownloadBehaviorBehavior::Allow)
                    .download_path(download_dir.to_string_lossy().to_string())
                    .build()
                    .map_err(FetchError::Browser)?,
            )
            .await
            .map_err(|e| {
                FetchError::Browser(format!("failed to set download directory: {e}"))
            })?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::SessionStart(format!("failed to create page: {e}")))?;

        debug!(dir = %download_dir.display(), "browser session ready");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            nav_timeout: self.nav_timeout,
            current_url: String::new(),
        }))
    }
}

/// A live Chromium page plus the browser process behind it.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    nav_timeout: Duration,
    current_url: String,
}

#[async_trait]
impl Session for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> FetchResult<()> {
        let start = Instant::now();

        let result = tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await;

        match result {
            Ok(Ok(_)) => {
                // Let in-flight loads settle before we query the DOM.
                let _ = self.page.wait_for_navigation().await;
                self.current_url = url.to_string();
                debug!(
                    url = %url,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "page loaded"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(FetchError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {}ms", self.nav_timeout.as_millis()),
            }),
        }
    }

    async fn click_link(&mut self, locator: &Locator) -> FetchResult<ClickedLink> {
        let result = self
            .page
            .evaluate(click_script(locator.css))
            .await
            .map_err(|e| FetchError::Browser(format!("click script failed: {e}")))?;

        let value: serde_json::Value = result
            .into_value()
            .map_err(|e| FetchError::Browser(format!("failed to read click result: {e:?}")))?;

        let found = value
            .as_object()
            .and_then(|o| o.get("found"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !found {
            return Err(FetchError::LocatorNotFound {
                locator: locator.describe.to_string(),
                url: self.current_url.clone(),
            });
        }

        let href = value
            .get("href")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let text = value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        debug!(href = %href, text = %text, "clicked {}", locator.describe);

        Ok(ClickedLink { href, text })
    }

    async fn close(self: Box<Self>) -> FetchResult<()> {
        let Self {
            page, mut browser, ..
        } = *self;

        let _ = page.close().await;
        if let Err(e) = browser.close().await {
            return Err(FetchError::Browser(format!(
                "browser did not shut down cleanly: {e}"
            )));
        }
        let _ = browser.wait().await;
        Ok(())
    }
}

/// Build the JS that finds the anchor, clicks it, and reports what it hit.
///
/// Selectors are compile-time constants (see `config`), so no escaping is
/// needed. They are embedded in double quotes because the attribute
/// selectors quote their values with single quotes.
fn click_script(css: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector("{css}");
            if (!el) {{ return {{ found: false }}; }}
            const href = el.getAttribute("href") || "";
            const text = (el.textContent || "").trim();
            el.click();
            return {{ found: true, href, text }};
        }})()"#
    )
}
