//! Static look at the download page, no browser involved.
//!
//! Fetches the page over plain HTTP and checks that the expected download
//! links are present. This backs `doctor --online`; the fetch workflow
//! itself always goes through the browser.

use crate::browser::Locator;
use crate::config::{CARD_DEFINITIONS_LOCATOR, PRICE_HISTORY_LOCATOR};
use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;

/// A download link as found in the static HTML.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLink {
    /// Href resolved against the page URL.
    pub href: String,
    /// The anchor's visible text.
    pub text: String,
}

/// What the static page check saw.
#[derive(Debug, Clone, Serialize)]
pub struct PageCheck {
    pub url: String,
    pub status: u16,
    pub price_link: Option<ResolvedLink>,
    pub definitions_link: Option<ResolvedLink>,
}

impl PageCheck {
    /// Both expected links were found.
    pub fn ready(&self) -> bool {
        self.price_link.is_some() && self.definitions_link.is_some()
    }
}

/// Fetch `url` and resolve both download locators against its HTML.
pub async fn preflight(url: &str) -> Result<PageCheck> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("goatherd/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?;
    let status = resp.status().as_u16();
    let body = resp.text().await.context("failed to read page body")?;

    Ok(PageCheck {
        url: url.to_string(),
        status,
        price_link: resolve_locator(&body, url, &PRICE_HISTORY_LOCATOR),
        definitions_link: resolve_locator(&body, url, &CARD_DEFINITIONS_LOCATOR),
    })
}

/// Find the first element matching `locator` in `html`, resolving a
/// relative href against `base`.
pub fn resolve_locator(html: &str, base: &str, locator: &Locator) -> Option<ResolvedLink> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(locator.css).unwrap();
    let element = document.select(&sel).next()?;

    let href = element.value().attr("href").unwrap_or("");
    let resolved = match url::Url::parse(base).and_then(|b| b.join(href)) {
        Ok(u) => u.to_string(),
        Err(_) => href.to_string(),
    };
    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    Some(ResolvedLink {
        href: resolved,
        text,
    })
}
