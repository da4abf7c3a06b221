// Copyright 2026 Goatherd Contributors
// SPDX-License-Identifier: Apache-2.0

//! The acquisition workflow: drive a browser session through the download
//! page, always fetch the latest price list, and fetch card definitions
//! only when no local copy exists.

use crate::browser::{Driver, Session};
use crate::config::{
    FetchConfig, CARD_DEFINITIONS_LOCATOR, CARD_DEFINITIONS_PREFIX, DOWNLOAD_PAGE_URL,
    PRICE_HISTORY_LOCATOR,
};
use crate::downloads::{self, DownloadedFile};
use crate::error::{FetchError, FetchResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// What one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport {
    /// When the run started (RFC 3339).
    pub started_at: String,
    /// The freshly downloaded price list.
    pub price: DownloadedFile,
    /// The downloaded definitions file, when one was fetched.
    pub definitions: Option<DownloadedFile>,
    /// Whether a local definitions file already existed.
    pub definitions_present: bool,
    /// Wall-clock time for the whole run.
    pub elapsed_ms: u64,
}

/// Run the full workflow: price list always, card definitions only when
/// no file with the `card-definitions` prefix exists in the download
/// directory.
///
/// The session is closed exactly once on every path out of this function,
/// including failures after it was opened. Close errors surface only when
/// the workflow itself succeeded.
pub async fn run(config: &FetchConfig, driver: &dyn Driver) -> FetchResult<FetchReport> {
    let started = Instant::now();
    let started_at = chrono::Utc::now().to_rfc3339();

    std::fs::create_dir_all(&config.download_dir).map_err(|e| FetchError::Filesystem {
        path: config.download_dir.clone(),
        source: e,
    })?;

    let mut session = driver.open().await?;
    info!(url = DOWNLOAD_PAGE_URL, "session open");

    let outcome = drive(session.as_mut(), config).await;
    let close_result = session.close().await;

    let (price, definitions, definitions_present) = outcome?;
    close_result?;

    let report = FetchReport {
        started_at,
        price,
        definitions,
        definitions_present,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        price = %report.price.file_name,
        definitions_fetched = report.definitions.is_some(),
        elapsed_ms = report.elapsed_ms,
        "fetch complete"
    );
    Ok(report)
}

/// Everything that happens between open and close.
async fn drive(
    session: &mut dyn Session,
    config: &FetchConfig,
) -> FetchResult<(DownloadedFile, Option<DownloadedFile>, bool)> {
    session.navigate(DOWNLOAD_PAGE_URL).await?;

    let before = downloads::snapshot(&config.download_dir)?;
    let link = session.click_link(&PRICE_HISTORY_LOCATOR).await?;
    info!(href = %link.href, "price list download started");
    let price = downloads::await_new_download(
        &config.download_dir,
        &before,
        config.download_timeout,
        config.poll_interval,
    )
    .await?;

    let definitions_present = downloads::has_file_with_prefix(
        &config.download_dir,
        CARD_DEFINITIONS_PREFIX,
        config.max_age,
    )?;

    let definitions = if definitions_present {
        debug!("card definitions already on disk, skipping");
        None
    } else {
        Some(fetch_card_definitions(session, config).await?)
    };

    Ok((price, definitions, definitions_present))
}

/// Fetch the card-definitions file with an already-navigated session.
///
/// Borrows the session; closing it stays with the caller.
pub async fn fetch_card_definitions(
    session: &mut dyn Session,
    config: &FetchConfig,
) -> FetchResult<DownloadedFile> {
    let before = downloads::snapshot(&config.download_dir)?;
    let link = session.click_link(&CARD_DEFINITIONS_LOCATOR).await?;
    info!(href = %link.href, "card definitions download started");
    downloads::await_new_download(
        &config.download_dir,
        &before,
        config.download_timeout,
        config.poll_interval,
    )
    .await
}
