//! Fixed acquisition targets and per-run settings.

use crate::browser::Locator;
use std::path::PathBuf;
use std::time::Duration;

/// The goatbots download page. Not configurable.
pub const DOWNLOAD_PAGE_URL: &str = "https://www.goatbots.com/download-prices";

/// File-name prefix that marks an already-downloaded card-definitions file.
pub const CARD_DEFINITIONS_PREFIX: &str = "card-definitions";

/// Default download directory, relative to the working directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "managed-files";

/// Link to the zipped price list.
pub const PRICE_HISTORY_LOCATOR: Locator = Locator {
    css: "main a[href*='price-history']",
    describe: "price-history download link",
};

/// Link to the zipped card-definitions file.
pub const CARD_DEFINITIONS_LOCATOR: Locator = Locator {
    css: "main a[href*='card-definitions']",
    describe: "card-definitions download link",
};

/// Default page-load timeout.
pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wait for a clicked download to finish.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between download-directory scans while waiting.
pub const DOWNLOAD_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resolved settings for one fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory the browser downloads into and the presence check scans.
    pub download_dir: PathBuf,
    /// Page-load timeout.
    pub nav_timeout: Duration,
    /// Per-download completion timeout.
    pub download_timeout: Duration,
    /// Download-directory scan interval.
    pub poll_interval: Duration,
    /// Ignore presence-check matches whose modification time is older.
    pub max_age: Option<Duration>,
    /// Run the browser headless (default) or with a visible window.
    pub headless: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            poll_interval: DOWNLOAD_POLL_INTERVAL,
            max_age: None,
            headless: true,
        }
    }
}
