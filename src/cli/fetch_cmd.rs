//! `goatherd fetch` — run the acquisition workflow.

use crate::browser::chromium::ChromiumDriver;
use crate::cli::output;
use crate::config::FetchConfig;
use crate::fetch;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Run the fetch command.
pub async fn run(
    dir: PathBuf,
    max_age_hours: Option<u64>,
    download_timeout_secs: u64,
    nav_timeout_secs: u64,
    headful: bool,
) -> Result<()> {
    let config = FetchConfig {
        download_dir: dir,
        nav_timeout: Duration::from_secs(nav_timeout_secs),
        download_timeout: Duration::from_secs(download_timeout_secs),
        max_age: max_age_hours.map(|h| Duration::from_secs(h * 3600)),
        headless: !headful,
        ..FetchConfig::default()
    };

    let driver = ChromiumDriver::new(&config);
    let report = fetch::run(&config, &driver).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!(report));
        return Ok(());
    }

    if !output::is_quiet() {
        println!(
            "[OK] price list: {} ({} bytes)",
            report.price.file_name, report.price.bytes
        );
        match &report.definitions {
            Some(d) => println!("[OK] card definitions: {} ({} bytes)", d.file_name, d.bytes),
            None => println!("[OK] card definitions already present, skipped"),
        }
        println!("Done in {}ms.", report.elapsed_ms);
    }

    Ok(())
}
