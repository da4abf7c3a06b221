//! Environment readiness check.

use crate::browser::chromium::find_chromium;
use crate::cli::output;
use crate::config::DOWNLOAD_PAGE_URL;
use crate::page;
use anyhow::Result;
use std::path::Path;

/// Check the browser binary and the download directory; with `online`,
/// also fetch the live page and verify both download links.
pub async fn run(dir: &Path, online: bool) -> Result<()> {
    let chromium = find_chromium();
    let dir_writable = probe_writable(dir);
    let page_check = if online {
        Some(page::preflight(DOWNLOAD_PAGE_URL).await)
    } else {
        None
    };

    let page_ready = match &page_check {
        None => true,
        Some(Ok(check)) => check.ready() && check.status < 400,
        Some(Err(_)) => false,
    };
    let ready = chromium.is_some() && dir_writable.is_ok() && page_ready;

    if output::is_json() {
        let page_json = match &page_check {
            None => serde_json::Value::Null,
            Some(Ok(check)) => serde_json::json!(check),
            Some(Err(e)) => serde_json::json!({ "error": format!("{e:#}") }),
        };
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "download_dir": dir.display().to_string(),
            "download_dir_writable": dir_writable.is_ok(),
            "page": page_json,
            "ready": ready,
        }));
        return Ok(());
    }

    println!("Goatherd Doctor");
    println!("===============");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set GOATHERD_CHROMIUM_PATH."
        ),
    }

    match &dir_writable {
        Ok(()) => println!("[OK] Download directory {} is writable", dir.display()),
        Err(e) => println!(
            "[!!] Download directory {} is not writable: {e}",
            dir.display()
        ),
    }

    if let Some(check) = &page_check {
        match check {
            Ok(check) => {
                if check.status < 400 {
                    println!("[OK] {} answered HTTP {}", check.url, check.status);
                } else {
                    println!("[!!] {} answered HTTP {}", check.url, check.status);
                }
                match &check.price_link {
                    Some(link) => println!("[OK] price-history link: {}", link.href),
                    None => println!("[!!] price-history link not found on the page"),
                }
                match &check.definitions_link {
                    Some(link) => println!("[OK] card-definitions link: {}", link.href),
                    None => println!("[!!] card-definitions link not found on the page"),
                }
            }
            Err(e) => println!("[!!] Could not reach {DOWNLOAD_PAGE_URL}: {e:#}"),
        }
    }

    println!();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

/// Create the directory if needed and try writing a probe file in it.
fn probe_writable(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".goatherd-doctor");
    std::fs::write(&probe, b"probe")?;
    std::fs::remove_file(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_writable_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("managed-files");
        assert!(probe_writable(&target).is_ok());
        assert!(target.is_dir());
        // The probe file is cleaned up.
        assert!(!target.join(".goatherd-doctor").exists());
    }
}
