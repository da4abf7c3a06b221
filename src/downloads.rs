//! Scans of the managed download directory.
//!
//! The browser drops files here; nothing in this module talks to the
//! browser. The presence check gates the card-definitions fetch, and the
//! completion watcher turns "a click happened" into "a file finished".

use crate::error::{FetchError, FetchResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, trace};

/// Suffixes browsers use for in-flight downloads.
const PARTIAL_SUFFIXES: &[&str] = &[".crdownload", ".part", ".tmp"];

/// A download the completion watcher accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedFile {
    /// File name inside the download directory.
    pub file_name: String,
    /// Size at the moment the file stopped growing.
    pub bytes: u64,
}

/// True iff `dir` holds a regular file whose name starts with `prefix`.
///
/// Prefix match, not exact: `card-definitions-2024.tsv` counts for prefix
/// `card-definitions`, as does a file literally named `card-definitions`.
/// In-flight downloads (partial suffixes) do not count. With `max_age`,
/// files whose modification time is older are ignored.
pub fn has_file_with_prefix(
    dir: &Path,
    prefix: &str,
    max_age: Option<Duration>,
) -> FetchResult<bool> {
    let entries = std::fs::read_dir(dir).map_err(|e| FetchError::Filesystem {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| FetchError::Filesystem {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(prefix) || is_partial(name) {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        if let Some(limit) = max_age {
            let age = meta
                .modified()
                .ok()
                .and_then(|m| SystemTime::now().duration_since(m).ok());
            match age {
                Some(age) if age <= limit => {}
                _ => continue,
            }
        }
        debug!(file = %name, "presence check hit");
        return Ok(true);
    }

    Ok(false)
}

/// Names currently present in `dir`, taken before a click so the watcher
/// can tell new files from old.
pub fn snapshot(dir: &Path) -> FetchResult<HashSet<OsString>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FetchError::Filesystem {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut names = HashSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| FetchError::Filesystem {
            path: dir.to_path_buf(),
            source: e,
        })?;
        names.insert(entry.file_name());
    }
    Ok(names)
}

/// Wait for a file that was not in `before` to appear in `dir` and stop
/// growing.
///
/// A download counts as complete when a regular file appears whose name
/// carries no partial suffix and whose size is non-zero and unchanged
/// across two consecutive polls. Chrome writes `.crdownload` files and
/// renames them on completion; the size check covers direct writes.
pub async fn await_new_download(
    dir: &Path,
    before: &HashSet<OsString>,
    timeout: Duration,
    poll_interval: Duration,
) -> FetchResult<DownloadedFile> {
    let start = Instant::now();
    // name -> size at the previous poll, to spot still-growing files
    let mut last_sizes: HashMap<OsString, u64> = HashMap::new();

    loop {
        for (name, size) in new_candidates(dir, before)? {
            if size > 0 && last_sizes.get(&name) == Some(&size) {
                let file_name = name.to_string_lossy().into_owned();
                debug!(file = %file_name, bytes = size, "download complete");
                return Ok(DownloadedFile {
                    file_name,
                    bytes: size,
                });
            }
            last_sizes.insert(name, size);
        }

        if start.elapsed() >= timeout {
            return Err(FetchError::DownloadTimeout {
                dir: dir.to_path_buf(),
                waited_secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Regular, non-partial, non-hidden files in `dir` that are not in
/// `before`, with their current sizes.
fn new_candidates(dir: &Path, before: &HashSet<OsString>) -> FetchResult<Vec<(OsString, u64)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FetchError::Filesystem {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FetchError::Filesystem {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        if before.contains(&name) {
            continue;
        }
        let display_name = name.to_string_lossy();
        if display_name.starts_with('.') || is_partial(&display_name) {
            trace!(file = %display_name, "skipping in-flight download");
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        found.push((name, meta.len()));
    }
    Ok(found)
}

/// Name has an in-flight download suffix (case-insensitive).
fn is_partial(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str, contents: &[u8]) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_presence_prefix_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "card-definitions-2024.tsv", b"data");
        assert!(has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_literal_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "card-definitions", b"data");
        assert!(has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "price-history.zip", b"data");
        touch(dir.path(), "notes.txt", b"data");
        assert!(!has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_ignores_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("card-definitions-x")).unwrap();
        assert!(!has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_ignores_partials() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "card-definitions.zip.crdownload", b"data");
        assert!(!has_file_with_prefix(dir.path(), "card-definitions", None).unwrap());
    }

    #[test]
    fn test_presence_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let err = has_file_with_prefix(&gone, "card-definitions", None).unwrap_err();
        assert!(matches!(err, FetchError::Filesystem { .. }));
    }

    #[test]
    fn test_presence_max_age() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "card-definitions.csv", b"data");
        std::thread::sleep(Duration::from_millis(50));

        // Older than the limit: treated as missing.
        let stale = has_file_with_prefix(
            dir.path(),
            "card-definitions",
            Some(Duration::from_millis(5)),
        )
        .unwrap();
        assert!(!stale);

        // Generous limit: still counts.
        let fresh = has_file_with_prefix(
            dir.path(),
            "card-definitions",
            Some(Duration::from_secs(60)),
        )
        .unwrap();
        assert!(fresh);
    }

    #[test]
    fn test_partial_suffixes_case_insensitive() {
        assert!(is_partial("price-history.zip.CRDOWNLOAD"));
        assert!(is_partial("x.part"));
        assert!(is_partial("y.tmp"));
        assert!(!is_partial("price-history.zip"));
    }

    #[tokio::test]
    async fn test_watcher_accepts_stable_file() {
        let dir = tempfile::tempdir().unwrap();
        let before = snapshot(dir.path()).unwrap();
        touch(dir.path(), "price-history.zip", b"zipbytes");

        let got = await_new_download(
            dir.path(),
            &before,
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        assert_eq!(got.file_name, "price-history.zip");
        assert_eq!(got.bytes, 8);
    }

    #[tokio::test]
    async fn test_watcher_ignores_preexisting_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "price-history.zip", b"old");
        let before = snapshot(dir.path()).unwrap();
        touch(dir.path(), "card-definitions.zip", b"new");

        let got = await_new_download(
            dir.path(),
            &before,
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        assert_eq!(got.file_name, "card-definitions.zip");
    }

    #[tokio::test]
    async fn test_watcher_times_out_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let before = snapshot(dir.path()).unwrap();

        let err = await_new_download(
            dir.path(),
            &before,
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::DownloadTimeout { .. }));
    }

    #[tokio::test]
    async fn test_watcher_rejects_partial_only() {
        let dir = tempfile::tempdir().unwrap();
        let before = snapshot(dir.path()).unwrap();
        touch(dir.path(), "price-history.zip.crdownload", b"partial");

        let err = await_new_download(
            dir.path(),
            &before,
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::DownloadTimeout { .. }));
    }

    #[tokio::test]
    async fn test_watcher_rejects_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let before = snapshot(dir.path()).unwrap();
        touch(dir.path(), "price-history.zip", b"");

        let err = await_new_download(
            dir.path(),
            &before,
            Duration::from_millis(100),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FetchError::DownloadTimeout { .. }));
    }

    #[tokio::test]
    async fn test_watcher_waits_for_rename() {
        // Simulates Chrome finishing a download: the partial file is
        // renamed to its final name mid-wait.
        let dir = tempfile::tempdir().unwrap();
        let before = snapshot(dir.path()).unwrap();
        touch(dir.path(), "price-history.zip.crdownload", b"zipbytes");

        let path = dir.path().to_path_buf();
        let renamer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fs::rename(
                path.join("price-history.zip.crdownload"),
                path.join("price-history.zip"),
            )
            .unwrap();
        });

        let got = await_new_download(
            dir.path(),
            &before,
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        renamer.await.unwrap();
        assert_eq!(got.file_name, "price-history.zip");
        assert_eq!(got.bytes, 8);
    }
}
