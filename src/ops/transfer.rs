//! Backup export and import of history and bookmarks.
//!
//! A backup is a single pretty-printed JSON document:
//!
//! ```text
//! { "Version": "1.0", "ExportDate": "...", "History": [ ... ], "Bookmarks": [ ... ] }
//! ```
//!
//! Unlike the store's own persistence, every failure here is reported to the
//! caller: a silently missing backup is worse than a loud one.

use crate::constants::BACKUP_FORMAT_VERSION;
use crate::errors::{AppResult, StoreError};
use crate::store::entry::deserialize_timestamp;
use crate::store::file::write_atomically;
use crate::store::{EntryStore, HistoryEntry};
use blake3::Hasher;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// On-disk backup document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub version: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub export_date: DateTime<Local>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub bookmarks: Vec<HistoryEntry>,
}

/// Report of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub history_count: usize,
    pub bookmark_count: usize,
    /// Size of the written document in bytes
    pub size: u64,
    /// BLAKE3 checksum of the written document
    pub checksum: String,
    pub duration: Duration,
}

/// Report of a completed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub history_added: usize,
    pub bookmarks_added: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.history_added + self.bookmarks_added
    }
}

/// Writes the selected collections of `store` to `path`.
///
/// # Errors
///
/// Returns a `StoreError` if the document cannot be serialized or written.
pub fn export(
    store: &mut EntryStore,
    path: &Path,
    include_history: bool,
    include_bookmarks: bool,
) -> AppResult<ExportReport> {
    let start_time = Instant::now();
    info!("Exporting backup to {:?}", path);

    let document = BackupDocument {
        version: BACKUP_FORMAT_VERSION.to_string(),
        export_date: Local::now(),
        history: if include_history {
            store.history().to_vec()
        } else {
            Vec::new()
        },
        bookmarks: if include_bookmarks {
            store.bookmarks().to_vec()
        } else {
            Vec::new()
        },
    };

    let json = serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, &json)?;

    let mut hasher = Hasher::new();
    hasher.update(&json);
    let checksum = hasher.finalize().to_hex().to_string();

    let report = ExportReport {
        history_count: document.history.len(),
        bookmark_count: document.bookmarks.len(),
        size: json.len() as u64,
        checksum,
        duration: start_time.elapsed(),
    };
    info!(
        "Exported {} history entries and {} bookmarks ({} bytes)",
        report.history_count, report.bookmark_count, report.size
    );
    Ok(report)
}

/// Reads a backup from `path` and merges entries whose id is new.
///
/// Imported bookmarks are always favorites. History entries keep their flag.
///
/// # Errors
///
/// Returns `StoreError::Read` if the file cannot be read and `StoreError::Json` if
/// it is not a backup document.
pub fn import(store: &mut EntryStore, path: &Path) -> AppResult<ImportReport> {
    info!("Importing backup from {:?}", path);
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document: BackupDocument =
        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if document.version != BACKUP_FORMAT_VERSION {
        warn!(
            "Backup version '{}' differs from '{}', importing anyway",
            document.version, BACKUP_FORMAT_VERSION
        );
    }

    let new_bookmarks: Vec<HistoryEntry> = only_new(store.bookmarks(), document.bookmarks)
        .into_iter()
        .map(|entry| entry.favorite(true))
        .collect();
    let new_history = only_new(store.history(), document.history);

    let report = ImportReport {
        history_added: new_history.len(),
        bookmarks_added: new_bookmarks.len(),
    };
    if !new_bookmarks.is_empty() {
        store.import_bookmarks(new_bookmarks);
    }
    if !new_history.is_empty() {
        store.import_history(new_history);
    }

    info!(
        "Imported {} history entries and {} bookmarks",
        report.history_added, report.bookmarks_added
    );
    Ok(report)
}

/// Entries of `incoming` whose id is not in `existing`.
///
/// Only the store is consulted: an id repeated inside `incoming` is imported as
/// many times as it appears.
fn only_new(existing: &[HistoryEntry], incoming: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let known: HashSet<&str> = existing.iter().map(|e| e.id.as_str()).collect();
    let before = incoming.len();
    let fresh: Vec<HistoryEntry> = incoming
        .into_iter()
        .filter(|e| !known.contains(e.id.as_str()))
        .collect();
    debug!("Skipping {} already known entries", before - fresh.len());
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::store::Operation;
    use tempfile::tempdir;

    fn entry(input: &str) -> HistoryEntry {
        HistoryEntry::new(Operation::Encrypt, input, "out")
    }

    #[test]
    fn test_export_respects_selection_and_checksums() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(dir.path().join("data"));
        store.add_entry(entry("plain"));
        store.add_entry(entry("fav").favorite(true));

        let path = dir.path().join("backup.json");
        let report = export(&mut store, &path, false, true).unwrap();
        assert_eq!(report.history_count, 0);
        assert_eq!(report.bookmark_count, 1);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(report.size, bytes.len() as u64);
        assert_eq!(report.checksum, blake3::hash(&bytes).to_hex().to_string());

        let document: BackupDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document.version, "1.0");
        assert!(document.history.is_empty());
    }

    #[test]
    fn test_import_skips_known_ids() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(dir.path().join("data"));
        store.add_entry(entry("a"));
        store.add_entry(entry("b").favorite(true));

        let path = dir.path().join("backup.json");
        export(&mut store, &path, true, true).unwrap();

        let report = import(&mut store, &path).unwrap();
        assert_eq!(report, ImportReport::default());
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.bookmarks().len(), 1);
    }

    #[test]
    fn test_import_into_fresh_store_keeps_repeats_and_forces_favorites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let bookmark = entry("bm").favorite(false);
        let document = BackupDocument {
            version: BACKUP_FORMAT_VERSION.to_string(),
            export_date: Local::now(),
            history: vec![entry("h1"), entry("h2")],
            bookmarks: vec![bookmark.clone(), bookmark],
        };
        fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

        let mut store = EntryStore::open(dir.path().join("fresh"));
        let report = import(&mut store, &path).unwrap();
        assert_eq!(report.history_added, 2);
        // Repeats inside one backup are not collapsed.
        assert_eq!(report.bookmarks_added, 2);
        assert_eq!(report.total(), 4);
        assert!(store.bookmarks().iter().all(|e| e.is_favorite));

        // A second run finds every id already present.
        assert_eq!(import(&mut store, &path).unwrap().total(), 0);
    }

    #[test]
    fn test_import_accepts_offsetless_export_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(
            &path,
            r#"{ "Version": "1.0", "ExportDate": "2024-01-15T14:30:00.1234567",
                 "History": [ { "Id": "h", "Timestamp": "2024-01-15T14:29:00", "Operation": "Encrypt" } ] }"#,
        )
        .unwrap();

        let mut store = EntryStore::open(dir.path().join("data"));
        assert_eq!(import(&mut store, &path).unwrap().history_added, 1);
    }

    #[test]
    fn test_import_errors_surface() {
        let dir = tempdir().unwrap();
        let mut store = EntryStore::open(dir.path());

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            import(&mut store, &missing),
            Err(AppError::Store(StoreError::Read { .. }))
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "[1, 2, 3]").unwrap();
        assert!(matches!(
            import(&mut store, &garbage),
            Err(AppError::Store(StoreError::Json { .. }))
        ));
    }
}
