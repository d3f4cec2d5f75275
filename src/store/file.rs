//! JSON document persistence for entry collections.
//!
//! Each collection lives in its own file as `{ "Entries": [ ... ] }`, pretty-printed.
//! Writes go to a temporary file in the same directory which then replaces the
//! target, so a crash mid-write leaves the previous document intact.

use crate::errors::{AppError, AppResult, StoreError};
use crate::store::entry::HistoryEntry;
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::fs::Permissions;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// On-disk collection. Entries are decoded one by one so a single bad entry costs
/// only itself.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEntryDocument {
    #[serde(default)]
    entries: Vec<serde_json::Value>,
}

/// Ensures the data directory exists, creating it if necessary.
///
/// Newly created directories get 0o700 permissions on unix.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be created or its permissions
/// cannot be set.
pub fn ensure_data_directory_exists(data_dir: &Path) -> AppResult<()> {
    if data_dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(data_dir).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create data directory: {}", e),
        ))
    })?;

    #[cfg(unix)]
    {
        let permissions = Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
        fs::set_permissions(data_dir, permissions).map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to set secure permissions on data directory: {}", e),
            ))
        })?;
        debug!("Set 0o700 permissions on data directory");
    }
    Ok(())
}

/// Reads a collection, treating a missing or unreadable document as empty.
pub fn load_entries(path: &Path) -> Vec<HistoryEntry> {
    if !path.exists() {
        debug!("No collection at {:?}, starting empty", path);
        return Vec::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to read {:?}, starting empty: {}", path, e);
            return Vec::new();
        }
    };

    let document = match serde_json::from_str::<RawEntryDocument>(&contents) {
        Ok(document) => document,
        Err(e) => {
            warn!("Corrupt collection {:?}, starting empty: {}", path, e);
            return Vec::new();
        }
    };

    let total = document.entries.len();
    let entries: Vec<HistoryEntry> = document
        .entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry {} in {:?}: {}", index, path, e);
                None
            }
        })
        .collect();
    debug!("Loaded {} of {} entries from {:?}", entries.len(), total, path);
    entries
}

/// Writes a collection, creating the parent directory when needed.
///
/// # Errors
///
/// Returns a `StoreError` if serialization, the temporary write, or the final
/// rename fails.
pub fn save_entries(path: &Path, entries: &[HistoryEntry]) -> AppResult<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct EntryDocumentRef<'a> {
        entries: &'a [HistoryEntry],
    }

    let json = serde_json::to_string_pretty(&EntryDocumentRef { entries }).map_err(|source| {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    write_atomically(path, json.as_bytes())?;
    debug!("Saved {} entries to {:?}", entries.len(), path);
    Ok(())
}

/// Replaces `path` with `bytes` via a sibling temporary file.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let write_error = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_data_directory_exists(dir)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.flush().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
