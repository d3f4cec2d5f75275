//! User preferences persisted as `settings.json`.

use crate::constants::{
    DEFAULT_MAX_BOOKMARK_ITEMS, DEFAULT_MAX_HISTORY_ITEMS, DEFAULT_RECENT_ITEMS_COUNT,
    SETTINGS_FILE_NAME,
};
use crate::errors::{AppError, AppResult, StoreError};
use crate::store::file::write_atomically;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Preferences that shape how history and detection behave.
///
/// Serialized with PascalCase keys. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppSettings {
    /// Whether input is inspected to choose between encrypting and decrypting.
    pub auto_detect: bool,
    pub recent_items_count: usize,
    pub max_history_items: usize,
    pub max_bookmark_items: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_detect: true,
            recent_items_count: DEFAULT_RECENT_ITEMS_COUNT,
            max_history_items: DEFAULT_MAX_HISTORY_ITEMS,
            max_bookmark_items: DEFAULT_MAX_BOOKMARK_ITEMS,
        }
    }
}

impl AppSettings {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE_NAME)
    }

    /// Reads settings from `data_dir`, falling back to defaults when the file is
    /// missing or corrupt.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Unusable settings file {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    /// Writes settings to `data_dir`, creating the directory if needed.
    pub fn save(&self, data_dir: &Path) -> AppResult<()> {
        let path = Self::path(data_dir);
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomically(&path, json.as_bytes())
    }

    /// Sets one setting by its name (PascalCase or kebab-case, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unknown name or a value that does not
    /// parse.
    pub fn set(&mut self, name: &str, value: &str) -> AppResult<()> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "autodetect" => self.auto_detect = parse_value(name, value)?,
            "recentitemscount" => self.recent_items_count = parse_value(name, value)?,
            "maxhistoryitems" => self.max_history_items = parse_value(name, value)?,
            "maxbookmarkitems" => self.max_bookmark_items = parse_value(name, value)?,
            _ => return Err(AppError::Config(format!("Unknown setting '{}'", name))),
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid value '{}' for {}", value, name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert!(settings.auto_detect);
        assert_eq!(settings.recent_items_count, 10);
        assert_eq!(settings.max_history_items, 500);
        assert_eq!(settings.max_bookmark_items, 100);
    }

    #[test]
    fn test_missing_and_corrupt_files_give_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());

        fs::write(AppSettings::path(dir.path()), "not json").unwrap();
        assert_eq!(AppSettings::load(dir.path()), AppSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let settings = AppSettings {
            auto_detect: false,
            max_history_items: 42,
            ..AppSettings::default()
        };
        settings.save(&data_dir).unwrap();

        assert_eq!(AppSettings::load(&data_dir), settings);
        let raw = fs::read_to_string(AppSettings::path(&data_dir)).unwrap();
        assert!(raw.contains("\"MaxHistoryItems\": 42"));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(AppSettings::path(dir.path()), r#"{ "MaxBookmarkItems": 5 }"#).unwrap();

        let settings = AppSettings::load(dir.path());
        assert_eq!(settings.max_bookmark_items, 5);
        assert_eq!(settings.max_history_items, 500);
        assert!(settings.auto_detect);
    }

    #[test]
    fn test_set_by_name() {
        let mut settings = AppSettings::default();
        settings.set("max-history-items", "20").unwrap();
        settings.set("AutoDetect", "false").unwrap();
        assert_eq!(settings.max_history_items, 20);
        assert!(!settings.auto_detect);

        assert!(matches!(settings.set("theme", "dark"), Err(AppError::Config(_))));
        assert!(matches!(
            settings.set("recent-items-count", "many"),
            Err(AppError::Config(_))
        ));
    }
}
