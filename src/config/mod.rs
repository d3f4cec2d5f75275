//! Configuration management for the aesvault application.
//!
//! This module handles loading and validating the runtime configuration from
//! environment variables, with sensible defaults. Persisted user preferences live in
//! [`settings`], and exclusive ownership of the data directory in [`lock`].
//!
//! # Environment Variables
//!
//! - `AESVAULT_DIR`: Path to the data directory (defaults to ~/.config/aesvault)
//! - `AESVAULT_PASSPHRASE`: Passphrase protecting the key vault; read by
//!   [`AgeProtector::from_env_or_prompt`](crate::crypto::AgeProtector::from_env_or_prompt)
//! - `HOME`: Used for expanding the default data directory path

pub mod lock;
pub mod settings;

pub use self::lock::DataDirLock;
pub use self::settings::AppSettings;

use crate::constants::{DEFAULT_DATA_SUBDIR, ENV_VAR_AESVAULT_DIR, ENV_VAR_HOME};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Runtime configuration for the aesvault application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use aesvault::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: PathBuf::from("/path/to/data"),
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use aesvault::Config;
/// use std::env;
///
/// env::set_var("AESVAULT_DIR", "/custom/data/path");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.data_dir.to_str(), Some("/custom/data/path"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding history, bookmarks, settings and the key vault.
    ///
    /// Loaded from `AESVAULT_DIR` with a fallback to ~/.config/aesvault.
    pub data_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &"[REDACTED_PATH]")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// The data directory path is expanded with `shellexpand`, so `~` and
    /// `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if path expansion fails or the resulting path
    /// is empty.
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(ENV_VAR_AESVAULT_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let data_dir = PathBuf::from(expanded_path.into_owned());
        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        Ok(Config { data_dir })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data directory path is empty"
    /// - "Data directory must be an absolute path"
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}
