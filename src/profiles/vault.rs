//! Protected persistence of the key configuration.
//!
//! Two blobs live in the data directory, both sealed by a [`SecretProtector`]:
//!
//! - `config.encrypted`: the user's [`AppConfig`].
//! - `defaults.encrypted`: optional user-chosen default keys that replace the
//!   built-in ones.
//!
//! A missing blob, or one that opens but holds corrupt JSON, yields a fresh
//! configuration built from the effective defaults. A blob the protector refuses to
//! open is reported as `CryptoError::VaultLocked` and is never overwritten.

use crate::constants::{CONFIG_FILE_NAME, DEFAULTS_FILE_NAME};
use crate::crypto::SecretProtector;
use crate::errors::{AppResult, CryptoError, StoreError};
use crate::profiles::{AppConfig, KeySet};
use crate::store::file::write_atomically;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Loads and stores the key configuration through a [`SecretProtector`].
pub struct KeyVault<P> {
    data_dir: PathBuf,
    protector: P,
}

impl<P: SecretProtector> KeyVault<P> {
    pub fn new(data_dir: impl Into<PathBuf>, protector: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            protector,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    fn defaults_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULTS_FILE_NAME)
    }

    /// The user defaults if present, otherwise the built-in keys.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::VaultLocked` if `defaults.encrypted` exists but cannot
    /// be opened, and `StoreError::Read` if it cannot be read.
    pub fn load_defaults(&self) -> AppResult<KeySet> {
        Ok(match self.read_sealed::<KeySet>(&self.defaults_path())? {
            Some(mut defaults) => {
                defaults.backfill(&KeySet::default());
                defaults
            }
            None => KeySet::default(),
        })
    }

    /// Loads the configuration, normalised against the effective defaults.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::VaultLocked` when a sealed blob exists but the
    /// protector rejects it, typically a mistyped passphrase. Callers must not fall
    /// back to defaults in that case.
    pub fn load(&self) -> AppResult<AppConfig> {
        let defaults = self.load_defaults()?;
        Ok(match self.read_sealed::<AppConfig>(&self.config_path())? {
            Some(mut config) => {
                config.normalize(&defaults);
                debug!("Loaded key configuration with {} profiles", config.profiles.len());
                config
            }
            None => AppConfig::from_defaults(&defaults),
        })
    }

    /// Seals and writes `config`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::VaultLocked` without writing if an existing blob cannot
    /// be opened with this protector, or an error if serialization, protection or
    /// the write fails.
    pub fn save(&self, config: &AppConfig) -> AppResult<()> {
        self.write_sealed(&self.config_path(), config)?;
        info!("Key configuration saved");
        Ok(())
    }

    /// Deletes the stored configuration. The next [`KeyVault::load`] starts over
    /// from the effective defaults.
    pub fn reset_to_defaults(&self) -> AppResult<()> {
        let path = self.config_path();
        match fs::remove_file(&path) {
            Ok(()) => info!("Key configuration reset to defaults"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No key configuration to reset")
            }
            Err(source) => return Err(StoreError::Write { path, source }.into()),
        }
        Ok(())
    }

    /// Stores `key` and `iv` as the user defaults used for fresh configurations.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` before anything is written if
    /// either length is wrong.
    pub fn set_as_defaults(&self, key: &str, iv: &str) -> AppResult<()> {
        let defaults = KeySet::from_plaintext(key, iv)?;
        self.write_sealed(&self.defaults_path(), &defaults)?;
        info!("User default keys updated");
        Ok(())
    }

    /// Opens the blob at `path`. `Ok(None)` for a missing file or corrupt JSON.
    fn read_sealed<T: DeserializeOwned>(&self, path: &Path) -> AppResult<Option<T>> {
        let Some(plain) = self.open_sealed(path)? else {
            return Ok(None);
        };
        match serde_json::from_slice(&plain) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Corrupt protected document {:?}, using defaults: {}", path, e);
                Ok(None)
            }
        }
    }

    fn open_sealed(&self, path: &Path) -> AppResult<Option<Zeroizing<Vec<u8>>>> {
        let sealed = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                }
                .into())
            }
        };
        match self.protector.unprotect(&sealed) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) => {
                warn!("Refusing to use {:?}: {}", path, e);
                Err(CryptoError::VaultLocked {
                    path: path.to_path_buf(),
                }
                .into())
            }
        }
    }

    fn write_sealed<T: Serialize>(&self, path: &Path, value: &T) -> AppResult<()> {
        // An existing blob must open with this protector before it is replaced.
        self.open_sealed(path)?;

        let plain = Zeroizing::new(serde_json::to_vec_pretty(value).map_err(|source| {
            StoreError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let sealed = self.protector.protect(&plain)?;
        write_atomically(path, &sealed)
    }
}
