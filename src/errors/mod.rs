//! Error handling utilities for the aesvault application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur during cryptographic operations.
///
/// The variants follow the failure classes a caller has to tell apart: bad key
/// material, input that is not Base64 at all, and ciphertext that does not decrypt.
/// Both passes of the double scheme report a failed decryption as the same
/// `DecryptionFailed` variant, so a caller cannot learn which pass rejected the input.
///
/// # Examples
///
/// ```
/// use aesvault::errors::CryptoError;
///
/// let error = CryptoError::InvalidKeyMaterial("key must be 16, 24 or 32 bytes, got 5".to_string());
/// let message = format!("{}", error);
/// assert!(message.contains("Invalid key material"));
/// assert!(message.contains("got 5"));
///
/// let error = CryptoError::DecryptionFailed;
/// assert!(format!("{}", error).contains("Invalid ciphertext or keys"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key or IV fails the byte-length contract.
    #[error("Invalid key material: {0}. Check the active profile's key and IV.")]
    InvalidKeyMaterial(String),

    /// Ciphertext or a Base64 key/IV could not be decoded.
    #[error("This is not encrypted text (invalid Base64): {0}")]
    InvalidEncoding(#[source] base64::DecodeError),

    /// Unpadding failed, or the decrypted bytes are not what this scheme produces.
    #[error("Decryption failed. Invalid ciphertext or keys.")]
    DecryptionFailed,

    /// The secret protector could not seal or open a blob.
    #[error("Secret protection failed: {0}")]
    Protection(String),

    /// A sealed vault file exists but the protector refused to open it.
    #[error("Cannot open {path}: wrong passphrase or damaged file. Nothing was changed. Check the passphrase, or delete the file to start over.")]
    VaultLocked {
        /// The sealed file
        path: PathBuf,
    },

    /// Reading a passphrase from the terminal failed.
    #[error("Failed to read passphrase: {0}")]
    PassphrasePrompt(String),

    /// An empty passphrase was supplied.
    #[error("Passphrase cannot be empty")]
    EmptyPassphrase,
}

/// Represents errors raised by strict persistence paths (backup export/import).
///
/// The entry store itself never surfaces these: its reads degrade to empty
/// collections and its writes are logged and dropped.
///
/// # Examples
///
/// ```
/// use aesvault::errors::StoreError;
/// use std::io::{self, ErrorKind};
/// use std::path::PathBuf;
///
/// let error = StoreError::Write {
///     path: PathBuf::from("/backups/export.json"),
///     source: io::Error::new(ErrorKind::PermissionDenied, "permission denied"),
/// };
/// let message = format!("{}", error);
/// assert!(message.contains("/backups/export.json"));
/// assert!(message.contains("permission denied"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {path}: {source}. Please check file permissions and free disk space.")]
    Write {
        /// The file being written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A document could not be parsed or serialized.
    #[error("Invalid JSON document {path}: {source}")]
    Json {
        /// The offending document
        path: PathBuf,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// No entry with the given id exists in the addressed collection.
    #[error("Entry not found: {0}")]
    NotFound(String),
}

/// Represents errors that can occur when taking ownership of the data directory.
///
/// # Examples
///
/// ```
/// use aesvault::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/data/.lock"),
/// };
///
/// assert!(format!("{}", error).contains("in use by another process"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already owns the data directory.
    #[error("Data directory is in use by another process: {path}. Please wait for the other aesvault process to finish.")]
    FileBusy {
        /// The lock file that is held
        path: PathBuf,
    },

    /// Acquiring the lock failed for a technical reason.
    #[error("Failed to acquire lock {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The lock file that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the aesvault application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use aesvault::errors::AppError;
///
/// let error = AppError::Config("Data directory path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Data directory path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use aesvault::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors from strict persistence paths.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Errors related to data directory locking.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors in key profile management (unknown profile, last profile, duplicates).
    #[error("Profile error: {0}")]
    Profile(String),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use aesvault::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Profile("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
