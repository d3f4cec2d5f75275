//! Constants used throughout the application.
//!
//! This module contains all constants used in the aesvault application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "aesvault";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str =
    "Double AES-CBC text encryption with history and bookmarks";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the data directory.
pub const ENV_VAR_AESVAULT_DIR: &str = "AESVAULT_DIR";
/// Environment variable holding the passphrase that protects the key vault.
pub const ENV_VAR_AESVAULT_PASSPHRASE: &str = "AESVAULT_PASSPHRASE";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default data directory, relative to the user's home directory.
pub const DEFAULT_DATA_SUBDIR: &str = ".config/aesvault";

// Validation
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// Persisted history collection.
pub const HISTORY_FILE_NAME: &str = "history.json";
/// Persisted bookmarks collection.
pub const BOOKMARKS_FILE_NAME: &str = "bookmarks.json";
/// Protected key configuration blob.
pub const CONFIG_FILE_NAME: &str = "config.encrypted";
/// Protected user-overridable default keys.
pub const DEFAULTS_FILE_NAME: &str = "defaults.encrypted";
/// Plain JSON preferences.
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Advisory lock held while a process owns the data directory.
pub const LOCK_FILE_NAME: &str = ".lock";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;

// Key Material
/// Built-in plaintext key for the double-encryption path (32 bytes).
pub const DEFAULT_KEY: &str = "12345678901234567890123456789012";
/// Built-in plaintext IV for the double-encryption path (16 bytes).
pub const DEFAULT_IV: &str = "1234567890123456";
/// Built-in Base64 key for the single-encryption path.
pub const DEFAULT_KEY_BASE64: &str = "MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI=";
/// Built-in Base64 IV for the single-encryption path.
pub const DEFAULT_IV_BASE64: &str = "MTIzNDU2Nzg5MDEyMzQ1Ng==";
/// Name given to the profile synthesised from legacy key fields.
pub const DEFAULT_PROFILE_NAME: &str = "Default";
/// Accepted plaintext key lengths in bytes (AES-128/192/256).
pub const VALID_KEY_LENGTHS: [usize; 3] = [16, 24, 32];
/// AES block size, which is also the required IV length in bytes.
pub const IV_LENGTH: usize = 16;
/// Length of generated plaintext keys.
pub const GENERATED_KEY_LENGTH: usize = 32;

// Detection heuristic
/// Strings shorter than this are never treated as ciphertext.
pub const DETECT_MIN_LENGTH: usize = 16;
/// Minimum length of a Base64 string that looks like ciphertext.
pub const DETECT_MIN_BASE64_LENGTH: usize = 20;

// Settings defaults
/// Default number of recent entries shown.
pub const DEFAULT_RECENT_ITEMS_COUNT: usize = 10;
/// Default cap on history entries.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 500;
/// Default cap on bookmark entries.
pub const DEFAULT_MAX_BOOKMARK_ITEMS: usize = 100;

// Backup format
/// Version written into exported backup documents.
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "aesvault";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
