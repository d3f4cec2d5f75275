//! Key and IV validation and generation.
//!
//! All validators are pure functions over the byte length of the UTF-8 (or decoded
//! Base64) representation; they never fail, they only answer.

use crate::constants::{
    GENERATED_KEY_LENGTH, IV_LENGTH, REDACTED_PLACEHOLDER, VALID_KEY_LENGTHS,
};
use crate::errors::{AppResult, CryptoError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A plaintext key and IV pair as used by the double-encryption path.
///
/// Both strings are wiped when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    pub key: String,
    pub iv: String,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &REDACTED_PLACEHOLDER)
            .field("iv", &REDACTED_PLACEHOLDER)
            .finish()
    }
}

impl KeyMaterial {
    pub fn new(key: impl Into<String>, iv: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            iv: iv.into(),
        }
    }

    /// Fresh random material; see [`generate_random_keys`].
    pub fn generate() -> Self {
        let (key, iv) = generate_random_keys();
        Self { key, iv }
    }

    /// Checks both lengths, naming the offending part on failure.
    pub fn validate(&self) -> AppResult<()> {
        validate_plaintext_key_material(&self.key, &self.iv)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_plaintext_key(&self.key) && is_valid_plaintext_iv(&self.iv)
    }
}

/// True iff the UTF-8 byte length of `key` is 16, 24 or 32.
///
/// ```
/// use aesvault::crypto::is_valid_plaintext_key;
///
/// assert!(is_valid_plaintext_key("1234567890123456"));
/// assert!(!is_valid_plaintext_key("123456789012345"));
/// ```
pub fn is_valid_plaintext_key(key: &str) -> bool {
    VALID_KEY_LENGTHS.contains(&key.len())
}

/// True iff the UTF-8 byte length of `iv` is exactly 16.
pub fn is_valid_plaintext_iv(iv: &str) -> bool {
    iv.len() == IV_LENGTH
}

/// True iff `base64` decodes and yields exactly `expected_bytes` bytes.
///
/// Malformed Base64 answers `false`.
pub fn is_valid_base64_key(base64: &str, expected_bytes: usize) -> bool {
    STANDARD
        .decode(base64)
        .map(|bytes| bytes.len() == expected_bytes)
        .unwrap_or(false)
}

/// Validates a plaintext key and IV, reporting the byte counts it saw.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyMaterial` when either length is wrong.
pub fn validate_plaintext_key_material(key: &str, iv: &str) -> AppResult<()> {
    if !is_valid_plaintext_key(key) {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "key must be exactly 16, 24, or 32 bytes, got {}",
            key.len()
        ))
        .into());
    }
    if !is_valid_plaintext_iv(iv) {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "IV must be exactly {} bytes, got {}",
            IV_LENGTH,
            iv.len()
        ))
        .into());
    }
    Ok(())
}

/// Generates a 32-character key and a 16-character IV from `[A-Za-z0-9]`.
///
/// ASCII-only output keeps the byte length equal to the character count, so the
/// result always validates.
pub fn generate_random_keys() -> (String, String) {
    let mut rng = rand::thread_rng();
    let key: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(GENERATED_KEY_LENGTH)
        .map(char::from)
        .collect();
    let iv: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(IV_LENGTH)
        .map(char::from)
        .collect();
    (key, iv)
}
