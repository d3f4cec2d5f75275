//! Protection of secrets at rest.
//!
//! The key vault stores its blobs through a [`SecretProtector`], an opaque
//! "protect bytes for the current user / unprotect them" capability. The concrete
//! mechanism is swappable; [`AgeProtector`] seals blobs with an age passphrase
//! recipient, which works on every platform.

use crate::constants::ENV_VAR_AESVAULT_PASSPHRASE;
use crate::errors::{AppResult, CryptoError};
use age::secrecy::SecretString;
use std::env;
use std::io::{Read, Write};
use tracing::debug;

/// Seals and opens opaque byte blobs for the current user.
pub trait SecretProtector {
    /// Seals `data`; the result is safe to write to disk.
    fn protect(&self, data: &[u8]) -> AppResult<Vec<u8>>;

    /// Opens a blob produced by [`SecretProtector::protect`].
    fn unprotect(&self, blob: &[u8]) -> AppResult<Vec<u8>>;
}

/// Passphrase-based protector using the age file format (scrypt recipient).
///
/// # Example
///
/// ```no_run
/// use aesvault::crypto::{AgeProtector, SecretProtector};
/// use age::secrecy::SecretString;
///
/// let protector = AgeProtector::new(SecretString::new("my-secret".to_string()));
/// let sealed = protector.protect(b"key material")?;
/// assert_eq!(protector.unprotect(&sealed)?, b"key material");
/// # Ok::<(), aesvault::AppError>(())
/// ```
pub struct AgeProtector {
    passphrase: SecretString,
}

impl AgeProtector {
    pub fn new(passphrase: SecretString) -> Self {
        Self { passphrase }
    }

    /// Builds a protector from `AESVAULT_PASSPHRASE`, prompting on the terminal when
    /// the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PassphrasePrompt` if the terminal cannot be read and
    /// `CryptoError::EmptyPassphrase` for an empty passphrase.
    pub fn from_env_or_prompt() -> AppResult<Self> {
        let passphrase = match env::var(ENV_VAR_AESVAULT_PASSPHRASE) {
            Ok(value) => {
                debug!("Using vault passphrase from environment");
                value
            }
            Err(_) => rpassword::prompt_password("Vault passphrase: ")
                .map_err(|e| CryptoError::PassphrasePrompt(e.to_string()))?,
        };

        if passphrase.is_empty() {
            return Err(CryptoError::EmptyPassphrase.into());
        }
        Ok(Self::new(SecretString::new(passphrase)))
    }
}

impl SecretProtector for AgeProtector {
    fn protect(&self, data: &[u8]) -> AppResult<Vec<u8>> {
        let encryptor = age::Encryptor::with_user_passphrase(self.passphrase.clone());

        let mut sealed = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut sealed)
            .map_err(|e| CryptoError::Protection(e.to_string()))?;
        writer
            .write_all(data)
            .map_err(|e| CryptoError::Protection(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| CryptoError::Protection(e.to_string()))?;

        Ok(sealed)
    }

    fn unprotect(&self, blob: &[u8]) -> AppResult<Vec<u8>> {
        let decryptor = match age::Decryptor::new(blob)
            .map_err(|e| CryptoError::Protection(e.to_string()))?
        {
            age::Decryptor::Passphrase(d) => d,
            _ => {
                return Err(CryptoError::Protection(
                    "blob is not passphrase-protected".to_string(),
                )
                .into())
            }
        };

        let mut reader = decryptor
            .decrypt(&self.passphrase, None)
            .map_err(|e| CryptoError::Protection(e.to_string()))?;
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| CryptoError::Protection(e.to_string()))?;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_protector_roundtrip() {
        let protector = AgeProtector::new(SecretString::new("unit-test-passphrase".to_string()));
        let sealed = protector.protect(b"{\"Key\":\"k\"}").unwrap();
        assert_ne!(sealed.as_slice(), b"{\"Key\":\"k\"}");
        assert_eq!(protector.unprotect(&sealed).unwrap(), b"{\"Key\":\"k\"}");
    }

    #[test]
    fn test_age_protector_wrong_passphrase_fails() {
        let sealer = AgeProtector::new(SecretString::new("right".to_string()));
        let opener = AgeProtector::new(SecretString::new("wrong".to_string()));
        let sealed = sealer.protect(b"secret").unwrap();
        assert!(opener.unprotect(&sealed).is_err());
    }

    #[test]
    fn test_age_protector_rejects_garbage() {
        let protector = AgeProtector::new(SecretString::new("pass".to_string()));
        let result = protector.unprotect(b"definitely not an age file");
        assert!(matches!(
            result,
            Err(crate::errors::AppError::Crypto(CryptoError::Protection(_)))
        ));
    }
}
