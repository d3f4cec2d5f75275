//! AES-CBC text transforms.
//!
//! Two independent modes share the same primitive (AES-CBC with PKCS7 padding,
//! Base64 wire encoding):
//!
//! - **Double** mode takes a plaintext key and IV (their UTF-8 bytes are the raw key
//!   material) and runs the cipher twice: the Base64 text of the first ciphertext is
//!   encrypted again under the same key and IV.
//! - **Single** mode takes the key and IV already Base64-encoded and runs one pass.
//!
//! # Determinism
//!
//! The IV is fixed per key profile, so the same plaintext under the same key and IV
//! always produces the same ciphertext. Exact-match lookups in history and
//! reproducible test vectors depend on this. It is an accepted weakness: an observer
//! holding many ciphertexts under one profile can tell when two plaintexts are equal
//! or share a leading block.

use crate::constants::{DETECT_MIN_BASE64_LENGTH, DETECT_MIN_LENGTH};
use crate::crypto::keys::validate_plaintext_key_material;
use crate::errors::{AppResult, CryptoError};
use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::debug;
use zeroize::Zeroizing;

/// Encrypts `plaintext` twice with the plaintext `key` and `iv`.
///
/// The empty string encrypts to the empty string without touching the cipher.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyMaterial` if the key is not 16, 24 or 32 bytes or
/// the IV is not 16 bytes when UTF-8 encoded.
///
/// # Example
///
/// ```
/// use aesvault::crypto::{decrypt_double, encrypt_double};
///
/// let key = "12345678901234567890123456789012";
/// let iv = "1234567890123456";
/// let encrypted = encrypt_double("Hello, World!", key, iv)?;
/// assert_eq!(decrypt_double(&encrypted, key, iv)?, "Hello, World!");
/// # Ok::<(), aesvault::AppError>(())
/// ```
pub fn encrypt_double(plaintext: &str, key: &str, iv: &str) -> AppResult<String> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }
    validate_plaintext_key_material(key, iv)?;

    let first = STANDARD.encode(cbc_encrypt(key.as_bytes(), iv.as_bytes(), plaintext.as_bytes())?);
    let second = cbc_encrypt(key.as_bytes(), iv.as_bytes(), first.as_bytes())?;

    debug!(
        "Double-encrypted {} bytes into {} bytes",
        plaintext.len(),
        second.len()
    );
    Ok(STANDARD.encode(second))
}

/// Reverses [`encrypt_double`].
///
/// # Errors
///
/// - `CryptoError::InvalidKeyMaterial` for a bad key or IV length.
/// - `CryptoError::InvalidEncoding` if `ciphertext` is not Base64.
/// - `CryptoError::DecryptionFailed` if either pass fails. Both passes collapse into
///   this one variant; a non-Base64 intermediate text counts as a failed pass.
pub fn decrypt_double(ciphertext: &str, key: &str, iv: &str) -> AppResult<String> {
    if ciphertext.is_empty() {
        return Ok(String::new());
    }
    validate_plaintext_key_material(key, iv)?;

    let outer = STANDARD
        .decode(ciphertext)
        .map_err(CryptoError::InvalidEncoding)?;

    open_double(&outer, key.as_bytes(), iv.as_bytes()).ok_or_else(|| {
        debug!("Double decryption rejected the ciphertext");
        CryptoError::DecryptionFailed.into()
    })
}

fn open_double(outer: &[u8], key: &[u8], iv: &[u8]) -> Option<String> {
    let first = cbc_decrypt(key, iv, outer).ok()?;
    let intermediate = String::from_utf8(first).ok()?;
    let inner = STANDARD.decode(intermediate.as_bytes()).ok()?;
    let second = cbc_decrypt(key, iv, &inner).ok()?;
    String::from_utf8(second).ok()
}

/// Encrypts `plaintext` once with a Base64-encoded key and IV.
///
/// # Errors
///
/// - `CryptoError::InvalidEncoding` if the key or IV is not Base64.
/// - `CryptoError::InvalidKeyMaterial` if they decode to unusable lengths.
pub fn encrypt_single(plaintext: &str, key_base64: &str, iv_base64: &str) -> AppResult<String> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }
    let (key, iv) = decode_key_material(key_base64, iv_base64)?;
    let ciphertext = cbc_encrypt(&key, &iv, plaintext.as_bytes())?;
    Ok(STANDARD.encode(ciphertext))
}

/// Reverses [`encrypt_single`].
///
/// # Errors
///
/// - `CryptoError::InvalidEncoding` if the ciphertext, key or IV is not Base64.
/// - `CryptoError::InvalidKeyMaterial` if the key or IV decode to unusable lengths.
/// - `CryptoError::DecryptionFailed` if unpadding fails or the result is not UTF-8.
pub fn decrypt_single(ciphertext: &str, key_base64: &str, iv_base64: &str) -> AppResult<String> {
    if ciphertext.is_empty() {
        return Ok(String::new());
    }
    let (key, iv) = decode_key_material(key_base64, iv_base64)?;
    let bytes = STANDARD
        .decode(ciphertext)
        .map_err(CryptoError::InvalidEncoding)?;

    let plaintext = cbc_decrypt(&key, &iv, &bytes)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed.into())
}

/// Heuristic used for UI hints: does `text` look like output of this tool?
///
/// True when the text is at least 20 characters, a multiple of 4 long, and decodes
/// as Base64. This is not a verification step and must not gate decryption.
pub fn looks_like_encrypted(text: &str) -> bool {
    if text.trim().is_empty() || text.chars().count() < DETECT_MIN_LENGTH {
        return false;
    }
    STANDARD.decode(text).is_ok()
        && text.len() >= DETECT_MIN_BASE64_LENGTH
        && text.len() % 4 == 0
}

type DecodedKey = (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>);

fn decode_key_material(key_base64: &str, iv_base64: &str) -> AppResult<DecodedKey> {
    let key = STANDARD
        .decode(key_base64)
        .map_err(CryptoError::InvalidEncoding)?;
    let iv = STANDARD
        .decode(iv_base64)
        .map_err(CryptoError::InvalidEncoding)?;
    Ok((Zeroizing::new(key), Zeroizing::new(iv)))
}

fn cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> AppResult<Vec<u8>> {
    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        other => return Err(key_length_error(other)),
    };
    Ok(ciphertext)
}

fn cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> AppResult<Vec<u8>> {
    let plaintext = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| iv_length_error(iv))?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        other => return Err(key_length_error(other)),
    };
    plaintext.map_err(|_| CryptoError::DecryptionFailed.into())
}

fn key_length_error(len: usize) -> crate::errors::AppError {
    CryptoError::InvalidKeyMaterial(format!("key must be 16, 24 or 32 bytes, got {}", len)).into()
}

fn iv_length_error(iv: &[u8]) -> crate::errors::AppError {
    CryptoError::InvalidKeyMaterial(format!("IV must be 16 bytes, got {}", iv.len())).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    const TEST_KEY: &str = "12345678901234567890123456789012";
    const TEST_IV: &str = "1234567890123456";
    const TEST_KEY_BASE64: &str = "MTIzNDU2Nzg5MDEyMzQ1Njc4OTAxMjM0NTY3ODkwMTI=";
    const TEST_IV_BASE64: &str = "MTIzNDU2Nzg5MDEyMzQ1Ng==";

    #[test]
    fn test_double_roundtrip() {
        let encrypted = encrypt_double("Hello, World!", TEST_KEY, TEST_IV).unwrap();
        assert_ne!(encrypted, "Hello, World!");
        let decrypted = decrypt_double(&encrypted, TEST_KEY, TEST_IV).unwrap();
        assert_eq!(decrypted, "Hello, World!");
    }

    #[test]
    fn test_double_is_two_single_passes() {
        // With the default profile the Base64 key/IV decode to the plaintext key/IV,
        // so double mode must equal two chained single-mode passes.
        let once = encrypt_single("SecretData123", TEST_KEY_BASE64, TEST_IV_BASE64).unwrap();
        let twice = encrypt_single(&once, TEST_KEY_BASE64, TEST_IV_BASE64).unwrap();
        assert_eq!(
            encrypt_double("SecretData123", TEST_KEY, TEST_IV).unwrap(),
            twice
        );
    }

    #[test]
    fn test_double_supports_all_key_sizes() {
        for key in [
            "1234567890123456",
            "123456789012345678901234",
            "12345678901234567890123456789012",
        ] {
            let encrypted = encrypt_double("size check", key, TEST_IV).unwrap();
            assert_eq!(decrypt_double(&encrypted, key, TEST_IV).unwrap(), "size check");
        }
    }

    #[test]
    fn test_empty_input_short_circuits() {
        assert_eq!(encrypt_double("", TEST_KEY, TEST_IV).unwrap(), "");
        assert_eq!(decrypt_double("", TEST_KEY, TEST_IV).unwrap(), "");
        // No validation happens for empty input.
        assert_eq!(encrypt_double("", "short", "short").unwrap(), "");
        assert_eq!(encrypt_single("", "!!", "!!").unwrap(), "");
        assert_eq!(decrypt_single("", "!!", "!!").unwrap(), "");
    }

    #[test]
    fn test_invalid_key_material_rejected_before_encrypting() {
        let result = encrypt_double("data", "short-key", TEST_IV);
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::InvalidKeyMaterial(_)))
        ));

        let result = encrypt_double("data", TEST_KEY, "short-iv");
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::InvalidKeyMaterial(_)))
        ));
    }

    #[test]
    fn test_decrypt_rejects_non_base64() {
        let result = decrypt_double("This is not valid base64!!!", TEST_KEY, TEST_IV);
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::InvalidEncoding(_)))
        ));
    }

    #[test]
    fn test_decrypt_rejects_truncated_ciphertext() {
        // Valid Base64, but 12 bytes is not a whole AES block.
        let result = decrypt_double("AAAAAAAAAAAAAAAA", TEST_KEY, TEST_IV);
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::DecryptionFailed))
        ));
    }

    #[test]
    fn test_single_roundtrip() {
        let encrypted = encrypt_single("client-42", TEST_KEY_BASE64, TEST_IV_BASE64).unwrap();
        let decrypted = decrypt_single(&encrypted, TEST_KEY_BASE64, TEST_IV_BASE64).unwrap();
        assert_eq!(decrypted, "client-42");
    }

    #[test]
    fn test_single_rejects_malformed_key() {
        let result = encrypt_single("client-42", "not*base64", TEST_IV_BASE64);
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::InvalidEncoding(_)))
        ));

        // "AAAA" decodes to 3 bytes, which is no AES key size.
        let result = encrypt_single("client-42", "AAAA", TEST_IV_BASE64);
        assert!(matches!(
            result,
            Err(AppError::Crypto(CryptoError::InvalidKeyMaterial(_)))
        ));
    }

    #[test]
    fn test_looks_like_encrypted() {
        let encrypted = encrypt_double("0123456789", TEST_KEY, TEST_IV).unwrap();
        assert!(looks_like_encrypted(&encrypted));

        assert!(!looks_like_encrypted(""));
        assert!(!looks_like_encrypted("   "));
        assert!(!looks_like_encrypted("short"));
        // 16 chars of valid Base64, but below the 20-char floor.
        assert!(!looks_like_encrypted("AAAAAAAAAAAAAAAA"));
        // 20 chars, valid Base64.
        assert!(looks_like_encrypted("AAAAAAAAAAAAAAAAAAAA"));
        // Plain prose of sufficient length.
        assert!(!looks_like_encrypted("this is clearly a sentence"));
    }
}
