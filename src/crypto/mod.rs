//! CryptoCore: text encryption, key validation and secret protection.
//!
//! # Module Structure
//!
//! - `cipher`: double and single AES-CBC transforms plus the ciphertext heuristic
//! - `keys`: key/IV validation and random key generation
//! - `protect`: the `SecretProtector` capability used for key storage at rest
//!
//! # Example
//!
//! ```
//! use aesvault::crypto::{decrypt_double, encrypt_double, looks_like_encrypted};
//!
//! let key = "12345678901234567890123456789012";
//! let iv = "1234567890123456";
//!
//! let encrypted = encrypt_double("0912345678", key, iv)?;
//! assert!(looks_like_encrypted(&encrypted));
//! assert_eq!(decrypt_double(&encrypted, key, iv)?, "0912345678");
//! # Ok::<(), aesvault::AppError>(())
//! ```

pub mod cipher;
pub mod keys;
pub mod protect;

// Re-export commonly used types
pub use self::cipher::{
    decrypt_double, decrypt_single, encrypt_double, encrypt_single, looks_like_encrypted,
};
pub use self::keys::{
    generate_random_keys, is_valid_base64_key, is_valid_plaintext_iv, is_valid_plaintext_key,
    validate_plaintext_key_material, KeyMaterial,
};
pub use self::protect::{AgeProtector, SecretProtector};
