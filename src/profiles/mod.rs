//! Key profiles and the protected key configuration.
//!
//! An [`AppConfig`] holds a list of named [`KeyProfile`]s and the id of the
//! selected one, plus the legacy top-level key fields that older configurations
//! carried before profiles existed. [`vault::KeyVault`] persists it through a
//! [`SecretProtector`](crate::crypto::SecretProtector).

pub mod vault;

pub use self::vault::KeyVault;

use crate::constants::{
    DEFAULT_IV, DEFAULT_IV_BASE64, DEFAULT_KEY, DEFAULT_KEY_BASE64, DEFAULT_PROFILE_NAME,
    REDACTED_PLACEHOLDER,
};
use crate::crypto::keys::{generate_random_keys, validate_plaintext_key_material, KeyMaterial};
use crate::errors::{AppError, AppResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// The four key fields shared by profiles, legacy config and user defaults.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySet {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "IV", default)]
    pub iv: String,
    #[serde(default)]
    pub key_base64: String,
    #[serde(rename = "IVBase64", default)]
    pub iv_base64: String,
}

impl Default for KeySet {
    /// The built-in keys.
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            iv: DEFAULT_IV.to_string(),
            key_base64: DEFAULT_KEY_BASE64.to_string(),
            iv_base64: DEFAULT_IV_BASE64.to_string(),
        }
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySet")
            .field("key", &REDACTED_PLACEHOLDER)
            .field("iv", &REDACTED_PLACEHOLDER)
            .field("key_base64", &REDACTED_PLACEHOLDER)
            .field("iv_base64", &REDACTED_PLACEHOLDER)
            .finish()
    }
}

impl KeySet {
    /// Builds a set from a plaintext key and IV, deriving the Base64 pair from
    /// their bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` if either length is wrong.
    pub fn from_plaintext(key: &str, iv: &str) -> AppResult<Self> {
        validate_plaintext_key_material(key, iv)?;
        Ok(Self {
            key: key.to_string(),
            iv: iv.to_string(),
            key_base64: STANDARD.encode(key.as_bytes()),
            iv_base64: STANDARD.encode(iv.as_bytes()),
        })
    }

    /// Fresh random key material.
    pub fn generate() -> Self {
        let (key, iv) = generate_random_keys();
        Self {
            key_base64: STANDARD.encode(key.as_bytes()),
            iv_base64: STANDARD.encode(iv.as_bytes()),
            key,
            iv,
        }
    }

    /// The plaintext pair used by the double-encryption path.
    pub fn material(&self) -> KeyMaterial {
        KeyMaterial::new(self.key.clone(), self.iv.clone())
    }

    /// Fills every empty field from `fallback`.
    fn backfill(&mut self, fallback: &KeySet) {
        for (field, default) in [
            (&mut self.key, &fallback.key),
            (&mut self.iv, &fallback.iv),
            (&mut self.key_base64, &fallback.key_base64),
            (&mut self.iv_base64, &fallback.iv_base64),
        ] {
            if field.is_empty() {
                field.clone_from(default);
            }
        }
    }
}

/// A named set of key material.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub keys: KeySet,
}

impl fmt::Debug for KeyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("keys", &self.keys)
            .finish()
    }
}

impl KeyProfile {
    pub fn new(name: impl Into<String>, keys: KeySet) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            keys,
        }
    }

    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// The protected key configuration.
///
/// `legacy` mirrors the top-level `Key`, `IV`, `KeyBase64` and `IVBase64` fields
/// of the stored document. They seed the `Default` profile when a document has
/// no profiles.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub legacy: KeySet,
    pub profiles: Vec<KeyProfile>,
    pub selected_profile_id: Option<Uuid>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("legacy", &self.legacy)
            .field("profiles", &self.profiles)
            .field("selected_profile_id", &self.selected_profile_id)
            .finish()
    }
}

impl AppConfig {
    /// A configuration holding a single `Default` profile built from `defaults`.
    pub fn from_defaults(defaults: &KeySet) -> Self {
        let mut config = Self {
            legacy: defaults.clone(),
            profiles: Vec::new(),
            selected_profile_id: None,
        };
        config.normalize(defaults);
        config
    }

    /// Back-fills empty legacy fields from `defaults` and synthesises the
    /// `Default` profile when there are no profiles.
    pub fn normalize(&mut self, defaults: &KeySet) {
        self.legacy.backfill(defaults);
        for profile in &mut self.profiles {
            profile.keys.backfill(defaults);
        }

        if self.profiles.is_empty() {
            let profile = KeyProfile::new(DEFAULT_PROFILE_NAME, self.legacy.clone());
            debug!("Synthesised '{}' profile from legacy keys", DEFAULT_PROFILE_NAME);
            self.selected_profile_id = Some(profile.id);
            self.profiles.push(profile);
        }
    }

    /// The selected profile, or the first one when the selection is missing or
    /// stale.
    pub fn active_profile(&self) -> Option<&KeyProfile> {
        self.selected_profile_id
            .and_then(|id| self.profiles.iter().find(|p| p.id == id))
            .or_else(|| self.profiles.first())
    }

    /// The active profile's keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Profile` when there are no profiles at all.
    pub fn active_keys(&self) -> AppResult<&KeySet> {
        self.active_profile()
            .map(|p| &p.keys)
            .ok_or_else(|| AppError::Profile("No key profile configured".to_string()))
    }

    pub fn find_profile(&self, name: &str) -> Option<&KeyProfile> {
        self.profiles.iter().find(|p| p.is_named(name))
    }

    fn find_profile_mut(&mut self, name: &str) -> AppResult<&mut KeyProfile> {
        self.profiles
            .iter_mut()
            .find(|p| p.is_named(name))
            .ok_or_else(|| AppError::Profile(format!("No profile named '{}'", name.trim())))
    }

    /// Makes the profile called `name` (case-insensitive) the active one.
    pub fn select_profile(&mut self, name: &str) -> AppResult<&KeyProfile> {
        let id = self.find_profile_mut(name)?.id;
        self.selected_profile_id = Some(id);
        info!("Selected key profile {}", id);
        self.active_profile()
            .ok_or_else(|| AppError::Profile("No key profile configured".to_string()))
    }

    /// Adds a profile with freshly generated keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Profile` for a blank name or one already in use
    /// (case-insensitive).
    pub fn add_profile(&mut self, name: &str) -> AppResult<&KeyProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Profile("Profile name cannot be empty".to_string()));
        }
        if self.find_profile(name).is_some() {
            return Err(AppError::Profile(format!(
                "A profile named '{}' already exists",
                name
            )));
        }

        self.profiles.push(KeyProfile::new(name, KeySet::generate()));
        info!("Added key profile '{}'", name);
        self.profiles
            .last()
            .ok_or_else(|| AppError::Profile("Profile was not added".to_string()))
    }

    /// Removes the profile called `name`. The selection falls back to the first
    /// remaining profile if it pointed at the removed one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Profile` for an unknown name or when only one profile is
    /// left.
    pub fn remove_profile(&mut self, name: &str) -> AppResult<KeyProfile> {
        if self.profiles.len() <= 1 {
            return Err(AppError::Profile(
                "Cannot delete the last profile".to_string(),
            ));
        }
        let position = self
            .profiles
            .iter()
            .position(|p| p.is_named(name))
            .ok_or_else(|| AppError::Profile(format!("No profile named '{}'", name.trim())))?;

        let removed = self.profiles.remove(position);
        if self.selected_profile_id == Some(removed.id) {
            self.selected_profile_id = self.profiles.first().map(|p| p.id);
        }
        info!("Removed key profile '{}'", removed.name);
        Ok(removed)
    }

    /// Replaces the keys of the profile called `name`.
    pub fn set_profile_keys(&mut self, name: &str, keys: KeySet) -> AppResult<()> {
        let profile = self.find_profile_mut(name)?;
        profile.keys = keys;
        debug!("Replaced keys of profile {}", profile.id);
        Ok(())
    }
}
