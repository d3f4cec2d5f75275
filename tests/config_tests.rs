//! Integration tests for configuration: environment loading, persisted settings
//! and the age-sealed key vault.

use age::secrecy::SecretString;
use aesvault::constants::{CONFIG_FILE_NAME, DEFAULTS_FILE_NAME};
use aesvault::crypto::{decrypt_double, encrypt_double, AgeProtector};
use aesvault::errors::{AppError, CryptoError};
use aesvault::profiles::KeyVault;
use aesvault::{AppSettings, Config};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn protector(passphrase: &str) -> AgeProtector {
    AgeProtector::new(SecretString::new(passphrase.to_string()))
}

#[test]
#[serial]
fn test_config_load_reads_aesvault_dir() {
    let temp_dir = tempdir().unwrap();
    let original = env::var("AESVAULT_DIR").ok();
    env::set_var("AESVAULT_DIR", temp_dir.path());

    let config = Config::load();

    match original {
        Some(v) => env::set_var("AESVAULT_DIR", v),
        None => env::remove_var("AESVAULT_DIR"),
    }

    let config = config.unwrap();
    assert_eq!(config.data_dir, PathBuf::from(temp_dir.path()));
    assert!(config.validate().is_ok());
}

#[test]
fn test_settings_survive_roundtrip() {
    let temp_dir = tempdir().unwrap();
    let mut settings = AppSettings::load(temp_dir.path());
    settings.set("recent-items-count", "3").unwrap();
    settings.save(temp_dir.path()).unwrap();

    assert_eq!(AppSettings::load(temp_dir.path()).recent_items_count, 3);
}

#[test]
fn test_vault_with_age_protector() {
    let temp_dir = tempdir().unwrap();
    let vault = KeyVault::new(temp_dir.path(), protector("correct horse"));

    let mut config = vault.load().unwrap();
    config.add_profile("Work").unwrap();
    config.select_profile("Work").unwrap();
    vault.save(&config).unwrap();

    let sealed = fs::read(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(sealed.starts_with(b"age-encryption.org/v1"));

    let reloaded = vault.load().unwrap();
    assert_eq!(reloaded.active_profile().unwrap().name, "Work");

    // The same text under the Work keys survives the reload.
    let keys = reloaded.active_keys().unwrap();
    let encrypted = encrypt_double("0912345678", &keys.key, &keys.iv).unwrap();
    let original_keys = config.active_keys().unwrap();
    assert_eq!(
        decrypt_double(&encrypted, &original_keys.key, &original_keys.iv).unwrap(),
        "0912345678"
    );
}

#[test]
fn test_vault_wrong_passphrase_is_refused() {
    let temp_dir = tempdir().unwrap();
    let writer = KeyVault::new(temp_dir.path(), protector("right"));
    let mut config = writer.load().unwrap();
    config.add_profile("Work").unwrap();
    writer.save(&config).unwrap();

    let reader = KeyVault::new(temp_dir.path(), protector("wrong"));
    assert!(matches!(
        reader.load(),
        Err(AppError::Crypto(CryptoError::VaultLocked { .. }))
    ));
    assert!(reader.save(&config).is_err());

    let reloaded = writer.load().unwrap();
    assert_eq!(reloaded.profiles.len(), 2);
}

#[test]
fn test_user_defaults_seed_a_reset_configuration() {
    let temp_dir = tempdir().unwrap();
    let vault = KeyVault::new(temp_dir.path(), protector("pass"));

    vault
        .set_as_defaults("ABCDEFGHIJKLMNOPQRSTUVWX", "0000000000000000")
        .unwrap();
    assert!(temp_dir.path().join(DEFAULTS_FILE_NAME).exists());

    vault.reset_to_defaults().unwrap();
    let keys = vault.load_defaults().unwrap();
    assert_eq!(keys.key, "ABCDEFGHIJKLMNOPQRSTUVWX");

    let config = vault.load().unwrap();
    assert_eq!(config.active_keys().unwrap(), &keys);
}
