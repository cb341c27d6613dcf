//! OS keychain adapter for secret storage.
//!
//! Uses the `keyring` crate to store/retrieve secrets via:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager
//!
//! `memory` provides an in-process substitute for tests and for callers that
//! must not touch the host vault.

pub mod memory;

pub use memory::InMemorySecretStore;

use gcs_core::repository::secret_store::SecretStore;
use gcs_types::error::SecretStoreError;

/// OS keychain secret store using the `keyring` crate.
///
/// Every error other than "no entry" is reported as `Unavailable`: a missing
/// Secret Service daemon, a locked keychain, or a platform failure all leave
/// the caller with the same remedy.
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, user: &str) -> Result<keyring::Entry, SecretStoreError> {
        keyring::Entry::new(service, user)
            .map_err(|e| SecretStoreError::Unavailable(format!("keychain entry error: {e}")))
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>, SecretStoreError> {
        let entry = Self::entry(service, user)?;

        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecretStoreError::Unavailable(format!(
                "keychain get error: {e}"
            ))),
        }
    }

    fn set(&self, service: &str, user: &str, value: &str) -> Result<(), SecretStoreError> {
        let entry = Self::entry(service, user)?;

        entry
            .set_password(value)
            .map_err(|e| SecretStoreError::Unavailable(format!("keychain set error: {e}")))
    }

    fn delete(&self, service: &str, user: &str) -> Result<(), SecretStoreError> {
        let entry = Self::entry(service, user)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(SecretStoreError::NotFound),
            Err(e) => Err(SecretStoreError::Unavailable(format!(
                "keychain delete error: {e}"
            ))),
        }
    }
}
