//! Data-encryption key lifecycle.
//!
//! The key lives in the OS secret store under service
//! `"globus-connect-server"`, user `"encryption-key"`, as standard base64 of
//! 32 random bytes. It is created on first use.
//!
//! Later key versions are stored under `encryption-key/<version>` so that
//! several generations can coexist once rotation exists; today only `v1` is
//! ever written and `rotate()` refuses.
//!
//! SECURITY: `KeyManager` never caches key material. Every call fetches from
//! the store and hands back a `DataKey` that wipes itself on drop.

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use gcs_core::repository::key::KeyProvider;
use gcs_core::repository::secret_store::DynSecretStore;
use gcs_types::error::{KeyError, SecretStoreError};
use gcs_types::key::{DataKey, KEY_LEN, KeyVersion};

/// Service name for every vault entry owned by this tool.
pub const VAULT_SERVICE: &str = "globus-connect-server";

/// Vault user holding the v1 data key.
pub const VAULT_USER: &str = "encryption-key";

/// Vault user name for a given key version.
pub fn vault_user_for(version: &KeyVersion) -> String {
    if version.is_current() {
        VAULT_USER.to_string()
    } else {
        format!("{VAULT_USER}/{version}")
    }
}

/// Derive a key from a passphrase: SHA-256 of its UTF-8 bytes.
///
/// Last-resort fallback for hosts with no secret store. There is no salt and
/// no work factor, so the result is only as strong as the passphrase.
pub fn derive_from_passphrase(passphrase: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
    key
}

fn vault_error(err: SecretStoreError) -> KeyError {
    match err {
        SecretStoreError::Unavailable(detail) => KeyError::VaultUnavailable(detail),
        SecretStoreError::NotFound => KeyError::VaultUnavailable("entry vanished".to_string()),
    }
}

/// Manages the data key in an injected secret store.
pub struct KeyManager {
    store: DynSecretStore,
    service: String,
}

impl KeyManager {
    pub fn new(store: DynSecretStore) -> Self {
        Self::with_service(store, VAULT_SERVICE)
    }

    /// Use a custom vault service name (useful for testing).
    pub fn with_service(store: DynSecretStore, service: impl Into<String>) -> Self {
        Self {
            store,
            service: service.into(),
        }
    }

    /// Return the current key, generating and storing one if none exists.
    pub fn get_or_create(&self) -> Result<DataKey, KeyError> {
        let version = KeyVersion::current();
        if let Some(key) = self.fetch(&version)? {
            return Ok(key);
        }

        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        let encoded = Zeroizing::new(STANDARD.encode(bytes.as_slice()));

        self.store
            .set(&self.service, &vault_user_for(&version), &encoded)
            .map_err(vault_error)?;

        tracing::info!(service = %self.service, version = %version, "generated new data-encryption key");
        Ok(DataKey::new(bytes, version))
    }

    /// Delete the current key from the store. Already absent is success.
    pub fn clear(&self) -> Result<(), KeyError> {
        let user = vault_user_for(&KeyVersion::current());
        match self.store.delete(&self.service, &user) {
            Ok(()) | Err(SecretStoreError::NotFound) => Ok(()),
            Err(e) => Err(vault_error(e)),
        }
    }

    /// Key rotation is reserved for a later release.
    pub fn rotate(&self) -> Result<KeyVersion, KeyError> {
        Err(KeyError::RotationUnsupported)
    }

    fn fetch(&self, version: &KeyVersion) -> Result<Option<DataKey>, KeyError> {
        let stored = match self.store.get(&self.service, &vault_user_for(version)) {
            Ok(Some(value)) => Zeroizing::new(value),
            Ok(None) | Err(SecretStoreError::NotFound) => return Ok(None),
            Err(e) => return Err(vault_error(e)),
        };

        let decoded = Zeroizing::new(
            STANDARD
                .decode(stored.trim().as_bytes())
                .map_err(|_| KeyError::CorruptKey("stored key is not valid base64".to_string()))?,
        );
        if decoded.len() != KEY_LEN {
            return Err(KeyError::CorruptKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                decoded.len()
            )));
        }

        let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
        bytes.copy_from_slice(&decoded);
        Ok(Some(DataKey::new(bytes, version.clone())))
    }
}

impl KeyProvider for KeyManager {
    fn current_key(&self) -> Result<DataKey, KeyError> {
        self.get_or_create()
    }

    fn key_for_version(&self, version: &KeyVersion) -> Result<DataKey, KeyError> {
        self.fetch(version)?
            .ok_or_else(|| KeyError::MissingKey(version.clone()))
    }
}

/// Key provider deriving the key from a passphrase on every call.
pub struct PassphraseKeyProvider {
    passphrase: SecretString,
}

impl PassphraseKeyProvider {
    pub fn new(passphrase: SecretString) -> Self {
        Self { passphrase }
    }
}

impl KeyProvider for PassphraseKeyProvider {
    fn current_key(&self) -> Result<DataKey, KeyError> {
        Ok(DataKey::new(
            derive_from_passphrase(self.passphrase.expose_secret()),
            KeyVersion::current(),
        ))
    }

    fn key_for_version(&self, version: &KeyVersion) -> Result<DataKey, KeyError> {
        if version.is_current() {
            self.current_key()
        } else {
            Err(KeyError::MissingKey(version.clone()))
        }
    }
}
