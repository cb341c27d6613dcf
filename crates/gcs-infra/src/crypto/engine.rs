//! AES-256-GCM sealing of token records.
//!
//! Each seal obtains the current key from the injected `KeyProvider`,
//! generates a fresh random 12-byte nonce, and encrypts with an empty AAD.
//! The resulting `EncryptedRecord` carries the key version, the nonce, and
//! `ciphertext || 16-byte tag`.
//!
//! The engine holds no key material between calls. Structural problems
//! (nonce length, unknown version) are rejected before any key is fetched;
//! every authentication failure is reported as `CryptoError::Tampered`.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use gcs_core::repository::key::DynKeyProvider;
use gcs_types::envelope::EncryptedRecord;
use gcs_types::error::CryptoError;
use gcs_types::key::NONCE_LEN;

/// Stateless AEAD engine over a key provider.
#[derive(Clone)]
pub struct AeadEngine {
    keys: DynKeyProvider,
}

impl AeadEngine {
    pub fn new(keys: DynKeyProvider) -> Self {
        Self { keys }
    }

    /// Encrypt `plaintext` under the current key with a fresh nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedRecord, CryptoError> {
        let key = self.keys.current_key()?;
        let cipher = Aes256Gcm::new(key.expose().into());

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(EncryptedRecord {
            version: key.version().clone(),
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Verify and decrypt a record produced by `seal()`.
    pub fn open(&self, record: &EncryptedRecord) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if record.nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonce(record.nonce.len()));
        }
        if !record.version.is_current() {
            return Err(CryptoError::UnsupportedVersion(record.version.to_string()));
        }

        let key = self.keys.key_for_version(&record.version)?;
        let cipher = Aes256Gcm::new(key.expose().into());

        cipher
            .decrypt(Nonce::from_slice(&record.nonce), record.ciphertext.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::Tampered)
    }
}
