//! Data-key provider port.

use std::sync::Arc;

use gcs_types::error::KeyError;
use gcs_types::key::{DataKey, KeyVersion};

/// Source of data-encryption keys for the AEAD engine.
///
/// Each call returns a fresh transient copy; implementations must not hand
/// out cached key material.
pub trait KeyProvider: Send + Sync {
    /// The key new records are sealed under, creating it if needed.
    fn current_key(&self) -> Result<DataKey, KeyError>;

    /// The key that sealed records tagged with `version`.
    fn key_for_version(&self, version: &KeyVersion) -> Result<DataKey, KeyError>;
}

pub type DynKeyProvider = Arc<dyn KeyProvider>;
