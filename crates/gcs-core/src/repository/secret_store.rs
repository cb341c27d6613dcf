//! OS secret store port.

use std::sync::Arc;

use gcs_types::error::SecretStoreError;

/// Key/value access to an OS credential vault under `(service, user)`.
///
/// Values are opaque UTF-8 strings. Calls may block (the platform can show
/// an unlock dialog on first access).
pub trait SecretStore: Send + Sync {
    /// Returns `Ok(None)` when no entry exists.
    fn get(&self, service: &str, user: &str) -> Result<Option<String>, SecretStoreError>;

    fn set(&self, service: &str, user: &str, value: &str) -> Result<(), SecretStoreError>;

    /// Returns `Err(SecretStoreError::NotFound)` when no entry exists.
    fn delete(&self, service: &str, user: &str) -> Result<(), SecretStoreError>;
}

/// Shared handle to a secret store, injected into whatever needs vault access.
pub type DynSecretStore = Arc<dyn SecretStore>;
