//! In-memory secret store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use gcs_core::repository::secret_store::SecretStore;
use gcs_types::error::SecretStoreError;

/// A `SecretStore` backed by a process-local map.
///
/// Can be switched to "unavailable" to model a host whose vault is down.
#[derive(Default)]
pub struct InMemorySecretStore {
    entries: Mutex<HashMap<(String, String), String>>,
    unavailable: AtomicBool,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `Unavailable` (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contains(&self, service: &str, user: &str) -> bool {
        self.lock().contains_key(&(service.to_string(), user.to_string()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), SecretStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(SecretStoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl SecretStore for InMemorySecretStore {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>, SecretStoreError> {
        self.check_available()?;
        Ok(self
            .lock()
            .get(&(service.to_string(), user.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, user: &str, value: &str) -> Result<(), SecretStoreError> {
        self.check_available()?;
        self.lock()
            .insert((service.to_string(), user.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, user: &str) -> Result<(), SecretStoreError> {
        self.check_available()?;
        match self.lock().remove(&(service.to_string(), user.to_string())) {
            Some(_) => Ok(()),
            None => Err(SecretStoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_is_none() {
        let store = InMemorySecretStore::new();
        assert!(store.get("svc", "user").unwrap().is_none());
    }

    #[test]
    fn test_set_get_delete() {
        let store = InMemorySecretStore::new();
        store.set("svc", "user", "value").unwrap();
        assert_eq!(store.get("svc", "user").unwrap().as_deref(), Some("value"));
        assert!(store.contains("svc", "user"));

        store.delete("svc", "user").unwrap();
        assert!(store.get("svc", "user").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = InMemorySecretStore::new();
        assert!(matches!(
            store.delete("svc", "user"),
            Err(SecretStoreError::NotFound)
        ));
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let store = InMemorySecretStore::new();
        store.set("svc", "user", "value").unwrap();
        store.set_unavailable(true);

        assert!(matches!(store.get("svc", "user"), Err(SecretStoreError::Unavailable(_))));
        assert!(matches!(store.set("svc", "user", "v"), Err(SecretStoreError::Unavailable(_))));
        assert!(matches!(store.delete("svc", "user"), Err(SecretStoreError::Unavailable(_))));

        store.set_unavailable(false);
        assert_eq!(store.get("svc", "user").unwrap().as_deref(), Some("value"));
    }
}
