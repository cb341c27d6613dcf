//! Application state wiring the token store together.
//!
//! AppState pins the generic token service to the concrete infra adapters:
//! the OS keychain (or a passphrase) for the data key, AES-256-GCM for
//! sealing, and per-profile files under the config root.

use std::sync::Arc;

use secrecy::SecretString;

use gcs_core::repository::key::{DynKeyProvider, KeyProvider};
use gcs_core::repository::secret_store::DynSecretStore;
use gcs_core::service::token::TokenService;
use gcs_infra::auth::GlobusAuthClient;
use gcs_infra::config::{load_cli_config, resolve_config_root};
use gcs_infra::crypto::engine::AeadEngine;
use gcs_infra::crypto::key_manager::{KeyManager, PassphraseKeyProvider};
use gcs_infra::keychain::KeyringSecretStore;
use gcs_infra::token::FileTokenStore;
use gcs_types::config::{CliConfig, KeySource};
use gcs_types::error::{AuthClientError, KeyError};
use gcs_types::key::{DataKey, KeyVersion};

pub type ConcreteTokenService = TokenService<FileTokenStore>;

/// Shared state for command handlers.
pub struct AppState {
    pub config: CliConfig,
    pub token_service: ConcreteTokenService,
    /// Present only when the data key lives in the OS keychain.
    pub key_manager: Option<Arc<KeyManager>>,
}

impl AppState {
    /// Resolve the config root, load `config.toml`, and wire the store.
    ///
    /// Nothing here touches the keychain; the key is fetched on first use.
    pub async fn init() -> anyhow::Result<Self> {
        let config_root = resolve_config_root();
        let config = load_cli_config(&config_root).await;
        tracing::debug!(root = %config_root.display(), key_source = ?config.key_source, "loaded config");

        let (keys, key_manager): (DynKeyProvider, Option<Arc<KeyManager>>) = match config.key_source
        {
            KeySource::Keychain => {
                let store: DynSecretStore = Arc::new(KeyringSecretStore::new());
                let manager = Arc::new(KeyManager::new(store));
                let keys: DynKeyProvider = manager.clone();
                (keys, Some(manager))
            }
            KeySource::Passphrase => (passphrase_provider(&config.passphrase_env), None),
        };

        let store = FileTokenStore::new(&config_root, AeadEngine::new(keys));

        Ok(Self {
            config,
            token_service: TokenService::new(store),
            key_manager,
        })
    }

    pub fn store(&self) -> &FileTokenStore {
        self.token_service.repository()
    }

    /// The profile named on the command line, else the configured default.
    pub fn profile<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.unwrap_or(&self.config.default_profile)
    }

    pub fn auth_client(&self) -> Result<GlobusAuthClient, AuthClientError> {
        GlobusAuthClient::from_config(&self.config.auth_url, self.config.client_id.as_deref())
    }
}

/// Build the passphrase provider from the configured environment variable.
///
/// A missing variable is reported when a key is first needed, so commands
/// that never decrypt (listing, logout) still work.
fn passphrase_provider(env_name: &str) -> DynKeyProvider {
    match std::env::var(env_name) {
        Ok(value) if !value.is_empty() => {
            Arc::new(PassphraseKeyProvider::new(SecretString::from(value)))
        }
        _ => Arc::new(UnsetPassphrase(env_name.to_string())),
    }
}

struct UnsetPassphrase(String);

impl KeyProvider for UnsetPassphrase {
    fn current_key(&self) -> Result<DataKey, KeyError> {
        Err(KeyError::PassphraseMissing(self.0.clone()))
    }

    fn key_for_version(&self, _version: &KeyVersion) -> Result<DataKey, KeyError> {
        Err(KeyError::PassphraseMissing(self.0.clone()))
    }
}
