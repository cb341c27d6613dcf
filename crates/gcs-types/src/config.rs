//! CLI configuration types.
//!
//! `CliConfig` represents the optional `config.toml` in the config root.
//! Every field has a default so a missing file is equivalent to `{}`.

use serde::{Deserialize, Serialize};

/// Where the data-encryption key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// OS secret store (Keychain / Secret Service / Credential Manager).
    #[default]
    Keychain,
    /// SHA-256 of a passphrase read from an environment variable. Last resort
    /// for hosts without a secret store.
    Passphrase,
}

/// Top-level configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Profile used when `--profile` is not given.
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Base URL of the OAuth2 authorization server.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Native-app client id used for refresh grants.
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub key_source: KeySource,

    /// Environment variable holding the passphrase when `key_source = "passphrase"`.
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_auth_url() -> String {
    "https://auth.globus.org".to_string()
}

fn default_passphrase_env() -> String {
    "GCS_TOKEN_PASSPHRASE".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            auth_url: default_auth_url(),
            client_id: None,
            key_source: KeySource::default(),
            passphrase_env: default_passphrase_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_default_values() {
        let config = CliConfig::default();
        assert_eq!(config.default_profile, "default");
        assert_eq!(config.auth_url, "https://auth.globus.org");
        assert_eq!(config.key_source, KeySource::Keychain);
        assert_eq!(config.passphrase_env, "GCS_TOKEN_PASSPHRASE");
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_cli_config_partial_toml() {
        let toml_str = r#"
default_profile = "prod"
key_source = "passphrase"
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_profile, "prod");
        assert_eq!(config.key_source, KeySource::Passphrase);
        assert_eq!(config.auth_url, "https://auth.globus.org");
    }

    #[test]
    fn test_cli_config_empty_toml_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_profile, "default");
        assert_eq!(config.key_source, KeySource::Keychain);
    }

    #[test]
    fn test_unknown_key_source_rejected() {
        assert!(toml::from_str::<CliConfig>(r#"key_source = "tpm""#).is_err());
    }
}
