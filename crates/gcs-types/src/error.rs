//! Error types for the credential store.
//!
//! None of these carry plaintext, token values, or key material in their
//! Display/Debug output.

use thiserror::Error;

use crate::key::{KeyVersion, NONCE_LEN};

/// Name of the OS secret store the current platform is expected to provide.
pub fn platform_vault_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "the macOS Keychain"
    } else if cfg!(target_os = "windows") {
        "the Windows Credential Manager"
    } else {
        "a Secret Service provider (GNOME Keyring or KWallet)"
    }
}

fn vault_unavailable_message(detail: &str) -> String {
    format!(
        "OS secret store unavailable ({detail}); install or unlock {}, \
         or set key_source = \"passphrase\" in config.toml",
        platform_vault_name()
    )
}

/// Outcomes of the OS secret store adapter other than success.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// No entry exists under the requested service/user pair.
    #[error("no entry in the OS secret store")]
    NotFound,

    #[error("OS secret store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from data-key management.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{}", vault_unavailable_message(.0))]
    VaultUnavailable(String),

    #[error("encryption key in the OS secret store is corrupt: {0}")]
    CorruptKey(String),

    #[error(
        "no encryption key for version '{0}' in the OS secret store; \
         the key was cleared or the token was written on another host -- log in again"
    )]
    MissingKey(KeyVersion),

    #[error("no passphrase available: environment variable {0} is not set")]
    PassphraseMissing(String),

    #[error("key rotation is not supported yet; existing envelopes use key version v1")]
    RotationUnsupported,
}

/// Errors from the authenticated-encryption engine.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid nonce length: expected {expected} bytes, got {0}", expected = NONCE_LEN)]
    InvalidNonce(usize),

    #[error("unsupported key version '{0}'")]
    UnsupportedVersion(String),

    /// Authentication failed: tag mismatch, truncation, or wrong key.
    #[error("decryption failed: data was tampered with or sealed under a different key")]
    Tampered,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Errors from the remote authorization server during a refresh grant.
#[derive(Debug, Error)]
pub enum AuthClientError {
    #[error("request to authorization server failed: {0}")]
    Http(String),

    #[error("authorization server rejected the refresh (HTTP {status}): {error}")]
    Rejected { status: u16, error: String },

    #[error("invalid response from authorization server: {0}")]
    InvalidResponse(String),

    #[error("no client id configured; set client_id in config.toml")]
    MissingClientId,
}

/// Errors from the profile token store and token lifecycle.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("not logged in for profile '{0}'; run `globus-connect-server login` first")]
    NotLoggedIn(String),

    #[error("invalid profile name '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidProfile(String),

    #[error("token file for profile '{profile}' is corrupt: {reason}")]
    Corrupt { profile: String, reason: String },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize token: {0}")]
    Serialization(String),

    #[error(
        "token for profile '{0}' has expired and has no refresh token; \
         run `globus-connect-server login` again"
    )]
    ExpiredUnrefreshable(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(#[source] AuthClientError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from the secure-input reader.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("environment variable {0} is not set")]
    EnvMissing(String),

    #[error("environment variable {0} is set but is not valid UTF-8")]
    EnvNotUnicode(String),

    #[error("secret must not be empty")]
    EmptySecret,

    #[error("no terminal available for an interactive prompt ({0}); use --secret-env or --secret-stdin")]
    TerminalUnavailable(String),

    #[error("secret is too short: at least {min} characters required")]
    TooShort { min: usize },

    #[error("secret is too long: at most {max} characters allowed")]
    TooLong { max: usize },

    #[error("failed to read secret: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_unavailable_names_platform_vault() {
        let err = KeyError::VaultUnavailable("no dbus session".to_string());
        let msg = err.to_string();
        assert!(msg.contains("no dbus session"));
        assert!(msg.contains(platform_vault_name()));
        assert!(msg.contains("passphrase"));
    }

    #[test]
    fn test_not_logged_in_suggests_login() {
        let err = TokenError::NotLoggedIn("alice".to_string());
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("login"));
    }

    #[test]
    fn test_invalid_nonce_display() {
        let err = CryptoError::InvalidNonce(8);
        assert_eq!(err.to_string(), "invalid nonce length: expected 12 bytes, got 8");
    }

    #[test]
    fn test_tampered_distinct_from_structural() {
        let tampered = CryptoError::Tampered.to_string();
        assert_ne!(tampered, CryptoError::InvalidNonce(0).to_string());
        assert_ne!(tampered, CryptoError::UnsupportedVersion("v9".into()).to_string());
    }

    #[test]
    fn test_crypto_error_wraps_key_error_transparently() {
        let err: CryptoError = KeyError::CorruptKey("wrong length".to_string()).into();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_errors_never_contain_secrets() {
        let test_secret = "sk-super-secret-value-12345";

        let errors: Vec<String> = vec![
            InputError::EmptySecret.to_string(),
            InputError::TooShort { min: 8 }.to_string(),
            InputError::TooLong { max: 64 }.to_string(),
            CryptoError::Tampered.to_string(),
            KeyError::CorruptKey("expected 32 bytes, got 16".to_string()).to_string(),
            TokenError::Corrupt {
                profile: "p".to_string(),
                reason: "not JSON".to_string(),
            }
            .to_string(),
        ];

        for msg in &errors {
            assert!(!msg.contains(test_secret), "Error leaks secret value: {msg}");
        }
    }
}
