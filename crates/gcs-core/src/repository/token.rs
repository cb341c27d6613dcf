//! Profile token repository port.

use gcs_types::error::TokenError;
use gcs_types::token::TokenInfo;

/// Persistent per-profile token storage.
pub trait TokenRepository: Send + Sync {
    /// Load the token for `profile`.
    /// Returns `TokenError::NotLoggedIn` if the profile has no stored token.
    fn load(
        &self,
        profile: &str,
    ) -> impl std::future::Future<Output = Result<TokenInfo, TokenError>> + Send;

    /// Store `token` for `profile`, replacing any previous token.
    fn save(
        &self,
        profile: &str,
        token: &TokenInfo,
    ) -> impl std::future::Future<Output = Result<(), TokenError>> + Send;

    /// Remove the stored token. Absence is success.
    fn delete(
        &self,
        profile: &str,
    ) -> impl std::future::Future<Output = Result<(), TokenError>> + Send;

    /// Names of all profiles with a stored token, sorted.
    fn list_profiles(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, TokenError>> + Send;
}
