//! OAuth2 authorization server port.

use gcs_types::error::AuthClientError;
use gcs_types::token::RefreshResponse;

/// Client for the refresh-token grant.
pub trait AuthClient: Send + Sync {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<RefreshResponse, AuthClientError>> + Send;
}
