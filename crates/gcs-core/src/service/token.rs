//! Token lifecycle: validity window, refreshability, refresh-if-needed.
//!
//! `TokenService` wraps a `TokenRepository` and decides when a stored token
//! must be refreshed. The refresh itself goes through an `AuthClient` and
//! races the caller's cancellation token; a cancelled refresh never touches
//! the stored token.

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use gcs_types::error::TokenError;
use gcs_types::token::{RefreshResponse, TokenInfo};

use crate::repository::auth::AuthClient;
use crate::repository::token::TokenRepository;

/// A token is treated as expired this many seconds before its actual expiry.
pub const VALIDITY_BUFFER_SECS: i64 = 5 * 60;

pub fn validity_buffer() -> TimeDelta {
    TimeDelta::seconds(VALIDITY_BUFFER_SECS)
}

/// True iff the token exists and `now + 5 minutes < expires_at`.
pub fn is_valid(token: Option<&TokenInfo>) -> bool {
    is_valid_at(token, Utc::now())
}

/// `is_valid` against an explicit clock reading.
pub fn is_valid_at(token: Option<&TokenInfo>, now: DateTime<Utc>) -> bool {
    token.is_some_and(|t| now + validity_buffer() < t.expires_at)
}

/// True iff the token exists and carries a non-empty refresh token.
pub fn can_refresh(token: Option<&TokenInfo>) -> bool {
    token.is_some_and(|t| t.usable_refresh_token().is_some())
}

/// Build the replacement token from a refresh response.
///
/// Scopes are carried over from the old token. A response without a new
/// refresh token keeps the previous one.
pub fn refreshed_token(old: &TokenInfo, response: RefreshResponse, now: DateTime<Utc>) -> TokenInfo {
    let expires_at = i64::try_from(response.expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    TokenInfo {
        access_token: response.access_token,
        refresh_token: response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| old.refresh_token.clone()),
        expires_at,
        scopes: old.scopes.clone(),
        resource_server: response.resource_server.or_else(|| old.resource_server.clone()),
    }
}

/// Token use cases over a profile repository.
pub struct TokenService<R> {
    repo: R,
}

impl<R: TokenRepository> TokenService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Refresh the profile's token if it is no longer valid.
    ///
    /// Returns `Ok(false)` when the stored token is still valid and
    /// `Ok(true)` after a successful refresh and save.
    pub async fn refresh_if_needed<A: AuthClient>(
        &self,
        profile: &str,
        client: &A,
        cancel: &CancellationToken,
    ) -> Result<bool, TokenError> {
        let token = self.repo.load(profile).await?;

        if is_valid(Some(&token)) {
            tracing::debug!(profile, expires_at = %token.expires_at, "token still valid");
            return Ok(false);
        }

        let Some(refresh_token) = token.usable_refresh_token() else {
            return Err(TokenError::ExpiredUnrefreshable(profile.to_string()));
        };

        tracing::info!(profile, "access token expired or expiring, refreshing");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TokenError::Cancelled),
            result = client.refresh(refresh_token) => result.map_err(TokenError::RefreshFailed)?,
        };

        let refreshed = refreshed_token(&token, response, Utc::now());
        self.repo.save(profile, &refreshed).await?;

        tracing::info!(profile, expires_at = %refreshed.expires_at, "token refreshed");
        Ok(true)
    }
}
