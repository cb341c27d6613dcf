//! OAuth2 refresh-token grant against the Globus Auth token endpoint.

use std::time::Duration;

use serde::Deserialize;

use gcs_core::repository::auth::AuthClient;
use gcs_types::error::AuthClientError;
use gcs_types::token::RefreshResponse;

const TOKEN_PATH: &str = "/v2/oauth2/token";

/// HTTP client for the refresh-token grant.
///
/// The refresh token is sent as a form field and is never logged.
pub struct GlobusAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
}

impl GlobusAuthClient {
    /// Build a client for `auth_url` (for example `https://auth.globus.org`).
    pub fn new(auth_url: &str, client_id: impl Into<String>) -> Result<Self, AuthClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("globus-connect-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            token_url: token_url(auth_url),
            client_id: client_id.into(),
        })
    }

    /// Build a client from optional config, failing when no client id is set.
    pub fn from_config(auth_url: &str, client_id: Option<&str>) -> Result<Self, AuthClientError> {
        match client_id {
            Some(id) if !id.trim().is_empty() => Self::new(auth_url, id.trim()),
            _ => Err(AuthClientError::MissingClientId),
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

impl AuthClient for GlobusAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthClientError> {
        tracing::debug!(url = %self.token_url, "requesting token refresh");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthClientError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthClientError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(AuthClientError::Rejected {
                status: status.as_u16(),
                error: describe_oauth_error(&body),
            });
        }

        parse_refresh_response(&body)
    }
}

fn token_url(auth_url: &str) -> String {
    format!("{}{}", auth_url.trim_end_matches('/'), TOKEN_PATH)
}

/// Parse a success body. Serde errors are reported by category only so the
/// token values in the body are never echoed.
fn parse_refresh_response(body: &str) -> Result<RefreshResponse, AuthClientError> {
    serde_json::from_str(body).map_err(|e| {
        AuthClientError::InvalidResponse(format!(
            "{:?} error at line {} column {}",
            e.classify(),
            e.line(),
            e.column()
        ))
    })
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Summarise an RFC 6749 error body.
fn describe_oauth_error(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(OAuthErrorBody {
            error: Some(error),
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(OAuthErrorBody {
            error: Some(error), ..
        }) => error,
        _ => "unrecognized error response".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url_joins_path() {
        assert_eq!(
            token_url("https://auth.globus.org"),
            "https://auth.globus.org/v2/oauth2/token"
        );
        assert_eq!(
            token_url("https://auth.example.org/"),
            "https://auth.example.org/v2/oauth2/token"
        );
    }

    #[test]
    fn test_from_config_requires_client_id() {
        assert!(matches!(
            GlobusAuthClient::from_config("https://auth.globus.org", None),
            Err(AuthClientError::MissingClientId)
        ));
        assert!(matches!(
            GlobusAuthClient::from_config("https://auth.globus.org", Some("  ")),
            Err(AuthClientError::MissingClientId)
        ));

        let client =
            GlobusAuthClient::from_config("https://auth.globus.org/", Some("abc-123")).unwrap();
        assert_eq!(client.token_url(), "https://auth.globus.org/v2/oauth2/token");
    }

    #[test]
    fn test_describe_oauth_error() {
        assert_eq!(
            describe_oauth_error(
                r#"{"error":"invalid_grant","error_description":"refresh token revoked"}"#
            ),
            "invalid_grant: refresh token revoked"
        );
        assert_eq!(
            describe_oauth_error(r#"{"error":"invalid_client"}"#),
            "invalid_client"
        );
        assert_eq!(
            describe_oauth_error("<html>502 Bad Gateway</html>"),
            "unrecognized error response"
        );
    }

    #[test]
    fn test_parse_refresh_response() {
        let body = r#"{
            "access_token": "AT-new",
            "refresh_token": "RT-new",
            "expires_in": 172800,
            "resource_server": "transfer.api.globus.org",
            "token_type": "Bearer"
        }"#;
        let response = parse_refresh_response(body).unwrap();
        assert_eq!(response.access_token, "AT-new");
        assert_eq!(response.refresh_token.as_deref(), Some("RT-new"));
        assert_eq!(response.expires_in, 172800);
    }

    #[test]
    fn test_parse_error_does_not_echo_body() {
        let body = r#"{"access_token": "AT-secret-value"}"#;
        let err = parse_refresh_response(body).unwrap_err();
        assert!(matches!(err, AuthClientError::InvalidResponse(_)));
        assert!(!err.to_string().contains("AT-secret-value"));
    }
}
