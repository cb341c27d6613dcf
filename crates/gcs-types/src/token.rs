//! OAuth2 token records persisted per profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;

/// Bearer token record for one profile.
///
/// Serialized as canonical JSON with optional fields omitted rather than
/// written as empty strings. The same shape is accepted from legacy
/// plaintext files, where `scopes` may also be a single string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(
        default,
        deserialize_with = "deserialize_non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_scopes")]
    pub scopes: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_server: Option<String>,
}

impl TokenInfo {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
            scopes: Vec::new(),
            resource_server: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_resource_server(mut self, resource_server: impl Into<String>) -> Self {
        self.resource_server = Some(resource_server.into());
        self
    }

    /// The refresh token, if present and non-empty.
    pub fn usable_refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"(redacted)")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "(redacted)"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("resource_server", &self.resource_server)
            .finish()
    }
}

/// Reads `null`, a missing field, and `""` all as `None`.
fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.is_empty()))
}

/// Accepts `scopes` as a list or as a single string.
fn deserialize_scopes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scopes {
        List(Vec<String>),
        Single(String),
    }

    match Scopes::deserialize(deserializer) {
        Ok(Scopes::List(list)) => Ok(list),
        Ok(Scopes::Single(scope)) if scope.is_empty() => Ok(Vec::new()),
        Ok(Scopes::Single(scope)) => Ok(vec![scope]),
        Err(_) => Err(serde::de::Error::custom(
            "scopes must be a list of strings or a single string",
        )),
    }
}

/// Successful response from the OAuth2 token endpoint for a refresh grant.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub resource_server: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("access_token", &"(redacted)")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "(redacted)"),
            )
            .field("expires_in", &self.expires_in)
            .field("resource_server", &self.resource_server)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TokenInfo {
        TokenInfo::new("A", Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap())
            .with_refresh_token("R")
            .with_scopes(vec!["s1".to_string(), "s2".to_string()])
            .with_resource_server("rs")
    }

    #[test]
    fn test_serialize_omits_absent_optionals() {
        let token = TokenInfo::new("A", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_value(&token).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("refresh_token"));
        assert!(!obj.contains_key("resource_server"));
        assert_eq!(obj["scopes"], serde_json::json!([]));
    }

    #[test]
    fn test_json_roundtrip() {
        let token = sample();
        let json = serde_json::to_string(&token).unwrap();
        let parsed: TokenInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_legacy_single_string_scope() {
        let json = r#"{"access_token":"a","expires_at":"2025-12-31T23:59:59Z","scopes":"openid"}"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(token.scopes, vec!["openid".to_string()]);
    }

    #[test]
    fn test_legacy_missing_scopes_defaults_to_empty() {
        let json = r#"{"access_token":"a","expires_at":"2025-12-31T23:59:59Z"}"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert!(token.scopes.is_empty());
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_legacy_empty_optionals_read_as_absent() {
        let json = r#"{"access_token":"a","refresh_token":"","expires_at":"2025-12-31T23:59:59Z","resource_server":""}"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert!(token.refresh_token.is_none());
        assert!(token.resource_server.is_none());

        let obj = serde_json::to_value(&token).unwrap();
        assert!(!obj.as_object().unwrap().contains_key("refresh_token"));
        assert!(!obj.as_object().unwrap().contains_key("resource_server"));
    }

    #[test]
    fn test_null_optionals_read_as_absent() {
        let json = r#"{"access_token":"a","refresh_token":null,"expires_at":"2025-12-31T23:59:59Z"}"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_unknown_scopes_shape_is_rejected() {
        let json = r#"{"access_token":"a","expires_at":"2025-12-31T23:59:59Z","scopes":{"x":1}}"#;
        assert!(serde_json::from_str::<TokenInfo>(json).is_err());

        let json = r#"{"access_token":"a","expires_at":"2025-12-31T23:59:59Z","scopes":[1,2]}"#;
        assert!(serde_json::from_str::<TokenInfo>(json).is_err());
    }

    #[test]
    fn test_usable_refresh_token_ignores_empty() {
        let token = sample().with_refresh_token("");
        assert!(token.usable_refresh_token().is_none());
        assert_eq!(sample().usable_refresh_token(), Some("R"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let token = TokenInfo::new("secret-access", Utc::now()).with_refresh_token("secret-refresh");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_refresh_response_parses_globus_shape() {
        let json = r#"{
            "access_token": "new",
            "expires_in": 172800,
            "resource_server": "auth.globus.org",
            "token_type": "Bearer",
            "scope": "openid profile"
        }"#;
        let response: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.expires_in, 172800);
        assert!(response.refresh_token.is_none());
        assert_eq!(response.resource_server.as_deref(), Some("auth.globus.org"));
    }
}
