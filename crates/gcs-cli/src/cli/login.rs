//! Login and logout: storing and removing a profile's token.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use console::style;

use gcs_core::repository::token::TokenRepository;
use gcs_infra::input::{SecretReader, SecretSource};
use gcs_types::token::TokenInfo;

use crate::cli::SecretArgs;
use crate::state::AppState;

/// Options for `login`, gathered from the command line.
pub struct LoginArgs {
    pub expires_in: u64,
    pub scopes: Vec<String>,
    pub resource_server: Option<String>,
    pub refresh_token_env: Option<String>,
    pub secret: SecretArgs,
}

/// Store an externally obtained access token for `profile`.
///
/// # Examples
///
/// ```bash
/// # Hidden prompt
/// globus-connect-server login --expires-in 172800 --scope openid
///
/// # Automation
/// GCS_ACCESS_TOKEN=... globus-connect-server login --expires-in 172800 \
///     --secret-env GCS_ACCESS_TOKEN --refresh-token-env GCS_REFRESH_TOKEN
/// ```
pub async fn login(state: &AppState, profile: &str, args: LoginArgs, json: bool) -> Result<()> {
    let expires_at = expiry_from_now(Utc::now(), args.expires_in)?;

    let reader = SecretReader::new();
    let source = SecretSource::select(
        args.secret.secret_env,
        args.secret.secret_stdin,
        format!("Access token for profile '{profile}'"),
    );
    let access_token = reader.read(&source)?;

    let mut token = TokenInfo::new(access_token.expose(), expires_at).with_scopes(args.scopes);
    if let Some(name) = args.refresh_token_env {
        let refresh_token = reader.read(&SecretSource::Env(name))?;
        token = token.with_refresh_token(refresh_token.expose());
    }
    if let Some(resource_server) = args.resource_server {
        token = token.with_resource_server(resource_server);
    }

    state.store().save(profile, &token).await?;
    tracing::info!(profile, expires_at = %token.expires_at, "stored token");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "profile": profile,
                "expires_at": token.expires_at,
                "scopes": token.scopes,
                "has_refresh_token": token.usable_refresh_token().is_some(),
            })
        );
    } else {
        println!(
            "  {} Logged in as profile '{}' (expires {})",
            style("✓").green().bold(),
            style(profile).bold(),
            token.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}

/// Delete the stored token for `profile`, optionally forgetting the key.
pub async fn logout(state: &AppState, profile: &str, forget_key: bool, json: bool) -> Result<()> {
    state.store().delete(profile).await?;

    let key_cleared = if forget_key {
        match &state.key_manager {
            Some(manager) => {
                manager.clear()?;
                true
            }
            None => {
                tracing::warn!("no keychain key to forget: data key comes from a passphrase");
                false
            }
        }
    } else {
        false
    };

    if json {
        println!(
            "{}",
            serde_json::json!({"profile": profile, "logged_out": true, "key_cleared": key_cleared})
        );
    } else {
        println!(
            "  {} Logged out of profile '{}'",
            style("✓").green().bold(),
            style(profile).bold()
        );
        if key_cleared {
            println!(
                "  {} Encryption key removed; other stored profiles can no longer be read",
                style("!").yellow().bold()
            );
        }
    }

    Ok(())
}

fn expiry_from_now(now: DateTime<Utc>, expires_in: u64) -> Result<DateTime<Utc>> {
    i64::try_from(expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .with_context(|| format!("--expires-in {expires_in} is out of range"))
}
