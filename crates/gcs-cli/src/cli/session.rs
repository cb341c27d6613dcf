//! Session subcommands: show, list, refresh.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tokio_util::sync::CancellationToken;

use gcs_core::repository::token::TokenRepository;
use gcs_core::service::token::{can_refresh, is_valid_at};
use gcs_types::error::TokenError;
use gcs_types::token::TokenInfo;

use crate::state::AppState;

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the stored session for the profile (never prints tokens).
    Show,

    /// List all profiles with a stored token.
    #[command(alias = "ls")]
    List,

    /// Refresh the access token if it is expired or about to expire.
    Refresh,
}

/// Handle a session subcommand.
pub async fn handle_session_command(
    cmd: SessionCommand,
    state: &AppState,
    profile: &str,
    cancel: &CancellationToken,
    json: bool,
) -> Result<()> {
    match cmd {
        SessionCommand::Show => show(state, profile, json).await,
        SessionCommand::List => list(state, json).await,
        SessionCommand::Refresh => refresh(state, profile, cancel, json).await,
    }
}

/// Validity label for a token at `now`.
fn status_label(token: &TokenInfo, now: DateTime<Utc>) -> &'static str {
    if is_valid_at(Some(token), now) {
        "valid"
    } else if can_refresh(Some(token)) {
        "expired (refreshable)"
    } else {
        "expired"
    }
}

/// Remaining lifetime in a short human form, e.g. `2d 3h`, `45m`, `expired`.
fn format_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expires_at - now;
    if remaining.num_seconds() <= 0 {
        return "expired".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    match (days, hours) {
        (0, 0) => format!("{}m", minutes.max(1)),
        (0, h) => format!("{h}h {minutes}m"),
        (d, h) => format!("{d}d {h}h"),
    }
}

fn session_json(profile: &str, token: &TokenInfo, now: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "profile": profile,
        "valid": is_valid_at(Some(token), now),
        "expires_at": token.expires_at,
        "scopes": token.scopes,
        "resource_server": token.resource_server,
        "has_refresh_token": token.usable_refresh_token().is_some(),
    })
}

async fn show(state: &AppState, profile: &str, json: bool) -> Result<()> {
    let token = state.store().load(profile).await?;
    let path = state.store().profile_path(profile)?;
    let now = Utc::now();

    if json {
        println!("{}", serde_json::to_string_pretty(&session_json(profile, &token, now))?);
        return Ok(());
    }

    let status = status_label(&token, now);
    let styled_status = if status == "valid" {
        style(status).green()
    } else {
        style(status).red()
    };

    println!();
    println!("  Profile:          {}", style(profile).bold());
    println!("  Status:           {styled_status}");
    println!(
        "  Expires:          {} ({})",
        token.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_remaining(token.expires_at, now)
    );
    if !token.scopes.is_empty() {
        println!("  Scopes:           {}", token.scopes.join(" "));
    }
    if let Some(rs) = &token.resource_server {
        println!("  Resource server:  {rs}");
    }
    println!(
        "  Refresh token:    {}",
        if token.usable_refresh_token().is_some() { "yes" } else { "no" }
    );
    println!(
        "  Stored at:        {}",
        style(path.display()).dim()
    );
    println!();

    Ok(())
}

async fn list(state: &AppState, json: bool) -> Result<()> {
    let profiles = state.store().list_profiles().await?;
    let now = Utc::now();

    // Undecryptable profiles are listed with the error rather than aborting.
    let mut rows = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let loaded = state.store().load(&profile).await;
        rows.push((profile, loaded));
    }

    if json {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(profile, loaded)| match loaded {
                Ok(token) => session_json(profile, token, now),
                Err(err) => serde_json::json!({"profile": profile, "error": err.to_string()}),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!();
        println!(
            "  {} No stored sessions. Add one with: {}",
            style("i").blue().bold(),
            style("globus-connect-server login --expires-in <SECONDS>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Profile").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Expires").fg(Color::White),
        Cell::new("Scopes").fg(Color::White),
    ]);

    for (profile, loaded) in &rows {
        match loaded {
            Ok(token) => {
                let status = status_label(token, now);
                let color = if status == "valid" { Color::Green } else { Color::Red };
                table.add_row(vec![
                    Cell::new(profile).fg(Color::Cyan),
                    Cell::new(status).fg(color),
                    Cell::new(format_remaining(token.expires_at, now)),
                    Cell::new(token.scopes.len()).fg(Color::DarkGrey),
                ]);
            }
            Err(err) => {
                table.add_row(vec![
                    Cell::new(profile).fg(Color::Cyan),
                    Cell::new(error_label(err)).fg(Color::Yellow),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} profile{}",
        style(rows.len()).bold(),
        if rows.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn error_label(err: &TokenError) -> &'static str {
    match err {
        TokenError::Crypto(_) => "unreadable (key)",
        TokenError::Corrupt { .. } => "corrupt",
        _ => "error",
    }
}

async fn refresh(
    state: &AppState,
    profile: &str,
    cancel: &CancellationToken,
    json: bool,
) -> Result<()> {
    let client = state.auth_client()?;
    let refreshed = state
        .token_service
        .refresh_if_needed(profile, &client, cancel)
        .await?;

    let token = state.store().load(profile).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "profile": profile,
                "refreshed": refreshed,
                "expires_at": token.expires_at,
            })
        );
    } else if refreshed {
        println!(
            "  {} Refreshed profile '{}' (expires {})",
            style("✓").green().bold(),
            style(profile).bold(),
            token.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    } else {
        println!(
            "  {} Profile '{}' is still valid ({} left)",
            style("i").blue().bold(),
            style(profile).bold(),
            format_remaining(token.expires_at, Utc::now())
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn remaining_formats() {
        let now = Utc::now();
        assert_eq!(format_remaining(now - TimeDelta::seconds(1), now), "expired");
        assert_eq!(format_remaining(now + TimeDelta::seconds(20), now), "1m");
        assert_eq!(format_remaining(now + TimeDelta::minutes(45), now), "45m");
        assert_eq!(
            format_remaining(now + TimeDelta::minutes(130), now),
            "2h 10m"
        );
        assert_eq!(format_remaining(now + TimeDelta::hours(51), now), "2d 3h");
    }

    #[test]
    fn status_labels() {
        let now = Utc::now();
        let valid = TokenInfo::new("AT", now + TimeDelta::hours(1));
        let expired = TokenInfo::new("AT", now - TimeDelta::hours(1));
        let refreshable = expired.clone().with_refresh_token("RT");

        assert_eq!(status_label(&valid, now), "valid");
        assert_eq!(status_label(&expired, now), "expired");
        assert_eq!(status_label(&refreshable, now), "expired (refreshable)");
    }

    #[test]
    fn session_json_has_no_token_values() {
        let now = Utc::now();
        let token = TokenInfo::new("AT-secret", now + TimeDelta::hours(1))
            .with_refresh_token("RT-secret");
        let rendered = session_json("prod", &token, now).to_string();
        assert!(!rendered.contains("AT-secret"));
        assert!(!rendered.contains("RT-secret"));
        assert!(rendered.contains("\"has_refresh_token\":true"));
    }
}
