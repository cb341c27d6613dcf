//! Data-encryption key subcommands: clear, rotate.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use gcs_types::error::KeyError;

use crate::state::AppState;

/// Key subcommands.
#[derive(Subcommand)]
pub enum KeyCommand {
    /// Delete the data-encryption key from the OS keychain.
    ///
    /// Every stored token becomes unreadable; log in again afterwards.
    Clear,

    /// Rotate the data-encryption key (not supported yet).
    Rotate,
}

/// Handle a key subcommand.
pub async fn handle_key_command(cmd: KeyCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        KeyCommand::Clear => clear(state, json),
        KeyCommand::Rotate => rotate(state),
    }
}

fn clear(state: &AppState, json: bool) -> Result<()> {
    let Some(manager) = &state.key_manager else {
        anyhow::bail!(
            "the data key is derived from ${}; unset it or change key_source to stop using it",
            state.config.passphrase_env
        );
    };

    manager.clear()?;

    if json {
        println!("{}", serde_json::json!({"key_cleared": true}));
    } else {
        println!(
            "  {} Encryption key removed from the OS keychain",
            style("✓").green().bold()
        );
    }
    Ok(())
}

fn rotate(state: &AppState) -> Result<()> {
    match &state.key_manager {
        Some(manager) => {
            manager.rotate()?;
            Ok(())
        }
        None => Err(KeyError::RotationUnsupported.into()),
    }
}
