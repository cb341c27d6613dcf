//! Globus Connect Server administrative CLI entry point.
//!
//! Binary name: `globus-connect-server`
//!
//! Parses CLI arguments, wires the encrypted token store, then dispatches to
//! the command handler. Logs go to stderr so `--json` output stays clean.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::login::LoginArgs;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG wins when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,gcs=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "globus-connect-server", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let profile = state.profile(cli.profile.as_deref()).to_string();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match cli.command {
        Commands::Login {
            expires_in,
            scopes,
            resource_server,
            refresh_token_env,
            secret,
        } => {
            let args = LoginArgs {
                expires_in,
                scopes,
                resource_server,
                refresh_token_env,
                secret,
            };
            cli::login::login(&state, &profile, args, cli.json).await?;
        }

        Commands::Logout { forget_key } => {
            cli::login::logout(&state, &profile, forget_key, cli.json).await?;
        }

        Commands::Session { action } => {
            cli::session::handle_session_command(action, &state, &profile, &cancel, cli.json)
                .await?;
        }

        Commands::Key { action } => {
            cli::key::handle_key_command(action, &state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Cancel in-flight work on Ctrl+C.
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::debug!("interrupt received, cancelling");
            cancel.cancel();
        }
        Err(err) => tracing::warn!("failed to install Ctrl+C handler: {err}"),
    }
}
