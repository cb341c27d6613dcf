//! CLI command definitions for the `globus-connect-server` binary.
//!
//! Uses clap derive macros. Only the credential-store commands live here:
//! `login`, `logout`, `session`, `key`, and `completions`.

pub mod key;
pub mod login;
pub mod session;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Administer a Globus Connect Server endpoint.
#[derive(Parser)]
#[command(name = "globus-connect-server", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Credential profile to use (defaults to `default_profile` in config.toml).
    #[arg(long, global = true, env = "GCS_PROFILE")]
    pub profile: Option<String>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an access token for a profile, encrypted at rest.
    Login {
        /// Lifetime of the access token in seconds.
        #[arg(long, value_name = "SECONDS")]
        expires_in: u64,

        /// Scope granted to the token (repeatable).
        #[arg(long = "scope", value_name = "SCOPE")]
        scopes: Vec<String>,

        /// Resource server the token is issued for.
        #[arg(long)]
        resource_server: Option<String>,

        /// Read a refresh token from this environment variable.
        #[arg(long, value_name = "NAME")]
        refresh_token_env: Option<String>,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Remove the stored token for a profile.
    Logout {
        /// Also delete the data-encryption key from the OS keychain.
        /// Tokens stored for other profiles become unreadable.
        #[arg(long)]
        forget_key: bool,
    },

    /// Inspect and refresh stored sessions.
    Session {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Manage the data-encryption key.
    Key {
        #[command(subcommand)]
        action: key::KeyCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Where the access token is read from. Without either flag the user is
/// prompted on the terminal with echo disabled.
#[derive(Args, Debug, Default)]
pub struct SecretArgs {
    /// Read the access token from this environment variable.
    #[arg(long, value_name = "NAME", conflicts_with = "secret_stdin")]
    pub secret_env: Option<String>,

    /// Read the access token from one line of standard input.
    #[arg(long)]
    pub secret_stdin: bool,
}
