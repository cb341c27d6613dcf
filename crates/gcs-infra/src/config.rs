//! Config root resolution and `config.toml` loading.
//!
//! The config root holds `config.toml` and the `tokens/` directory. It is
//! `$GLOBUS_CONNECT_SERVER_CONFIG_DIR` when set, otherwise the platform config
//! directory (`~/.config/globus-connect-server` on Linux).

use std::path::{Path, PathBuf};

use gcs_types::config::CliConfig;

/// Environment variable overriding the config root.
pub const CONFIG_DIR_ENV: &str = "GLOBUS_CONNECT_SERVER_CONFIG_DIR";

const APP_DIR: &str = "globus-connect-server";

/// Resolve the config root from the environment and platform directories.
pub fn resolve_config_root() -> PathBuf {
    config_root_from(std::env::var(CONFIG_DIR_ENV).ok(), dirs::config_dir())
}

fn config_root_from(env_value: Option<String>, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_value.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(config) = platform_dir {
        return config.join(APP_DIR);
    }

    // Last resort: current directory
    PathBuf::from(format!(".{APP_DIR}"))
}

/// Load `{config_root}/config.toml`.
///
/// - Missing file: [`CliConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
pub async fn load_cli_config(config_root: &Path) -> CliConfig {
    let config_path = config_root.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return CliConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return CliConfig::default();
        }
    };

    match toml::from_str::<CliConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            CliConfig::default()
        }
    }
}
