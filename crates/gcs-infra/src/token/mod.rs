//! Encrypted per-profile token files.
//!
//! Layout: `<config-root>/tokens/<profile>.json`, directory `0700`, files
//! `0600`. Each file is an `EnvelopeFile` whose record seals the canonical
//! JSON of a `TokenInfo`.
//!
//! Files that parse as a bare `TokenInfo` are legacy plaintext. Loading one
//! returns the token and re-saves it encrypted; if that re-save fails (no
//! vault on this host) the plaintext file stays and a warning is logged.
//!
//! Saves write a sibling temp file (`.<profile>.json.tmp`, `0600`) and rename
//! it over the profile file, so a crash never truncates a good file. A stray
//! temp file from an interrupted save is overwritten by the next save.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use zeroize::Zeroizing;

use gcs_core::repository::token::TokenRepository;
use gcs_types::envelope::EnvelopeFile;
use gcs_types::error::TokenError;
use gcs_types::token::TokenInfo;

use crate::crypto::engine::AeadEngine;

/// Longest accepted profile name.
const MAX_PROFILE_LEN: usize = 64;

/// Check that a profile name is usable as a file stem.
pub fn validate_profile(profile: &str) -> Result<(), TokenError> {
    let valid = !profile.is_empty()
        && profile.len() <= MAX_PROFILE_LEN
        && !profile.starts_with('.')
        && !profile.contains("..")
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(TokenError::InvalidProfile(profile.to_string()))
    }
}

/// Summarize a JSON error without echoing any part of the input.
fn describe_json_error(err: &serde_json::Error) -> String {
    use serde_json::error::Category;

    let kind = match err.classify() {
        Category::Io => "I/O error",
        Category::Syntax => "invalid JSON",
        Category::Data => "unexpected structure",
        Category::Eof => "truncated JSON",
    };
    format!("{kind} at line {} column {}", err.line(), err.column())
}

/// What a profile file turned out to contain.
enum Decoded {
    Encrypted(TokenInfo),
    Legacy(TokenInfo),
}

/// File-backed token repository sealing every record with an `AeadEngine`.
pub struct FileTokenStore {
    tokens_dir: PathBuf,
    engine: AeadEngine,
}

impl FileTokenStore {
    /// Store token files under `{config_root}/tokens/`.
    pub fn new(config_root: &Path, engine: AeadEngine) -> Self {
        Self {
            tokens_dir: config_root.join("tokens"),
            engine,
        }
    }

    pub fn tokens_dir(&self) -> &Path {
        &self.tokens_dir
    }

    /// Compute the file path for a profile: `{tokens_dir}/{profile}.json`.
    pub fn profile_path(&self, profile: &str) -> Result<PathBuf, TokenError> {
        validate_profile(profile)?;
        Ok(self.tokens_dir.join(format!("{profile}.json")))
    }

    fn temp_path(&self, profile: &str) -> PathBuf {
        self.tokens_dir.join(format!(".{profile}.json.tmp"))
    }

    pub async fn load_token(&self, profile: &str) -> Result<TokenInfo, TokenError> {
        let path = self.profile_path(profile)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TokenError::NotLoggedIn(profile.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match self.decode(profile, &bytes)? {
            Decoded::Encrypted(token) => Ok(token),
            Decoded::Legacy(token) => {
                tracing::info!(profile, "migrating plaintext token file to encrypted format");
                if let Err(err) = self.save_token(profile, &token).await {
                    tracing::warn!(
                        profile,
                        path = %path.display(),
                        "token file left in plaintext, could not encrypt it: {err}"
                    );
                }
                Ok(token)
            }
        }
    }

    pub async fn save_token(&self, profile: &str, token: &TokenInfo) -> Result<(), TokenError> {
        let path = self.profile_path(profile)?;
        self.ensure_dir().await?;

        let contents = self.encode(token)?;
        write_owner_only(&self.temp_path(profile), &path, &contents).await?;

        tracing::debug!(profile, path = %path.display(), "saved encrypted token");
        Ok(())
    }

    pub async fn delete_token(&self, profile: &str) -> Result<(), TokenError> {
        let path = self.profile_path(profile)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(profile, "deleted token file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Leftover from an interrupted save, if any.
        let _ = tokio::fs::remove_file(self.temp_path(profile)).await;
        Ok(())
    }

    pub async fn list_token_profiles(&self) -> Result<Vec<String>, TokenError> {
        let mut entries = match tokio::fs::read_dir(&self.tokens_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut profiles = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_profile(stem).is_ok() {
                    profiles.push(stem.to_string());
                }
            }
        }

        profiles.sort();
        Ok(profiles)
    }

    /// Serialize, seal, and wrap a token into envelope bytes.
    fn encode(&self, token: &TokenInfo) -> Result<Vec<u8>, TokenError> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(token).map_err(|e| TokenError::Serialization(e.to_string()))?,
        );
        let record = self.engine.seal(&plaintext)?;

        serde_json::to_vec_pretty(&EnvelopeFile::encrypted_v1(record))
            .map_err(|e| TokenError::Serialization(e.to_string()))
    }

    fn decode(&self, profile: &str, bytes: &[u8]) -> Result<Decoded, TokenError> {
        let corrupt = |reason: String| TokenError::Corrupt {
            profile: profile.to_string(),
            reason,
        };

        if let Ok(envelope) = serde_json::from_slice::<EnvelopeFile>(bytes) {
            if envelope.is_encrypted_v1() {
                let plaintext = self.engine.open(&envelope.encrypted_data)?;
                let token = serde_json::from_slice::<TokenInfo>(&plaintext).map_err(|e| {
                    corrupt(format!("decrypted record is not a token: {}", describe_json_error(&e)))
                })?;
                return Ok(Decoded::Encrypted(token));
            }
        }

        match serde_json::from_slice::<TokenInfo>(bytes) {
            Ok(token) if token.access_token.is_empty() => {
                Err(corrupt("legacy token has an empty access token".to_string()))
            }
            Ok(token) => Ok(Decoded::Legacy(token)),
            Err(e) => Err(corrupt(format!(
                "neither an encrypted envelope nor a legacy token ({})",
                describe_json_error(&e)
            ))),
        }
    }

    async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.tokens_dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.tokens_dir, std::fs::Permissions::from_mode(0o700))
                .await?;
        }

        Ok(())
    }
}

/// Write `contents` to `temp` with mode `0600`, sync, then rename over `path`.
async fn write_owner_only(temp: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(temp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    // A stray temp file from an earlier crash keeps its old mode through open().
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(temp, std::fs::Permissions::from_mode(0o600)).await?;
    }

    if let Err(e) = tokio::fs::rename(temp, path).await {
        let _ = tokio::fs::remove_file(temp).await;
        return Err(e);
    }

    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Ok(dir) = tokio::fs::File::open(parent).await {
                let _ = dir.sync_all().await;
            }
        }
    }

    Ok(())
}

impl TokenRepository for FileTokenStore {
    async fn load(&self, profile: &str) -> Result<TokenInfo, TokenError> {
        self.load_token(profile).await
    }

    async fn save(&self, profile: &str, token: &TokenInfo) -> Result<(), TokenError> {
        self.save_token(profile, token).await
    }

    async fn delete(&self, profile: &str) -> Result<(), TokenError> {
        self.delete_token(profile).await
    }

    async fn list_profiles(&self) -> Result<Vec<String>, TokenError> {
        self.list_token_profiles().await
    }
}
