//! Secure input of raw secrets.
//!
//! A secret comes from exactly one source, chosen by precedence:
//! environment variable > standard input > interactive prompt.
//!
//! - Environment: the named variable must exist; there is no fall-through.
//! - Stdin: one line, up to the first newline or EOF.
//! - Prompt: written to stderr, read from the terminal with echo disabled.
//!
//! The value is trimmed and returned as a [`Redacted`] so it cannot end up in
//! logs or error messages by accident.

use std::env::VarError;
use std::io::BufRead;

use console::Term;
use dialoguer::Password;
use zeroize::Zeroizing;

use gcs_types::error::InputError;
use gcs_types::secret::Redacted;

/// Where a secret is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Named environment variable.
    Env(String),
    /// One line of standard input.
    Stdin,
    /// Hidden interactive prompt with the given text.
    Prompt(String),
}

impl SecretSource {
    /// Pick a source by precedence: env > stdin > prompt.
    pub fn select(env: Option<String>, stdin: bool, prompt: impl Into<String>) -> Self {
        match env {
            Some(name) => SecretSource::Env(name),
            None if stdin => SecretSource::Stdin,
            None => SecretSource::Prompt(prompt.into()),
        }
    }
}

/// Reads one secret per invocation and applies trimming and bounds.
#[derive(Debug, Clone, Default)]
pub struct SecretReader {
    allow_empty: bool,
    min_len: Option<usize>,
    max_len: Option<usize>,
}

impl SecretReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an empty secret instead of failing with `EmptySecret`.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Require the trimmed secret to have between `min` and `max` characters.
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_len = min;
        self.max_len = max;
        self
    }

    pub fn read(&self, source: &SecretSource) -> Result<Redacted, InputError> {
        let raw = match source {
            SecretSource::Env(name) => read_env(name, |n| std::env::var(n))?,
            SecretSource::Stdin => read_line_from(&mut std::io::stdin().lock())?,
            SecretSource::Prompt(prompt) => prompt_hidden(prompt)?,
        };
        self.finish(&raw)
    }

    /// Trim, reject empty, and check bounds.
    pub fn finish(&self, raw: &str) -> Result<Redacted, InputError> {
        let secret = Redacted::new(raw.trim());

        if secret.is_empty() {
            if self.allow_empty {
                return Ok(secret);
            }
            return Err(InputError::EmptySecret);
        }

        validate_length(&secret, self.min_len, self.max_len)?;
        Ok(secret)
    }
}

/// Enforce inclusive length bounds, counted in characters.
pub fn validate_length(
    secret: &Redacted,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), InputError> {
    let len = secret.char_len();
    if let Some(min) = min {
        if len < min {
            return Err(InputError::TooShort { min });
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(InputError::TooLong { max });
        }
    }
    Ok(())
}

fn read_env(
    name: &str,
    lookup: impl FnOnce(&str) -> Result<String, VarError>,
) -> Result<Zeroizing<String>, InputError> {
    match lookup(name) {
        Ok(value) => Ok(Zeroizing::new(value)),
        Err(VarError::NotPresent) => Err(InputError::EnvMissing(name.to_string())),
        Err(VarError::NotUnicode(_)) => Err(InputError::EnvNotUnicode(name.to_string())),
    }
}

/// Read a single line (without requiring a trailing newline).
pub fn read_line_from<R: BufRead>(reader: &mut R) -> Result<Zeroizing<String>, InputError> {
    let mut line = Zeroizing::new(String::new());
    reader.read_line(&mut line)?;
    Ok(line)
}

fn prompt_hidden(prompt: &str) -> Result<Zeroizing<String>, InputError> {
    let term = Term::stderr();
    if !term.is_term() {
        return Err(InputError::TerminalUnavailable(
            "standard error is not a terminal".to_string(),
        ));
    }

    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact_on(&term)
        .map(Zeroizing::new)
        .map_err(|e| InputError::TerminalUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_source_precedence() {
        assert_eq!(
            SecretSource::select(Some("S3_SECRET".to_string()), true, "Secret"),
            SecretSource::Env("S3_SECRET".to_string())
        );
        assert_eq!(
            SecretSource::select(None, true, "Secret"),
            SecretSource::Stdin
        );
        assert_eq!(
            SecretSource::select(None, false, "Secret"),
            SecretSource::Prompt("Secret".to_string())
        );
    }

    #[test]
    fn test_env_missing_does_not_fall_through() {
        let result = read_env("GCS_TEST_UNSET_SECRET", |_| Err(VarError::NotPresent));
        assert!(matches!(result, Err(InputError::EnvMissing(name)) if name == "GCS_TEST_UNSET_SECRET"));
    }

    #[test]
    fn test_env_not_unicode_is_not_reported_as_missing() {
        let result = read_env("S3_SECRET", |_| {
            Err(VarError::NotUnicode(std::ffi::OsString::from("bytes")))
        });
        match result {
            Err(InputError::EnvNotUnicode(name)) => assert_eq!(name, "S3_SECRET"),
            other => panic!("expected EnvNotUnicode, got {other:?}"),
        }
        assert!(
            InputError::EnvNotUnicode("S3_SECRET".to_string())
                .to_string()
                .contains("not valid UTF-8")
        );
    }

    #[test]
    fn test_env_lookup_value() {
        let value = read_env("S3_SECRET", |name| {
            assert_eq!(name, "S3_SECRET");
            Ok("  abc123  ".to_string())
        })
        .unwrap();
        let secret = SecretReader::new().finish(&value).unwrap();
        assert_eq!(secret.expose(), "abc123");
    }

    #[test]
    fn test_read_from_real_environment() {
        // SAFETY: unique variable name, set and removed within this test.
        unsafe { std::env::set_var("GCS_TEST_SECRET_INPUT_1", "from-env") };

        let secret = SecretReader::new()
            .read(&SecretSource::Env("GCS_TEST_SECRET_INPUT_1".to_string()))
            .unwrap();
        assert_eq!(secret.expose(), "from-env");

        // SAFETY: as above.
        unsafe { std::env::remove_var("GCS_TEST_SECRET_INPUT_1") };
    }

    #[test]
    fn test_read_line_stops_at_newline() {
        let mut input = Cursor::new("first-line\nsecond-line\n");
        let line = read_line_from(&mut input).unwrap();
        assert_eq!(SecretReader::new().finish(&line).unwrap().expose(), "first-line");
    }

    #[test]
    fn test_read_line_until_eof() {
        let mut input = Cursor::new("no-newline");
        let line = read_line_from(&mut input).unwrap();
        assert_eq!(line.as_str(), "no-newline");
    }

    #[test]
    fn test_empty_secret_rejected() {
        let reader = SecretReader::new();
        assert!(matches!(reader.finish("   \n"), Err(InputError::EmptySecret)));
        assert!(matches!(reader.finish(""), Err(InputError::EmptySecret)));
    }

    #[test]
    fn test_empty_secret_allowed_when_opted_in() {
        let secret = SecretReader::new().allow_empty(true).finish(" \t\n").unwrap();
        assert!(secret.is_empty());
        assert_eq!(secret.to_string(), "(empty)");
    }

    #[test]
    fn test_length_bounds() {
        let reader = SecretReader::new().with_length(Some(4), Some(8));
        assert!(matches!(reader.finish("abc"), Err(InputError::TooShort { min: 4 })));
        assert!(matches!(reader.finish("abcdefghi"), Err(InputError::TooLong { max: 8 })));
        assert_eq!(reader.finish(" abcd ").unwrap().expose(), "abcd");
        assert_eq!(reader.finish("abcdefgh").unwrap().expose(), "abcdefgh");
    }

    #[test]
    fn test_length_counts_characters() {
        let secret = Redacted::new("ééé");
        assert!(validate_length(&secret, Some(3), Some(3)).is_ok());
    }

    #[test]
    fn test_returned_secret_is_redacted() {
        let secret = SecretReader::new().finish("hunter2").unwrap();
        assert_eq!(format!("{secret}"), "(redacted)");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }
}
