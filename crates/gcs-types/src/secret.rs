use secrecy::{ExposeSecret, SecretString};

use std::fmt;

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Renders as `(redacted)`, or `(empty)` when the wrapped value is the empty
/// string. The value is wiped from memory on drop and is only reachable
/// through `.expose()`.
pub struct Redacted(SecretString);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.expose().chars().count()
    }
}

impl From<String> for Redacted {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted({self})")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(f, "(redacted)")
        }
    }
}
