use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use std::fmt;

/// Length of a data-encryption key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Length of an AES-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Version tag identifying which data key sealed a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyVersion(pub String);

impl KeyVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version every new record is sealed under.
    pub fn current() -> Self {
        Self("v1".to_string())
    }

    pub fn is_current(&self) -> bool {
        self.0 == "v1"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transient copy of a data-encryption key.
///
/// The bytes are wiped when the value is dropped. Holders should keep a
/// `DataKey` only for the duration of a single seal or open.
pub struct DataKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
    version: KeyVersion,
}

impl DataKey {
    pub fn new(bytes: Zeroizing<[u8; KEY_LEN]>, version: KeyVersion) -> Self {
        Self { bytes, version }
    }

    pub fn expose(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn version(&self) -> &KeyVersion {
        &self.version
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("bytes", &"(redacted)")
            .field("version", &self.version)
            .finish()
    }
}
