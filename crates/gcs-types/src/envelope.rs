//! On-disk envelope and the AEAD record it carries.
//!
//! ```json
//! {
//!   "format": "encrypted-v1",
//!   "encrypted_data": { "Version": "v1", "Nonce": "<b64>", "Ciphertext": "<b64>" }
//! }
//! ```
//!
//! Field names and casing are part of the file format.

use serde::{Deserialize, Serialize};

use crate::key::KeyVersion;

/// Format tag written into every encrypted profile file.
pub const ENCRYPTED_FORMAT_V1: &str = "encrypted-v1";

/// Output of an AEAD seal: version tag, nonce, and ciphertext with the GCM tag
/// as its suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    #[serde(rename = "Version")]
    pub version: KeyVersion,
    #[serde(rename = "Nonce", with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(rename = "Ciphertext", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

/// Outer JSON structure of a profile file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeFile {
    pub format: String,
    pub encrypted_data: EncryptedRecord,
}

impl EnvelopeFile {
    /// Wrap a record with the current format tag.
    pub fn encrypted_v1(record: EncryptedRecord) -> Self {
        Self {
            format: ENCRYPTED_FORMAT_V1.to_string(),
            encrypted_data: record,
        }
    }

    pub fn is_encrypted_v1(&self) -> bool {
        self.format == ENCRYPTED_FORMAT_V1
    }
}

/// Standard padded base64 for byte fields.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
