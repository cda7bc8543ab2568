//! Data model for cached responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A cached payload with the time it was stored and its fingerprint.
///
/// Entries are serialized as JSON, with the payload base64-encoded:
///
/// ```json
/// { "when": "2024-05-01T12:00:00Z", "data": "djE=", "checksum": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry was written.
    pub when: DateTime<Utc>,

    /// Cached payload.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,

    /// Lowercase hex SHA-256 of `data` at write time.
    pub checksum: String,
}

impl CacheEntry {
    /// Wraps `data` with its checksum and the given timestamp.
    pub fn new(data: Vec<u8>, when: DateTime<Utc>) -> Self {
        let checksum = checksum(&data);
        Self {
            when,
            data,
            checksum,
        }
    }

    /// Returns true if `data` still matches the stored checksum.
    pub fn is_intact(&self) -> bool {
        checksum(&self.data) == self.checksum
    }

    /// Age of the entry at `now`. Entries stamped in the future are treated
    /// as brand new.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.when).to_std().unwrap_or_default()
    }
}

/// Lowercase hex SHA-256 digest of `data`.
///
/// # Examples
///
/// ```
/// use reqdef::cache::checksum;
///
/// assert_eq!(
///     checksum(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
