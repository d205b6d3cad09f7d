use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex characters kept from the digest. Short enough to read, long enough
/// that collisions are negligible for corpora up to the low millions.
pub const FINGERPRINT_LEN: usize = 16;

/// Content-derived document identifier: SHA-256 of the raw content bytes,
/// truncated to a fixed hex prefix. Byte-identical content always maps to
/// the same fingerprint; nothing else participates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Fingerprint(digest[..FINGERPRINT_LEN].to_string())
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        if s.len() != FINGERPRINT_LEN {
            return Err(format!(
                "Fingerprint must be {FINGERPRINT_LEN} hex characters, got {}",
                s.len()
            ));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Fingerprint must be hex, got '{s}'"));
        }
        Ok(Fingerprint(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
