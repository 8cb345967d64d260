//! Content digests for artifact integrity
//!
//! [`ContentDigest`] is a strongly-typed SHA-256 digest used by the export
//! bundler to bind artifacts to their manifest entries.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte SHA-256 content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute the digest of arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(digest.into())
    }

    /// Reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short prefix (first 8 bytes, hex) for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Errors from parsing a digest
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Digest must decode to exactly 32 bytes
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex decode failure
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = ContentDigest::compute(b"payload");
        let b = ContentDigest::compute(b"payload");
        assert_eq!(a, b);
        assert_ne!(a, ContentDigest::compute(b"other"));
    }

    #[test]
    fn digest_display_round_trip() {
        let digest = ContentDigest::compute(b"payload");
        let parsed: ContentDigest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn digest_rejects_short_hex() {
        let result: Result<ContentDigest, _> = "abcd".parse();
        assert!(matches!(result, Err(DigestError::InvalidLength { .. })));
    }

    #[test]
    fn digest_serde_hex_string() {
        let digest = ContentDigest::compute(b"payload");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json.len(), 66); // quotes + 64 hex chars
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }

    #[test]
    fn digest_short_prefix() {
        let digest = ContentDigest::compute(b"payload");
        assert_eq!(digest.short().len(), 16);
        assert!(digest.to_string().starts_with(&digest.short()));
    }
}
