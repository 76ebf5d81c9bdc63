//! BLAKE3 content hashing, used to chain-link Run Store trace entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte BLAKE3 content hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a single byte slice.
    #[must_use]
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash multiple byte slices as if they were concatenated, without
    /// materializing the concatenation.
    #[must_use]
    pub fn hash_multi(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// The all-zero hash, used as the `prev_hash` of a trace's first entry.
    #[must_use]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Whether this is the all-zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Build from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice, failing if the length isn't exactly 32.
    ///
    /// # Errors
    ///
    /// Returns an error describing the slice's actual length if it isn't 32.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, String> {
        let array: [u8; 32] = slice
            .try_into()
            .map_err(|_| format!("expected 32 bytes, got {}", slice.len()))?;
        Ok(Self(array))
    }

    /// Hex-encoded representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string isn't valid hex or doesn't decode to
    /// exactly 32 bytes.
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(ContentHash::hash(b"hello"), ContentHash::hash(b"hello"));
        assert_ne!(ContentHash::hash(b"hello"), ContentHash::hash(b"world"));
    }

    #[test]
    fn hash_multi_matches_concatenation() {
        let multi = ContentHash::hash_multi(&[b"hel", b"lo"]);
        let single = ContentHash::hash(b"hello");
        assert_eq!(multi, single);
    }

    #[test]
    fn zero_roundtrips_through_hex() {
        let zero = ContentHash::zero();
        assert!(zero.is_zero());
        let parsed = ContentHash::from_hex(&zero.to_hex()).unwrap();
        assert_eq!(zero, parsed);
    }

    #[test]
    fn rejects_wrong_length_slice() {
        assert!(ContentHash::try_from_slice(&[0u8; 10]).is_err());
    }
}
