//! Content fingerprinting
//!
//! The fingerprint is a plain SHA-256 digest over the raw uploaded bytes.
//! It is computed once per upload and carried by value through every later
//! stage; nothing downstream re-hashes re-serialized data.

use std::fmt;
use std::str::FromStr;

use sha2::{Sha256, Digest};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, Result};

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 32;

/// 256-bit content fingerprint of a raw document
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; FINGERPRINT_LEN]);

impl ContentHash {
    /// Wrap a raw digest
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        ContentHash(bytes)
    }

    /// Parse a 64-character hex digest
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let decoded = hex::decode(hex_str)?;
        let bytes: [u8; FINGERPRINT_LEN] = decoded.try_into().map_err(|v: Vec<u8>| {
            CoreError::InvalidPayload(format!(
                "fingerprint must be {} bytes, got {}",
                FINGERPRINT_LEN,
                v.len()
            ))
        })?;
        Ok(ContentHash(bytes))
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `chars` hex characters of the digest
    pub fn hex_prefix(&self, chars: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(chars);
        hex
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}…)", self.hex_prefix(16))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        ContentHash::from_hex(s)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the fingerprint of raw document bytes
pub fn fingerprint(data: &[u8]) -> ContentHash {
    let digest = Sha256::digest(data);
    let mut output = [0u8; FINGERPRINT_LEN];
    output.copy_from_slice(&digest);
    ContentHash(output)
}

/// Verify a fingerprint in constant time
pub fn verify_fingerprint(expected: &ContentHash, data: &[u8]) -> bool {
    let actual = fingerprint(data);
    constant_time_eq(expected.as_bytes(), actual.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_digest() {
        // sha256("abc")
        let hash = fingerprint(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash.to_hex().len(), 64);
    }

    #[test]
    fn test_empty_input_has_digest() {
        let hash = fingerprint(b"");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hex_prefix() {
        let hash = fingerprint(b"abc");
        assert_eq!(hash.hex_prefix(12), "ba7816bf8f01");
        assert_eq!(hash.hex_prefix(8), "ba7816bf");
        assert_eq!(hash.hex_prefix(100).len(), 64);
    }

    #[test]
    fn test_hex_round_trip_and_serde() {
        let hash = fingerprint(b"date,product\n");
        let parsed: ContentHash = hash.to_hex().parse().unwrap();
        assert_eq!(parsed, hash);

        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(ContentHash::from_hex("abcd").is_err());
        assert!(ContentHash::from_hex("zz").is_err());
    }

    #[test]
    fn test_verify_fingerprint() {
        let data = b"a,b\n1,2\n";
        let hash = fingerprint(data);
        assert!(verify_fingerprint(&hash, data));
        assert!(!verify_fingerprint(&hash, b"a,b\n1,3\n"));
    }

    proptest! {
        #[test]
        fn prop_fingerprint_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(fingerprint(&data), fingerprint(&data.clone()));
        }

        #[test]
        fn prop_single_byte_change_alters_fingerprint(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut changed = data.clone();
            let i = index.index(changed.len());
            changed[i] ^= flip;
            prop_assert_ne!(fingerprint(&data), fingerprint(&changed));
        }
    }
}
