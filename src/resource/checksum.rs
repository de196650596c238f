//! Content checksums used to tell unchanged resources from updated ones.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 checksum of a resource's raw content, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, content: &[u8]) -> bool {
        *self == Self::from_bytes(content)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_same_checksum() {
        let a = Checksum::from_bytes(b"<xs:schema/>");
        let b = Checksum::from_bytes(b"<xs:schema/>");
        assert_eq!(a, b);
        assert!(a.verify(b"<xs:schema/>"));
    }

    #[test]
    fn different_content_differs() {
        let a = Checksum::from_bytes(b"<xs:schema/>");
        assert!(!a.verify(b"<xs:schema />"));
    }

    #[test]
    fn hex_encoded_sha256() {
        let empty = Checksum::from_bytes(b"");
        assert_eq!(
            empty.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
