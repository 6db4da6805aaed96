//! SHA-256 hash type.

use std::fmt;

use sha2::{Digest, Sha256};
use stellar_xdr::curr::{Hash, Limits, WriteXdr};

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero hash.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Hash arbitrary bytes.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Hash the XDR encoding of a value.
    pub fn hash_xdr<T: WriteXdr>(value: &T) -> Result<Self, stellar_xdr::curr::Error> {
        let bytes = value.to_xdr(Limits::none())?;
        Ok(Self::hash(&bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Hash256> for Hash {
    fn from(value: Hash256) -> Self {
        Hash(value.0)
    }
}

impl From<Hash> for Hash256 {
    fn from(value: Hash) -> Self {
        Hash256(value.0)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(value: [u8; 32]) -> Self {
        Hash256(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_empty() {
        // SHA-256 of the empty string
        assert_eq!(
            Hash256::hash(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_xdr_matches_manual_encoding() {
        let value = Hash([7u8; 32]);
        let bytes = value.to_xdr(Limits::none()).unwrap();
        assert_eq!(Hash256::hash_xdr(&value).unwrap(), Hash256::hash(&bytes));
    }

    #[test]
    fn test_xdr_hash_conversion() {
        let h = Hash256([3u8; 32]);
        let xdr: Hash = h.into();
        assert_eq!(Hash256::from(xdr), h);
    }
}
