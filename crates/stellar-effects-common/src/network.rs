//! Network identity.
//!
//! A network is identified by its passphrase. The network id is the SHA-256
//! of the passphrase and seeds every network-scoped derivation (transaction
//! hashes, asset contract addresses).

use thiserror::Error;

use crate::Hash256;

/// Passphrase of the public network.
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
/// Passphrase of the test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
/// Passphrase of the future network, used when no network is named.
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("unknown network name: {0}")]
    UnknownName(String),
}

/// Hash of a network passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub Hash256);

impl NetworkId {
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self(Hash256::hash(passphrase.as_bytes()))
    }

    pub fn mainnet() -> Self {
        Self::from_passphrase(PUBLIC_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::from_passphrase(TESTNET_PASSPHRASE)
    }

    pub fn futurenet() -> Self {
        Self::from_passphrase(FUTURENET_PASSPHRASE)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

/// Resolve a network name or literal passphrase to a passphrase.
///
/// Strings with a space between other characters are passphrases and are
/// returned byte for byte, surrounding whitespace included. Otherwise
/// `public`, `testnet` and `futurenet` are recognized, case-insensitively and
/// ignoring surrounding whitespace. `None` (or a blank name) resolves to
/// futurenet.
pub fn resolve_passphrase(network: Option<&str>) -> Result<String, NetworkError> {
    let Some((raw, name)) = network
        .map(|raw| (raw, raw.trim()))
        .filter(|(_, name)| !name.is_empty())
    else {
        return Ok(FUTURENET_PASSPHRASE.to_string());
    };
    if name.contains(' ') {
        return Ok(raw.to_string());
    }
    match name.to_ascii_lowercase().as_str() {
        "public" | "mainnet" | "pubnet" => Ok(PUBLIC_PASSPHRASE.to_string()),
        "testnet" => Ok(TESTNET_PASSPHRASE.to_string()),
        "futurenet" => Ok(FUTURENET_PASSPHRASE.to_string()),
        _ => Err(NetworkError::UnknownName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_names() {
        assert_eq!(resolve_passphrase(Some("PUBLIC")).unwrap(), PUBLIC_PASSPHRASE);
        assert_eq!(resolve_passphrase(Some("testnet")).unwrap(), TESTNET_PASSPHRASE);
        assert_eq!(resolve_passphrase(None).unwrap(), FUTURENET_PASSPHRASE);
        assert_eq!(resolve_passphrase(Some("  ")).unwrap(), FUTURENET_PASSPHRASE);
    }

    #[test]
    fn test_resolve_literal_passphrase() {
        let custom = "Standalone Network ; February 2017";
        assert_eq!(resolve_passphrase(Some(custom)).unwrap(), custom);
    }

    #[test]
    fn test_padded_passphrase_is_kept_verbatim() {
        let padded = " Standalone Network ; February 2017 ";
        assert_eq!(resolve_passphrase(Some(padded)).unwrap(), padded);
        assert_ne!(
            NetworkId::from_passphrase(padded),
            NetworkId::from_passphrase(padded.trim())
        );
        assert_eq!(resolve_passphrase(Some(" testnet ")).unwrap(), TESTNET_PASSPHRASE);
    }

    #[test]
    fn test_resolve_unknown_name() {
        assert_eq!(
            resolve_passphrase(Some("devnet")),
            Err(NetworkError::UnknownName("devnet".to_string()))
        );
    }

    #[test]
    fn test_network_ids_differ() {
        assert_ne!(NetworkId::testnet(), NetworkId::mainnet());
        assert_eq!(NetworkId::testnet(), NetworkId::from_passphrase(TESTNET_PASSPHRASE));
    }
}
