//! Derivation options.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{EffectsError, XdrInput};
use crate::Result;

/// Inputs and flags of one derivation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveOptions {
    /// Network passphrase, or one of the names `public`, `testnet`,
    /// `futurenet`.
    #[serde(default)]
    pub network: String,

    /// XDR `TransactionEnvelope`.
    #[serde(with = "base64_bytes", alias = "tx")]
    pub envelope: Vec<u8>,

    /// XDR `TransactionResult`.
    #[serde(with = "base64_bytes")]
    pub result: Vec<u8>,

    /// XDR `TransactionMeta`.
    #[serde(with = "base64_bytes")]
    pub meta: Vec<u8>,

    /// Attach the resolved asset contract mapping to each operation.
    #[serde(default)]
    pub map_sac: bool,
}

impl DeriveOptions {
    pub fn new(
        network: impl Into<String>,
        envelope: Vec<u8>,
        result: Vec<u8>,
        meta: Vec<u8>,
    ) -> Self {
        Self {
            network: network.into(),
            envelope,
            result,
            meta,
            map_sac: false,
        }
    }

    /// Build options from base64-encoded XDR strings.
    pub fn from_base64(network: impl Into<String>, envelope: &str, result: &str, meta: &str) -> Result<Self> {
        Ok(Self::new(
            network,
            decode_base64(XdrInput::Envelope, envelope)?,
            decode_base64(XdrInput::Result, result)?,
            decode_base64(XdrInput::Meta, meta)?,
        ))
    }

    pub fn with_map_sac(mut self, map_sac: bool) -> Self {
        self.map_sac = map_sac;
        self
    }

    /// Reject options that cannot describe a transaction.
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            return Err(EffectsError::InvalidOptions("network is required".into()));
        }
        for (input, bytes) in [
            (XdrInput::Envelope, &self.envelope),
            (XdrInput::Result, &self.result),
            (XdrInput::Meta, &self.meta),
        ] {
            if bytes.is_empty() {
                return Err(EffectsError::InvalidOptions(format!("{} is empty", input)));
            }
        }
        Ok(())
    }
}

fn decode_base64(input: XdrInput, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| EffectsError::Base64 {
            input,
            reason: e.to_string(),
        })
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(s.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_network() {
        let opts = DeriveOptions::new("", vec![1], vec![1], vec![1]);
        assert!(matches!(opts.validate(), Err(EffectsError::InvalidOptions(_))));
    }

    #[test]
    fn test_validate_requires_inputs() {
        let opts = DeriveOptions::new("testnet", vec![1], vec![], vec![1]);
        let err = opts.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid options: transaction result is empty");
    }

    #[test]
    fn test_from_base64() {
        let opts = DeriveOptions::from_base64("testnet", "AAAA", "AQID", "BAUG").unwrap();
        assert_eq!(opts.envelope, vec![0, 0, 0]);
        assert_eq!(opts.result, vec![1, 2, 3]);
        assert!(!opts.map_sac);
        assert!(DeriveOptions::from_base64("testnet", "%%", "AQID", "BAUG").is_err());
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{"network":"testnet","tx":"AAAA","result":"AQID","meta":"BAUG","mapSac":true}"#;
        let opts: DeriveOptions = serde_json::from_str(json).unwrap();
        assert!(opts.map_sac);
        assert_eq!(opts.meta, vec![4, 5, 6]);
    }
}
