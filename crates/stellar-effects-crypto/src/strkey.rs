//! StrKey codec.
//!
//! `base32(version || payload || crc16_xmodem_le(version || payload))`,
//! unpadded. The version byte is the prefix letter's base32 index shifted
//! left by three, so every key of one kind starts with the same letter.

use crate::error::CryptoError;

/// Kind of key, named after its leading letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// `G`, ed25519 account.
    Account,
    /// `M`, multiplexed account.
    Muxed,
    /// `T`, pre-authorized transaction hash.
    PreAuthTx,
    /// `X`, sha256 hash signer.
    HashX,
    /// `P`, signed payload signer.
    SignedPayload,
    /// `C`, contract.
    Contract,
    /// `L`, liquidity pool.
    LiquidityPool,
    /// `B`, claimable balance.
    ClaimableBalance,
}

impl Version {
    fn byte(self) -> u8 {
        let index = match self {
            Version::Account => 6,
            Version::Muxed => 12,
            Version::PreAuthTx => 19,
            Version::HashX => 23,
            Version::SignedPayload => 15,
            Version::Contract => 2,
            Version::LiquidityPool => 11,
            Version::ClaimableBalance => 1,
        };
        index << 3
    }
}

/// Encode `payload` under `version`.
pub fn encode(version: Version, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 3);
    raw.push(version.byte());
    raw.extend_from_slice(payload);
    let crc = crc16_xmodem(&raw);
    raw.extend_from_slice(&crc.to_le_bytes());
    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &raw)
}

/// Decode a StrKey, checking its version and checksum.
pub fn decode(version: Version, s: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, s)
        .ok_or_else(|| CryptoError::InvalidStrKey("invalid base32".to_string()))?;
    let [found, .., _, _] = raw.as_slice() else {
        return Err(CryptoError::InvalidStrKey("too short".to_string()));
    };
    if *found != version.byte() {
        return Err(CryptoError::InvalidStrKey(format!(
            "expected {:?} key, found version byte {:#04x}",
            version, found
        )));
    }
    let (body, crc) = raw.split_at(raw.len() - 2);
    if crc16_xmodem(body).to_le_bytes() != crc {
        return Err(CryptoError::InvalidStrKey("checksum mismatch".to_string()));
    }
    Ok(body[1..].to_vec())
}

fn decode_32(version: Version, s: &str) -> Result<[u8; 32], CryptoError> {
    let payload = decode(version, s)?;
    payload.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidStrKey(format!("{:?} payload is {} bytes", version, payload.len()))
    })
}

pub fn encode_account_id(key: &[u8; 32]) -> String {
    encode(Version::Account, key)
}

pub fn decode_account_id(s: &str) -> Result<[u8; 32], CryptoError> {
    decode_32(Version::Account, s)
}

pub fn encode_pre_auth_tx(hash: &[u8; 32]) -> String {
    encode(Version::PreAuthTx, hash)
}

pub fn encode_sha256_hash(hash: &[u8; 32]) -> String {
    encode(Version::HashX, hash)
}

pub fn encode_contract(hash: &[u8; 32]) -> String {
    encode(Version::Contract, hash)
}

pub fn encode_liquidity_pool(hash: &[u8; 32]) -> String {
    encode(Version::LiquidityPool, hash)
}

/// Claimable balance ids carry their id type (0, v0) before the hash.
pub fn encode_claimable_balance(hash: &[u8; 32]) -> String {
    let mut payload = [0u8; 33];
    payload[1..].copy_from_slice(hash);
    encode(Version::ClaimableBalance, &payload)
}

/// `M...`: the ed25519 key followed by the big-endian id.
pub fn encode_muxed_account(key: &[u8; 32], id: u64) -> String {
    let mut payload = [0u8; 40];
    payload[..32].copy_from_slice(key);
    payload[32..].copy_from_slice(&id.to_be_bytes());
    encode(Version::Muxed, &payload)
}

pub fn decode_muxed_account(s: &str) -> Result<([u8; 32], u64), CryptoError> {
    let payload = decode(Version::Muxed, s)?;
    let (Ok(key), Ok(id)) = (
        <[u8; 32]>::try_from(payload.get(..32).unwrap_or_default()),
        <[u8; 8]>::try_from(payload.get(32..).unwrap_or_default()),
    ) else {
        return Err(CryptoError::InvalidStrKey(format!(
            "muxed payload is {} bytes",
            payload.len()
        )));
    };
    Ok((key, u64::from_be_bytes(id)))
}

/// `P...`: key, big-endian payload length, payload zero-padded to 4 bytes.
pub fn encode_signed_payload(key: &[u8; 32], payload: &[u8]) -> String {
    let padded = payload.len().div_ceil(4) * 4;
    let mut data = Vec::with_capacity(36 + padded);
    data.extend_from_slice(key);
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(payload);
    data.resize(36 + padded, 0);
    encode(Version::SignedPayload, &data)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, byte| {
        (0..8).fold(crc ^ (u16::from(*byte) << 8), |crc, _| {
            if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_account_ids() {
        assert_eq!(
            encode_account_id(&[0u8; 32]),
            "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF"
        );
        assert_eq!(
            encode_account_id(&[1u8; 32]),
            "GAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQDZ7H"
        );
        assert_eq!(
            decode_account_id("GAEQSCIJBEEQSCIJBEEQSCIJBEEQSCIJBEEQSCIJBEEQSCIJBEEQSH7S").unwrap(),
            [9u8; 32]
        );
    }

    #[test]
    fn test_known_contract() {
        assert_eq!(
            encode_contract(&[0xABu8; 32]),
            "CCV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XMCW"
        );
    }

    #[test]
    fn test_corrupted_checksum_is_rejected() {
        let mut encoded = encode_account_id(&[0u8; 32]);
        encoded.pop();
        encoded.push('A');
        assert!(decode_account_id(&encoded).is_err());
    }

    #[test]
    fn test_version_mismatch() {
        let contract = encode_contract(&[1u8; 32]);
        assert!(decode_account_id(&contract).is_err());
        assert_eq!(decode(Version::Contract, &contract).unwrap(), vec![1u8; 32]);
    }

    #[test]
    fn test_muxed_account() {
        let encoded = encode_muxed_account(&[42u8; 32], 12345);
        assert!(encoded.starts_with('M'));
        assert_eq!(decode_muxed_account(&encoded).unwrap(), ([42u8; 32], 12345));
        assert!(decode_muxed_account(&encode(Version::Muxed, &[0u8; 32])).is_err());
    }

    #[test]
    fn test_prefix_letters() {
        assert!(encode_claimable_balance(&[3u8; 32]).starts_with('B'));
        assert!(encode_liquidity_pool(&[3u8; 32]).starts_with('L'));
        assert!(encode_pre_auth_tx(&[3u8; 32]).starts_with('T'));
        assert!(encode_sha256_hash(&[3u8; 32]).starts_with('X'));
        assert!(encode_signed_payload(&[7u8; 32], &[1, 2, 3]).starts_with('P'));
    }
}
