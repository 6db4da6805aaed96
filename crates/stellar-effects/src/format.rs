//! Rendering of XDR values into the textual forms effects carry.
//!
//! Assets are SEP-11 strings (`native` or `CODE:ISSUER`), addresses are
//! StrKeys, opaque Soroban values are base64 XDR, and integer amounts are
//! decimal strings so they survive JSON consumers that parse numbers as
//! doubles.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Serialize, Serializer};
use stellar_effects_crypto::{
    account_id_from_strkey, account_id_to_strkey, claimable_balance_id_to_strkey,
    pool_id_to_strkey, sc_address_to_strkey,
};
use stellar_xdr::curr::{
    AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, ContractDataDurability, LedgerKey,
    Limits, Price, ScVal, TrustLineAsset, WriteXdr,
};

/// An integer amount, serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(pub i128);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(value as i128)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value as i128)
    }
}

impl From<i128> for Amount {
    fn from(value: i128) -> Self {
        Amount(value)
    }
}

/// SEP-11 string of a classic asset.
pub fn asset_to_string(asset: &Asset) -> String {
    match asset {
        Asset::Native => "native".to_string(),
        Asset::CreditAlphanum4(a) => format!(
            "{}:{}",
            asset_code_to_string(&a.asset_code.0),
            account_id_to_strkey(&a.issuer)
        ),
        Asset::CreditAlphanum12(a) => format!(
            "{}:{}",
            asset_code_to_string(&a.asset_code.0),
            account_id_to_strkey(&a.issuer)
        ),
    }
}

/// Trustline asset: SEP-11 for classic assets, the pool StrKey for pool shares.
pub fn trustline_asset_to_string(asset: &TrustLineAsset) -> String {
    match asset {
        TrustLineAsset::Native => "native".to_string(),
        TrustLineAsset::CreditAlphanum4(a) => {
            asset_to_string(&Asset::CreditAlphanum4(a.clone()))
        }
        TrustLineAsset::CreditAlphanum12(a) => {
            asset_to_string(&Asset::CreditAlphanum12(a.clone()))
        }
        TrustLineAsset::PoolShare(pool) => pool_id_to_strkey(pool),
    }
}

/// Classic asset behind a trustline, if it is not a pool share.
pub fn trustline_classic_asset(asset: &TrustLineAsset) -> Option<Asset> {
    match asset {
        TrustLineAsset::Native => Some(Asset::Native),
        TrustLineAsset::CreditAlphanum4(a) => Some(Asset::CreditAlphanum4(a.clone())),
        TrustLineAsset::CreditAlphanum12(a) => Some(Asset::CreditAlphanum12(a.clone())),
        TrustLineAsset::PoolShare(_) => None,
    }
}

/// Parse a SEP-11 asset string.
///
/// Returns `None` for malformed codes or issuers.
pub fn parse_asset(value: &str) -> Option<Asset> {
    if value == "native" {
        return Some(Asset::Native);
    }
    let (code, issuer) = value.split_once(':')?;
    let issuer = account_id_from_strkey(issuer).ok()?;
    let code_bytes = code.as_bytes();
    if code_bytes.is_empty() || !code_bytes.iter().all(u8::is_ascii_alphanumeric) {
        return None;
    }
    if code_bytes.len() <= 4 {
        let mut buf = [0u8; 4];
        buf[..code_bytes.len()].copy_from_slice(code_bytes);
        Some(Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(buf),
            issuer,
        }))
    } else if code_bytes.len() <= 12 {
        let mut buf = [0u8; 12];
        buf[..code_bytes.len()].copy_from_slice(code_bytes);
        Some(Asset::CreditAlphanum12(AlphaNum12 {
            asset_code: AssetCode12(buf),
            issuer,
        }))
    } else {
        None
    }
}

fn asset_code_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Base64 XDR of a value; empty if it cannot be re-encoded.
pub fn xdr_base64<T: WriteXdr>(value: &T) -> String {
    match value.to_xdr(Limits::none()) {
        Ok(bytes) => STANDARD.encode(bytes),
        Err(err) => {
            tracing::warn!(error = %err, "failed to re-encode XDR value");
            String::new()
        }
    }
}

pub fn scval_to_base64(value: &ScVal) -> String {
    xdr_base64(value)
}

pub fn price_to_string(price: &Price) -> String {
    format!("{}/{}", price.n, price.d)
}

pub fn durability_name(durability: &ContractDataDurability) -> &'static str {
    match durability {
        ContractDataDurability::Temporary => "temporary",
        ContractDataDurability::Persistent => "persistent",
    }
}

/// Human readable identifier of a ledger entry, `<kind>:<id>`.
pub fn ledger_key_label(key: &LedgerKey) -> String {
    match key {
        LedgerKey::Account(k) => format!("account:{}", account_id_to_strkey(&k.account_id)),
        LedgerKey::Trustline(k) => format!(
            "trustline:{}:{}",
            account_id_to_strkey(&k.account_id),
            trustline_asset_to_string(&k.asset)
        ),
        LedgerKey::Offer(k) => format!("offer:{}", k.offer_id),
        LedgerKey::Data(k) => {
            let name: &[u8] = k.data_name.0.as_ref();
            format!(
                "data:{}:{}",
                account_id_to_strkey(&k.account_id),
                String::from_utf8_lossy(name)
            )
        }
        LedgerKey::ClaimableBalance(k) => format!(
            "claimableBalance:{}",
            claimable_balance_id_to_strkey(&k.balance_id)
        ),
        LedgerKey::LiquidityPool(k) => {
            format!("liquidityPool:{}", pool_id_to_strkey(&k.liquidity_pool_id))
        }
        LedgerKey::ContractData(k) => format!(
            "contractData:{}:{}",
            sc_address_to_strkey(&k.contract),
            scval_to_base64(&k.key)
        ),
        LedgerKey::ContractCode(k) => format!("contractCode:{}", hex::encode(k.hash.0)),
        LedgerKey::ConfigSetting(k) => {
            format!("configSetting:{}", k.config_setting_id as i32)
        }
        LedgerKey::Ttl(k) => format!("ttl:{}", hex::encode(k.key_hash.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{AccountId, PublicKey, Uint256};

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    fn zero_account() -> AccountId {
        AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([0u8; 32])))
    }

    #[test]
    fn test_asset_strings() {
        assert_eq!(asset_to_string(&Asset::Native), "native");
        let usd = Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(*b"USD\0"),
            issuer: zero_account(),
        });
        assert_eq!(asset_to_string(&usd), format!("USD:{}", ZERO_ACCOUNT));
    }

    #[test]
    fn test_parse_asset() {
        let parsed = parse_asset(&format!("USD:{}", ZERO_ACCOUNT)).unwrap();
        assert_eq!(
            parsed,
            Asset::CreditAlphanum4(AlphaNum4 {
                asset_code: AssetCode4(*b"USD\0"),
                issuer: zero_account(),
            })
        );
        let long = parse_asset(&format!("LONGERCODE:{}", ZERO_ACCOUNT)).unwrap();
        assert!(matches!(long, Asset::CreditAlphanum12(_)));
        assert_eq!(parse_asset("native"), Some(Asset::Native));
        assert_eq!(parse_asset("USD"), None);
        assert_eq!(parse_asset("USD:GBAD"), None);
        assert_eq!(parse_asset(&format!("WAYTOOLONGCODE:{}", ZERO_ACCOUNT)), None);
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let json = serde_json::to_string(&Amount(-1_000_000_000_000_000_000_000)).unwrap();
        assert_eq!(json, "\"-1000000000000000000000\"");
    }

    #[test]
    fn test_scval_base64() {
        assert_eq!(scval_to_base64(&ScVal::Void), "AAAAAQ==");
        assert_eq!(scval_to_base64(&ScVal::U32(7)), "AAAAAwAAAAc=");
    }

    #[test]
    fn test_price_string() {
        assert_eq!(price_to_string(&Price { n: 3, d: 2 }), "3/2");
    }
}
