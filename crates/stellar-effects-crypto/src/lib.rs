//! Key and address encodings for rs-stellar-effects.
//!
//! Stellar renders every address kind (accounts, muxed accounts, contracts,
//! liquidity pools, claimable balances, signer keys) as a StrKey: a base32
//! string with a version byte and a CRC16 checksum. [`strkey`] holds the raw
//! codecs; the conversion helpers below go straight from XDR types.

mod error;
pub mod strkey;

pub use error::CryptoError;

use stellar_xdr::curr::{
    AccountId, ClaimableBalanceId, ContractId, MuxedAccount, PoolId, PublicKey, ScAddress,
    SignerKey,
};

/// Encode an account id as `G...`.
pub fn account_id_to_strkey(account: &AccountId) -> String {
    match &account.0 {
        PublicKey::PublicKeyTypeEd25519(key) => strkey::encode_account_id(&key.0),
    }
}

/// Decode a `G...` address into an account id.
pub fn account_id_from_strkey(s: &str) -> Result<AccountId, CryptoError> {
    let key = strkey::decode_account_id(s)?;
    Ok(AccountId(PublicKey::PublicKeyTypeEd25519(
        stellar_xdr::curr::Uint256(key),
    )))
}

/// Encode a muxed account: `M...` when multiplexed, `G...` otherwise.
pub fn muxed_account_to_strkey(account: &MuxedAccount) -> String {
    match account {
        MuxedAccount::Ed25519(key) => strkey::encode_account_id(&key.0),
        MuxedAccount::MuxedEd25519(m) => strkey::encode_muxed_account(&m.ed25519.0, m.id),
    }
}

/// Encode a contract id as `C...`.
pub fn contract_id_to_strkey(contract: &ContractId) -> String {
    strkey::encode_contract(&contract.0 .0)
}

/// Encode a liquidity pool id as `L...`.
pub fn pool_id_to_strkey(pool: &PoolId) -> String {
    strkey::encode_liquidity_pool(&pool.0 .0)
}

/// Encode a claimable balance id as `B...`.
pub fn claimable_balance_id_to_strkey(id: &ClaimableBalanceId) -> String {
    match id {
        ClaimableBalanceId::ClaimableBalanceIdTypeV0(hash) => {
            strkey::encode_claimable_balance(&hash.0)
        }
    }
}

/// Encode any Soroban address.
pub fn sc_address_to_strkey(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(account) => account_id_to_strkey(account),
        ScAddress::Contract(contract) => contract_id_to_strkey(contract),
        ScAddress::MuxedAccount(m) => strkey::encode_muxed_account(&m.ed25519.0, m.id),
        ScAddress::ClaimableBalance(id) => claimable_balance_id_to_strkey(id),
        ScAddress::LiquidityPool(pool) => pool_id_to_strkey(pool),
    }
}

/// Encode a signer key (`G...`, `T...`, `X...` or `P...`).
pub fn signer_key_to_strkey(key: &SignerKey) -> String {
    match key {
        SignerKey::Ed25519(k) => strkey::encode_account_id(&k.0),
        SignerKey::PreAuthTx(h) => strkey::encode_pre_auth_tx(&h.0),
        SignerKey::HashX(h) => strkey::encode_sha256_hash(&h.0),
        SignerKey::Ed25519SignedPayload(p) => {
            strkey::encode_signed_payload(&p.ed25519.0, p.payload.as_slice())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{Hash, MuxedAccountMed25519, Uint256};

    #[test]
    fn test_account_roundtrip() {
        let account = AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([5u8; 32])));
        let encoded = account_id_to_strkey(&account);
        assert!(encoded.starts_with('G'));
        assert_eq!(account_id_from_strkey(&encoded).unwrap(), account);
    }

    #[test]
    fn test_muxed_rendering() {
        let plain = MuxedAccount::Ed25519(Uint256([1u8; 32]));
        assert!(muxed_account_to_strkey(&plain).starts_with('G'));
        let muxed = MuxedAccount::MuxedEd25519(MuxedAccountMed25519 {
            id: 42,
            ed25519: Uint256([1u8; 32]),
        });
        assert!(muxed_account_to_strkey(&muxed).starts_with('M'));
    }

    #[test]
    fn test_sc_address_prefixes() {
        let contract = ScAddress::Contract(ContractId(Hash([9u8; 32])));
        assert!(sc_address_to_strkey(&contract).starts_with('C'));
        let pool = ScAddress::LiquidityPool(PoolId(Hash([9u8; 32])));
        assert!(sc_address_to_strkey(&pool).starts_with('L'));
        let balance = ScAddress::ClaimableBalance(ClaimableBalanceId::ClaimableBalanceIdTypeV0(
            Hash([9u8; 32]),
        ));
        assert!(sc_address_to_strkey(&balance).starts_with('B'));
    }

    #[test]
    fn test_contract_encoding() {
        let contract = ContractId(Hash([0xabu8; 32]));
        assert_eq!(
            contract_id_to_strkey(&contract),
            "CCV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XMCW"
        );
    }
}
