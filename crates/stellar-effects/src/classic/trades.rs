//! Trade effects from claim atoms.
//!
//! A claim atom is written from the counterparty's side: the maker sold
//! `asset_sold` and received `asset_bought`. The taker (operation source)
//! therefore sold `asset_bought` and bought `asset_sold`.

use stellar_effects_crypto::{account_id_to_strkey, pool_id_to_strkey};
use stellar_xdr::curr::{AccountId, Asset, ClaimAtom, PublicKey};

use crate::effect::EffectBody;
use crate::format::{asset_to_string, Amount};

/// One `trade` effect per claim atom, in result order.
pub fn trade_effects(atoms: &[ClaimAtom]) -> Vec<EffectBody> {
    atoms.iter().map(trade_effect).collect()
}

fn trade_effect(atom: &ClaimAtom) -> EffectBody {
    match atom {
        ClaimAtom::V0(claim) => {
            let seller = AccountId(PublicKey::PublicKeyTypeEd25519(claim.seller_ed25519.clone()));
            trade(
                account_id_to_strkey(&seller),
                Some(claim.offer_id),
                None,
                (&claim.asset_bought, claim.amount_bought),
                (&claim.asset_sold, claim.amount_sold),
            )
        }
        ClaimAtom::OrderBook(claim) => trade(
            account_id_to_strkey(&claim.seller_id),
            Some(claim.offer_id),
            None,
            (&claim.asset_bought, claim.amount_bought),
            (&claim.asset_sold, claim.amount_sold),
        ),
        ClaimAtom::LiquidityPool(claim) => {
            let pool = pool_id_to_strkey(&claim.liquidity_pool_id);
            trade(
                pool.clone(),
                None,
                Some(pool),
                (&claim.asset_bought, claim.amount_bought),
                (&claim.asset_sold, claim.amount_sold),
            )
        }
    }
}

fn trade(
    counterparty: String,
    offer: Option<i64>,
    pool: Option<String>,
    sold: (&Asset, i64),
    bought: (&Asset, i64),
) -> EffectBody {
    EffectBody::Trade {
        counterparty,
        offer: offer.map(Amount::from),
        pool,
        sold: asset_to_string(sold.0),
        sold_amount: sold.1.into(),
        bought: asset_to_string(bought.0),
        bought_amount: bought.1.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stellar_xdr::curr::*;

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    fn usd() -> Asset {
        Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(*b"USD\0"),
            issuer: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([0u8; 32]))),
        })
    }

    #[test]
    fn test_order_book_trade_from_taker_side() {
        let atom = ClaimAtom::OrderBook(ClaimOfferAtom {
            seller_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([0u8; 32]))),
            offer_id: 42,
            asset_sold: usd(),
            amount_sold: 100,
            asset_bought: Asset::Native,
            amount_bought: 250,
        });
        let effects = trade_effects(&[atom]);
        assert_eq!(
            serde_json::to_value(&effects[0]).unwrap(),
            json!({
                "type": "trade",
                "counterparty": ZERO_ACCOUNT,
                "offer": "42",
                "sold": "native",
                "soldAmount": "250",
                "bought": format!("USD:{ZERO_ACCOUNT}"),
                "boughtAmount": "100"
            })
        );
    }

    #[test]
    fn test_pool_trade_names_pool() {
        let atom = ClaimAtom::LiquidityPool(ClaimLiquidityAtom {
            liquidity_pool_id: PoolId(Hash([1u8; 32])),
            asset_sold: usd(),
            amount_sold: 5,
            asset_bought: Asset::Native,
            amount_bought: 6,
        });
        match &trade_effects(&[atom])[0] {
            EffectBody::Trade {
                counterparty,
                offer,
                pool,
                ..
            } => {
                assert!(counterparty.starts_with('L'));
                assert_eq!(offer, &None);
                assert_eq!(pool.as_deref(), Some(counterparty.as_str()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
