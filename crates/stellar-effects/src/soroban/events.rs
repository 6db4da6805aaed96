//! Asset contract events and their balance consequences.

use stellar_xdr::curr::{
    AccountId, Asset, ContractEvent, ContractEventBody, Int128Parts, PublicKey, ScAddress, ScVal,
};

use super::trace::marker;

/// A signed balance movement of one holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceMove {
    pub holder: ScAddress,
    pub delta: i128,
}

/// Balance movements described by an event of `asset`'s contract.
///
/// `transfer` debits the sender and credits the receiver, except that the
/// issuer side of a transfer mints or burns instead. `mint` credits,
/// `burn` and `clawback` debit. Other events move nothing.
pub fn sac_balance_moves(event: &ContractEvent, asset: &Asset) -> Vec<BalanceMove> {
    let ContractEventBody::V0(body) = &event.body;
    let Some(amount) = event_amount(&body.data) else {
        return Vec::new();
    };
    let addresses: Vec<ScAddress> = body
        .topics
        .iter()
        .skip(1)
        .filter_map(|topic| match topic {
            ScVal::Address(address) => Some(drop_muxed_info(address)),
            _ => None,
        })
        .collect();

    match marker(event) {
        Some("transfer") => {
            let (Some(from), Some(to)) = (addresses.first(), addresses.get(1)) else {
                return Vec::new();
            };
            let from_is_issuer = is_issuer(from, asset);
            let to_is_issuer = is_issuer(to, asset);
            match (from_is_issuer, to_is_issuer) {
                (true, true) => Vec::new(),
                (true, false) => vec![credit(to, amount)],
                (false, true) => vec![debit(from, amount)],
                (false, false) => vec![debit(from, amount), credit(to, amount)],
            }
        }
        // Older hosts put the admin before the receiver.
        Some("mint") => addresses
            .last()
            .filter(|to| !is_issuer(to, asset))
            .map(|to| vec![credit(to, amount)])
            .unwrap_or_default(),
        Some("burn") => addresses
            .first()
            .map(|from| vec![debit(from, amount)])
            .unwrap_or_default(),
        Some("clawback") => addresses
            .last()
            .map(|from| vec![debit(from, amount)])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn credit(holder: &ScAddress, amount: i128) -> BalanceMove {
    BalanceMove {
        holder: holder.clone(),
        delta: amount,
    }
}

fn debit(holder: &ScAddress, amount: i128) -> BalanceMove {
    BalanceMove {
        holder: holder.clone(),
        delta: -amount,
    }
}

/// Amount carried by event data: an `I128`, or a map with an `amount` key.
pub fn event_amount(data: &ScVal) -> Option<i128> {
    match data {
        ScVal::I128(parts) => Some(i128_from_parts(parts)),
        ScVal::Map(Some(map)) => map.0.iter().find_map(|entry| match (&entry.key, &entry.val) {
            (ScVal::Symbol(sym), ScVal::I128(parts)) if sym.0.as_slice() == b"amount" => {
                Some(i128_from_parts(parts))
            }
            _ => None,
        }),
        _ => None,
    }
}

fn i128_from_parts(parts: &Int128Parts) -> i128 {
    ((parts.hi as i128) << 64) | (parts.lo as i128)
}

fn is_issuer(address: &ScAddress, asset: &Asset) -> bool {
    let ScAddress::Account(account) = address else {
        return false;
    };
    match asset {
        Asset::Native => false,
        Asset::CreditAlphanum4(a) => &a.issuer == account,
        Asset::CreditAlphanum12(a) => &a.issuer == account,
    }
}

fn drop_muxed_info(address: &ScAddress) -> ScAddress {
    match address {
        ScAddress::MuxedAccount(muxed) => ScAddress::Account(AccountId(
            PublicKey::PublicKeyTypeEd25519(muxed.ed25519.clone()),
        )),
        _ => address.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::*;

    fn account(seed: u8) -> AccountId {
        AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([seed; 32])))
    }

    fn usd() -> Asset {
        Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(*b"USD\0"),
            issuer: account(9),
        })
    }

    fn i128_val(value: i128) -> ScVal {
        ScVal::I128(Int128Parts {
            hi: (value >> 64) as i64,
            lo: value as u64,
        })
    }

    fn event(name: &str, addresses: &[u8], data: ScVal) -> ContractEvent {
        let mut topics = vec![ScVal::Symbol(ScSymbol(name.try_into().unwrap()))];
        topics.extend(
            addresses
                .iter()
                .map(|seed| ScVal::Address(ScAddress::Account(account(*seed)))),
        );
        topics.push(ScVal::String(ScString("USD:issuer".try_into().unwrap())));
        ContractEvent {
            ext: ExtensionPoint::V0,
            contract_id: Some(ContractId(Hash([1u8; 32]))),
            type_: ContractEventType::Contract,
            body: ContractEventBody::V0(ContractEventV0 {
                topics: topics.try_into().unwrap(),
                data,
            }),
        }
    }

    fn holder(seed: u8) -> ScAddress {
        ScAddress::Account(account(seed))
    }

    #[test]
    fn test_transfer_between_holders() {
        let moves = sac_balance_moves(&event("transfer", &[1, 2], i128_val(50)), &usd());
        assert_eq!(
            moves,
            vec![
                BalanceMove { holder: holder(1), delta: -50 },
                BalanceMove { holder: holder(2), delta: 50 },
            ]
        );
    }

    #[test]
    fn test_transfer_from_issuer_mints() {
        let moves = sac_balance_moves(&event("transfer", &[9, 2], i128_val(50)), &usd());
        assert_eq!(moves, vec![BalanceMove { holder: holder(2), delta: 50 }]);
    }

    #[test]
    fn test_transfer_to_issuer_burns() {
        let moves = sac_balance_moves(&event("transfer", &[1, 9], i128_val(50)), &usd());
        assert_eq!(moves, vec![BalanceMove { holder: holder(1), delta: -50 }]);
    }

    #[test]
    fn test_mint_burn_clawback() {
        assert_eq!(
            sac_balance_moves(&event("mint", &[9, 3], i128_val(5)), &usd()),
            vec![BalanceMove { holder: holder(3), delta: 5 }]
        );
        assert_eq!(
            sac_balance_moves(&event("mint", &[3], i128_val(5)), &usd()),
            vec![BalanceMove { holder: holder(3), delta: 5 }]
        );
        assert_eq!(
            sac_balance_moves(&event("burn", &[3], i128_val(5)), &usd()),
            vec![BalanceMove { holder: holder(3), delta: -5 }]
        );
        assert_eq!(
            sac_balance_moves(&event("clawback", &[9, 3], i128_val(5)), &usd()),
            vec![BalanceMove { holder: holder(3), delta: -5 }]
        );
        assert!(sac_balance_moves(&event("set_authorized", &[3], ScVal::Bool(true)), &usd())
            .is_empty());
    }

    #[test]
    fn test_amount_from_map_data() {
        let data = ScVal::Map(Some(ScMap(
            vec![
                ScMapEntry {
                    key: ScVal::Symbol(ScSymbol("amount".try_into().unwrap())),
                    val: i128_val(77),
                },
                ScMapEntry {
                    key: ScVal::Symbol(ScSymbol("to_muxed_id".try_into().unwrap())),
                    val: ScVal::U64(1),
                },
            ]
            .try_into()
            .unwrap(),
        )));
        assert_eq!(event_amount(&data), Some(77));
        assert_eq!(event_amount(&i128_val(-3)), Some(-3));
        assert_eq!(event_amount(&ScVal::Void), None);
    }
}
