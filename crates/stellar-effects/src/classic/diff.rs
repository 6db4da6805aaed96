//! Generic ledger entry differ.
//!
//! Turns paired entry changes into effects. Account effects are emitted after
//! every other entry so that, e.g., a trustline creation precedes the reserve
//! change it causes. Sponsorship effects follow their entry.

use base64::{engine::general_purpose::STANDARD, Engine};
use stellar_effects_crypto::{
    account_id_to_strkey, claimable_balance_id_to_strkey, pool_id_to_strkey, signer_key_to_strkey,
};
use stellar_xdr::curr::{
    AccountEntry, Claimant, ClaimableBalanceEntry, DataEntry, LedgerEntryData, LiquidityPoolEntry,
    LiquidityPoolEntryBody, OfferEntry, TrustLineEntry,
};

use crate::changes::{entry_sponsor, EntryChange};
use crate::effect::{DataEntryState, EffectBody, OfferState, PoolState, Reserve};
use crate::format::{
    asset_to_string, ledger_key_label, price_to_string, trustline_asset_to_string, Amount,
};

#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    /// Emit `balanceChanged` for account and trustline balances.
    pub include_balances: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            include_balances: true,
        }
    }
}

/// Effects of `changes`, non-account entries first.
pub fn diff_entries(changes: &[EntryChange], options: DiffOptions) -> Vec<EffectBody> {
    let mut effects = Vec::new();
    for change in changes.iter().filter(|c| !c.is_account()) {
        diff_entry(change, options, &mut effects);
    }
    for change in changes.iter().filter(|c| c.is_account()) {
        diff_entry(change, options, &mut effects);
    }
    effects
}

fn diff_entry(change: &EntryChange, options: DiffOptions, effects: &mut Vec<EffectBody>) {
    let before = change.before_data();
    let after = change.after_data();
    match (before, after) {
        (None, Some(LedgerEntryData::Account(a))) => {
            effects.push(EffectBody::AccountCreated {
                account: account_id_to_strkey(&a.account_id),
                starting_balance: a.balance.into(),
            });
        }
        (Some(LedgerEntryData::Account(b)), Some(LedgerEntryData::Account(a))) => {
            account_updated(b, a, options, effects);
        }
        (Some(LedgerEntryData::Account(b)), None) => {
            let account = account_id_to_strkey(&b.account_id);
            if options.include_balances && b.balance != 0 {
                effects.push(EffectBody::BalanceChanged {
                    account: account.clone(),
                    asset: "native".to_string(),
                    delta: Amount::from(-b.balance),
                    balance: Some(Amount(0)),
                    subentries: None,
                });
            }
            effects.push(EffectBody::AccountRemoved { account });
        }

        (None, Some(LedgerEntryData::Trustline(t))) => {
            effects.push(EffectBody::TrustlineCreated {
                account: account_id_to_strkey(&t.account_id),
                asset: trustline_asset_to_string(&t.asset),
                limit: t.limit.into(),
                flags: t.flags,
            });
            if options.include_balances && t.balance != 0 {
                effects.push(trustline_balance(t, t.balance));
            }
        }
        (Some(LedgerEntryData::Trustline(b)), Some(LedgerEntryData::Trustline(a))) => {
            trustline_updated(b, a, options, effects);
        }
        (Some(LedgerEntryData::Trustline(b)), None) => {
            if options.include_balances && b.balance != 0 {
                let mut debit = trustline_balance(b, -b.balance);
                if let EffectBody::BalanceChanged { balance, .. } = &mut debit {
                    *balance = Some(Amount(0));
                }
                effects.push(debit);
            }
            effects.push(EffectBody::TrustlineRemoved {
                account: account_id_to_strkey(&b.account_id),
                asset: trustline_asset_to_string(&b.asset),
            });
        }

        (None, Some(LedgerEntryData::Offer(o))) => {
            effects.push(EffectBody::OfferCreated(offer_state(o, None)));
        }
        (Some(LedgerEntryData::Offer(b)), Some(LedgerEntryData::Offer(a))) => {
            if b != a {
                let delta = Amount::from(a.amount as i128 - b.amount as i128);
                effects.push(EffectBody::OfferUpdated(offer_state(a, Some(delta))));
            }
        }
        (Some(LedgerEntryData::Offer(b)), None) => {
            effects.push(EffectBody::OfferRemoved {
                owner: account_id_to_strkey(&b.seller_id),
                offer: b.offer_id.into(),
            });
        }

        (None, Some(LedgerEntryData::Data(d))) => {
            effects.push(EffectBody::DataEntryCreated(data_state(d)));
        }
        (Some(LedgerEntryData::Data(b)), Some(LedgerEntryData::Data(a))) => {
            if b.data_value != a.data_value {
                effects.push(EffectBody::DataEntryUpdated(data_state(a)));
            }
        }
        (Some(LedgerEntryData::Data(b)), None) => {
            effects.push(EffectBody::DataEntryRemoved {
                account: account_id_to_strkey(&b.account_id),
                name: data_name(b),
            });
        }

        (None, Some(LedgerEntryData::ClaimableBalance(c))) => {
            effects.push(EffectBody::ClaimableBalanceCreated {
                balance: claimable_balance_id_to_strkey(&c.balance_id),
                asset: asset_to_string(&c.asset),
                amount: c.amount.into(),
                claimants: c.claimants.iter().map(claimant_destination).collect(),
            });
        }
        (Some(LedgerEntryData::ClaimableBalance(c)), None) => {
            effects.push(claimable_balance_removed(c));
        }

        (None, Some(LedgerEntryData::LiquidityPool(p))) => {
            effects.push(EffectBody::LiquidityPoolCreated(pool_state(p)));
        }
        (Some(LedgerEntryData::LiquidityPool(b)), Some(LedgerEntryData::LiquidityPool(a))) => {
            if b != a {
                effects.push(EffectBody::LiquidityPoolUpdated(pool_state(a)));
            }
        }
        (Some(LedgerEntryData::LiquidityPool(b)), None) => {
            effects.push(EffectBody::LiquidityPoolRemoved {
                pool: pool_id_to_strkey(&b.liquidity_pool_id),
            });
        }

        // Contract entries, TTLs and config settings belong to the Soroban
        // module; claimable balances are never updated in place.
        _ => {}
    }

    sponsorship_effects(change, effects);
}

fn account_updated(
    before: &AccountEntry,
    after: &AccountEntry,
    options: DiffOptions,
    effects: &mut Vec<EffectBody>,
) {
    let account = account_id_to_strkey(&after.account_id);

    if options.include_balances && before.balance != after.balance {
        let subentries =
            (before.num_sub_entries != after.num_sub_entries).then_some(after.num_sub_entries);
        effects.push(EffectBody::BalanceChanged {
            account: account.clone(),
            asset: "native".to_string(),
            delta: Amount::from(after.balance as i128 - before.balance as i128),
            balance: Some(after.balance.into()),
            subentries,
        });
    }

    if before.thresholds != after.thresholds {
        effects.push(EffectBody::AccountThresholdsUpdated {
            account: account.clone(),
            thresholds: after.thresholds.0,
        });
    }

    for signer in after.signers.iter() {
        let previous = before.signers.iter().find(|s| s.key == signer.key);
        match previous {
            Some(prev) if prev.weight == signer.weight => {}
            _ => effects.push(EffectBody::AccountSignerUpdated {
                account: account.clone(),
                signer: signer_key_to_strkey(&signer.key),
                weight: signer.weight,
                prev_weight: previous.map(|p| p.weight),
            }),
        }
    }
    for removed in before
        .signers
        .iter()
        .filter(|s| !after.signers.iter().any(|a| a.key == s.key))
    {
        effects.push(EffectBody::AccountSignerUpdated {
            account: account.clone(),
            signer: signer_key_to_strkey(&removed.key),
            weight: 0,
            prev_weight: Some(removed.weight),
        });
    }

    if before.home_domain != after.home_domain {
        effects.push(EffectBody::AccountHomeDomainUpdated {
            account: account.clone(),
            domain: String::from_utf8_lossy(after.home_domain.0.as_slice()).into_owned(),
        });
    }

    if before.flags != after.flags {
        effects.push(EffectBody::AccountFlagsUpdated {
            account: account.clone(),
            flags: after.flags,
            prev_flags: before.flags,
        });
    }

    if before.inflation_dest != after.inflation_dest {
        effects.push(EffectBody::AccountInflationDestinationUpdated {
            account,
            inflation_destination: after.inflation_dest.as_ref().map(account_id_to_strkey),
        });
    }
}

fn trustline_updated(
    before: &TrustLineEntry,
    after: &TrustLineEntry,
    options: DiffOptions,
    effects: &mut Vec<EffectBody>,
) {
    let limit_changed = before.limit != after.limit;
    let flags_changed = before.flags != after.flags;
    if limit_changed || flags_changed {
        effects.push(EffectBody::TrustlineUpdated {
            account: account_id_to_strkey(&after.account_id),
            asset: trustline_asset_to_string(&after.asset),
            limit: limit_changed.then(|| after.limit.into()),
            flags: flags_changed.then_some(after.flags),
            prev_flags: flags_changed.then_some(before.flags),
        });
    }
    if options.include_balances && before.balance != after.balance {
        effects.push(trustline_balance(
            after,
            after.balance as i128 - before.balance as i128,
        ));
    }
}

fn trustline_balance(line: &TrustLineEntry, delta: impl Into<Amount>) -> EffectBody {
    EffectBody::BalanceChanged {
        account: account_id_to_strkey(&line.account_id),
        asset: trustline_asset_to_string(&line.asset),
        delta: delta.into(),
        balance: Some(line.balance.into()),
        subentries: None,
    }
}

fn offer_state(offer: &OfferEntry, amount_delta: Option<Amount>) -> OfferState {
    OfferState {
        owner: account_id_to_strkey(&offer.seller_id),
        offer: offer.offer_id.into(),
        selling: asset_to_string(&offer.selling),
        buying: asset_to_string(&offer.buying),
        amount: offer.amount.into(),
        price: price_to_string(&offer.price),
        amount_delta,
    }
}

fn data_name(entry: &DataEntry) -> String {
    String::from_utf8_lossy(entry.data_name.0.as_slice()).into_owned()
}

fn data_state(entry: &DataEntry) -> DataEntryState {
    DataEntryState {
        account: account_id_to_strkey(&entry.account_id),
        name: data_name(entry),
        value: STANDARD.encode(entry.data_value.0.as_slice()),
    }
}

fn claimant_destination(claimant: &Claimant) -> String {
    let Claimant::ClaimantTypeV0(v0) = claimant;
    account_id_to_strkey(&v0.destination)
}

fn claimable_balance_removed(entry: &ClaimableBalanceEntry) -> EffectBody {
    EffectBody::ClaimableBalanceRemoved {
        balance: claimable_balance_id_to_strkey(&entry.balance_id),
        asset: asset_to_string(&entry.asset),
        amount: entry.amount.into(),
    }
}

fn pool_state(entry: &LiquidityPoolEntry) -> PoolState {
    let LiquidityPoolEntryBody::LiquidityPoolConstantProduct(cp) = &entry.body;
    PoolState {
        pool: pool_id_to_strkey(&entry.liquidity_pool_id),
        reserves: vec![
            Reserve {
                asset: asset_to_string(&cp.params.asset_a),
                amount: cp.reserve_a.into(),
            },
            Reserve {
                asset: asset_to_string(&cp.params.asset_b),
                amount: cp.reserve_b.into(),
            },
        ],
        shares: cp.total_pool_shares.into(),
    }
}

fn sponsorship_effects(change: &EntryChange, effects: &mut Vec<EffectBody>) {
    let before = change.before.as_ref().and_then(entry_sponsor);
    let after = change.after.as_ref().and_then(entry_sponsor);
    let entry = || ledger_key_label(&change.key);
    match (before, after) {
        (None, Some(sponsor)) => effects.push(EffectBody::SponsorshipCreated {
            entry: entry(),
            sponsor: account_id_to_strkey(sponsor),
        }),
        (Some(prev), None) => effects.push(EffectBody::SponsorshipRemoved {
            entry: entry(),
            sponsor: account_id_to_strkey(prev),
        }),
        (Some(prev), Some(sponsor)) if prev != sponsor => {
            effects.push(EffectBody::SponsorshipUpdated {
                entry: entry(),
                sponsor: account_id_to_strkey(sponsor),
                prev_sponsor: account_id_to_strkey(prev),
            })
        }
        _ => {}
    }
}
