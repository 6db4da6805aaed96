//! Contract storage, code and TTL changes.

use stellar_effects_crypto::sc_address_to_strkey;
use stellar_xdr::curr::{ContractDataEntry, LedgerEntryData, LedgerKey, ScAddress, ScVal};

use crate::changes::EntryChange;
use crate::effect::{ContractDataState, EffectBody};
use crate::format::{durability_name, ledger_key_label, scval_to_base64};

/// Effects of the Soroban entries among `changes`.
///
/// `is_sac` tells whether a contract was resolved as an asset contract; its
/// balance and instance entries are then skipped. `ttl_effects` enables
/// `setTtl` for TTL entries.
pub fn storage_effects(
    changes: &[EntryChange],
    mut is_sac: impl FnMut(&ScAddress) -> bool,
    ttl_effects: bool,
) -> Vec<EffectBody> {
    let mut effects = Vec::new();
    for change in changes {
        // A restored TTL entry belongs to the restored data or code entry.
        if change.restored && !matches!(change.key, LedgerKey::Ttl(_)) {
            effects.push(EffectBody::EntryRestored {
                entry: ledger_key_label(&change.key),
            });
        }
        match change.data() {
            Some(LedgerEntryData::ContractData(data)) => {
                if is_sac(&data.contract) && is_sac_managed_key(&data.key) {
                    continue;
                }
                contract_data_effect(change, &mut effects);
            }
            Some(LedgerEntryData::ContractCode(code)) => {
                let wasm_hash = hex::encode(code.hash.0);
                if change.is_created() && !change.restored {
                    effects.push(EffectBody::ContractCodeUploaded { wasm_hash });
                } else if change.is_removed() {
                    effects.push(EffectBody::ContractCodeRemoved { wasm_hash });
                }
            }
            Some(LedgerEntryData::Ttl(ttl)) if ttl_effects => {
                let changed = match change.before_data() {
                    Some(LedgerEntryData::Ttl(prev)) => {
                        prev.live_until_ledger_seq != ttl.live_until_ledger_seq
                    }
                    _ => true,
                };
                if changed && change.after.is_some() {
                    effects.push(EffectBody::SetTtl {
                        entry: hex::encode(ttl.key_hash.0),
                        ttl: ttl.live_until_ledger_seq,
                    });
                }
            }
            _ => {}
        }
    }
    effects
}

fn contract_data_effect(change: &EntryChange, effects: &mut Vec<EffectBody>) {
    let before = match change.before_data() {
        Some(LedgerEntryData::ContractData(d)) => Some(d),
        _ => None,
    };
    let after = match change.after_data() {
        Some(LedgerEntryData::ContractData(d)) => Some(d),
        _ => None,
    };
    match (before, after) {
        (None, Some(after)) if !change.restored => {
            effects.push(EffectBody::ContractDataCreated(data_state(after)));
        }
        (None, Some(_)) => {}
        (Some(before), Some(after)) => {
            if before.val != after.val {
                effects.push(EffectBody::ContractDataUpdated(data_state(after)));
            }
        }
        (Some(before), None) => effects.push(EffectBody::ContractDataRemoved {
            contract: sc_address_to_strkey(&before.contract),
            key: scval_to_base64(&before.key),
            durability: durability_name(&before.durability),
        }),
        (None, None) => {}
    }
}

fn data_state(data: &ContractDataEntry) -> ContractDataState {
    ContractDataState {
        contract: sc_address_to_strkey(&data.contract),
        key: scval_to_base64(&data.key),
        durability: durability_name(&data.durability),
        value: scval_to_base64(&data.val),
    }
}

/// Instance entry, or a `[Symbol Balance, Address]` balance entry.
pub fn is_sac_managed_key(key: &ScVal) -> bool {
    match key {
        ScVal::LedgerKeyContractInstance => true,
        ScVal::Vec(Some(items)) => matches!(
            items.0.as_slice(),
            [ScVal::Symbol(sym), ScVal::Address(_)] if sym.0.as_slice() == b"Balance"
        ),
        _ => false,
    }
}
