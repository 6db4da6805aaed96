//! Pairing of ledger entry changes into before/after states.

use stellar_xdr::curr::{
    AccountId, LedgerEntry, LedgerEntryChange, LedgerEntryData, LedgerEntryExt, LedgerKey,
    LedgerKeyAccount, LedgerKeyClaimableBalance, LedgerKeyContractCode, LedgerKeyContractData,
    LedgerKeyData, LedgerKeyLiquidityPool, LedgerKeyOffer, LedgerKeyTrustLine, LedgerKeyTtl,
};

/// One ledger entry's transition within an operation.
///
/// Created when `before` is absent, removed when `after` is absent, updated
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChange {
    pub key: LedgerKey,
    pub before: Option<LedgerEntry>,
    pub after: Option<LedgerEntry>,
    /// The entry was brought back from the archive.
    pub restored: bool,
}

impl EntryChange {
    pub fn is_created(&self) -> bool {
        self.before.is_none() && self.after.is_some()
    }

    pub fn is_removed(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }

    pub fn is_updated(&self) -> bool {
        self.before.is_some() && self.after.is_some()
    }

    /// Data of the surviving state, or of the removed one.
    pub fn data(&self) -> Option<&LedgerEntryData> {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(|entry| &entry.data)
    }

    pub fn before_data(&self) -> Option<&LedgerEntryData> {
        self.before.as_ref().map(|entry| &entry.data)
    }

    pub fn after_data(&self) -> Option<&LedgerEntryData> {
        self.after.as_ref().map(|entry| &entry.data)
    }

    pub fn is_account(&self) -> bool {
        matches!(self.key, LedgerKey::Account(_))
    }
}

/// Pair a change stream into ordered transitions.
///
/// `State` records the value preceding the next `Updated` or `Removed` of the
/// same key and yields nothing on its own. Transitions keep the position of
/// the change that completed them.
pub fn pair_changes(changes: &[LedgerEntryChange]) -> Vec<EntryChange> {
    let mut pending: Vec<(LedgerKey, LedgerEntry)> = Vec::new();
    let mut paired: Vec<EntryChange> = Vec::new();

    for change in changes {
        match change {
            LedgerEntryChange::State(entry) => {
                pending.push((entry_to_key(entry), entry.clone()));
            }
            LedgerEntryChange::Created(entry) => {
                paired.push(EntryChange {
                    key: entry_to_key(entry),
                    before: None,
                    after: Some(entry.clone()),
                    restored: false,
                });
            }
            LedgerEntryChange::Restored(entry) => {
                paired.push(EntryChange {
                    key: entry_to_key(entry),
                    before: None,
                    after: Some(entry.clone()),
                    restored: true,
                });
            }
            LedgerEntryChange::Updated(entry) => {
                let key = entry_to_key(entry);
                // An update of an entry restored earlier in the same
                // operation amends the restore.
                if let Some(existing) = paired
                    .iter_mut()
                    .find(|c| c.restored && c.key == key && c.after.is_some())
                {
                    existing.after = Some(entry.clone());
                    continue;
                }
                let before = take_state(&mut pending, &key);
                if before.is_none() {
                    tracing::trace!(?key, "update without preceding state");
                }
                paired.push(EntryChange {
                    key,
                    before,
                    after: Some(entry.clone()),
                    restored: false,
                });
            }
            LedgerEntryChange::Removed(key) => {
                let before = take_state(&mut pending, key);
                if before.is_none() {
                    tracing::trace!(?key, "removal without preceding state");
                    continue;
                }
                paired.push(EntryChange {
                    key: key.clone(),
                    before,
                    after: None,
                    restored: false,
                });
            }
        }
    }

    paired
}

fn take_state(pending: &mut Vec<(LedgerKey, LedgerEntry)>, key: &LedgerKey) -> Option<LedgerEntry> {
    let pos = pending.iter().position(|(k, _)| k == key)?;
    Some(pending.remove(pos).1)
}

/// Ledger key of an entry.
pub fn entry_to_key(entry: &LedgerEntry) -> LedgerKey {
    match &entry.data {
        LedgerEntryData::Account(a) => LedgerKey::Account(LedgerKeyAccount {
            account_id: a.account_id.clone(),
        }),
        LedgerEntryData::Trustline(t) => LedgerKey::Trustline(LedgerKeyTrustLine {
            account_id: t.account_id.clone(),
            asset: t.asset.clone(),
        }),
        LedgerEntryData::Offer(o) => LedgerKey::Offer(LedgerKeyOffer {
            seller_id: o.seller_id.clone(),
            offer_id: o.offer_id,
        }),
        LedgerEntryData::Data(d) => LedgerKey::Data(LedgerKeyData {
            account_id: d.account_id.clone(),
            data_name: d.data_name.clone(),
        }),
        LedgerEntryData::ClaimableBalance(c) => {
            LedgerKey::ClaimableBalance(LedgerKeyClaimableBalance {
                balance_id: c.balance_id.clone(),
            })
        }
        LedgerEntryData::LiquidityPool(l) => LedgerKey::LiquidityPool(LedgerKeyLiquidityPool {
            liquidity_pool_id: l.liquidity_pool_id.clone(),
        }),
        LedgerEntryData::ContractData(c) => LedgerKey::ContractData(LedgerKeyContractData {
            contract: c.contract.clone(),
            key: c.key.clone(),
            durability: c.durability.clone(),
        }),
        LedgerEntryData::ContractCode(c) => LedgerKey::ContractCode(LedgerKeyContractCode {
            hash: c.hash.clone(),
        }),
        LedgerEntryData::ConfigSetting(c) => {
            LedgerKey::ConfigSetting(stellar_xdr::curr::LedgerKeyConfigSetting {
                config_setting_id: c.discriminant(),
            })
        }
        LedgerEntryData::Ttl(t) => LedgerKey::Ttl(LedgerKeyTtl {
            key_hash: t.key_hash.clone(),
        }),
    }
}

/// Account sponsoring the entry's reserve, if any.
pub fn entry_sponsor(entry: &LedgerEntry) -> Option<&AccountId> {
    match &entry.ext {
        LedgerEntryExt::V1(v1) => v1.sponsoring_id.0.as_ref(),
        LedgerEntryExt::V0 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::*;

    fn account_entry(seed: u8, balance: i64) -> LedgerEntry {
        LedgerEntry {
            last_modified_ledger_seq: 1,
            data: LedgerEntryData::Account(AccountEntry {
                account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([seed; 32]))),
                balance,
                seq_num: SequenceNumber(1),
                num_sub_entries: 0,
                inflation_dest: None,
                flags: 0,
                home_domain: String32::default(),
                thresholds: Thresholds([1, 0, 0, 0]),
                signers: vec![].try_into().unwrap(),
                ext: AccountEntryExt::V0,
            }),
            ext: LedgerEntryExt::V0,
        }
    }

    #[test]
    fn test_pair_state_and_update() {
        let before = account_entry(1, 100);
        let after = account_entry(1, 50);
        let paired = pair_changes(&[
            LedgerEntryChange::State(before.clone()),
            LedgerEntryChange::Updated(after.clone()),
        ]);
        assert_eq!(paired.len(), 1);
        assert!(paired[0].is_updated());
        assert_eq!(paired[0].before, Some(before));
        assert_eq!(paired[0].after, Some(after));
        assert!(paired[0].is_account());
    }

    #[test]
    fn test_pair_created_and_removed() {
        let created = account_entry(2, 10);
        let removed = account_entry(3, 0);
        let removed_key = entry_to_key(&removed);
        let paired = pair_changes(&[
            LedgerEntryChange::Created(created.clone()),
            LedgerEntryChange::State(removed.clone()),
            LedgerEntryChange::Removed(removed_key.clone()),
        ]);
        assert_eq!(paired.len(), 2);
        assert!(paired[0].is_created());
        assert_eq!(paired[0].key, entry_to_key(&created));
        assert!(paired[1].is_removed());
        assert_eq!(paired[1].key, removed_key);
    }

    #[test]
    fn test_unpaired_state_is_dropped() {
        let paired = pair_changes(&[LedgerEntryChange::State(account_entry(4, 1))]);
        assert!(paired.is_empty());
    }

    #[test]
    fn test_restored_then_updated() {
        let entry = account_entry(5, 1);
        let updated = account_entry(5, 2);
        let paired = pair_changes(&[
            LedgerEntryChange::Restored(entry),
            LedgerEntryChange::Updated(updated.clone()),
        ]);
        assert_eq!(paired.len(), 1);
        assert!(paired[0].restored);
        assert_eq!(paired[0].after, Some(updated));
    }

    #[test]
    fn test_entry_sponsor() {
        let mut entry = account_entry(6, 1);
        assert!(entry_sponsor(&entry).is_none());
        let sponsor = AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([9u8; 32])));
        entry.ext = LedgerEntryExt::V1(LedgerEntryExtensionV1 {
            sponsoring_id: SponsorshipDescriptor(Some(sponsor.clone())),
            ext: LedgerEntryExtensionV1Ext::V0,
        });
        assert_eq!(entry_sponsor(&entry), Some(&sponsor));
    }
}
