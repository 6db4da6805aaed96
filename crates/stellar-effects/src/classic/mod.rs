//! Per-operation effect derivation.
//!
//! Every operation kind maps to one [`Rule`]. All rules share the generic
//! entry differ; trading operations prefix it with their trades, and Soroban
//! operations append contract effects instead of classic balance diffs.

pub mod diff;
pub mod trades;

use stellar_xdr::curr::{LedgerEntryData, LedgerKey};
use tracing::warn;

use crate::context::{OperationInput, TxContext};
use crate::deriver::OperationEffects;
use crate::effect::{Effect, EffectBody};
use crate::error::DerivationInconsistency;
use crate::operation::OperationKind;
use crate::sac::SacCache;
use crate::soroban::derive_contract_effects;

use self::diff::{diff_entries, DiffOptions};
use self::trades::trade_effects;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Generic,
    Trading,
    BumpSequence,
    Soroban,
}

fn rule_for(kind: OperationKind) -> Rule {
    match kind {
        OperationKind::CreateAccount
        | OperationKind::Payment
        | OperationKind::SetOptions
        | OperationKind::ChangeTrust
        | OperationKind::AllowTrust
        | OperationKind::AccountMerge
        | OperationKind::ManageData
        | OperationKind::CreateClaimableBalance
        | OperationKind::ClaimClaimableBalance
        | OperationKind::BeginSponsoringFutureReserves
        | OperationKind::EndSponsoringFutureReserves
        | OperationKind::RevokeSponsorship
        | OperationKind::Clawback
        | OperationKind::ClawbackClaimableBalance
        | OperationKind::SetTrustLineFlags
        | OperationKind::LiquidityPoolDeposit
        | OperationKind::LiquidityPoolWithdraw
        | OperationKind::Inflation => Rule::Generic,
        OperationKind::PathPaymentStrictReceive
        | OperationKind::PathPaymentStrictSend
        | OperationKind::ManageSellOffer
        | OperationKind::ManageBuyOffer
        | OperationKind::CreatePassiveSellOffer => Rule::Trading,
        OperationKind::BumpSequence => Rule::BumpSequence,
        OperationKind::InvokeHostFunction
        | OperationKind::ExtendFootprintTtl
        | OperationKind::RestoreFootprint => Rule::Soroban,
    }
}

/// Derive the effects of one operation.
///
/// Failed transactions and failed operations yield no effects: their
/// metadata is rolled back.
pub fn derive_operation(
    input: &OperationInput<'_>,
    ctx: &TxContext,
    cache: &dyn SacCache,
) -> OperationEffects {
    let rule = rule_for(input.kind);
    if !ctx.is_success() || !input.succeeded() {
        return OperationEffects::default();
    }

    let mut bodies = Vec::new();
    match rule {
        Rule::Trading => {
            let atoms = input.result.map(|r| r.claim_atoms()).unwrap_or_default();
            bodies.extend(trade_effects(atoms));
        }
        Rule::BumpSequence => bodies.extend(sequence_bump(input)),
        Rule::Generic | Rule::Soroban => {}
    }

    let options = DiffOptions {
        include_balances: rule != Rule::Soroban,
    };
    bodies.extend(diff_entries(&input.changes, options));

    let mut sac_map = None;
    if rule == Rule::Soroban {
        let soroban = derive_contract_effects(input, ctx, cache);
        bodies.extend(soroban.effects);
        if !soroban.sac_map.is_empty() {
            sac_map = Some(soroban.sac_map);
        }
    }

    let warnings = check_expectations(input);
    for warning in &warnings {
        warn!(
            operation = warning.operation,
            kind = warning.kind,
            reason = %warning.reason,
            "derivation inconsistency"
        );
    }

    OperationEffects {
        effects: bodies
            .into_iter()
            .map(|body| Effect::new(input.source_strkey.clone(), body))
            .collect(),
        sac_map,
        warnings,
    }
}

/// `sequenceBumped` from the source account's sequence change.
fn sequence_bump(input: &OperationInput<'_>) -> Option<EffectBody> {
    input.changes.iter().find_map(|change| {
        let (Some(LedgerEntryData::Account(before)), Some(LedgerEntryData::Account(after))) =
            (change.before_data(), change.after_data())
        else {
            return None;
        };
        if after.account_id != input.source_account || before.seq_num == after.seq_num {
            return None;
        }
        Some(EffectBody::SequenceBumped {
            account: input.source_strkey.clone(),
            sequence: after.seq_num.0.into(),
        })
    })
}

/// Changes every successful operation of a kind must show.
fn check_expectations(input: &OperationInput<'_>) -> Vec<DerivationInconsistency> {
    let changes = &input.changes;
    let touches = |pred: fn(&LedgerKey) -> bool| changes.iter().any(|c| pred(&c.key));
    let violated = match input.kind {
        OperationKind::Payment
        | OperationKind::PathPaymentStrictReceive
        | OperationKind::PathPaymentStrictSend => {
            (!touches(|k| matches!(k, LedgerKey::Account(_) | LedgerKey::Trustline(_))))
                .then_some("no balance-bearing entry changed")
        }
        OperationKind::CreateAccount => (!changes
            .iter()
            .any(|c| c.is_account() && c.is_created()))
        .then_some("no account was created"),
        OperationKind::ChangeTrust => (!touches(|k| matches!(k, LedgerKey::Trustline(_))))
            .then_some("no trustline changed"),
        OperationKind::ManageData => {
            (!touches(|k| matches!(k, LedgerKey::Data(_)))).then_some("no data entry changed")
        }
        OperationKind::AccountMerge => (!changes
            .iter()
            .any(|c| c.is_account() && c.is_removed()))
        .then_some("no account was removed"),
        _ => None,
    };
    violated
        .map(|reason| vec![DerivationInconsistency::new(input.index, input.kind.name(), reason)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_rule() {
        assert_eq!(rule_for(OperationKind::Inflation), Rule::Generic);
        assert_eq!(rule_for(OperationKind::ManageBuyOffer), Rule::Trading);
        assert_eq!(rule_for(OperationKind::RestoreFootprint), Rule::Soroban);
        assert_eq!(rule_for(OperationKind::BumpSequence), Rule::BumpSequence);
        assert_eq!(rule_for(OperationKind::Payment), Rule::Generic);
    }
}
