//! Transaction-level effects.
//!
//! The fee effect comes first and is present even for failed transactions.
//! Cross-operation effects of a successful transaction follow in operation
//! order.

use stellar_effects_crypto::{account_id_to_strkey, muxed_account_to_strkey};
use stellar_xdr::curr::OperationBody;

use crate::deriver::OperationEffects;
use crate::effect::{Effect, EffectBody};
use crate::frame::{muxed_to_account_id, TransactionFrame};
use crate::result::TxOutcome;

/// Aggregate the transaction-level effects.
pub fn aggregate(
    frame: &TransactionFrame,
    result: &TxOutcome,
    operations: &[OperationEffects],
) -> Vec<Effect> {
    let fee_source = account_id_to_strkey(&muxed_to_account_id(frame.fee_source_account()));
    let mut effects = vec![Effect::new(
        fee_source.clone(),
        EffectBody::FeeCharged {
            account: fee_source,
            asset: "native".to_string(),
            charged: result.fee_charged().into(),
            bid: frame.total_fee().into(),
            fee_bump: frame.is_fee_bump(),
        },
    )];
    if !result.is_success() {
        return effects;
    }

    let op_results = result.operation_results();
    for (index, operation) in frame.operations().iter().enumerate() {
        let source = frame.operation_source(index);
        let source_strkey = muxed_account_to_strkey(&source);
        let source_account = muxed_to_account_id(&source);
        match &operation.body {
            OperationBody::AccountMerge(destination) => {
                let Some(amount) = op_results.get(index).and_then(|r| r.merged_balance()) else {
                    continue;
                };
                effects.push(Effect::new(
                    source_strkey,
                    EffectBody::AccountMerged {
                        account: account_id_to_strkey(&source_account),
                        destination: account_id_to_strkey(&muxed_to_account_id(destination)),
                        amount: amount.into(),
                    },
                ));
            }
            OperationBody::BeginSponsoringFutureReserves(begin) => {
                let end = frame
                    .operations()
                    .iter()
                    .enumerate()
                    .skip(index + 1)
                    .find(|(i, op)| {
                        let ender = muxed_to_account_id(&frame.operation_source(*i));
                        matches!(op.body, OperationBody::EndSponsoringFutureReserves)
                            && ender == begin.sponsored_id
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(operations.len());
                let entries = operations
                    .get(index + 1..end.min(operations.len()))
                    .unwrap_or_default()
                    .iter()
                    .flat_map(|op| op.effects.iter())
                    .filter(|e| matches!(e.body, EffectBody::SponsorshipCreated { .. }))
                    .count();
                effects.push(Effect::new(
                    source_strkey,
                    EffectBody::ReservesSponsored {
                        sponsor: account_id_to_strkey(&source_account),
                        account: account_id_to_strkey(&begin.sponsored_id),
                        entries: u32::try_from(entries).unwrap_or(u32::MAX),
                    },
                ));
            }
            OperationBody::RevokeSponsorship(_) => {
                let Some(derived) = operations.get(index) else {
                    continue;
                };
                for effect in &derived.effects {
                    if let Some(body) = transferred(&effect.body) {
                        effects.push(Effect::new(source_strkey.clone(), body));
                    }
                }
            }
            _ => {}
        }
    }
    effects
}

fn transferred(body: &EffectBody) -> Option<EffectBody> {
    let (entry, prev_sponsor, sponsor) = match body {
        EffectBody::SponsorshipCreated { entry, sponsor } => (entry, None, Some(sponsor)),
        EffectBody::SponsorshipUpdated {
            entry,
            sponsor,
            prev_sponsor,
        } => (entry, Some(prev_sponsor), Some(sponsor)),
        EffectBody::SponsorshipRemoved { entry, sponsor } => (entry, Some(sponsor), None),
        _ => return None,
    };
    Some(EffectBody::SponsorshipTransferred {
        entry: entry.clone(),
        prev_sponsor: prev_sponsor.cloned(),
        sponsor: sponsor.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transferred_maps_sponsorship_effects() {
        let removed = EffectBody::SponsorshipRemoved {
            entry: "account:G".into(),
            sponsor: "GSPONSOR".into(),
        };
        assert_eq!(
            transferred(&removed),
            Some(EffectBody::SponsorshipTransferred {
                entry: "account:G".into(),
                prev_sponsor: Some("GSPONSOR".into()),
                sponsor: None,
            })
        );
        assert_eq!(
            transferred(&EffectBody::AccountRemoved {
                account: "G".into()
            }),
            None
        );
    }
}
