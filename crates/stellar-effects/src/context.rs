//! Decoding boundary and per-call transaction context.

use stellar_effects_common::NetworkId;
use stellar_effects_crypto::muxed_account_to_strkey;
use stellar_xdr::curr::{
    AccountId, ContractEvent, DiagnosticEvent, Limits, MuxedAccount, Operation, ReadXdr,
    TransactionEnvelope, TransactionMeta, TransactionResult,
};

use crate::changes::{pair_changes, EntryChange};
use crate::error::{EffectsError, XdrInput};
use crate::frame::{muxed_to_account_id, TransactionFrame};
use crate::meta::MetaView;
use crate::operation::OperationKind;
use crate::options::DeriveOptions;
use crate::result::{OpOutcome, TxOutcome};
use crate::Result;

/// Everything one derivation call reads. Immutable once decoded.
#[derive(Debug, Clone)]
pub struct TxContext {
    pub frame: TransactionFrame,
    pub result: TxOutcome,
    pub meta: MetaView,
    pub network_id: NetworkId,
    pub passphrase: String,
}

impl TxContext {
    /// Decode the three XDR inputs of `options`.
    pub fn decode(options: &DeriveOptions, passphrase: String) -> Result<Self> {
        let envelope: TransactionEnvelope = decode_xdr(XdrInput::Envelope, &options.envelope)?;
        let result: TransactionResult = decode_xdr(XdrInput::Result, &options.result)?;
        let meta: TransactionMeta = decode_xdr(XdrInput::Meta, &options.meta)?;
        Ok(Self::from_parts(envelope, result, &meta, passphrase))
    }

    pub fn from_parts(
        envelope: TransactionEnvelope,
        result: TransactionResult,
        meta: &TransactionMeta,
        passphrase: String,
    ) -> Self {
        Self {
            frame: TransactionFrame::new(envelope),
            result: TxOutcome::new(result),
            meta: MetaView::from_xdr(meta),
            network_id: NetworkId::from_passphrase(&passphrase),
            passphrase,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    pub fn operation_count(&self) -> usize {
        self.frame.operation_count()
    }

    pub fn diagnostic_events(&self) -> &[DiagnosticEvent] {
        &self.meta.diagnostic_events
    }

    /// Assemble the inputs of operation `index`.
    pub fn operation(&self, index: usize) -> Option<OperationInput<'_>> {
        let operation = self.frame.operations().get(index)?;
        let source = self.frame.operation_source(index);
        let op_meta = self.meta.operation(index);
        Some(OperationInput {
            index,
            kind: OperationKind::from_body(&operation.body),
            operation,
            source_account: muxed_to_account_id(&source),
            source_strkey: muxed_account_to_strkey(&source),
            source,
            result: self.result.operation_results().get(index),
            changes: op_meta
                .map(|m| pair_changes(&m.changes))
                .unwrap_or_default(),
            events: op_meta.map(|m| m.events.as_slice()).unwrap_or_default(),
        })
    }
}

/// One operation with its result, paired changes and events.
#[derive(Debug, Clone)]
pub struct OperationInput<'a> {
    pub index: usize,
    pub kind: OperationKind,
    pub operation: &'a Operation,
    pub source: MuxedAccount,
    pub source_account: AccountId,
    /// StrKey of the operation source, `M...` when multiplexed.
    pub source_strkey: String,
    pub result: Option<&'a OpOutcome>,
    pub changes: Vec<EntryChange>,
    pub events: &'a [ContractEvent],
}

impl OperationInput<'_> {
    pub fn succeeded(&self) -> bool {
        self.result.is_some_and(OpOutcome::is_success)
    }
}

fn decode_xdr<T: ReadXdr>(input: XdrInput, bytes: &[u8]) -> Result<T> {
    T::from_xdr(bytes, Limits::none()).map_err(|source| EffectsError::Decode { input, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        let options = DeriveOptions::new("testnet", vec![1, 2, 3], vec![0], vec![0]);
        let err = TxContext::decode(&options, "Test SDF Network ; September 2015".into())
            .unwrap_err();
        assert!(matches!(
            err,
            EffectsError::Decode {
                input: XdrInput::Envelope,
                ..
            }
        ));
    }
}
