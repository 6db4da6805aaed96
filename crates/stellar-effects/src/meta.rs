//! Per-operation view of transaction metadata.
//!
//! Every `TransactionMeta` version carries one change set per operation.
//! Contract events moved between versions: V3 keeps them in the Soroban
//! section (a Soroban transaction has exactly one operation), V4 keeps them
//! per operation. Diagnostic events are always transaction-wide.

use stellar_xdr::curr::{
    ContractEvent, DiagnosticEvent, LedgerEntryChange, LedgerEntryChanges, TransactionMeta,
};

use crate::error::EffectsError;

/// Changes and events of one operation.
#[derive(Debug, Clone, Default)]
pub struct OperationMetaView {
    pub changes: Vec<LedgerEntryChange>,
    pub events: Vec<ContractEvent>,
}

/// Metadata split by operation.
#[derive(Debug, Clone, Default)]
pub struct MetaView {
    pub operations: Vec<OperationMetaView>,
    pub diagnostic_events: Vec<DiagnosticEvent>,
}

impl MetaView {
    pub fn from_xdr(meta: &TransactionMeta) -> Self {
        match meta {
            TransactionMeta::V0(operations) => Self {
                operations: operations
                    .iter()
                    .map(|op| changes_only(&op.changes))
                    .collect(),
                ..Self::default()
            },
            TransactionMeta::V1(v1) => Self {
                operations: v1
                    .operations
                    .iter()
                    .map(|op| changes_only(&op.changes))
                    .collect(),
                ..Self::default()
            },
            TransactionMeta::V2(v2) => Self {
                operations: v2
                    .operations
                    .iter()
                    .map(|op| changes_only(&op.changes))
                    .collect(),
                ..Self::default()
            },
            TransactionMeta::V3(v3) => {
                let mut operations: Vec<OperationMetaView> = v3
                    .operations
                    .iter()
                    .map(|op| changes_only(&op.changes))
                    .collect();
                let mut diagnostic_events = Vec::new();
                if let Some(soroban) = &v3.soroban_meta {
                    if let Some(first) = operations.first_mut() {
                        first.events = soroban.events.to_vec();
                    }
                    diagnostic_events = soroban.diagnostic_events.to_vec();
                }
                Self {
                    operations,
                    diagnostic_events,
                }
            }
            TransactionMeta::V4(v4) => Self {
                operations: v4
                    .operations
                    .iter()
                    .map(|op| OperationMetaView {
                        changes: to_vec(&op.changes),
                        events: op.events.to_vec(),
                    })
                    .collect(),
                diagnostic_events: v4.diagnostic_events.to_vec(),
            },
        }
    }

    /// A successful transaction must carry one change set per operation.
    pub fn check_operation_count(&self, expected: usize) -> Result<(), EffectsError> {
        if self.operations.len() != expected {
            return Err(EffectsError::MetaMismatch {
                expected,
                actual: self.operations.len(),
            });
        }
        Ok(())
    }

    pub fn operation(&self, index: usize) -> Option<&OperationMetaView> {
        self.operations.get(index)
    }
}

fn changes_only(changes: &LedgerEntryChanges) -> OperationMetaView {
    OperationMetaView {
        changes: to_vec(changes),
        events: Vec::new(),
    }
}

fn to_vec(changes: &LedgerEntryChanges) -> Vec<LedgerEntryChange> {
    changes.iter().cloned().collect()
}
