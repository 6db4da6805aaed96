//! Envelope view.
//!
//! The three envelope shapes (v0, v1 and fee bump) are flattened once into
//! the few properties effect derivation reads.

use stellar_xdr::curr::{
    AccountId, FeeBumpTransactionInnerTx, MuxedAccount, Operation, PublicKey, TransactionEnvelope,
};

#[derive(Debug, Clone)]
pub struct TransactionFrame {
    source: MuxedAccount,
    /// Outer source of a fee bump, otherwise `None`.
    fee_source: Option<MuxedAccount>,
    fee_bid: i64,
    operations: Vec<Operation>,
}

impl TransactionFrame {
    pub fn new(envelope: TransactionEnvelope) -> Self {
        match envelope {
            TransactionEnvelope::TxV0(env) => Self {
                source: MuxedAccount::Ed25519(env.tx.source_account_ed25519),
                fee_source: None,
                fee_bid: env.tx.fee.into(),
                operations: env.tx.operations.into(),
            },
            TransactionEnvelope::Tx(env) => Self {
                source: env.tx.source_account,
                fee_source: None,
                fee_bid: env.tx.fee.into(),
                operations: env.tx.operations.into(),
            },
            TransactionEnvelope::TxFeeBump(env) => {
                let FeeBumpTransactionInnerTx::Tx(inner) = env.tx.inner_tx;
                Self {
                    source: inner.tx.source_account,
                    fee_source: Some(env.tx.fee_source),
                    fee_bid: env.tx.fee,
                    operations: inner.tx.operations.into(),
                }
            }
        }
    }

    /// Source of the inner transaction.
    pub fn source_account(&self) -> &MuxedAccount {
        &self.source
    }

    /// Account paying the fee.
    pub fn fee_source_account(&self) -> &MuxedAccount {
        self.fee_source.as_ref().unwrap_or(&self.source)
    }

    /// Maximum fee the payer bid, the outer fee for a fee bump.
    pub fn total_fee(&self) -> i64 {
        self.fee_bid
    }

    pub fn is_fee_bump(&self) -> bool {
        self.fee_source.is_some()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Source of the operation at `index`, defaulting to the transaction's.
    pub fn operation_source(&self, index: usize) -> MuxedAccount {
        self.operations
            .get(index)
            .and_then(|op| op.source_account.clone())
            .unwrap_or_else(|| self.source.clone())
    }
}

/// The account behind a possibly multiplexed account.
pub fn muxed_to_account_id(muxed: &MuxedAccount) -> AccountId {
    let key = match muxed {
        MuxedAccount::Ed25519(key) => key.clone(),
        MuxedAccount::MuxedEd25519(m) => m.ed25519.clone(),
    };
    AccountId(PublicKey::PublicKeyTypeEd25519(key))
}
