//! Transaction and operation outcomes.
//!
//! The parts of a `TransactionResult` effects depend on: the fee, whether
//! operations were applied, and the payloads of crossed offers and merges.

use stellar_xdr::curr::{
    AccountMergeResult, ClaimAtom, InnerTransactionResultResult, ManageBuyOfferResult,
    ManageSellOfferResult, OperationResult, OperationResultTr, PathPaymentStrictReceiveResult,
    PathPaymentStrictSendResult, TransactionResult, TransactionResultResult,
};

/// Decoded transaction result.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    fee_charged: i64,
    code: &'static str,
    success: bool,
    /// Empty when the transaction failed before applying operations.
    operations: Vec<OpOutcome>,
}

impl TxOutcome {
    pub fn new(result: TransactionResult) -> Self {
        let code = result.result.name();
        let (success, operations): (bool, Vec<OperationResult>) = match result.result {
            TransactionResultResult::TxSuccess(ops) => (true, ops.into()),
            TransactionResultResult::TxFailed(ops) => (false, ops.into()),
            TransactionResultResult::TxFeeBumpInnerSuccess(pair)
            | TransactionResultResult::TxFeeBumpInnerFailed(pair) => match pair.result.result {
                InnerTransactionResultResult::TxSuccess(ops) => (true, ops.into()),
                InnerTransactionResultResult::TxFailed(ops) => (false, ops.into()),
                _ => (false, Vec::new()),
            },
            _ => (false, Vec::new()),
        };
        Self {
            fee_charged: result.fee_charged,
            code,
            success,
            operations: operations.into_iter().map(OpOutcome::new).collect(),
        }
    }

    pub fn fee_charged(&self) -> i64 {
        self.fee_charged
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// XDR arm name of the result, e.g. `TxSuccess`.
    pub fn code_name(&self) -> &'static str {
        self.code
    }

    pub fn operation_results(&self) -> &[OpOutcome] {
        &self.operations
    }
}

/// Result of one applied operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpOutcome {
    inner: OperationResult,
}

/// Every operation result arm names its success case `Success`.
macro_rules! arm_succeeded {
    ($tr:expr, $($arm:ident),+ $(,)?) => {
        match $tr {
            $(OperationResultTr::$arm(r) => r.name() == "Success",)+
        }
    };
}

impl OpOutcome {
    pub fn new(inner: OperationResult) -> Self {
        Self { inner }
    }

    pub fn is_success(&self) -> bool {
        let OperationResult::OpInner(tr) = &self.inner else {
            return false;
        };
        arm_succeeded!(
            tr,
            CreateAccount,
            Payment,
            PathPaymentStrictReceive,
            ManageSellOffer,
            CreatePassiveSellOffer,
            SetOptions,
            ChangeTrust,
            AllowTrust,
            AccountMerge,
            Inflation,
            ManageData,
            BumpSequence,
            ManageBuyOffer,
            PathPaymentStrictSend,
            CreateClaimableBalance,
            ClaimClaimableBalance,
            BeginSponsoringFutureReserves,
            EndSponsoringFutureReserves,
            RevokeSponsorship,
            Clawback,
            ClawbackClaimableBalance,
            SetTrustLineFlags,
            LiquidityPoolDeposit,
            LiquidityPoolWithdraw,
            InvokeHostFunction,
            ExtendFootprintTtl,
            RestoreFootprint,
        )
    }

    /// Offers and pool reserves crossed, in result order.
    pub fn claim_atoms(&self) -> &[ClaimAtom] {
        let OperationResult::OpInner(tr) = &self.inner else {
            return &[];
        };
        match tr {
            OperationResultTr::ManageSellOffer(ManageSellOfferResult::Success(s))
            | OperationResultTr::CreatePassiveSellOffer(ManageSellOfferResult::Success(s))
            | OperationResultTr::ManageBuyOffer(ManageBuyOfferResult::Success(s)) => {
                s.offers_claimed.as_slice()
            }
            OperationResultTr::PathPaymentStrictReceive(
                PathPaymentStrictReceiveResult::Success(s),
            ) => s.offers.as_slice(),
            OperationResultTr::PathPaymentStrictSend(PathPaymentStrictSendResult::Success(s)) => {
                s.offers.as_slice()
            }
            _ => &[],
        }
    }

    /// Balance moved by a successful merge.
    pub fn merged_balance(&self) -> Option<i64> {
        match &self.inner {
            OperationResult::OpInner(OperationResultTr::AccountMerge(
                AccountMergeResult::Success(amount),
            )) => Some(*amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::*;

    fn result_with(result: TransactionResultResult) -> TxOutcome {
        TxOutcome::new(TransactionResult {
            fee_charged: 100,
            result,
            ext: TransactionResultExt::V0,
        })
    }

    fn payment_success() -> OperationResult {
        OperationResult::OpInner(OperationResultTr::Payment(PaymentResult::Success))
    }

    #[test]
    fn test_tx_result_success() {
        let wrapper = result_with(TransactionResultResult::TxSuccess(
            vec![payment_success()].try_into().unwrap(),
        ));
        assert!(wrapper.is_success());
        assert_eq!(wrapper.fee_charged(), 100);
        assert_eq!(wrapper.code_name(), "TxSuccess");
        assert_eq!(wrapper.operation_results().len(), 1);
        assert!(wrapper.operation_results()[0].is_success());
    }

    #[test]
    fn test_tx_result_failure_without_operations() {
        let wrapper = result_with(TransactionResultResult::TxBadSeq);
        assert!(!wrapper.is_success());
        assert_eq!(wrapper.code_name(), "TxBadSeq");
        assert!(wrapper.operation_results().is_empty());
    }

    #[test]
    fn test_fee_bump_inner_results() {
        let inner = InnerTransactionResultPair {
            transaction_hash: Hash([0u8; 32]),
            result: InnerTransactionResult {
                fee_charged: 100,
                result: InnerTransactionResultResult::TxSuccess(
                    vec![payment_success()].try_into().unwrap(),
                ),
                ext: InnerTransactionResultExt::V0,
            },
        };
        let wrapper = result_with(TransactionResultResult::TxFeeBumpInnerSuccess(inner));
        assert!(wrapper.is_success());
        assert_eq!(wrapper.operation_results().len(), 1);
    }

    #[test]
    fn test_op_result_failure_codes() {
        let failed = OpOutcome::new(OperationResult::OpInner(
            OperationResultTr::Payment(PaymentResult::Underfunded),
        ));
        assert!(!failed.is_success());
        assert!(!OpOutcome::new(OperationResult::OpBadAuth).is_success());
    }

    #[test]
    fn test_merged_balance() {
        let merge = OpOutcome::new(OperationResult::OpInner(
            OperationResultTr::AccountMerge(AccountMergeResult::Success(12_345)),
        ));
        assert_eq!(merge.merged_balance(), Some(12_345));
        assert_eq!(OpOutcome::new(payment_success()).merged_balance(), None);
    }

    #[test]
    fn test_claim_atoms_from_offer_result() {
        let atom = ClaimAtom::OrderBook(ClaimOfferAtom {
            seller_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([1u8; 32]))),
            offer_id: 9,
            asset_sold: Asset::Native,
            amount_sold: 10,
            asset_bought: Asset::Native,
            amount_bought: 20,
        });
        let result = OpOutcome::new(OperationResult::OpInner(
            OperationResultTr::ManageSellOffer(ManageSellOfferResult::Success(
                ManageOfferSuccessResult {
                    offers_claimed: vec![atom.clone()].try_into().unwrap(),
                    offer: ManageOfferSuccessResultOffer::Deleted,
                },
            )),
        ));
        assert_eq!(result.claim_atoms(), &[atom]);
    }
}
