//! Operation kinds.

use stellar_xdr::curr::OperationBody;

/// Closed set of operation kinds, one per `OperationBody` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
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
}

impl OperationKind {
    pub fn from_body(body: &OperationBody) -> Self {
        match body {
            OperationBody::CreateAccount(_) => OperationKind::CreateAccount,
            OperationBody::Payment(_) => OperationKind::Payment,
            OperationBody::PathPaymentStrictReceive(_) => OperationKind::PathPaymentStrictReceive,
            OperationBody::ManageSellOffer(_) => OperationKind::ManageSellOffer,
            OperationBody::CreatePassiveSellOffer(_) => OperationKind::CreatePassiveSellOffer,
            OperationBody::SetOptions(_) => OperationKind::SetOptions,
            OperationBody::ChangeTrust(_) => OperationKind::ChangeTrust,
            OperationBody::AllowTrust(_) => OperationKind::AllowTrust,
            OperationBody::AccountMerge(_) => OperationKind::AccountMerge,
            OperationBody::Inflation => OperationKind::Inflation,
            OperationBody::ManageData(_) => OperationKind::ManageData,
            OperationBody::BumpSequence(_) => OperationKind::BumpSequence,
            OperationBody::ManageBuyOffer(_) => OperationKind::ManageBuyOffer,
            OperationBody::PathPaymentStrictSend(_) => OperationKind::PathPaymentStrictSend,
            OperationBody::CreateClaimableBalance(_) => OperationKind::CreateClaimableBalance,
            OperationBody::ClaimClaimableBalance(_) => OperationKind::ClaimClaimableBalance,
            OperationBody::BeginSponsoringFutureReserves(_) => {
                OperationKind::BeginSponsoringFutureReserves
            }
            OperationBody::EndSponsoringFutureReserves => {
                OperationKind::EndSponsoringFutureReserves
            }
            OperationBody::RevokeSponsorship(_) => OperationKind::RevokeSponsorship,
            OperationBody::Clawback(_) => OperationKind::Clawback,
            OperationBody::ClawbackClaimableBalance(_) => OperationKind::ClawbackClaimableBalance,
            OperationBody::SetTrustLineFlags(_) => OperationKind::SetTrustLineFlags,
            OperationBody::LiquidityPoolDeposit(_) => OperationKind::LiquidityPoolDeposit,
            OperationBody::LiquidityPoolWithdraw(_) => OperationKind::LiquidityPoolWithdraw,
            OperationBody::InvokeHostFunction(_) => OperationKind::InvokeHostFunction,
            OperationBody::ExtendFootprintTtl(_) => OperationKind::ExtendFootprintTtl,
            OperationBody::RestoreFootprint(_) => OperationKind::RestoreFootprint,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateAccount => "CreateAccount",
            OperationKind::Payment => "Payment",
            OperationKind::PathPaymentStrictReceive => "PathPaymentStrictReceive",
            OperationKind::ManageSellOffer => "ManageSellOffer",
            OperationKind::CreatePassiveSellOffer => "CreatePassiveSellOffer",
            OperationKind::SetOptions => "SetOptions",
            OperationKind::ChangeTrust => "ChangeTrust",
            OperationKind::AllowTrust => "AllowTrust",
            OperationKind::AccountMerge => "AccountMerge",
            OperationKind::Inflation => "Inflation",
            OperationKind::ManageData => "ManageData",
            OperationKind::BumpSequence => "BumpSequence",
            OperationKind::ManageBuyOffer => "ManageBuyOffer",
            OperationKind::PathPaymentStrictSend => "PathPaymentStrictSend",
            OperationKind::CreateClaimableBalance => "CreateClaimableBalance",
            OperationKind::ClaimClaimableBalance => "ClaimClaimableBalance",
            OperationKind::BeginSponsoringFutureReserves => "BeginSponsoringFutureReserves",
            OperationKind::EndSponsoringFutureReserves => "EndSponsoringFutureReserves",
            OperationKind::RevokeSponsorship => "RevokeSponsorship",
            OperationKind::Clawback => "Clawback",
            OperationKind::ClawbackClaimableBalance => "ClawbackClaimableBalance",
            OperationKind::SetTrustLineFlags => "SetTrustLineFlags",
            OperationKind::LiquidityPoolDeposit => "LiquidityPoolDeposit",
            OperationKind::LiquidityPoolWithdraw => "LiquidityPoolWithdraw",
            OperationKind::InvokeHostFunction => "InvokeHostFunction",
            OperationKind::ExtendFootprintTtl => "ExtendFootprintTtl",
            OperationKind::RestoreFootprint => "RestoreFootprint",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
