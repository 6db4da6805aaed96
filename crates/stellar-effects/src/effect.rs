//! The effect vocabulary.
//!
//! An [`Effect`] serializes as one flat JSON object: `source`, the camelCase
//! `type` tag, and the kind's attributes. Optional attributes are omitted when
//! absent.

use serde::Serialize;

use crate::format::Amount;

/// One semantic consequence of executing an operation or transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Effect {
    /// StrKey of the account the effect is attributed to.
    pub source: String,
    #[serde(flatten)]
    pub body: EffectBody,
}

impl Effect {
    pub fn new(source: impl Into<String>, body: EffectBody) -> Self {
        Self {
            source: source.into(),
            body,
        }
    }

    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferState {
    pub owner: String,
    pub offer: Amount,
    pub selling: String,
    pub buying: String,
    pub amount: Amount,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_delta: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataEntryState {
    pub account: String,
    pub name: String,
    /// Base64 of the raw value bytes.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reserve {
    pub asset: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub pool: String,
    pub reserves: Vec<Reserve>,
    pub shares: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDataState {
    pub contract: String,
    pub key: String,
    pub durability: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractKind {
    Wasm,
    FromAsset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EffectBody {
    FeeCharged {
        account: String,
        asset: String,
        charged: Amount,
        bid: Amount,
        fee_bump: bool,
    },
    AccountCreated {
        account: String,
        starting_balance: Amount,
    },
    AccountRemoved {
        account: String,
    },
    BalanceChanged {
        account: String,
        asset: String,
        delta: Amount,
        #[serde(skip_serializing_if = "Option::is_none")]
        balance: Option<Amount>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subentries: Option<u32>,
    },
    AccountThresholdsUpdated {
        account: String,
        /// `[master, low, med, high]`
        thresholds: [u8; 4],
    },
    AccountSignerUpdated {
        account: String,
        signer: String,
        /// 0 when the signer was removed.
        weight: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        prev_weight: Option<u32>,
    },
    AccountHomeDomainUpdated {
        account: String,
        domain: String,
    },
    AccountFlagsUpdated {
        account: String,
        flags: u32,
        prev_flags: u32,
    },
    AccountInflationDestinationUpdated {
        account: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        inflation_destination: Option<String>,
    },
    SequenceBumped {
        account: String,
        sequence: Amount,
    },
    TrustlineCreated {
        account: String,
        asset: String,
        limit: Amount,
        flags: u32,
    },
    TrustlineUpdated {
        account: String,
        asset: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<Amount>,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        prev_flags: Option<u32>,
    },
    TrustlineRemoved {
        account: String,
        asset: String,
    },
    OfferCreated(OfferState),
    OfferUpdated(OfferState),
    OfferRemoved {
        owner: String,
        offer: Amount,
    },
    Trade {
        counterparty: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        offer: Option<Amount>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pool: Option<String>,
        sold: String,
        sold_amount: Amount,
        bought: String,
        bought_amount: Amount,
    },
    DataEntryCreated(DataEntryState),
    DataEntryUpdated(DataEntryState),
    DataEntryRemoved {
        account: String,
        name: String,
    },
    ClaimableBalanceCreated {
        balance: String,
        asset: String,
        amount: Amount,
        claimants: Vec<String>,
    },
    ClaimableBalanceRemoved {
        balance: String,
        asset: String,
        amount: Amount,
    },
    LiquidityPoolCreated(PoolState),
    LiquidityPoolUpdated(PoolState),
    LiquidityPoolRemoved {
        pool: String,
    },
    SponsorshipCreated {
        entry: String,
        sponsor: String,
    },
    SponsorshipUpdated {
        entry: String,
        sponsor: String,
        prev_sponsor: String,
    },
    SponsorshipRemoved {
        entry: String,
        sponsor: String,
    },
    ContractInvoked {
        contract: String,
        function: String,
        args: Vec<String>,
        depth: u32,
    },
    ContractCreated {
        contract: String,
        kind: ContractKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        wasm_hash: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        asset: Option<String>,
    },
    ContractCodeUploaded {
        wasm_hash: String,
    },
    ContractCodeRemoved {
        wasm_hash: String,
    },
    ContractDataCreated(ContractDataState),
    ContractDataUpdated(ContractDataState),
    ContractDataRemoved {
        contract: String,
        key: String,
        durability: &'static str,
    },
    ContractError {
        #[serde(skip_serializing_if = "Option::is_none")]
        contract: Option<String>,
        code: String,
        message: String,
    },
    DiagnosticEvent {
        #[serde(skip_serializing_if = "Option::is_none")]
        contract: Option<String>,
        topics: Vec<String>,
        data: String,
    },
    SetTtl {
        entry: String,
        ttl: u32,
    },
    EntryRestored {
        entry: String,
    },
    AccountMerged {
        account: String,
        destination: String,
        amount: Amount,
    },
    ReservesSponsored {
        sponsor: String,
        account: String,
        entries: u32,
    },
    SponsorshipTransferred {
        entry: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prev_sponsor: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sponsor: Option<String>,
    },
}

impl EffectBody {
    pub fn kind(&self) -> &'static str {
        match self {
            EffectBody::FeeCharged { .. } => "feeCharged",
            EffectBody::AccountCreated { .. } => "accountCreated",
            EffectBody::AccountRemoved { .. } => "accountRemoved",
            EffectBody::BalanceChanged { .. } => "balanceChanged",
            EffectBody::AccountThresholdsUpdated { .. } => "accountThresholdsUpdated",
            EffectBody::AccountSignerUpdated { .. } => "accountSignerUpdated",
            EffectBody::AccountHomeDomainUpdated { .. } => "accountHomeDomainUpdated",
            EffectBody::AccountFlagsUpdated { .. } => "accountFlagsUpdated",
            EffectBody::AccountInflationDestinationUpdated { .. } => {
                "accountInflationDestinationUpdated"
            }
            EffectBody::SequenceBumped { .. } => "sequenceBumped",
            EffectBody::TrustlineCreated { .. } => "trustlineCreated",
            EffectBody::TrustlineUpdated { .. } => "trustlineUpdated",
            EffectBody::TrustlineRemoved { .. } => "trustlineRemoved",
            EffectBody::OfferCreated(_) => "offerCreated",
            EffectBody::OfferUpdated(_) => "offerUpdated",
            EffectBody::OfferRemoved { .. } => "offerRemoved",
            EffectBody::Trade { .. } => "trade",
            EffectBody::DataEntryCreated(_) => "dataEntryCreated",
            EffectBody::DataEntryUpdated(_) => "dataEntryUpdated",
            EffectBody::DataEntryRemoved { .. } => "dataEntryRemoved",
            EffectBody::ClaimableBalanceCreated { .. } => "claimableBalanceCreated",
            EffectBody::ClaimableBalanceRemoved { .. } => "claimableBalanceRemoved",
            EffectBody::LiquidityPoolCreated(_) => "liquidityPoolCreated",
            EffectBody::LiquidityPoolUpdated(_) => "liquidityPoolUpdated",
            EffectBody::LiquidityPoolRemoved { .. } => "liquidityPoolRemoved",
            EffectBody::SponsorshipCreated { .. } => "sponsorshipCreated",
            EffectBody::SponsorshipUpdated { .. } => "sponsorshipUpdated",
            EffectBody::SponsorshipRemoved { .. } => "sponsorshipRemoved",
            EffectBody::ContractInvoked { .. } => "contractInvoked",
            EffectBody::ContractCreated { .. } => "contractCreated",
            EffectBody::ContractCodeUploaded { .. } => "contractCodeUploaded",
            EffectBody::ContractCodeRemoved { .. } => "contractCodeRemoved",
            EffectBody::ContractDataCreated(_) => "contractDataCreated",
            EffectBody::ContractDataUpdated(_) => "contractDataUpdated",
            EffectBody::ContractDataRemoved { .. } => "contractDataRemoved",
            EffectBody::ContractError { .. } => "contractError",
            EffectBody::DiagnosticEvent { .. } => "diagnosticEvent",
            EffectBody::SetTtl { .. } => "setTtl",
            EffectBody::EntryRestored { .. } => "entryRestored",
            EffectBody::AccountMerged { .. } => "accountMerged",
            EffectBody::ReservesSponsored { .. } => "reservesSponsored",
            EffectBody::SponsorshipTransferred { .. } => "sponsorshipTransferred",
        }
    }

    /// Whether the effect moves an asset balance.
    pub fn is_balance_change(&self) -> bool {
        matches!(self, EffectBody::BalanceChanged { .. })
    }
}
