//! Semantic effects of Stellar transactions.
//!
//! Given the XDR envelope, result and metadata of an applied transaction,
//! this crate derives the ordered list of effects each operation had on the
//! ledger (balances moved, trustlines created, contracts invoked, ...) plus
//! the transaction-level effects, starting with the fee.
//!
//! # Example
//!
//! ```no_run
//! use stellar_effects::{derive_transaction_effects, DeriveOptions};
//!
//! # fn main() -> stellar_effects::Result<()> {
//! let options = DeriveOptions::from_base64("testnet", "AAAA...", "AAAA...", "AAAA...")?
//!     .with_map_sac(true);
//! let derived = derive_transaction_effects(&options)?;
//! for effect in &derived.effects {
//!     println!("{}", effect.kind());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Asset contracts
//!
//! Stellar Asset Contract addresses are resolved to the classic asset they
//! wrap and memoized per network in a [`SacCache`]. The free functions share
//! one process-wide cache, cleared with [`dispose_sac_cache`];
//! [`EffectDeriver::with_cache`] isolates a cache per deriver.

pub mod aggregate;
pub mod changes;
pub mod classic;
pub mod context;
mod deriver;
pub mod effect;
mod error;
pub mod format;
pub mod frame;
pub mod meta;
pub mod operation;
mod options;
pub mod result;
pub mod sac;
pub mod soroban;

pub use deriver::{derive_transaction_effects, DerivationResult, EffectDeriver, OperationEffects};
pub use effect::{Effect, EffectBody};
pub use error::{DerivationInconsistency, EffectsError, XdrInput};
pub use format::Amount;
pub use operation::OperationKind;
pub use options::DeriveOptions;
pub use sac::{
    asset_contract_id, dispose_sac_cache, global_sac_cache, SacCache, SacCacheStats, SacEntry,
    SacMapCache,
};

/// Result type for effect derivation.
pub type Result<T> = std::result::Result<T, EffectsError>;
