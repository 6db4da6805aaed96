//! Common types shared by the rs-stellar-effects crates.
//!
//! - [`Hash256`]: a SHA-256 digest with XDR hashing helpers
//! - [`NetworkId`]: the hash of a network passphrase
//! - [`resolve_passphrase`]: maps well-known network names to passphrases

mod hash;
mod network;

pub use hash::Hash256;
pub use network::{
    resolve_passphrase, NetworkError, NetworkId, FUTURENET_PASSPHRASE, PUBLIC_PASSPHRASE,
    TESTNET_PASSPHRASE,
};
