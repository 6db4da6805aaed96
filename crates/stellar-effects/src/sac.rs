//! Stellar Asset Contract (SAC) resolution.
//!
//! A SAC's address is derived from its asset:
//! `SHA-256(XDR(HashIdPreimage::ContractId { network_id, Asset(asset) }))`.
//! The derivation cannot be reversed, so resolution re-derives the address of
//! each candidate asset and accepts the first match. Results are memoized per
//! (network, contract) in a [`SacCache`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use stellar_effects_common::{Hash256, NetworkId};
use stellar_xdr::curr::{
    Asset, ContractId, ContractIdPreimage, Hash, HashIdPreimage, HashIdPreimageContractId,
};
use tracing::trace;

/// Cached outcome of resolving one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SacEntry {
    Asset(Asset),
    /// No candidate seen so far re-derives to this contract.
    NotSac,
}

/// Memo of SAC resolutions.
///
/// Implementations must tolerate concurrent readers and writers; writers for
/// one key always store the same derived value.
pub trait SacCache: Send + Sync {
    fn get(&self, network: &NetworkId, contract: &ContractId) -> Option<SacEntry>;
    fn insert(&self, network: NetworkId, contract: ContractId, entry: SacEntry);
    /// Drop every entry for every network.
    fn clear(&self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters of a [`SacMapCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SacCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// [`SacCache`] backed by a sharded concurrent map.
#[derive(Default)]
pub struct SacMapCache {
    entries: DashMap<(NetworkId, [u8; 32]), SacEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SacMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SacCacheStats {
        SacCacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl SacCache for SacMapCache {
    fn get(&self, network: &NetworkId, contract: &ContractId) -> Option<SacEntry> {
        let found = self
            .entries
            .get(&(*network, contract.0 .0))
            .map(|entry| entry.value().clone());
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn insert(&self, network: NetworkId, contract: ContractId, entry: SacEntry) {
        self.entries.insert((network, contract.0 .0), entry);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

static GLOBAL_CACHE: OnceLock<Arc<SacMapCache>> = OnceLock::new();

/// The process-wide cache used by the free entry points.
pub fn global_sac_cache() -> Arc<SacMapCache> {
    GLOBAL_CACHE.get_or_init(|| Arc::new(SacMapCache::new())).clone()
}

/// Clear the process-wide SAC cache. Safe to call at any time.
pub fn dispose_sac_cache() {
    if let Some(cache) = GLOBAL_CACHE.get() {
        let dropped = cache.len();
        cache.clear();
        trace!(dropped, "disposed SAC cache");
    }
}

/// Address of the asset contract for `asset` on `network`.
pub fn asset_contract_id(network: &NetworkId, asset: &Asset) -> ContractId {
    let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
        network_id: Hash::from(network.0),
        contract_id_preimage: ContractIdPreimage::Asset(asset.clone()),
    });
    let hash = Hash256::hash_xdr(&preimage).unwrap_or(Hash256::ZERO);
    ContractId(Hash::from(hash))
}

/// Resolve `contract` to the asset it wraps.
///
/// The answer depends only on `contract` and `hints`: the native asset and
/// each hint are the candidates. The cache saves the hashing, it never adds
/// a candidate, so a cached asset is returned only when it is native or among
/// `hints`. A cached negative is re-verified against the hints.
pub fn resolve_sac(
    cache: &dyn SacCache,
    network: &NetworkId,
    contract: &ContractId,
    hints: &[Asset],
) -> Option<Asset> {
    match cache.get(network, contract) {
        Some(SacEntry::Asset(asset)) => {
            if asset == Asset::Native || hints.contains(&asset) {
                trace!(contract = %hex::encode(contract.0 .0), "SAC cache hit");
                return Some(asset);
            }
            trace!(
                contract = %hex::encode(contract.0 .0),
                "cached SAC asset not among candidates"
            );
            return None;
        }
        Some(SacEntry::NotSac) => {
            if hints.is_empty() {
                trace!(contract = %hex::encode(contract.0 .0), "SAC negative cache hit");
                return None;
            }
            let found = first_match(network, contract, hints.iter());
            if let Some(asset) = &found {
                cache.insert(*network, contract.clone(), SacEntry::Asset(asset.clone()));
            }
            return found;
        }
        None => {}
    }

    let native = Asset::Native;
    let found = first_match(network, contract, std::iter::once(&native).chain(hints.iter()));
    let entry = match &found {
        Some(asset) => SacEntry::Asset(asset.clone()),
        None => SacEntry::NotSac,
    };
    cache.insert(*network, contract.clone(), entry);
    found
}

fn first_match<'a>(
    network: &NetworkId,
    contract: &ContractId,
    candidates: impl Iterator<Item = &'a Asset>,
) -> Option<Asset> {
    let mut tried: Vec<&Asset> = Vec::new();
    for candidate in candidates {
        if tried.contains(&candidate) {
            continue;
        }
        tried.push(candidate);
        if &asset_contract_id(network, candidate) == contract {
            return Some(candidate.clone());
        }
    }
    None
}
