//! Soroban effects: invocation trace, asset contract events, storage.
//!
//! A Soroban operation is described by its invocation trace rather than by
//! classic balance diffs. Events of Stellar Asset Contracts become
//! asset-level `balanceChanged` effects; events of other contracts are kept
//! as `diagnosticEvent` effects with their raw topics and data.

pub mod events;
pub mod storage;
pub mod trace;

use std::collections::BTreeMap;

use stellar_effects_common::{Hash256, NetworkId};
use stellar_effects_crypto::{contract_id_to_strkey, sc_address_to_strkey};
use stellar_xdr::curr::{
    AccountId, AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, ContractEvent,
    ContractEventBody, ContractEventType, ContractExecutable, ContractId, ContractIdPreimage, Hash,
    HashIdPreimage, HashIdPreimageContractId, HostFunction, LedgerEntryData, OperationBody,
    PublicKey, ScAddress, ScError, ScVal, Uint256,
};
use tracing::trace;

use crate::changes::EntryChange;
use crate::context::{OperationInput, TxContext};
use crate::effect::{ContractKind, EffectBody};
use crate::format::{asset_to_string, parse_asset, scval_to_base64, trustline_classic_asset};
use crate::sac::{resolve_sac, SacCache};

use self::events::sac_balance_moves;
use self::storage::storage_effects;
use self::trace::{build_trace, TraceItem};

/// Contract effects of one operation and the asset contracts it touched.
#[derive(Debug, Clone, Default)]
pub struct SorobanEffects {
    pub effects: Vec<EffectBody>,
    /// Contract StrKey to SEP-11 asset string.
    pub sac_map: BTreeMap<String, String>,
}

/// Derive the contract effects of a successful Soroban operation.
///
/// Order: `contractCreated`, then the trace walk, then storage effects.
pub fn derive_contract_effects(
    input: &OperationInput<'_>,
    ctx: &TxContext,
    cache: &dyn SacCache,
) -> SorobanEffects {
    let diagnostics = ctx.diagnostic_events();
    let mut resolver = SacResolver::new(cache, &ctx.network_id);
    resolver.collect_hints(input, ctx);

    let mut effects = Vec::new();
    match &input.operation.body {
        OperationBody::InvokeHostFunction(op) => {
            if let Some(created) = created_contract(&op.host_function, &ctx.network_id) {
                effects.push(created);
            }
            let trace = build_trace(&op.host_function, &op.auth, input.events, diagnostics);
            for item in trace {
                walk_item(item, &mut resolver, &mut effects);
            }
            effects.extend(storage_effects(
                &input.changes,
                |contract| resolver.resolve_address(contract).is_some(),
                false,
            ));
        }
        OperationBody::ExtendFootprintTtl(_) | OperationBody::RestoreFootprint(_) => {
            effects.extend(storage_effects(&input.changes, |_| false, true));
        }
        _ => {}
    }

    SorobanEffects {
        effects,
        sac_map: resolver.into_map(),
    }
}

fn walk_item(item: TraceItem, resolver: &mut SacResolver<'_>, effects: &mut Vec<EffectBody>) {
    match item {
        TraceItem::Invoke {
            contract,
            function,
            args,
            depth,
        } => {
            resolver.resolve_address(&contract);
            effects.push(EffectBody::ContractInvoked {
                contract: sc_address_to_strkey(&contract),
                function,
                args: args.iter().map(scval_to_base64).collect(),
                depth,
            });
        }
        TraceItem::Event(event) => {
            let asset = event
                .contract_id
                .as_ref()
                .and_then(|contract| resolver.resolve(contract));
            match asset {
                Some(asset) => {
                    let asset_name = asset_to_string(&asset);
                    for movement in sac_balance_moves(&event, &asset) {
                        effects.push(EffectBody::BalanceChanged {
                            account: sc_address_to_strkey(&movement.holder),
                            asset: asset_name.clone(),
                            delta: movement.delta.into(),
                            balance: None,
                            subentries: None,
                        });
                    }
                }
                None => effects.push(diagnostic_effect(&event)),
            }
        }
        TraceItem::Error {
            contract,
            error,
            data,
        } => effects.push(EffectBody::ContractError {
            contract: contract.as_ref().map(contract_id_to_strkey),
            code: error_code(&error),
            message: error_message(&data),
        }),
    }
}

fn diagnostic_effect(event: &ContractEvent) -> EffectBody {
    let ContractEventBody::V0(body) = &event.body;
    EffectBody::DiagnosticEvent {
        contract: event.contract_id.as_ref().map(contract_id_to_strkey),
        topics: body.topics.iter().map(scval_to_base64).collect(),
        data: scval_to_base64(&body.data),
    }
}

/// `contractCreated` for the create-contract host functions.
fn created_contract(host_function: &HostFunction, network: &NetworkId) -> Option<EffectBody> {
    let (preimage, executable) = match host_function {
        HostFunction::CreateContract(args) => (&args.contract_id_preimage, &args.executable),
        HostFunction::CreateContractV2(args) => (&args.contract_id_preimage, &args.executable),
        HostFunction::InvokeContract(_) | HostFunction::UploadContractWasm(_) => return None,
    };
    let contract = contract_id_from_preimage(network, preimage);
    let (kind, wasm_hash, asset) = match (preimage, executable) {
        (ContractIdPreimage::Asset(asset), _) => {
            (ContractKind::FromAsset, None, Some(asset_to_string(asset)))
        }
        (_, ContractExecutable::Wasm(hash)) => (ContractKind::Wasm, Some(hex::encode(hash.0)), None),
        (_, ContractExecutable::StellarAsset) => (ContractKind::FromAsset, None, None),
    };
    Some(EffectBody::ContractCreated {
        contract: contract_id_to_strkey(&contract),
        kind,
        wasm_hash,
        asset,
    })
}

fn contract_id_from_preimage(network: &NetworkId, preimage: &ContractIdPreimage) -> ContractId {
    let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
        network_id: Hash::from(network.0),
        contract_id_preimage: preimage.clone(),
    });
    ContractId(Hash::from(
        Hash256::hash_xdr(&preimage).unwrap_or(Hash256::ZERO),
    ))
}

fn error_code(error: &ScError) -> String {
    match error {
        ScError::Contract(code) => format!("Contract:{code}"),
        ScError::WasmVm(code)
        | ScError::Context(code)
        | ScError::Storage(code)
        | ScError::Object(code)
        | ScError::Crypto(code)
        | ScError::Events(code)
        | ScError::Budget(code)
        | ScError::Value(code)
        | ScError::Auth(code) => format!("{}:{}", error.name(), code.name()),
    }
}

/// The first string in the error data, or its base64 XDR.
fn error_message(data: &ScVal) -> String {
    let text = |value: &ScVal| match value {
        ScVal::String(s) => Some(String::from_utf8_lossy(s.0.as_slice()).into_owned()),
        ScVal::Symbol(s) => Some(String::from_utf8_lossy(s.0.as_slice()).into_owned()),
        _ => None,
    };
    let found = match data {
        ScVal::Vec(Some(values)) => values.0.iter().find_map(text),
        other => text(other),
    };
    found.unwrap_or_else(|| scval_to_base64(data))
}

/// Per-operation SAC resolution with the hints found in the transaction.
struct SacResolver<'a> {
    cache: &'a dyn SacCache,
    network: &'a NetworkId,
    shared_hints: Vec<Asset>,
    contract_hints: BTreeMap<[u8; 32], Vec<Asset>>,
    resolved: BTreeMap<[u8; 32], Option<Asset>>,
}

impl<'a> SacResolver<'a> {
    fn new(cache: &'a dyn SacCache, network: &'a NetworkId) -> Self {
        Self {
            cache,
            network,
            shared_hints: Vec::new(),
            contract_hints: BTreeMap::new(),
            resolved: BTreeMap::new(),
        }
    }

    fn collect_hints(&mut self, input: &OperationInput<'_>, ctx: &TxContext) {
        if let OperationBody::InvokeHostFunction(op) = &input.operation.body {
            let preimage = match &op.host_function {
                HostFunction::CreateContract(args) => Some(&args.contract_id_preimage),
                HostFunction::CreateContractV2(args) => Some(&args.contract_id_preimage),
                _ => None,
            };
            if let Some(ContractIdPreimage::Asset(asset)) = preimage {
                self.shared_hints.push(asset.clone());
            }
        }

        let diagnostic_events = ctx
            .diagnostic_events()
            .iter()
            .filter(|d| d.in_successful_contract_call)
            .map(|d| &d.event);
        for event in input.events.iter().chain(diagnostic_events) {
            if event.type_ != ContractEventType::Contract {
                continue;
            }
            if let (Some(contract), Some(asset)) = (&event.contract_id, asset_from_last_topic(event))
            {
                self.add_contract_hint(contract.0 .0, asset);
            }
        }

        for change in &input.changes {
            self.hints_from_change(change);
        }
    }

    fn hints_from_change(&mut self, change: &EntryChange) {
        match change.data() {
            Some(LedgerEntryData::Trustline(line)) => {
                if let Some(asset) = trustline_classic_asset(&line.asset) {
                    self.shared_hints.push(asset);
                }
            }
            Some(LedgerEntryData::ContractData(data)) => {
                let (ScAddress::Contract(contract), ScVal::ContractInstance(instance)) =
                    (&data.contract, &data.val)
                else {
                    return;
                };
                let Some(storage) = &instance.storage else {
                    return;
                };
                for entry in storage.0.iter() {
                    if let Some(asset) = asset_from_instance_entry(&entry.key, &entry.val) {
                        self.add_contract_hint(contract.0 .0, asset);
                    }
                }
            }
            _ => {}
        }
    }

    fn add_contract_hint(&mut self, contract: [u8; 32], asset: Asset) {
        let hints = self.contract_hints.entry(contract).or_default();
        if !hints.contains(&asset) {
            hints.push(asset);
        }
    }

    fn resolve_address(&mut self, address: &ScAddress) -> Option<Asset> {
        match address {
            ScAddress::Contract(contract) => self.resolve(contract),
            _ => None,
        }
    }

    fn resolve(&mut self, contract: &ContractId) -> Option<Asset> {
        if let Some(found) = self.resolved.get(&contract.0 .0) {
            return found.clone();
        }
        let mut hints = self
            .contract_hints
            .get(&contract.0 .0)
            .cloned()
            .unwrap_or_default();
        hints.extend(self.shared_hints.iter().cloned());
        let found = resolve_sac(self.cache, self.network, contract, &hints);
        trace!(
            contract = %contract_id_to_strkey(contract),
            resolved = found.is_some(),
            "resolved contract"
        );
        self.resolved.insert(contract.0 .0, found.clone());
        found
    }

    fn into_map(self) -> BTreeMap<String, String> {
        self.resolved
            .into_iter()
            .filter_map(|(contract, asset)| {
                let asset = asset?;
                Some((
                    contract_id_to_strkey(&ContractId(Hash(contract))),
                    asset_to_string(&asset),
                ))
            })
            .collect()
    }
}

/// Asset events carry the SEP-11 name of the asset as their last topic.
fn asset_from_last_topic(event: &ContractEvent) -> Option<Asset> {
    let ContractEventBody::V0(body) = &event.body;
    match body.topics.last()? {
        ScVal::String(s) => parse_asset(std::str::from_utf8(s.0.as_slice()).ok()?),
        _ => None,
    }
}

/// `METADATA { name }` or `[AssetInfo] => [kind, { asset_code, issuer }]`.
fn asset_from_instance_entry(key: &ScVal, val: &ScVal) -> Option<Asset> {
    match key {
        ScVal::Symbol(sym) if sym.0.as_slice() == b"METADATA" => {
            let ScVal::Map(Some(map)) = val else {
                return None;
            };
            map.0.iter().find_map(|entry| match (&entry.key, &entry.val) {
                (ScVal::Symbol(k), ScVal::String(name)) if k.0.as_slice() == b"name" => {
                    parse_asset(std::str::from_utf8(name.0.as_slice()).ok()?)
                }
                _ => None,
            })
        }
        ScVal::Vec(Some(items)) => {
            let [ScVal::Symbol(sym)] = items.0.as_slice() else {
                return None;
            };
            if sym.0.as_slice() != b"AssetInfo" {
                return None;
            }
            asset_from_asset_info(val)
        }
        _ => None,
    }
}

fn asset_from_asset_info(val: &ScVal) -> Option<Asset> {
    let ScVal::Vec(Some(items)) = val else {
        return None;
    };
    match items.0.as_slice() {
        [ScVal::Symbol(kind)] if kind.0.as_slice() == b"Native" => Some(Asset::Native),
        [ScVal::Symbol(_), ScVal::Map(Some(fields))] => {
            let mut code = None;
            let mut issuer = None;
            for entry in fields.0.iter() {
                match (&entry.key, &entry.val) {
                    (ScVal::Symbol(k), ScVal::String(v)) if k.0.as_slice() == b"asset_code" => {
                        code = std::str::from_utf8(v.0.as_slice()).ok();
                    }
                    (ScVal::Symbol(k), ScVal::Bytes(v)) if k.0.as_slice() == b"issuer" => {
                        issuer = <[u8; 32]>::try_from(v.0.as_slice()).ok();
                    }
                    _ => {}
                }
            }
            let code = code?.as_bytes();
            let issuer = AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(issuer?)));
            match code.len() {
                1..=4 => {
                    let mut buf = [0u8; 4];
                    buf[..code.len()].copy_from_slice(code);
                    Some(Asset::CreditAlphanum4(AlphaNum4 {
                        asset_code: AssetCode4(buf),
                        issuer,
                    }))
                }
                5..=12 => {
                    let mut buf = [0u8; 12];
                    buf[..code.len()].copy_from_slice(code);
                    Some(Asset::CreditAlphanum12(AlphaNum12 {
                        asset_code: AssetCode12(buf),
                        issuer,
                    }))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::*;

    fn usd() -> Asset {
        Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(*b"USD\0"),
            issuer: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256([0u8; 32]))),
        })
    }

    fn sym(value: &str) -> ScVal {
        ScVal::Symbol(ScSymbol(value.try_into().unwrap()))
    }

    #[test]
    fn test_created_contract_from_asset() {
        let network = NetworkId::testnet();
        let host_function = HostFunction::CreateContract(CreateContractArgs {
            contract_id_preimage: ContractIdPreimage::Asset(usd()),
            executable: ContractExecutable::StellarAsset,
        });
        let effect = created_contract(&host_function, &network).unwrap();
        let expected = contract_id_to_strkey(&crate::sac::asset_contract_id(&network, &usd()));
        match effect {
            EffectBody::ContractCreated {
                contract,
                kind,
                wasm_hash,
                asset,
            } => {
                assert_eq!(contract, expected);
                assert_eq!(kind, ContractKind::FromAsset);
                assert_eq!(wasm_hash, None);
                assert_eq!(asset.as_deref(), Some(asset_to_string(&usd()).as_str()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_message_prefers_strings() {
        let message = ScVal::Vec(Some(ScVec(
            vec![
                ScVal::U32(1),
                ScVal::String(ScString("escalating error".try_into().unwrap())),
            ]
            .try_into()
            .unwrap(),
        )));
        assert_eq!(error_message(&message), "escalating error");
        assert_eq!(error_message(&ScVal::U32(7)), "AAAAAwAAAAc=");
        assert_eq!(error_code(&ScError::Contract(3)), "Contract:3");
    }

    #[test]
    fn test_asset_from_metadata_name() {
        let name = asset_to_string(&usd());
        let metadata = ScVal::Map(Some(ScMap(
            vec![ScMapEntry {
                key: sym("name"),
                val: ScVal::String(ScString(name.as_str().try_into().unwrap())),
            }]
            .try_into()
            .unwrap(),
        )));
        assert_eq!(asset_from_instance_entry(&sym("METADATA"), &metadata), Some(usd()));
    }

    #[test]
    fn test_asset_from_asset_info() {
        let key = ScVal::Vec(Some(ScVec(vec![sym("AssetInfo")].try_into().unwrap())));
        let info = ScVal::Vec(Some(ScVec(
            vec![
                sym("AlphaNum4"),
                ScVal::Map(Some(ScMap(
                    vec![
                        ScMapEntry {
                            key: sym("asset_code"),
                            val: ScVal::String(ScString("USD".try_into().unwrap())),
                        },
                        ScMapEntry {
                            key: sym("issuer"),
                            val: ScVal::Bytes(ScBytes(vec![0u8; 32].try_into().unwrap())),
                        },
                    ]
                    .try_into()
                    .unwrap(),
                ))),
            ]
            .try_into()
            .unwrap(),
        )));
        assert_eq!(asset_from_instance_entry(&key, &info), Some(usd()));
        let native = ScVal::Vec(Some(ScVec(vec![sym("Native")].try_into().unwrap())));
        assert_eq!(asset_from_instance_entry(&key, &native), Some(Asset::Native));
    }
}
