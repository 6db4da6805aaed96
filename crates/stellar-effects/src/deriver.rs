//! Public entry points.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use stellar_effects_common::resolve_passphrase;
use tracing::debug;

use crate::aggregate::aggregate;
use crate::classic::derive_operation;
use crate::context::TxContext;
use crate::effect::Effect;
use crate::error::DerivationInconsistency;
use crate::options::DeriveOptions;
use crate::sac::{global_sac_cache, SacCache};
use crate::Result;

/// Effects of one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEffects {
    pub effects: Vec<Effect>,
    /// Contract StrKey to SEP-11 asset, for the asset contracts touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sac_map: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DerivationInconsistency>,
}

/// Output of one derivation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivationResult {
    /// One entry per envelope operation, in order.
    pub operations: Vec<OperationEffects>,
    /// Transaction-level effects, `feeCharged` first.
    pub effects: Vec<Effect>,
}

impl DerivationResult {
    pub fn warnings(&self) -> impl Iterator<Item = &DerivationInconsistency> {
        self.operations.iter().flat_map(|op| op.warnings.iter())
    }
}

/// Derives transaction effects against a SAC cache.
#[derive(Clone)]
pub struct EffectDeriver {
    cache: Arc<dyn SacCache>,
}

impl Default for EffectDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EffectDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDeriver")
            .field("cached_contracts", &self.cache.len())
            .finish()
    }
}

impl EffectDeriver {
    /// A deriver sharing the process-wide SAC cache.
    pub fn new() -> Self {
        Self {
            cache: global_sac_cache(),
        }
    }

    /// A deriver with its own cache.
    pub fn with_cache(cache: Arc<dyn SacCache>) -> Self {
        Self { cache }
    }

    pub fn derive(&self, options: &DeriveOptions) -> Result<DerivationResult> {
        options.validate()?;
        let passphrase = resolve_passphrase(Some(options.network.as_str()))?;
        let ctx = TxContext::decode(options, passphrase)?;
        if ctx.is_success() {
            ctx.meta.check_operation_count(ctx.operation_count())?;
        }

        let mut operations = Vec::with_capacity(ctx.operation_count());
        for index in 0..ctx.operation_count() {
            let Some(input) = ctx.operation(index) else {
                operations.push(OperationEffects::default());
                continue;
            };
            let mut derived = derive_operation(&input, &ctx, self.cache.as_ref());
            if !options.map_sac {
                derived.sac_map = None;
            }
            operations.push(derived);
        }

        let effects = aggregate(&ctx.frame, &ctx.result, &operations);
        debug!(
            operations = operations.len(),
            effects = operations.iter().map(|op| op.effects.len()).sum::<usize>(),
            balance_changes = operations
                .iter()
                .flat_map(|op| op.effects.iter())
                .filter(|e| e.body.is_balance_change())
                .count(),
            tx_effects = effects.len(),
            result = ctx.result.code_name(),
            "derived transaction effects"
        );
        Ok(DerivationResult {
            operations,
            effects,
        })
    }
}

/// Derive effects using the process-wide SAC cache.
pub fn derive_transaction_effects(options: &DeriveOptions) -> Result<DerivationResult> {
    EffectDeriver::new().derive(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EffectsError;
    use crate::sac::SacMapCache;

    #[test]
    fn test_invalid_options_are_rejected_before_decoding() {
        let deriver = EffectDeriver::with_cache(Arc::new(SacMapCache::new()));
        let err = deriver
            .derive(&DeriveOptions::new("testnet", vec![], vec![1], vec![1]))
            .unwrap_err();
        assert!(matches!(err, EffectsError::InvalidOptions(_)));
    }

    #[test]
    fn test_operation_effects_omit_empty_fields() {
        let value = serde_json::to_value(OperationEffects::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "effects": [] }));
    }
}
