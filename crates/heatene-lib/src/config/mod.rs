//! Effective parameter resolution.
//!
//! The built-in parameter document ships inside the crate. Operators supply an
//! optional override document, which is deep-merged over the defaults and then
//! deserialized into [`EffectiveParameters`]. Nothing here touches the file
//! system: the caller decides where overrides come from.

mod merge;
mod params;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

pub use merge::{deep_merge, MergeNote, Merged};
pub use params::{
    ClimateParameters, ClimateZone, EffectiveParameters, FuelPrice, HeatLossParameters,
    HeatingSystem, MarketParameters, Pricing, ProductParameters, RoomParameters, RoomTypeInfo,
    RunningParameters, SizePresetInfo, SynthesisParameters, SynthesisShares, TariffKind, Tariffs,
};

static DEFAULTS: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/defaults.json"))
        .expect("bundled defaults.json must be valid JSON")
});

/// The built-in default parameter document.
pub fn defaults() -> &'static Value {
    &DEFAULTS
}

/// Parameters plus any shape mismatches the merge had to resolve.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub parameters: EffectiveParameters,
    pub notes: Vec<MergeNote>,
}

/// Merge `overrides` over `defaults` and return typed, validated parameters.
///
/// Shape mismatches are logged at `warn` level; use [`resolve_with_notes`] to
/// inspect them programmatically.
pub fn resolve(defaults: &Value, overrides: Option<&Value>) -> Result<EffectiveParameters> {
    resolve_with_notes(defaults, overrides).map(|resolution| resolution.parameters)
}

pub fn resolve_with_notes(defaults: &Value, overrides: Option<&Value>) -> Result<Resolution> {
    let Merged { value, notes } = match overrides {
        Some(overrides) => deep_merge(defaults, overrides),
        None => Merged {
            value: defaults.clone(),
            notes: Vec::new(),
        },
    };

    for note in &notes {
        warn!(
            path = %note.path,
            default_kind = note.default_kind,
            override_kind = note.override_kind,
            "override replaced a value of a different shape"
        );
    }

    let parameters: EffectiveParameters = serde_json::from_value(value)?;
    parameters.validate()?;
    debug!(
        overridden = overrides.is_some(),
        notes = notes.len(),
        "resolved effective parameters"
    );

    Ok(Resolution { parameters, notes })
}

/// Built-in parameters with no overrides applied.
pub fn default_parameters() -> Result<EffectiveParameters> {
    resolve(defaults(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn as_value(params: &EffectiveParameters) -> Value {
        serde_json::to_value(params).expect("parameters serialize")
    }

    /// Numbers in the bundled JSON are a mix of integers and floats; typed
    /// round-trips always emit floats, so compare through the typed form.
    fn normalized(value: &Value) -> Value {
        let params: EffectiveParameters =
            serde_json::from_value(value.clone()).expect("document matches schema");
        as_value(&params)
    }

    #[test]
    fn defaults_resolve_to_a_deep_equal_copy() {
        let resolved = default_parameters().expect("defaults resolve");
        assert_eq!(as_value(&resolved), normalized(defaults()));
    }

    #[test]
    fn resolving_defaults_over_defaults_is_idempotent() {
        let once = resolve_with_notes(defaults(), Some(defaults())).expect("resolves");
        assert!(once.notes.is_empty());
        assert_eq!(once.parameters, default_parameters().expect("defaults resolve"));
    }

    #[test]
    fn scalar_override_replaces_single_leaf() {
        let overrides = json!({"product": {"watts_per_metre": 80}});
        let params = resolve(defaults(), Some(&overrides)).expect("resolves");
        assert_eq!(params.product.watts_per_metre, 80.0);
        assert_eq!(params.product.max_piece_length_m, 6.0);
    }

    #[test]
    fn shape_mismatch_surfaces_note_then_schema_error() {
        let overrides = json!({"heat_loss": {"window_multiplier": 1.2}});
        let merged = deep_merge(defaults(), &overrides);
        assert_eq!(merged.notes.len(), 1);
        assert!(matches!(
            resolve(defaults(), Some(&overrides)),
            Err(Error::ParameterSchema(_))
        ));
    }

    #[test]
    fn misspelled_override_section_is_rejected() {
        let overrides = json!({"prodcut": {"watts_per_metre": 80}});
        assert!(matches!(
            resolve(defaults(), Some(&overrides)),
            Err(Error::ParameterSchema(_))
        ));
    }

    #[test]
    fn nonsensical_values_fail_validation() {
        let overrides = json!({"product": {"watts_per_metre": 0}});
        assert!(matches!(
            resolve(defaults(), Some(&overrides)),
            Err(Error::InvalidParameters { .. })
        ));
    }

    #[test]
    fn operators_can_add_regions() {
        let overrides = json!({"climate": {"multiplier": {"uk": {"isle-of-man": 1.07}}}});
        let params = resolve(defaults(), Some(&overrides)).expect("resolves");
        assert_eq!(params.climate.multiplier[&crate::model::Market::Uk]["isle-of-man"], 1.07);
        assert_eq!(params.climate.multiplier[&crate::model::Market::Uk]["london"], 0.92);
    }
}
