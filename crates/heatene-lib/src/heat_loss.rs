//! Room heat-loss model.
//!
//! Required wattage is a per-area loss built from an insulation base plus an
//! external-wall adder, scaled by a chain of independent multipliers, times the
//! floor area. Every step is recorded as a named [`Factor`] so callers can
//! verify each coefficient on its own.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EffectiveParameters;
use crate::coverage::estimated_perimeter;
use crate::error::{Error, Result};
use crate::model::{PropertyProfile, Room};

/// How a factor combines with the running per-area loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// Starting value in W/m².
    Base,
    /// Added to the base before any multiplier, in W/m².
    Additive,
    Multiplier,
}

/// One named step of the heat-loss factor chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub name: &'static str,
    /// Category key or measured value the coefficient was looked up for.
    pub basis: String,
    pub kind: FactorKind,
    pub value: f64,
}

impl Factor {
    fn new(name: &'static str, basis: impl ToString, kind: FactorKind, value: f64) -> Self {
        Self {
            name,
            basis: basis.to_string(),
            kind,
            value,
        }
    }
}

/// Outcome of [`estimate_watts`] for one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLossResult {
    /// Ordered factor chain: base, wall adder, then every multiplier.
    pub factors: Vec<Factor>,
    /// Combined loss in W/m² after every factor.
    pub per_area_watts: f64,
    pub area_sqm: f64,
    pub required_watts: f64,
    /// Linear metres of product that would deliver `required_watts`.
    pub ideal_metres: f64,
    /// Estimated room perimeter, see [`estimated_perimeter`].
    pub estimated_perimeter_m: f64,
    /// `ideal_metres` as a percentage of the estimated perimeter.
    pub wall_coverage_pct: f64,
}

impl HeatLossResult {
    /// Value of the named factor, if it appears in the chain.
    pub fn factor(&self, name: &str) -> Option<f64> {
        self.factors.iter().find(|f| f.name == name).map(|f| f.value)
    }

    /// Product of every multiplier in the chain.
    pub fn combined_multiplier(&self) -> f64 {
        self.factors
            .iter()
            .filter(|f| f.kind == FactorKind::Multiplier)
            .map(|f| f.value)
            .product()
    }
}

/// Step-linear penalty for ceilings above the reference height; never a bonus.
pub fn height_multiplier(height_m: f64, reference_m: f64, adjust_per_10cm: f64) -> f64 {
    let steps = ((height_m - reference_m) / 0.1).max(0.0);
    1.0 + steps * adjust_per_10cm
}

/// Climate multiplier for the property's region within its market.
///
/// Unknown regions fail closed unless `climate.trust_market_fallback` is set,
/// in which case the market's fallback region is used and a warning logged.
pub fn climate_multiplier(
    property: &PropertyProfile,
    params: &EffectiveParameters,
) -> Result<f64> {
    let table = params.climate.multiplier.get(&property.market).ok_or_else(|| {
        Error::unknown_key(
            "climate market",
            property.market.key(),
            params.climate.multiplier.keys().map(|m| m.key()),
        )
    })?;

    if let Some(value) = table.get(&property.region) {
        return Ok(*value);
    }

    if params.climate.trust_market_fallback {
        let fallback = params.climate.market_fallback_region.get(&property.market);
        if let Some((fallback, value)) = fallback.and_then(|r| table.get(r).map(|v| (r, *v))) {
            warn!(
                region = %property.region,
                fallback = %fallback,
                market = %property.market,
                "unknown climate region, using market fallback"
            );
            return Ok(value);
        }
    }

    Err(Error::unknown_key(
        "climate region",
        &property.region,
        table.keys(),
    ))
}

/// Estimate the wattage a room needs to hold its target temperature.
pub fn estimate_watts(
    room: &Room,
    property: &PropertyProfile,
    params: &EffectiveParameters,
) -> Result<HeatLossResult> {
    let hl = &params.heat_loss;

    let base = params.base_heat_loss(property.insulation)?;
    let wall_adder = f64::from(room.external_walls) * hl.external_wall_add_per_wall;

    let factors = vec![
        Factor::new("base", property.insulation, FactorKind::Base, base),
        Factor::new(
            "external_walls",
            room.external_walls,
            FactorKind::Additive,
            wall_adder,
        ),
        Factor::new(
            "age",
            property.age,
            FactorKind::Multiplier,
            params.age_multiplier(property.age)?,
        ),
        Factor::new(
            "property_type",
            property.property_type,
            FactorKind::Multiplier,
            params.type_multiplier(property.property_type)?,
        ),
        Factor::new(
            "window_area",
            room.window_area,
            FactorKind::Multiplier,
            params.window_multiplier(room.window_area)?,
        ),
        Factor::new(
            "floor_type",
            room.floor_type,
            FactorKind::Multiplier,
            params.floor_multiplier(room.floor_type)?,
        ),
        Factor::new(
            "ceiling_height",
            format!("{:.2}m", room.height_m),
            FactorKind::Multiplier,
            height_multiplier(
                room.height_m,
                hl.reference_height_m,
                hl.height_adjust_per_10cm,
            ),
        ),
        Factor::new(
            "climate",
            &property.region,
            FactorKind::Multiplier,
            climate_multiplier(property, params)?,
        ),
        Factor::new(
            "room_type",
            room.room_type,
            FactorKind::Multiplier,
            params.room_type_multiplier(room.room_type)?,
        ),
        Factor::new(
            "usage",
            room.usage_pattern,
            FactorKind::Multiplier,
            params.usage_multiplier(room.usage_pattern)?,
        ),
    ];

    let mut per_area_watts = base + wall_adder;
    for factor in factors.iter().filter(|f| f.kind == FactorKind::Multiplier) {
        per_area_watts *= factor.value;
    }

    let required_watts = per_area_watts * room.area_sqm;
    let ideal_metres = required_watts / params.product.watts_per_metre;
    let estimated_perimeter_m = estimated_perimeter(room.area_sqm);
    let wall_coverage_pct = ideal_metres / estimated_perimeter_m * 100.0;

    debug!(
        room = %room.name,
        per_area_watts,
        area_sqm = room.area_sqm,
        required_watts,
        "estimated room heat loss"
    );

    Ok(HeatLossResult {
        factors,
        per_area_watts,
        area_sqm: room.area_sqm,
        required_watts,
        ideal_metres,
        estimated_perimeter_m,
        wall_coverage_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_parameters, defaults, resolve};
    use crate::model::{
        FloorType, InsulationTier, Market, PropertyAge, PropertyType, RoomType, UsagePattern,
        WindowArea,
    };
    use serde_json::json;

    fn property(region: &str) -> PropertyProfile {
        PropertyProfile {
            market: Market::Uk,
            property_type: PropertyType::Detached,
            age: PropertyAge::From1980To2000,
            insulation: InsulationTier::Average,
            region: region.to_string(),
            current_heating: "gas-modern".to_string(),
        }
    }

    fn living_room(area_sqm: f64) -> Room {
        Room {
            name: "Living Room".to_string(),
            room_type: RoomType::Living,
            area_sqm,
            height_m: 2.4,
            external_walls: 1,
            window_area: WindowArea::Medium,
            floor_type: FloorType::Ground,
            usage_pattern: UsagePattern::Regular,
        }
    }

    #[test]
    fn height_penalty_is_step_linear_and_never_a_bonus() {
        assert_eq!(height_multiplier(2.4, 2.4, 0.03), 1.0);
        assert_eq!(height_multiplier(2.2, 2.4, 0.03), 1.0);
        assert!((height_multiplier(2.7, 2.4, 0.03) - 1.09).abs() < 1e-9);
    }

    #[test]
    fn factor_chain_is_ordered_and_complete() {
        let params = default_parameters().expect("defaults resolve");
        let result =
            estimate_watts(&living_room(14.0), &property("east-midlands"), &params).unwrap();
        let names: Vec<_> = result.factors.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "base",
                "external_walls",
                "age",
                "property_type",
                "window_area",
                "floor_type",
                "ceiling_height",
                "climate",
                "room_type",
                "usage",
            ]
        );
        assert_eq!(result.factor("base"), Some(65.0));
        assert_eq!(result.factor("external_walls"), Some(5.0));
        assert_eq!(result.factor("climate"), Some(1.0));
    }

    #[test]
    fn per_area_loss_is_base_plus_walls_times_multipliers() {
        let params = default_parameters().expect("defaults resolve");
        let result =
            estimate_watts(&living_room(14.0), &property("east-midlands"), &params).unwrap();
        let expected = 70.0 * result.combined_multiplier();
        assert!((result.per_area_watts - expected).abs() < 1e-9);
        assert!((result.required_watts - expected * 14.0).abs() < 1e-9);
        assert!((result.ideal_metres - result.required_watts / 70.0).abs() < 1e-9);
        assert!((result.estimated_perimeter_m - 4.0 * 14f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn unknown_region_fails_closed_by_default() {
        let params = default_parameters().expect("defaults resolve");
        let err = estimate_watts(&living_room(14.0), &property("londn"), &params).unwrap_err();
        assert!(matches!(err, Error::UnknownKey { .. }));
        assert!(err.to_string().contains("'london'"), "{err}");
    }

    #[test]
    fn trusted_fallback_uses_market_region() {
        let overrides = json!({"climate": {"trust_market_fallback": true}});
        let params = resolve(defaults(), Some(&overrides)).expect("resolves");
        let result = estimate_watts(&living_room(14.0), &property("atlantis"), &params).unwrap();
        assert_eq!(result.factor("climate"), Some(1.0));
    }
}
