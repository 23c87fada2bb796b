//! Translate a wattage requirement into linear metres of skirting.
//!
//! Wall length is not measured. The perimeter is approximated as that of a
//! square room of the same area, `4 * sqrt(area)`, and scaled by the room
//! type's usable-wall fraction to allow for doors, units and fixtures.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{ProductCatalog, ProductSku};
use crate::config::{EffectiveParameters, ProductParameters};
use crate::error::{Error, Result};
use crate::model::Room;

/// Lengths this close to a whole number of pieces do not need another piece.
const PIECE_EPSILON: f64 = 1e-9;

/// How much usable wall is fitted with product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageStrategy {
    /// Every usable metre, capped at what the room needs.
    #[default]
    Maximum,
    /// A fixed share of usable wall, typically two opposing walls.
    Reduced,
}

impl CoverageStrategy {
    pub const ALL: [CoverageStrategy; 2] = [CoverageStrategy::Maximum, CoverageStrategy::Reduced];

    pub fn key(self) -> &'static str {
        match self {
            CoverageStrategy::Maximum => "maximum",
            CoverageStrategy::Reduced => "reduced",
        }
    }
}

/// Result of fitting one strategy to one room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyPlan {
    pub strategy: CoverageStrategy,
    pub metres: f64,
    pub delivered_watts: f64,
    /// `delivered_watts / required_watts`; 1.0 when nothing is required.
    pub coverage_ratio: f64,
    /// Pieces needed given the maximum piece length.
    pub pieces: u32,
}

/// Coverage outcome for one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageResult {
    pub required_watts: f64,
    pub estimated_perimeter_m: f64,
    pub usable_wall_m: f64,
    /// Length that would deliver exactly `required_watts`.
    pub ideal_metres: f64,
    /// The plan for the requested strategy.
    pub selected: StrategyPlan,
    pub maximum: StrategyPlan,
    pub reduced: StrategyPlan,
    /// Even maximum coverage misses the requirement by more than the tolerance.
    pub insufficient_wall: bool,
    /// Legacy panel equivalent of `required_watts`.
    pub sku: ProductSku,
}

/// Perimeter of a square room with the given floor area.
pub fn estimated_perimeter(area_sqm: f64) -> f64 {
    4.0 * area_sqm.sqrt()
}

/// Estimated wall length that can carry product in `room`.
pub fn usable_wall_length(room: &Room, params: &EffectiveParameters) -> Result<f64> {
    let fraction = params.room_type(room.room_type)?.usable_wall_fraction;
    Ok(estimated_perimeter(room.area_sqm) * fraction)
}

/// Fit one strategy against a known usable wall length.
pub fn plan_strategy(
    strategy: CoverageStrategy,
    required_watts: f64,
    usable_wall_m: f64,
    product: &ProductParameters,
) -> Result<StrategyPlan> {
    check_non_negative(required_watts, "required wattage")?;
    check_non_negative(usable_wall_m, "usable wall length")?;

    let ideal = required_watts / product.watts_per_metre;
    let available = match strategy {
        CoverageStrategy::Maximum => usable_wall_m,
        CoverageStrategy::Reduced => usable_wall_m * product.reduced_coverage_fraction,
    };
    let metres = ideal.min(available);
    let delivered_watts = metres * product.watts_per_metre;
    let coverage_ratio = if required_watts > 0.0 {
        delivered_watts / required_watts
    } else {
        1.0
    };

    Ok(StrategyPlan {
        strategy,
        metres,
        delivered_watts,
        coverage_ratio,
        pieces: pieces_for(metres, product.max_piece_length_m),
    })
}

/// Number of pieces of at most `max_piece_m` needed to cover `metres`.
pub fn pieces_for(metres: f64, max_piece_m: f64) -> u32 {
    if metres <= PIECE_EPSILON {
        return 0;
    }
    ((metres - PIECE_EPSILON) / max_piece_m).ceil().max(1.0) as u32
}

/// True when `maximum` falls short of the requirement by more than `tolerance`.
pub fn is_insufficient(maximum: &StrategyPlan, required_watts: f64, tolerance: f64) -> bool {
    required_watts > 0.0 && maximum.delivered_watts < required_watts * (1.0 - tolerance)
}

/// Plan both strategies for `room` and report the one asked for.
pub fn select_coverage(
    required_watts: f64,
    room: &Room,
    params: &EffectiveParameters,
    strategy: CoverageStrategy,
    catalog: &ProductCatalog,
) -> Result<CoverageResult> {
    let product = &params.product;
    let usable_wall_m = usable_wall_length(room, params)?;

    let maximum = plan_strategy(CoverageStrategy::Maximum, required_watts, usable_wall_m, product)?;
    let reduced = plan_strategy(CoverageStrategy::Reduced, required_watts, usable_wall_m, product)?;
    let selected = match strategy {
        CoverageStrategy::Maximum => maximum,
        CoverageStrategy::Reduced => reduced,
    };
    let insufficient_wall =
        is_insufficient(&maximum, required_watts, product.insufficient_wall_tolerance);
    let sku = catalog.select(required_watts, product.sku_match_ratio)?.clone();

    debug!(
        room = %room.name,
        usable_wall_m,
        strategy = strategy.key(),
        metres = selected.metres,
        insufficient_wall,
        sku = %sku.name,
        "selected coverage"
    );

    Ok(CoverageResult {
        required_watts,
        estimated_perimeter_m: estimated_perimeter(room.area_sqm),
        usable_wall_m,
        ideal_metres: required_watts / product.watts_per_metre,
        selected,
        maximum,
        reduced,
        insufficient_wall,
        sku,
    })
}

fn check_non_negative(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_input(format!(
            "{what} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_parameters;
    use crate::model::{FloorType, Market, RoomType, UsagePattern, WindowArea};

    fn room(room_type: RoomType, area_sqm: f64) -> Room {
        Room {
            name: "Test".to_string(),
            room_type,
            area_sqm,
            height_m: 2.4,
            external_walls: 1,
            window_area: WindowArea::Medium,
            floor_type: FloorType::Ground,
            usage_pattern: UsagePattern::Regular,
        }
    }

    #[test]
    fn short_wall_caps_length_and_flags_insufficient() {
        let params = default_parameters().expect("defaults resolve");
        let plan =
            plan_strategy(CoverageStrategy::Maximum, 1320.0, 12.0, &params.product).unwrap();
        assert!((1320.0_f64 / 70.0 - 18.857).abs() < 1e-3);
        assert_eq!(plan.metres, 12.0);
        assert_eq!(plan.delivered_watts, 840.0);
        assert_eq!(plan.pieces, 2);
        assert!(is_insufficient(&plan, 1320.0, 0.3));
    }

    #[test]
    fn long_wall_caps_at_requirement() {
        let params = default_parameters().expect("defaults resolve");
        let plan = plan_strategy(CoverageStrategy::Maximum, 700.0, 30.0, &params.product).unwrap();
        assert!((plan.metres - 10.0).abs() < 1e-9);
        assert!((plan.coverage_ratio - 1.0).abs() < 1e-9);
        assert!(!is_insufficient(&plan, 700.0, 0.3));
    }

    #[test]
    fn reduced_never_exceeds_maximum() {
        let params = default_parameters().expect("defaults resolve");
        let catalog = params.panel_catalog(Market::Uk).unwrap();
        for room_type in RoomType::ALL {
            for area in [4.0, 8.0, 14.0, 22.0, 40.0] {
                for watts in [0.0, 200.0, 900.0, 2500.0] {
                    let result = select_coverage(
                        watts,
                        &room(*room_type, area),
                        &params,
                        CoverageStrategy::Reduced,
                        &catalog,
                    )
                    .unwrap();
                    assert!(result.reduced.metres <= result.maximum.metres);
                    assert_eq!(result.selected, result.reduced);
                }
            }
        }
    }

    #[test]
    fn zero_requirement_needs_nothing() {
        let params = default_parameters().expect("defaults resolve");
        let plan = plan_strategy(CoverageStrategy::Maximum, 0.0, 10.0, &params.product).unwrap();
        assert_eq!(plan.metres, 0.0);
        assert_eq!(plan.pieces, 0);
        assert_eq!(plan.coverage_ratio, 1.0);
    }

    #[test]
    fn pieces_round_up_except_at_exact_multiples() {
        assert_eq!(pieces_for(6.0, 6.0), 1);
        assert_eq!(pieces_for(6.01, 6.0), 2);
        assert_eq!(pieces_for(0.5, 6.0), 1);
        assert_eq!(pieces_for(18.0, 6.0), 3);
    }

    #[test]
    fn kitchen_has_less_usable_wall_than_living_room() {
        let params = default_parameters().expect("defaults resolve");
        let kitchen = usable_wall_length(&room(RoomType::Kitchen, 16.0), &params).unwrap();
        let living = usable_wall_length(&room(RoomType::Living, 16.0), &params).unwrap();
        assert!((kitchen - 16.0 * 0.4).abs() < 1e-9);
        assert!(kitchen < living);
    }

    #[test]
    fn negative_requirement_is_rejected() {
        let params = default_parameters().expect("defaults resolve");
        assert!(plan_strategy(CoverageStrategy::Maximum, -1.0, 10.0, &params.product).is_err());
    }
}
