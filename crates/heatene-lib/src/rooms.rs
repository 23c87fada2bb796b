//! Room list synthesis for quick estimates and whole-home roll-up.

use serde::Serialize;

use crate::config::EffectiveParameters;
use crate::coverage::CoverageResult;
use crate::error::{Error, Result};
use crate::heat_loss::HeatLossResult;
use crate::model::{Room, RoomGeometry, RoomSpec, RoomType};
use crate::units::require_positive;

/// Upper bound on synthesized bedrooms or bathrooms.
pub const MAX_SYNTHESIZED_ROOMS: u32 = 20;

/// Allocate `total_area_sqm` across a canonical room list.
///
/// The list is a living room, a kitchen, `bedrooms` bedrooms (the first
/// weighted larger), the whole part of `bathrooms` as full bathrooms, a half
/// bath when `bathrooms` ends in `.5`, and a hallway. Shares come from
/// `rooms.synthesis.shares`, are normalized to sum to one, and rooms whose
/// share is zero are left out. Geometry is returned in metric units.
pub fn synthesize_rooms(
    bedrooms: u32,
    bathrooms: f64,
    total_area_sqm: f64,
    params: &EffectiveParameters,
) -> Result<Vec<RoomSpec>> {
    let total_area_sqm = require_positive(total_area_sqm, "total floor area")?;
    if !bathrooms.is_finite() || bathrooms < 0.0 || (bathrooms * 2.0).fract() != 0.0 {
        return Err(Error::invalid_input(format!(
            "bathrooms must be a non-negative multiple of 0.5, got {bathrooms}"
        )));
    }
    let full_baths = bathrooms.trunc() as u32;
    let half_bath = bathrooms.fract() > 0.0;
    if bedrooms > MAX_SYNTHESIZED_ROOMS || full_baths > MAX_SYNTHESIZED_ROOMS {
        return Err(Error::invalid_input(format!(
            "at most {MAX_SYNTHESIZED_ROOMS} bedrooms and bathrooms are supported"
        )));
    }

    let synthesis = &params.rooms.synthesis;
    let shares = &synthesis.shares;

    let mut weighted: Vec<(String, RoomType, f64)> = vec![
        ("Living Room".to_string(), RoomType::Living, shares.living),
        ("Kitchen".to_string(), RoomType::Kitchen, shares.kitchen),
    ];
    for n in 1..=bedrooms {
        let (room_type, share) = if n == 1 {
            (RoomType::MasterBedroom, shares.first_bedroom)
        } else {
            (RoomType::Bedroom, shares.bedroom)
        };
        weighted.push((format!("Bedroom {n}"), room_type, share));
    }
    for n in 1..=full_baths {
        let name = if full_baths == 1 {
            "Bathroom".to_string()
        } else {
            format!("Bathroom {n}")
        };
        weighted.push((name, RoomType::Bathroom, shares.bathroom));
    }
    if half_bath {
        weighted.push(("Half Bath".to_string(), RoomType::Bathroom, shares.half_bath));
    }
    weighted.push(("Hallway".to_string(), RoomType::Hallway, shares.hallway));
    weighted.retain(|(_, _, share)| *share > 0.0);

    let total_share: f64 = weighted.iter().map(|(_, _, share)| share).sum();
    if total_share <= f64::EPSILON {
        return Err(Error::Degenerate {
            quantity: "room area shares".to_string(),
            message: "synthesis shares sum to zero".to_string(),
        });
    }

    Ok(weighted
        .into_iter()
        .map(|(name, room_type, share)| RoomSpec {
            name: Some(name),
            room_type,
            geometry: RoomGeometry::Area {
                area: total_area_sqm * share / total_share,
                height: synthesis.height_m,
            },
            external_walls: synthesis.external_walls,
            window_area: synthesis.window_area,
            floor_type: synthesis.floor_type,
            usage_pattern: synthesis.usage_pattern,
        })
        .collect())
}

/// Everything computed for one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomEstimate {
    pub room: Room,
    /// Comfort temperature the room type is designed for.
    pub target_temp_c: f64,
    pub heat_loss: HeatLossResult,
    pub coverage: CoverageResult,
    /// Rated wattage of the product priced for this room.
    pub installed_watts: f64,
    /// Electricity cost per heating hour at the running duty cycle.
    pub hourly_running_cost: f64,
}

/// Whole-home totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeTotals {
    pub room_count: usize,
    pub area_sqm: f64,
    pub required_watts: f64,
    /// Sum of each room's installed wattage.
    pub installed_watts: f64,
    /// Metres of skirting under the selected strategy.
    pub metres: f64,
    pub pieces: u32,
    /// Legacy panel equivalents.
    pub panel_count: usize,
    pub panel_watts: f64,
    pub panel_price: f64,
    pub hourly_running_cost: f64,
    /// Names of rooms whose usable wall cannot meet the requirement.
    pub insufficient_rooms: Vec<String>,
}

/// Roll per-room results into home-level totals.
pub fn aggregate(rooms: &[RoomEstimate]) -> HomeTotals {
    let mut totals = HomeTotals {
        room_count: rooms.len(),
        area_sqm: 0.0,
        required_watts: 0.0,
        installed_watts: 0.0,
        metres: 0.0,
        pieces: 0,
        panel_count: rooms.len(),
        panel_watts: 0.0,
        panel_price: 0.0,
        hourly_running_cost: 0.0,
        insufficient_rooms: Vec::new(),
    };
    for estimate in rooms {
        totals.area_sqm += estimate.room.area_sqm;
        totals.required_watts += estimate.heat_loss.required_watts;
        totals.installed_watts += estimate.installed_watts;
        totals.metres += estimate.coverage.selected.metres;
        totals.pieces = totals.pieces.saturating_add(estimate.coverage.selected.pieces);
        totals.panel_watts += estimate.coverage.sku.wattage;
        totals.panel_price += estimate.coverage.sku.price;
        totals.hourly_running_cost += estimate.hourly_running_cost;
        if estimate.coverage.insufficient_wall {
            totals.insufficient_rooms.push(estimate.room.name.clone());
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_parameters, defaults, resolve};
    use serde_json::json;

    fn area(spec: &RoomSpec) -> f64 {
        match spec.geometry {
            RoomGeometry::Area { area, .. } => area,
            _ => panic!("synthesized rooms use area geometry"),
        }
    }

    #[test]
    fn synthesized_areas_sum_to_total() {
        let params = default_parameters().unwrap();
        let rooms = synthesize_rooms(3, 1.5, 95.0, &params).unwrap();
        let names: Vec<_> = rooms.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(
            names,
            vec![
                "Living Room",
                "Kitchen",
                "Bedroom 1",
                "Bedroom 2",
                "Bedroom 3",
                "Bathroom",
                "Half Bath",
                "Hallway"
            ]
        );
        let sum: f64 = rooms.iter().map(area).sum();
        assert!((sum - 95.0).abs() < 1e-9);
    }

    #[test]
    fn first_bedroom_is_weighted_larger() {
        let params = default_parameters().unwrap();
        let rooms = synthesize_rooms(2, 1.0, 80.0, &params).unwrap();
        assert_eq!(rooms[2].room_type, RoomType::MasterBedroom);
        assert!(area(&rooms[2]) > area(&rooms[3]));
    }

    #[test]
    fn zero_shares_drop_rooms() {
        let overrides = json!({"rooms": {"synthesis": {"shares": {"hallway": 0}}}});
        let params = resolve(defaults(), Some(&overrides)).unwrap();
        let rooms = synthesize_rooms(1, 1.0, 60.0, &params).unwrap();
        assert!(rooms.iter().all(|r| r.room_type != RoomType::Hallway));
    }

    #[test]
    fn rejects_bad_counts() {
        let params = default_parameters().unwrap();
        assert!(synthesize_rooms(2, 1.25, 80.0, &params).is_err());
        assert!(synthesize_rooms(2, -1.0, 80.0, &params).is_err());
        assert!(synthesize_rooms(2, 1.0, 0.0, &params).is_err());
        assert!(synthesize_rooms(50, 1.0, 80.0, &params).is_err());
    }
}
