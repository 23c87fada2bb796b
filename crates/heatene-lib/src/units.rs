//! Metric/imperial conversion for lengths and areas.
//!
//! Every physical calculation in the engine runs in canonical metric units
//! (metres, square metres). Values only cross into feet or square feet at the
//! request boundary (user-entered dimensions) and at display time, which is
//! the caller's concern. No rounding is applied here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Exact international foot definition.
pub const METRES_PER_FOOT: f64 = 0.3048;

/// Square metres in one square foot.
pub const SQM_PER_SQFT: f64 = METRES_PER_FOOT * METRES_PER_FOOT;

/// Unit system a request expresses its geometry in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn key(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Unit label for lengths in this system.
    pub fn length_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m",
            UnitSystem::Imperial => "ft",
        }
    }

    /// Unit label for areas in this system.
    pub fn area_label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "m²",
            UnitSystem::Imperial => "ft²",
        }
    }
}

pub fn feet_to_metres(feet: f64) -> f64 {
    feet * METRES_PER_FOOT
}

pub fn metres_to_feet(metres: f64) -> f64 {
    metres / METRES_PER_FOOT
}

pub fn sqft_to_sqm(sqft: f64) -> f64 {
    sqft * SQM_PER_SQFT
}

pub fn sqm_to_sqft(sqm: f64) -> f64 {
    sqm / SQM_PER_SQFT
}

/// Convert a length expressed in `units` to metres.
pub fn length_to_canonical(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => feet_to_metres(value),
    }
}

/// Convert a length in metres to `units`.
pub fn length_from_canonical(metres: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => metres,
        UnitSystem::Imperial => metres_to_feet(metres),
    }
}

/// Convert an area expressed in `units` to square metres.
pub fn area_to_canonical(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => sqft_to_sqm(value),
    }
}

/// Convert an area in square metres to `units`.
pub fn area_from_canonical(sqm: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => sqm,
        UnitSystem::Imperial => sqm_to_sqft(sqm),
    }
}

/// Range-check a physical measurement before it enters the engine.
pub(crate) fn require_positive(value: f64, what: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid_input(format!(
            "{what} must be finite and positive, got {value}"
        )));
    }
    Ok(value)
}
