//! Input records: property profile, room specifications and the closed
//! category sets their lookups are keyed by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EffectiveParameters;
use crate::error::{Error, Result};
use crate::units::{area_to_canonical, length_to_canonical, require_positive, UnitSystem};

/// Most external walls a single room can have.
pub const MAX_EXTERNAL_WALLS: u32 = 4;

macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $key)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Key used for parameter-table lookups and serialization.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.key().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        Error::unknown_key($label, wanted, Self::ALL.iter().map(|v| v.key()))
                    })
            }
        }
    };
}

keyed_enum! {
    /// Deployment market; selects currency, tariffs and regional tables.
    Market, "market" {
        Uk => "uk",
        Us => "us",
    }
}

keyed_enum! {
    InsulationTier, "insulation tier" {
        Poor => "poor",
        Average => "average",
        Good => "good",
        Excellent => "excellent",
    }
}

keyed_enum! {
    /// Construction era of the property.
    PropertyAge, "property age" {
        Pre1920 => "pre1920",
        From1920To1950 => "1920-1950",
        From1950To1980 => "1950-1980",
        From1980To2000 => "1980-2000",
        Since2000 => "2000+",
    }
}

keyed_enum! {
    /// Housing type. The first five are UK terms, the rest US terms.
    PropertyType, "property type" {
        Flat => "flat",
        Terrace => "terrace",
        Semi => "semi",
        Detached => "detached",
        Bungalow => "bungalow",
        Apartment => "apartment",
        Condo => "condo",
        Townhouse => "townhouse",
        SingleFamily => "single-family",
        Ranch => "ranch",
    }
}

keyed_enum! {
    WindowArea, "window area" {
        None => "none",
        Small => "small",
        Medium => "medium",
        Large => "large",
        Extensive => "extensive",
    }
}

keyed_enum! {
    FloorType, "floor type" {
        Ground => "ground",
        Upper => "upper",
        /// Floor above an unheated space.
        Unheated => "unheated",
    }
}

keyed_enum! {
    RoomType, "room type" {
        Living => "living",
        Bedroom => "bedroom",
        MasterBedroom => "master-bedroom",
        Kitchen => "kitchen",
        Bathroom => "bathroom",
        Office => "office",
        Dining => "dining",
        Hallway => "hallway",
        Conservatory => "conservatory",
        Utility => "utility",
        Other => "other",
    }
}

keyed_enum! {
    /// How much of the day a single room is occupied and heated.
    UsagePattern, "usage pattern" {
        AllDay => "all-day",
        Regular => "regular",
        Occasional => "occasional",
    }
}

keyed_enum! {
    /// Household-level heating schedule, drives daily running hours.
    HeatingPattern, "heating pattern" {
        Full => "full",
        Zoned => "zoned",
        Minimal => "minimal",
    }
}

keyed_enum! {
    SizePreset, "size preset" {
        Small => "small",
        Medium => "medium",
        Large => "large",
        XLarge => "xlarge",
    }
}

keyed_enum! {
    FuelType, "fuel type" {
        Gas => "gas",
        Electricity => "electricity",
        Oil => "oil",
        Lpg => "lpg",
        Propane => "propane",
        Wood => "wood",
        /// No central system; a blend of portable heaters and the like.
        Mixed => "mixed",
    }
}

/// Household-level facts shared by every room in one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyProfile {
    pub market: Market,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub age: PropertyAge,
    pub insulation: InsulationTier,
    /// Climate region code (UK region or US state), resolved per market.
    pub region: String,
    /// Key into the heating-system table for the system being replaced.
    pub current_heating: String,
}

/// How a room's size was captured.
///
/// Explicit values are in the request's unit system until [`RoomSpec::to_room`]
/// converts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomGeometry {
    /// A named size; omitted means the room type's default size.
    Preset {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<SizePreset>,
    },
    Dimensions {
        length: f64,
        width: f64,
        height: f64,
    },
    Area {
        area: f64,
        height: f64,
    },
}

/// A room as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub geometry: RoomGeometry,
    pub external_walls: u32,
    pub window_area: WindowArea,
    pub floor_type: FloorType,
    pub usage_pattern: UsagePattern,
}

/// A room in canonical metric units, ready for the heat-loss and coverage models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub area_sqm: f64,
    pub height_m: f64,
    pub external_walls: u32,
    pub window_area: WindowArea,
    pub floor_type: FloorType,
    pub usage_pattern: UsagePattern,
}

impl RoomSpec {
    /// Resolve presets, convert explicit geometry from `units` to metres and
    /// range-check the result.
    pub fn to_room(&self, units: UnitSystem, params: &EffectiveParameters) -> Result<Room> {
        let (area_sqm, height_m) = match &self.geometry {
            RoomGeometry::Preset { size } => {
                let size = match size {
                    Some(size) => *size,
                    None => params.room_type(self.room_type)?.default_size,
                };
                let preset = params.size_preset(size)?;
                (preset.area_sqm, preset.height_m)
            }
            RoomGeometry::Dimensions {
                length,
                width,
                height,
            } => {
                let length = require_positive(length_to_canonical(*length, units), "room length")?;
                let width = require_positive(length_to_canonical(*width, units), "room width")?;
                (length * width, length_to_canonical(*height, units))
            }
            RoomGeometry::Area { area, height } => (
                area_to_canonical(*area, units),
                length_to_canonical(*height, units),
            ),
        };

        if self.external_walls > MAX_EXTERNAL_WALLS {
            return Err(Error::invalid_input(format!(
                "external_walls must be between 0 and {MAX_EXTERNAL_WALLS}, got {}",
                self.external_walls
            )));
        }

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => params.room_type(self.room_type)?.name.clone(),
        };

        Ok(Room {
            name,
            room_type: self.room_type,
            area_sqm: require_positive(area_sqm, "room area")?,
            height_m: require_positive(height_m, "ceiling height")?,
            external_walls: self.external_walls,
            window_area: self.window_area,
            floor_type: self.floor_type,
            usage_pattern: self.usage_pattern,
        })
    }
}
