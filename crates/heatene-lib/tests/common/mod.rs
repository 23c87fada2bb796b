#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use heatene_lib::{
    default_parameters, EffectiveParameters, EstimateRequest, PropertyProfile, Room,
};
use heatene_lib::model::{
    FloorType, InsulationTier, Market, PropertyAge, PropertyType, RoomType, UsagePattern,
    WindowArea,
};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn params() -> EffectiveParameters {
    default_parameters().expect("bundled defaults resolve")
}

pub fn load_request(name: &str) -> EstimateRequest {
    let path = fixtures_dir().join(name);
    let text = fs::read_to_string(&path).expect("read request fixture");
    serde_json::from_str(&text).expect("request fixture matches schema")
}

/// Detached 1980-2000 house with average insulation in a 1.0 climate region.
pub fn reference_property() -> PropertyProfile {
    PropertyProfile {
        market: Market::Uk,
        property_type: PropertyType::Detached,
        age: PropertyAge::From1980To2000,
        insulation: InsulationTier::Average,
        region: "east-midlands".to_string(),
        current_heating: "gas-modern".to_string(),
    }
}

/// 14 m² living room, one external wall, medium windows, ground floor, 2.4 m ceiling.
pub fn reference_room() -> Room {
    Room {
        name: "Living Room".to_string(),
        room_type: RoomType::Living,
        area_sqm: 14.0,
        height_m: 2.4,
        external_walls: 1,
        window_area: WindowArea::Medium,
        floor_type: FloorType::Ground,
        usage_pattern: UsagePattern::Regular,
    }
}
