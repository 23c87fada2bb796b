//! Typed view of the merged parameter document.
//!
//! Category tables stay keyed by string so operators can retune or extend
//! them through overrides. Every lookup goes through a helper that fails
//! closed with [`Error::UnknownKey`] instead of substituting a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ProductCatalog, ProductSku};
use crate::error::{Error, Result};
use crate::model::{
    FloorType, FuelType, HeatingPattern, InsulationTier, Market, PropertyAge, PropertyType,
    RoomType, SizePreset, UsagePattern, WindowArea,
};

/// Fully resolved constants for one calculation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectiveParameters {
    pub heat_loss: HeatLossParameters,
    pub climate: ClimateParameters,
    pub rooms: RoomParameters,
    pub product: ProductParameters,
    pub markets: BTreeMap<Market, MarketParameters>,
    pub heating_systems: BTreeMap<String, HeatingSystem>,
    pub running: RunningParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatLossParameters {
    /// W/m² before any multiplier, by insulation tier.
    pub base_by_insulation: BTreeMap<String, f64>,
    pub age_multiplier: BTreeMap<String, f64>,
    pub type_multiplier: BTreeMap<String, f64>,
    /// W/m² added per external wall, before multipliers.
    pub external_wall_add_per_wall: f64,
    pub window_multiplier: BTreeMap<String, f64>,
    pub floor_multiplier: BTreeMap<String, f64>,
    pub reference_height_m: f64,
    /// Fractional penalty per 10 cm of ceiling above the reference height.
    pub height_adjust_per_10cm: f64,
    pub room_type_multiplier: BTreeMap<String, f64>,
    pub usage_multiplier: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimateParameters {
    /// Region code -> multiplier, per market.
    pub multiplier: BTreeMap<Market, BTreeMap<String, f64>>,
    /// Region used for unknown codes, only when `trust_market_fallback` is set.
    pub market_fallback_region: BTreeMap<Market, String>,
    pub trust_market_fallback: bool,
    /// Calibrated (days, hours, duty) triples a request may select by name.
    pub zones: BTreeMap<String, ClimateZone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimateZone {
    pub heating_days: f64,
    pub hours_per_day: f64,
    pub duty_cycle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomParameters {
    pub types: BTreeMap<String, RoomTypeInfo>,
    pub size_presets: BTreeMap<String, SizePresetInfo>,
    pub synthesis: SynthesisParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomTypeInfo {
    pub name: String,
    pub target_temp_c: f64,
    pub default_size: SizePreset,
    /// Share of the estimated perimeter free of doors and fixtures.
    pub usable_wall_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizePresetInfo {
    pub area_sqm: f64,
    pub height_m: f64,
}

/// Defaults for the room list synthesized on the quick-estimate path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisParameters {
    pub shares: SynthesisShares,
    pub height_m: f64,
    pub external_walls: u32,
    pub window_area: WindowArea,
    pub floor_type: FloorType,
    pub usage_pattern: UsagePattern,
}

/// Raw area weights; normalized to sum to one at synthesis time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisShares {
    pub living: f64,
    pub kitchen: f64,
    pub first_bedroom: f64,
    pub bedroom: f64,
    pub bathroom: f64,
    pub half_bath: f64,
    pub hallway: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductParameters {
    pub watts_per_metre: f64,
    pub max_piece_length_m: f64,
    /// Share of usable wall fitted under the reduced-coverage strategy.
    pub reduced_coverage_fraction: f64,
    /// Shortfall beyond which a room is flagged as having insufficient wall.
    pub insufficient_wall_tolerance: f64,
    /// A SKU matches when its rating is at least this share of the target.
    pub sku_match_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketParameters {
    pub currency: String,
    pub tariffs: Tariffs,
    pub fuel_prices: BTreeMap<String, FuelPrice>,
    /// kg CO₂ per kWh, by fuel.
    pub co2_factors: BTreeMap<String, f64>,
    pub pricing: Pricing,
    pub panels: Vec<ProductSku>,
    pub base_heating_days: f64,
}

/// Energy prices in major currency units per kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tariffs {
    pub electricity: f64,
    pub gas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffKind {
    Electricity,
    Gas,
}

/// Price of a fuel per kWh: either one of the request's tariffs or a fixed figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FuelPrice {
    Tariff { tariff: TariffKind },
    Fixed(f64),
}

impl FuelPrice {
    pub fn per_kwh(self, tariffs: &Tariffs) -> f64 {
        match self {
            FuelPrice::Tariff {
                tariff: TariffKind::Electricity,
            } => tariffs.electricity,
            FuelPrice::Tariff {
                tariff: TariffKind::Gas,
            } => tariffs.gas,
            FuelPrice::Fixed(price) => price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pricing {
    pub price_per_metre: f64,
    pub install_per_metre: f64,
    /// One room thermostat per heated room.
    pub thermostat: f64,
    pub install_per_panel: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatingSystem {
    pub name: String,
    /// Delivered heat per unit of fuel energy (COP for heat pumps).
    pub efficiency: f64,
    pub fuel: FuelType,
    pub annual_maintenance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunningParameters {
    pub hours_per_day: BTreeMap<String, f64>,
    /// Fraction of heating hours the product actually draws power.
    pub duty_cycle: f64,
    /// Fractional energy saved by heating rooms independently.
    pub zonal_savings: f64,
    /// Multiplier on energy drawn; below one when thermostat control trims usage.
    pub thermostat_efficiency: f64,
    pub projection_years: u32,
    /// Savings within this band are reported as similar cost.
    pub similar_cost_tolerance: f64,
}

fn lookup<'a, V>(table: &'a BTreeMap<String, V>, name: &str, key: &str) -> Result<&'a V> {
    table
        .get(key)
        .ok_or_else(|| Error::unknown_key(name, key, table.keys()))
}

impl EffectiveParameters {
    pub fn base_heat_loss(&self, tier: InsulationTier) -> Result<f64> {
        lookup(&self.heat_loss.base_by_insulation, "insulation tier", tier.key()).copied()
    }

    pub fn age_multiplier(&self, age: PropertyAge) -> Result<f64> {
        lookup(&self.heat_loss.age_multiplier, "property age", age.key()).copied()
    }

    pub fn type_multiplier(&self, property_type: PropertyType) -> Result<f64> {
        lookup(
            &self.heat_loss.type_multiplier,
            "property type",
            property_type.key(),
        )
        .copied()
    }

    pub fn window_multiplier(&self, window: WindowArea) -> Result<f64> {
        lookup(&self.heat_loss.window_multiplier, "window area", window.key()).copied()
    }

    pub fn floor_multiplier(&self, floor: FloorType) -> Result<f64> {
        lookup(&self.heat_loss.floor_multiplier, "floor type", floor.key()).copied()
    }

    pub fn room_type_multiplier(&self, room_type: RoomType) -> Result<f64> {
        lookup(
            &self.heat_loss.room_type_multiplier,
            "room type",
            room_type.key(),
        )
        .copied()
    }

    pub fn usage_multiplier(&self, usage: UsagePattern) -> Result<f64> {
        lookup(&self.heat_loss.usage_multiplier, "usage pattern", usage.key()).copied()
    }

    pub fn room_type(&self, room_type: RoomType) -> Result<&RoomTypeInfo> {
        lookup(&self.rooms.types, "room type", room_type.key())
    }

    pub fn size_preset(&self, size: SizePreset) -> Result<SizePresetInfo> {
        lookup(&self.rooms.size_presets, "size preset", size.key()).copied()
    }

    pub fn market(&self, market: Market) -> Result<&MarketParameters> {
        self.markets.get(&market).ok_or_else(|| {
            Error::unknown_key("market", market.key(), self.markets.keys().map(|m| m.key()))
        })
    }

    pub fn heating_system(&self, key: &str) -> Result<&HeatingSystem> {
        lookup(&self.heating_systems, "heating system", key)
    }

    pub fn hours_per_day(&self, pattern: HeatingPattern) -> Result<f64> {
        lookup(&self.running.hours_per_day, "heating pattern", pattern.key()).copied()
    }

    pub fn climate_zone(&self, zone: &str) -> Result<ClimateZone> {
        lookup(&self.climate.zones, "climate zone", zone).copied()
    }

    pub fn co2_factor(&self, market: Market, fuel: FuelType) -> Result<f64> {
        lookup(&self.market(market)?.co2_factors, "CO2 factor", fuel.key()).copied()
    }

    pub fn fuel_price(&self, market: Market, fuel: FuelType) -> Result<FuelPrice> {
        lookup(&self.market(market)?.fuel_prices, "fuel price", fuel.key()).copied()
    }

    /// Legacy SKU catalog for a market, sorted by ascending wattage.
    pub fn panel_catalog(&self, market: Market) -> Result<ProductCatalog> {
        ProductCatalog::new(self.market(market)?.panels.clone())
    }

    /// Reject values that deserialize but would produce meaningless quotes.
    pub fn validate(&self) -> Result<()> {
        let hl = &self.heat_loss;
        for (table, values) in [
            ("heat_loss.base_by_insulation", &hl.base_by_insulation),
            ("heat_loss.age_multiplier", &hl.age_multiplier),
            ("heat_loss.type_multiplier", &hl.type_multiplier),
            ("heat_loss.window_multiplier", &hl.window_multiplier),
            ("heat_loss.floor_multiplier", &hl.floor_multiplier),
            ("heat_loss.room_type_multiplier", &hl.room_type_multiplier),
            ("heat_loss.usage_multiplier", &hl.usage_multiplier),
            ("running.hours_per_day", &self.running.hours_per_day),
        ] {
            for (key, value) in values {
                positive(*value, &format!("{table}.{key}"))?;
            }
        }
        non_negative(hl.external_wall_add_per_wall, "heat_loss.external_wall_add_per_wall")?;
        positive(hl.reference_height_m, "heat_loss.reference_height_m")?;
        non_negative(hl.height_adjust_per_10cm, "heat_loss.height_adjust_per_10cm")?;

        for (market, regions) in &self.climate.multiplier {
            for (region, value) in regions {
                positive(*value, &format!("climate.multiplier.{market}.{region}"))?;
            }
        }
        for (name, zone) in &self.climate.zones {
            positive(zone.heating_days, &format!("climate.zones.{name}.heating_days"))?;
            positive(zone.hours_per_day, &format!("climate.zones.{name}.hours_per_day"))?;
            fraction(zone.duty_cycle, &format!("climate.zones.{name}.duty_cycle"))?;
        }

        for (key, info) in &self.rooms.types {
            fraction(
                info.usable_wall_fraction,
                &format!("rooms.types.{key}.usable_wall_fraction"),
            )?;
        }
        for (key, preset) in &self.rooms.size_presets {
            positive(preset.area_sqm, &format!("rooms.size_presets.{key}.area_sqm"))?;
            positive(preset.height_m, &format!("rooms.size_presets.{key}.height_m"))?;
        }
        let shares = &self.rooms.synthesis.shares;
        for (name, share) in [
            ("living", shares.living),
            ("kitchen", shares.kitchen),
            ("first_bedroom", shares.first_bedroom),
            ("bedroom", shares.bedroom),
            ("bathroom", shares.bathroom),
            ("half_bath", shares.half_bath),
            ("hallway", shares.hallway),
        ] {
            non_negative(share, &format!("rooms.synthesis.shares.{name}"))?;
        }
        positive(self.rooms.synthesis.height_m, "rooms.synthesis.height_m")?;

        let product = &self.product;
        positive(product.watts_per_metre, "product.watts_per_metre")?;
        positive(product.max_piece_length_m, "product.max_piece_length_m")?;
        fraction(product.reduced_coverage_fraction, "product.reduced_coverage_fraction")?;
        fraction(product.sku_match_ratio, "product.sku_match_ratio")?;
        if !(0.0..1.0).contains(&product.insufficient_wall_tolerance) {
            return Err(invalid(format!(
                "product.insufficient_wall_tolerance must be in [0, 1), got {}",
                product.insufficient_wall_tolerance
            )));
        }

        for (market, params) in &self.markets {
            non_negative(
                params.tariffs.electricity,
                &format!("markets.{market}.tariffs.electricity"),
            )?;
            non_negative(params.tariffs.gas, &format!("markets.{market}.tariffs.gas"))?;
            for (fuel, price) in &params.fuel_prices {
                if let FuelPrice::Fixed(value) = price {
                    non_negative(*value, &format!("markets.{market}.fuel_prices.{fuel}"))?;
                }
            }
            for (fuel, factor) in &params.co2_factors {
                non_negative(*factor, &format!("markets.{market}.co2_factors.{fuel}"))?;
            }
            let pricing = &params.pricing;
            for (name, value) in [
                ("price_per_metre", pricing.price_per_metre),
                ("install_per_metre", pricing.install_per_metre),
                ("thermostat", pricing.thermostat),
                ("install_per_panel", pricing.install_per_panel),
            ] {
                non_negative(value, &format!("markets.{market}.pricing.{name}"))?;
            }
            positive(params.base_heating_days, &format!("markets.{market}.base_heating_days"))?;
            ProductCatalog::new(params.panels.clone())?;
        }

        for (key, system) in &self.heating_systems {
            positive(system.efficiency, &format!("heating_systems.{key}.efficiency"))?;
            non_negative(
                system.annual_maintenance,
                &format!("heating_systems.{key}.annual_maintenance"),
            )?;
        }

        let running = &self.running;
        fraction(running.duty_cycle, "running.duty_cycle")?;
        if !(0.0..1.0).contains(&running.zonal_savings) {
            return Err(invalid(format!(
                "running.zonal_savings must be in [0, 1), got {}",
                running.zonal_savings
            )));
        }
        fraction(running.thermostat_efficiency, "running.thermostat_efficiency")?;
        if running.projection_years == 0 {
            return Err(invalid("running.projection_years must be at least 1".to_string()));
        }
        non_negative(running.similar_cost_tolerance, "running.similar_cost_tolerance")?;

        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidParameters { message }
}

fn positive(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{what} must be finite and positive, got {value}")));
    }
    Ok(())
}

fn non_negative(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!(
            "{what} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Value in the half-open unit interval (0, 1].
fn fraction(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(invalid(format!("{what} must be in (0, 1], got {value}")));
    }
    Ok(())
}
