//! Quick command: estimate from room counts and floor area alone.

use anyhow::{bail, Result};
use clap::ValueEnum;

use heatene_lib::model::{
    HeatingPattern, InsulationTier, Market, PropertyAge, PropertyProfile, PropertyType,
};
use heatene_lib::{
    CoverageStrategy, CurrentCost, EffectiveParameters, EstimateRequest, ProductMode, RoomsInput,
    TariffOverrides, UnitSystem,
};

use crate::commands::estimate::{print_estimate, run_request};
use crate::output::OutputFormat;

/// Product configuration to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProductChoice {
    /// Skirting on all usable wall.
    #[default]
    Skirting,
    /// Skirting on a reduced share of usable wall.
    Reduced,
    /// Legacy fixed-wattage panels.
    Panels,
}

impl From<ProductChoice> for ProductMode {
    fn from(choice: ProductChoice) -> Self {
        match choice {
            ProductChoice::Skirting => ProductMode::Skirting {
                strategy: CoverageStrategy::Maximum,
            },
            ProductChoice::Reduced => ProductMode::Skirting {
                strategy: CoverageStrategy::Reduced,
            },
            ProductChoice::Panels => ProductMode::LegacyPanels,
        }
    }
}

/// Arguments for the quick command.
#[derive(Debug, Clone)]
pub struct QuickCommandArgs {
    pub market: Market,
    pub property_type: PropertyType,
    pub age: PropertyAge,
    pub insulation: InsulationTier,
    pub region: String,
    pub current_heating: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    /// Total floor area in `units`.
    pub area: f64,
    pub units: UnitSystem,
    pub heating_pattern: HeatingPattern,
    pub climate_zone: Option<String>,
    pub annual_cost: Option<f64>,
    pub monthly_cost: Option<f64>,
    pub electricity_tariff: Option<f64>,
    pub gas_tariff: Option<f64>,
    pub product: ProductChoice,
    pub include_installation: bool,
}

impl QuickCommandArgs {
    /// Convert CLI args to a library request.
    pub fn to_request(&self) -> Result<EstimateRequest> {
        let current_cost = match (self.annual_cost, self.monthly_cost) {
            (Some(_), Some(_)) => bail!("pass at most one of --annual-cost and --monthly-cost"),
            (Some(amount), None) => CurrentCost::Annual { amount },
            (None, Some(amount)) => CurrentCost::Monthly { amount },
            (None, None) => CurrentCost::Modelled,
        };
        Ok(EstimateRequest {
            property: PropertyProfile {
                market: self.market,
                property_type: self.property_type,
                age: self.age,
                insulation: self.insulation,
                region: self.region.clone(),
                current_heating: self.current_heating.clone(),
            },
            units: self.units,
            rooms: RoomsInput::Quick {
                bedrooms: self.bedrooms,
                bathrooms: self.bathrooms,
                total_area: self.area,
            },
            heating_pattern: self.heating_pattern,
            climate_zone: self.climate_zone.clone(),
            current_cost,
            tariffs: TariffOverrides {
                electricity: self.electricity_tariff,
                gas: self.gas_tariff,
            },
            product: self.product.into(),
            include_installation: self.include_installation,
        })
    }
}

pub fn handle_quick(
    params: &EffectiveParameters,
    args: &QuickCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let request = args.to_request()?;
    let estimate = run_request(params, &request, None)?;
    print_estimate(&estimate, format)
}
