//! Whole-home estimate: the one entry point most callers need.
//!
//! A request names the property, its rooms (or enough to synthesize them),
//! how the home is heated today and which product configuration to price.
//! The estimate runs every room through heat loss and coverage, prices the
//! investment and projects running costs against the current system.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::ProductCatalog;
use crate::config::{EffectiveParameters, Tariffs};
use crate::coverage::{select_coverage, CoverageStrategy};
use crate::error::{Error, Result};
use crate::financial::{
    hourly_running_cost, project, running_profile, CurrentCost, FinancialResult,
    ProjectionRequest,
};
use crate::heat_loss::estimate_watts;
use crate::model::{HeatingPattern, Market, PropertyProfile, Room, RoomSpec};
use crate::rooms::{aggregate, synthesize_rooms, HomeTotals, RoomEstimate};
use crate::units::{area_to_canonical, UnitSystem};

/// Rooms as collected, or the counts needed to synthesize them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomsInput {
    Detailed {
        rooms: Vec<RoomSpec>,
    },
    Quick {
        bedrooms: u32,
        /// Whole and half bathrooms, e.g. `1.5`.
        bathrooms: f64,
        /// Total heated floor area in the request's unit system.
        total_area: f64,
    },
}

/// Which product the investment is priced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductMode {
    Skirting {
        #[serde(default)]
        strategy: CoverageStrategy,
    },
    /// Fixed-wattage panels matched per room from the catalog.
    LegacyPanels,
}

impl Default for ProductMode {
    fn default() -> Self {
        ProductMode::Skirting {
            strategy: CoverageStrategy::Maximum,
        }
    }
}

/// Tariffs the customer supplied; unset values use the market defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<f64>,
}

impl TariffOverrides {
    pub fn apply(self, defaults: Tariffs) -> Tariffs {
        Tariffs {
            electricity: self.electricity.unwrap_or(defaults.electricity),
            gas: self.gas.unwrap_or(defaults.gas),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimateRequest {
    pub property: PropertyProfile,
    #[serde(default)]
    pub units: UnitSystem,
    pub rooms: RoomsInput,
    pub heating_pattern: HeatingPattern,
    /// Named climate zone whose calibrated profile replaces the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate_zone: Option<String>,
    pub current_cost: CurrentCost,
    #[serde(default)]
    pub tariffs: TariffOverrides,
    #[serde(default)]
    pub product: ProductMode,
    #[serde(default = "default_true")]
    pub include_installation: bool,
}

/// Up-front cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Investment {
    pub equipment: f64,
    pub installation: f64,
    pub thermostats: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub market: Market,
    pub currency: String,
    pub units: UnitSystem,
    pub product: ProductMode,
    pub tariffs: Tariffs,
    pub rooms: Vec<RoomEstimate>,
    pub totals: HomeTotals,
    pub investment: Investment,
    pub financial: FinancialResult,
}

/// Run a full estimate against the market's built-in panel catalog.
pub fn estimate(request: &EstimateRequest, params: &EffectiveParameters) -> Result<Estimate> {
    let catalog = params.panel_catalog(request.property.market)?;
    estimate_with_catalog(request, params, &catalog)
}

/// Run a full estimate, matching legacy panels from `catalog`.
pub fn estimate_with_catalog(
    request: &EstimateRequest,
    params: &EffectiveParameters,
    catalog: &ProductCatalog,
) -> Result<Estimate> {
    let property = &request.property;
    let market = params.market(property.market)?;
    let tariffs = request.tariffs.apply(market.tariffs);

    let rooms = build_rooms(request, params)?;
    info!(
        market = %property.market,
        rooms = rooms.len(),
        "running estimate"
    );

    let profile = running_profile(
        property,
        request.heating_pattern,
        request.climate_zone.as_deref(),
        params,
    )?;
    let strategy = match request.product {
        ProductMode::Skirting { strategy } => strategy,
        ProductMode::LegacyPanels => CoverageStrategy::Maximum,
    };

    let mut estimates = Vec::with_capacity(rooms.len());
    for room in rooms {
        let heat_loss = estimate_watts(&room, property, params)?;
        let coverage = select_coverage(heat_loss.required_watts, &room, params, strategy, catalog)?;
        let installed_watts = match request.product {
            ProductMode::Skirting { .. } => coverage.selected.delivered_watts,
            ProductMode::LegacyPanels => coverage.sku.wattage,
        };
        let target_temp_c = params.room_type(room.room_type)?.target_temp_c;
        estimates.push(RoomEstimate {
            target_temp_c,
            hourly_running_cost: hourly_running_cost(
                installed_watts,
                tariffs.electricity,
                profile.duty_cycle,
            ),
            room,
            heat_loss,
            coverage,
            installed_watts,
        });
    }

    let totals = aggregate(&estimates);
    let investment = price_investment(request, params, &totals)?;
    debug!(
        total_watts = totals.installed_watts,
        investment = investment.total,
        "priced investment"
    );

    let financial = project(
        &ProjectionRequest {
            total_watts: totals.installed_watts,
            property,
            heating_pattern: request.heating_pattern,
            climate_zone: request.climate_zone.as_deref(),
            current_cost: request.current_cost,
            tariffs,
            investment: investment.total,
        },
        params,
    )?;

    Ok(Estimate {
        market: property.market,
        currency: market.currency.clone(),
        units: request.units,
        product: request.product,
        tariffs,
        rooms: estimates,
        totals,
        investment,
        financial,
    })
}

/// Canonical room list for the request.
fn build_rooms(request: &EstimateRequest, params: &EffectiveParameters) -> Result<Vec<Room>> {
    match &request.rooms {
        RoomsInput::Detailed { rooms } => {
            if rooms.is_empty() {
                return Err(Error::invalid_input("at least one room is required"));
            }
            rooms
                .iter()
                .map(|spec| spec.to_room(request.units, params))
                .collect()
        }
        RoomsInput::Quick {
            bedrooms,
            bathrooms,
            total_area,
        } => {
            let total_area_sqm = area_to_canonical(*total_area, request.units);
            synthesize_rooms(*bedrooms, *bathrooms, total_area_sqm, params)?
                .iter()
                .map(|spec| spec.to_room(UnitSystem::Metric, params))
                .collect()
        }
    }
}

fn price_investment(
    request: &EstimateRequest,
    params: &EffectiveParameters,
    totals: &HomeTotals,
) -> Result<Investment> {
    let pricing = &params.market(request.property.market)?.pricing;
    let rooms = totals.room_count as f64;

    let (equipment, installation, thermostats) = match request.product {
        ProductMode::Skirting { .. } => (
            totals.metres * pricing.price_per_metre,
            totals.metres * pricing.install_per_metre,
            rooms * pricing.thermostat,
        ),
        ProductMode::LegacyPanels => (
            totals.panel_price,
            totals.panel_count as f64 * pricing.install_per_panel,
            0.0,
        ),
    };
    let installation = if request.include_installation {
        installation
    } else {
        0.0
    };

    Ok(Investment {
        equipment,
        installation,
        thermostats,
        total: equipment + installation + thermostats,
    })
}
