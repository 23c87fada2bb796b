//! Running cost, emissions and payback projection.
//!
//! The candidate system is billed at the electricity tariff on an annual kWh
//! figure derived from its rated wattage and a running profile. The current
//! system's cost is either reported by the customer or modelled from the same
//! heat demand, so both sides of the comparison share one kWh basis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EffectiveParameters, Tariffs};
use crate::error::{Error, Result};
use crate::heat_loss::climate_multiplier;
use crate::model::{FuelType, HeatingPattern, PropertyProfile};

/// Denominators at or below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// How the customer's current heating spend is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentCost {
    Annual { amount: f64 },
    Monthly { amount: f64 },
    /// Derived from the candidate's heat demand and the current system's
    /// efficiency, fuel price and maintenance.
    Modelled,
}

/// Hours, days and duty cycle the annual energy figure is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunningProfile {
    pub hours_per_day: f64,
    pub heating_days: f64,
    pub duty_cycle: f64,
    pub zonal_savings: f64,
    pub thermostat_efficiency: f64,
}

impl RunningProfile {
    /// Heat a load of `watts` delivers over a year, before any control savings.
    pub fn demand_kwh(&self, watts: f64) -> f64 {
        watts / 1000.0 * self.hours_per_day * self.heating_days * self.duty_cycle
    }

    /// Share of the demand the product actually bills once zoning and
    /// thermostat control are applied.
    pub fn control_factor(&self) -> f64 {
        (1.0 - self.zonal_savings) * self.thermostat_efficiency
    }

    /// Annual consumption of the product at `watts` under this profile.
    pub fn annual_kwh(&self, watts: f64) -> f64 {
        self.demand_kwh(watts) * self.control_factor()
    }
}

/// Build the running profile for a property.
///
/// A named climate zone supplies its calibrated triple directly; otherwise the
/// household heating pattern sets the hours and heating days scale with the
/// region's climate multiplier.
pub fn running_profile(
    property: &PropertyProfile,
    heating_pattern: HeatingPattern,
    climate_zone: Option<&str>,
    params: &EffectiveParameters,
) -> Result<RunningProfile> {
    let running = &params.running;
    let (hours_per_day, heating_days, duty_cycle) = match climate_zone {
        Some(zone) => {
            let zone = params.climate_zone(zone)?;
            (zone.hours_per_day, zone.heating_days, zone.duty_cycle)
        }
        None => {
            let base_days = params.market(property.market)?.base_heating_days;
            let climate = climate_multiplier(property, params)?;
            (
                params.hours_per_day(heating_pattern)?,
                (base_days * climate).round(),
                running.duty_cycle,
            )
        }
    };
    Ok(RunningProfile {
        hours_per_day,
        heating_days,
        duty_cycle,
        zonal_savings: running.zonal_savings,
        thermostat_efficiency: running.thermostat_efficiency,
    })
}

/// Years to recover the investment, or never.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Years(f64),
    Never,
}

impl Payback {
    pub fn years(self) -> Option<f64> {
        match self {
            Payback::Years(years) => Some(years),
            Payback::Never => None,
        }
    }
}

/// Direction of the annual cost change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavingsOutcome {
    Saving,
    SimilarCost,
    CostIncrease,
}

impl SavingsOutcome {
    /// Classify `savings`; anything within `tolerance` of zero is similar cost.
    pub fn classify(savings: f64, tolerance: f64) -> Self {
        if savings > tolerance {
            SavingsOutcome::Saving
        } else if savings < -tolerance {
            SavingsOutcome::CostIncrease
        } else {
            SavingsOutcome::SimilarCost
        }
    }
}

/// Cumulative spend at the end of `year`; year 0 is before any running cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub current: f64,
    pub candidate: f64,
}

/// Inputs to [`project`].
#[derive(Debug, Clone, Copy)]
pub struct ProjectionRequest<'a> {
    /// Rated wattage of the installed product across the home.
    pub total_watts: f64,
    pub property: &'a PropertyProfile,
    pub heating_pattern: HeatingPattern,
    pub climate_zone: Option<&'a str>,
    pub current_cost: CurrentCost,
    pub tariffs: Tariffs,
    /// Up-front cost of the candidate system.
    pub investment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialResult {
    pub profile: RunningProfile,
    /// Heat demand both systems must meet.
    pub demand_kwh: f64,
    /// Candidate system consumption after control savings.
    pub annual_kwh: f64,
    /// Current system consumption, implied from cost or modelled.
    pub current_kwh: f64,
    pub current_annual_cost: f64,
    pub candidate_annual_cost: f64,
    /// Signed; negative when the candidate costs more to run.
    pub annual_savings: f64,
    pub outcome: SavingsOutcome,
    pub investment: f64,
    pub payback: Payback,
    pub co2_current_kg: f64,
    pub co2_candidate_kg: f64,
    /// Signed; negative when the candidate emits more.
    pub co2_reduction_kg: f64,
    pub projection: Vec<ProjectionPoint>,
    /// Current minus candidate cumulative cost at the end of the horizon.
    pub horizon_savings: f64,
    /// First year the candidate's cumulative cost is no higher than the current system's.
    pub break_even_year: Option<u32>,
}

/// Project running costs, emissions and payback for the candidate system.
pub fn project(
    request: &ProjectionRequest<'_>,
    params: &EffectiveParameters,
) -> Result<FinancialResult> {
    let property = request.property;
    check_amount(request.total_watts, "total wattage")?;
    check_amount(request.investment, "investment")?;
    check_amount(request.tariffs.electricity, "electricity tariff")?;
    check_amount(request.tariffs.gas, "gas tariff")?;

    let profile = running_profile(
        property,
        request.heating_pattern,
        request.climate_zone,
        params,
    )?;
    let demand_kwh = profile.demand_kwh(request.total_watts);
    let annual_kwh = demand_kwh * profile.control_factor();
    let candidate_annual_cost = annual_kwh * request.tariffs.electricity;

    let system = params.heating_system(&property.current_heating)?;
    let fuel_price = params
        .fuel_price(property.market, system.fuel)?
        .per_kwh(&request.tariffs);

    let (current_annual_cost, current_kwh) = match request.current_cost {
        CurrentCost::Annual { amount } => {
            check_amount(amount, "annual heating cost")?;
            (amount, implied_kwh(amount, fuel_price)?)
        }
        CurrentCost::Monthly { amount } => {
            check_amount(amount, "monthly heating cost")?;
            let annual = amount * 12.0;
            (annual, implied_kwh(annual, fuel_price)?)
        }
        CurrentCost::Modelled => {
            if system.efficiency <= DEGENERATE_EPSILON {
                return Err(Error::Degenerate {
                    quantity: "current system consumption".to_string(),
                    message: format!("heating system '{}' has zero efficiency", system.name),
                });
            }
            // Zoning and thermostat savings belong to the product only.
            let kwh = demand_kwh / system.efficiency;
            (kwh * fuel_price + system.annual_maintenance, kwh)
        }
    };

    let annual_savings = current_annual_cost - candidate_annual_cost;
    let outcome = SavingsOutcome::classify(annual_savings, params.running.similar_cost_tolerance);
    let payback = if annual_savings > 0.0 {
        Payback::Years(request.investment / annual_savings)
    } else {
        Payback::Never
    };

    let co2_current_kg = current_kwh * params.co2_factor(property.market, system.fuel)?;
    let co2_candidate_kg =
        annual_kwh * params.co2_factor(property.market, FuelType::Electricity)?;

    let projection = projection_series(
        params.running.projection_years,
        current_annual_cost,
        candidate_annual_cost,
        request.investment,
    );
    let horizon_savings = projection
        .last()
        .map(|p| p.current - p.candidate)
        .unwrap_or(-request.investment);
    let break_even_year = projection
        .iter()
        .find(|p| p.candidate <= p.current)
        .map(|p| p.year);

    debug!(
        annual_kwh,
        current_annual_cost,
        candidate_annual_cost,
        annual_savings,
        investment = request.investment,
        "projected running costs"
    );

    Ok(FinancialResult {
        profile,
        demand_kwh,
        annual_kwh,
        current_kwh,
        current_annual_cost,
        candidate_annual_cost,
        annual_savings,
        outcome,
        investment: request.investment,
        payback,
        co2_current_kg,
        co2_candidate_kg,
        co2_reduction_kg: co2_current_kg - co2_candidate_kg,
        projection,
        horizon_savings,
        break_even_year,
    })
}

/// Cumulative cost for years `0..=horizon`, the candidate starting at `investment`.
pub fn projection_series(
    horizon: u32,
    current_annual_cost: f64,
    candidate_annual_cost: f64,
    investment: f64,
) -> Vec<ProjectionPoint> {
    (0..=horizon)
        .map(|year| {
            let n = f64::from(year);
            ProjectionPoint {
                year,
                current: n * current_annual_cost,
                candidate: investment + n * candidate_annual_cost,
            }
        })
        .collect()
}

/// Cost of running `watts` for one heating hour at the given duty cycle.
pub fn hourly_running_cost(watts: f64, electricity_tariff: f64, duty_cycle: f64) -> f64 {
    watts / 1000.0 * electricity_tariff * duty_cycle
}

/// Energy bought for `annual_cost` at `price_per_kwh`.
pub fn implied_kwh(annual_cost: f64, price_per_kwh: f64) -> Result<f64> {
    if !price_per_kwh.is_finite() || price_per_kwh <= DEGENERATE_EPSILON {
        return Err(Error::Degenerate {
            quantity: "implied current-system kWh".to_string(),
            message: format!("fuel price per kWh is {price_per_kwh}"),
        });
    }
    Ok(annual_cost / price_per_kwh)
}

fn check_amount(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_input(format!(
            "{what} must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}
