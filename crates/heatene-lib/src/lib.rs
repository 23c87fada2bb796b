//! HeatENE estimation engine.
//!
//! This crate sizes skirting heaters for a home and projects what they cost
//! to buy and run compared with the heating already installed. It is pure:
//! every function takes its inputs and an [`EffectiveParameters`] value and
//! returns a plain record. Reading overrides or requests from disk and
//! rendering results is left to callers such as the CLI.
//!

pub mod catalog;
pub mod config;
pub mod coverage;
pub mod error;
pub mod estimate;
pub mod financial;
pub mod heat_loss;
pub mod model;
pub mod rooms;
pub mod units;

pub use catalog::{ProductCatalog, ProductSku};
pub use config::{
    default_parameters, defaults, resolve, resolve_with_notes, EffectiveParameters, MergeNote,
    Resolution,
};
pub use coverage::{select_coverage, CoverageResult, CoverageStrategy, StrategyPlan};
pub use error::{Error, Result};
pub use estimate::{
    estimate, estimate_with_catalog, Estimate, EstimateRequest, Investment, ProductMode,
    RoomsInput, TariffOverrides,
};
pub use financial::{project, CurrentCost, FinancialResult, Payback, SavingsOutcome};
pub use heat_loss::{estimate_watts, Factor, HeatLossResult};
pub use model::{PropertyProfile, Room, RoomGeometry, RoomSpec};
pub use rooms::{aggregate, synthesize_rooms, HomeTotals, RoomEstimate};
pub use units::UnitSystem;
