use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use heatene_cli::commands::defaults::handle_defaults;
use heatene_cli::commands::estimate::handle_estimate;
use heatene_cli::commands::products::handle_products;
use heatene_cli::commands::quick::{handle_quick, ProductChoice, QuickCommandArgs};
use heatene_cli::config::load_parameters;
use heatene_cli::output::{write_merge_notes, OutputFormat};
use heatene_cli::terminal::ColorPalette;
use heatene_lib::model::{HeatingPattern, InsulationTier, Market, PropertyAge, PropertyType};
use heatene_lib::UnitSystem;

#[derive(Parser, Debug)]
#[command(author, version, about = "HeatENE skirting heater sizing and running-cost estimates")]
struct Cli {
    /// JSON file of parameter overrides. Falls back to $HEATENE_OVERRIDES, then
    /// the platform config directory.
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate a home described by a JSON request file.
    Estimate {
        /// Path to the request file.
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// CSV of panel products to match instead of the market's built-in list.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Estimate from bedroom and bathroom counts and total floor area.
    Quick(QuickArgs),
    /// Print the effective parameters as JSON.
    Defaults,
    /// List the panel products for a market.
    Products {
        #[arg(long, default_value = "uk")]
        market: Market,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct QuickArgs {
    #[arg(long, default_value = "uk")]
    market: Market,
    #[arg(long = "type", default_value = "semi")]
    property_type: PropertyType,
    #[arg(long, default_value = "1950-1980")]
    age: PropertyAge,
    #[arg(long, default_value = "average")]
    insulation: InsulationTier,
    /// Region key within the market's climate table.
    #[arg(long)]
    region: String,
    /// Key of the heating system being replaced.
    #[arg(long, default_value = "gas-modern")]
    heating: String,
    #[arg(long)]
    bedrooms: u32,
    #[arg(long, default_value_t = 1.0)]
    bathrooms: f64,
    /// Total floor area, in square metres or square feet per --units.
    #[arg(long)]
    area: f64,
    #[arg(long, value_enum, default_value_t = UnitsArg::Metric)]
    units: UnitsArg,
    #[arg(long, default_value = "full")]
    pattern: HeatingPattern,
    /// Named climate zone to take the running profile from.
    #[arg(long)]
    climate_zone: Option<String>,
    /// What the current system costs per year.
    #[arg(long, conflicts_with = "monthly_cost")]
    annual_cost: Option<f64>,
    /// What the current system costs per month.
    #[arg(long)]
    monthly_cost: Option<f64>,
    /// Electricity tariff per kWh, replacing the market default.
    #[arg(long)]
    electricity_tariff: Option<f64>,
    /// Gas tariff per kWh, replacing the market default.
    #[arg(long)]
    gas_tariff: Option<f64>,
    #[arg(long, value_enum, default_value_t = ProductChoice::Skirting)]
    product: ProductChoice,
    /// Leave installation labour out of the investment.
    #[arg(long)]
    no_install: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for UnitSystem {
    fn from(units: UnitsArg) -> Self {
        match units {
            UnitsArg::Metric => UnitSystem::Metric,
            UnitsArg::Imperial => UnitSystem::Imperial,
        }
    }
}

impl From<QuickArgs> for QuickCommandArgs {
    fn from(args: QuickArgs) -> Self {
        Self {
            market: args.market,
            property_type: args.property_type,
            age: args.age,
            insulation: args.insulation,
            region: args.region,
            current_heating: args.heating,
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            area: args.area,
            units: args.units.into(),
            heating_pattern: args.pattern,
            climate_zone: args.climate_zone,
            annual_cost: args.annual_cost,
            monthly_cost: args.monthly_cost,
            electricity_tariff: args.electricity_tariff,
            gas_tariff: args.gas_tariff,
            product: args.product,
            include_installation: !args.no_install,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let resolution = load_parameters(cli.overrides.as_deref())?;
    if !resolution.notes.is_empty() {
        let palette = ColorPalette::detect();
        write_merge_notes(&resolution.notes, &palette, &mut io::stderr().lock())?;
    }
    let params = &resolution.parameters;

    match cli.command {
        Command::Estimate { input, catalog } => {
            handle_estimate(params, &input, catalog.as_deref(), cli.format)
        }
        Command::Quick(args) => handle_quick(params, &args.into(), cli.format),
        Command::Defaults => handle_defaults(params),
        Command::Products { market, catalog } => {
            handle_products(params, market, catalog.as_deref(), cli.format)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
