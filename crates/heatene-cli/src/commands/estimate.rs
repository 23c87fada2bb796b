//! Estimate command: run a request file through the engine.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use heatene_lib::{
    estimate_with_catalog, EffectiveParameters, Estimate, EstimateRequest, ProductCatalog,
};

use crate::config::read_json;
use crate::output::{write_estimate_text, write_json, OutputFormat};
use crate::terminal::ColorPalette;

/// Load a request from `input` and print its estimate.
pub fn handle_estimate(
    params: &EffectiveParameters,
    input: &Path,
    catalog: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let value = read_json(input)?;
    let request: EstimateRequest = serde_json::from_value(value)
        .with_context(|| format!("{} is not a valid estimate request", input.display()))?;
    let estimate = run_request(params, &request, catalog)?;
    print_estimate(&estimate, format)
}

/// Run `request`, matching panels from `catalog` when given.
pub fn run_request(
    params: &EffectiveParameters,
    request: &EstimateRequest,
    catalog: Option<&Path>,
) -> Result<Estimate> {
    let catalog = match catalog {
        Some(path) => ProductCatalog::from_path(path)
            .with_context(|| format!("failed to load product catalog from {}", path.display()))?,
        None => params.panel_catalog(request.property.market)?,
    };
    estimate_with_catalog(request, params, &catalog).context("estimate failed")
}

pub fn print_estimate(estimate: &Estimate, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => write_json(estimate, &mut out)?,
        OutputFormat::Text => write_estimate_text(estimate, &ColorPalette::detect(), &mut out)?,
    }
    out.flush()?;
    Ok(())
}
