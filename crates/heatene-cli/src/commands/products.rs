//! Products command: list the legacy panel catalog for a market.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use heatene_lib::model::Market;
use heatene_lib::{EffectiveParameters, ProductCatalog, ProductSku};

use crate::output::{write_json, write_products, OutputFormat};
use crate::terminal::ColorPalette;

#[derive(Debug, Serialize)]
struct ProductListing<'a> {
    market: Market,
    currency: &'a str,
    products: &'a [ProductSku],
}

pub fn handle_products(
    params: &EffectiveParameters,
    market: Market,
    catalog: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let currency = params.market(market)?.currency.as_str();
    let catalog = match catalog {
        Some(path) => ProductCatalog::from_path(path)
            .with_context(|| format!("failed to load product catalog from {}", path.display()))?,
        None => params.panel_catalog(market)?,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => write_json(
            &ProductListing {
                market,
                currency,
                products: catalog.skus(),
            },
            &mut out,
        )?,
        OutputFormat::Text => {
            write_products(currency, catalog.skus(), &ColorPalette::detect(), &mut out)?
        }
    }
    out.flush()?;
    Ok(())
}
