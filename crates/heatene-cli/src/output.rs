//! Rendering engine results as text or JSON.
//!
//! Formatting only: every number printed here is already computed by the
//! engine, this module rounds and labels it.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use heatene_lib::units::{area_from_canonical, length_from_canonical};
use heatene_lib::{Estimate, MergeNote, Payback, ProductMode, ProductSku, SavingsOutcome};

use crate::terminal::{format_money, ColorPalette};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn write_json<T: Serialize, W: Write>(value: &T, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Print merge notes so operators see which override changed a value's shape.
pub fn write_merge_notes<W: Write>(
    notes: &[MergeNote],
    palette: &ColorPalette,
    out: &mut W,
) -> io::Result<()> {
    for note in notes {
        writeln!(
            out,
            "{}note:{} override at '{}' replaced {} with {}",
            palette.yellow, palette.reset, note.path, note.default_kind, note.override_kind
        )?;
    }
    Ok(())
}

pub fn write_products<W: Write>(
    currency: &str,
    skus: &[ProductSku],
    palette: &ColorPalette,
    out: &mut W,
) -> io::Result<()> {
    writeln!(
        out,
        "{}Available panels ({}):{}",
        palette.white_bold,
        skus.len(),
        palette.reset
    )?;
    writeln!(
        out,
        "{:<22} {:>8} {:>10} {:>8}",
        "Name", "Watts", "Price", "Metres"
    )?;
    for sku in skus {
        writeln!(
            out,
            "{:<22} {:>8.0} {:>10} {:>8.1}",
            sku.name,
            sku.wattage,
            format_money(currency, sku.price),
            sku.metres
        )?;
    }
    Ok(())
}

pub fn write_estimate_text<W: Write>(
    estimate: &Estimate,
    palette: &ColorPalette,
    out: &mut W,
) -> io::Result<()> {
    let p = palette;
    let currency = estimate.currency.as_str();
    let units = estimate.units;
    let money = |amount: f64| format_money(currency, amount);

    let product = match estimate.product {
        ProductMode::Skirting { strategy } => format!("skirting, {} coverage", strategy.key()),
        ProductMode::LegacyPanels => "legacy panels".to_string(),
    };
    writeln!(
        out,
        "{}HeatENE estimate{} {}({}, {}){}",
        p.white_bold, p.reset, p.gray, estimate.market, product, p.reset
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<18} {:>9} {:>6} {:>9} {:>8} {:>6} {:<14} {:>8}",
        "Room",
        format!("Area {}", units.area_label()),
        "Target",
        "Need W",
        format!("Len {}", units.length_label()),
        "Pieces",
        "Panel",
        "Per hour"
    )?;
    for room in &estimate.rooms {
        let plan = &room.coverage.selected;
        let flag = if room.coverage.insufficient_wall {
            format!(" {}insufficient wall{}", p.red, p.reset)
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:<18} {:>9.1} {:>6} {:>9.0} {:>8.1} {:>6} {:<14} {:>8.2}{}",
            room.room.name,
            area_from_canonical(room.room.area_sqm, units),
            format!("{:.0}°C", room.target_temp_c),
            room.heat_loss.required_watts,
            length_from_canonical(plan.metres, units),
            plan.pieces,
            room.coverage.sku.name,
            room.hourly_running_cost,
            flag
        )?;
    }

    let totals = &estimate.totals;
    writeln!(out)?;
    writeln!(
        out,
        "{}Total requirement:{} {:.0} W across {} rooms; installed {:.0} W",
        p.cyan, p.reset, totals.required_watts, totals.room_count, totals.installed_watts
    )?;
    if !totals.insufficient_rooms.is_empty() {
        writeln!(
            out,
            "{}Usable wall too short in:{} {}",
            p.red,
            p.reset,
            totals.insufficient_rooms.join(", ")
        )?;
    }
    if let ProductMode::Skirting { .. } = estimate.product {
        writeln!(
            out,
            "Skirting: {:.1} {} in {} pieces",
            length_from_canonical(totals.metres, units),
            units.length_label(),
            totals.pieces
        )?;
    }

    let investment = &estimate.investment;
    writeln!(out)?;
    writeln!(out, "{}Investment{}", p.white_bold, p.reset)?;
    writeln!(out, "  Equipment     {:>12}", money(investment.equipment))?;
    writeln!(out, "  Installation  {:>12}", money(investment.installation))?;
    writeln!(out, "  Thermostats   {:>12}", money(investment.thermostats))?;
    writeln!(out, "  Total         {:>12}", money(investment.total))?;

    let fin = &estimate.financial;
    let savings_color = match fin.outcome {
        SavingsOutcome::Saving => p.green,
        SavingsOutcome::SimilarCost => p.yellow,
        SavingsOutcome::CostIncrease => p.red,
    };
    let outcome = match fin.outcome {
        SavingsOutcome::Saving => "saving",
        SavingsOutcome::SimilarCost => "similar cost",
        SavingsOutcome::CostIncrease => "cost increase",
    };
    writeln!(out)?;
    writeln!(out, "{}Running costs{}", p.white_bold, p.reset)?;
    writeln!(
        out,
        "  Current system  {:>12} / year",
        money(fin.current_annual_cost)
    )?;
    writeln!(
        out,
        "  HeatENE         {:>12} / year  {}({:.0} kWh){}",
        money(fin.candidate_annual_cost),
        p.gray,
        fin.annual_kwh,
        p.reset
    )?;
    writeln!(
        out,
        "  Savings         {}{:>12}{} / year  ({})",
        savings_color,
        money(fin.annual_savings),
        p.reset,
        outcome
    )?;
    let payback = match fin.payback {
        Payback::Years(years) if years < 1.0 => "<1 year".to_string(),
        Payback::Years(years) => format!("{years:.1} years"),
        Payback::Never => "never".to_string(),
    };
    writeln!(out, "  Payback         {payback:>12}")?;
    let break_even = fin
        .break_even_year
        .map(|y| format!("year {y}"))
        .unwrap_or_else(|| "not within horizon".to_string());
    writeln!(
        out,
        "  {}-year savings {:>12}  (break-even: {})",
        fin.projection.len().saturating_sub(1),
        money(fin.horizon_savings),
        break_even
    )?;

    writeln!(out)?;
    writeln!(out, "{}Emissions{}", p.white_bold, p.reset)?;
    writeln!(out, "  Current  {:>8.0} kg CO2 / year", fin.co2_current_kg)?;
    writeln!(out, "  HeatENE  {:>8.0} kg CO2 / year", fin.co2_candidate_kg)?;
    writeln!(out, "  Change   {:>8.0} kg CO2 / year", -fin.co2_reduction_kg)?;

    writeln!(out)?;
    writeln!(out, "{}Cumulative cost{}", p.white_bold, p.reset)?;
    writeln!(out, "  {:>4} {:>12} {:>12}", "Year", "Current", "HeatENE")?;
    for point in &fin.projection {
        writeln!(
            out,
            "  {:>4} {:>12} {:>12}",
            point.year,
            money(point.current),
            money(point.candidate)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatene_lib::{default_parameters, estimate, EstimateRequest};

    fn render(request: &str) -> String {
        let request: EstimateRequest = serde_json::from_str(request).unwrap();
        let params = default_parameters().unwrap();
        let estimate = estimate(&request, &params).unwrap();
        let mut buf = Vec::new();
        write_estimate_text(&estimate, &ColorPalette::plain(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_report_has_every_section() {
        let text = render(include_str!("../../../docs/fixtures/uk_detailed_request.json"));
        for heading in ["Investment", "Running costs", "Emissions", "Cumulative cost"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("10-year savings"));
        assert!(text.contains("21°C"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn legacy_report_omits_skirting_line() {
        let text = render(include_str!("../../../docs/fixtures/us_quick_request.json"));
        assert!(text.contains("legacy panels"));
        assert!(!text.contains("Skirting:"));
        assert!(text.contains("ft²"));
    }

    #[test]
    fn merge_notes_name_the_path() {
        let notes = vec![MergeNote {
            path: "product".to_string(),
            default_kind: "object",
            override_kind: "string",
        }];
        let mut buf = Vec::new();
        write_merge_notes(&notes, &ColorPalette::plain(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "note: override at 'product' replaced object with string\n"
        );
    }
}
