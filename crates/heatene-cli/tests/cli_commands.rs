//! End-to-end tests for the `heatene` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
}

/// Quiet, uncoloured command with no ambient overrides.
fn heatene() -> Command {
    let mut cmd = cargo_bin_cmd!("heatene");
    cmd.env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .env_remove("HEATENE_OVERRIDES");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run heatene");
    assert!(
        output.status.success(),
        "heatene failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn estimate_prints_text_report() {
    heatene()
        .args(["estimate", "--input"])
        .arg(fixture("uk_detailed_request.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("HeatENE estimate"))
        .stdout(predicate::str::contains("Kitchen Diner"))
        .stdout(predicate::str::contains("Investment"))
        .stdout(predicate::str::contains("Cumulative cost"))
        .stdout(predicate::str::contains("£"));
}

#[test]
fn estimate_json_has_rooms_and_projection() {
    let json = stdout_json(
        heatene()
            .args(["--format", "json", "estimate", "--input"])
            .arg(fixture("uk_detailed_request.json")),
    );
    assert_eq!(json["market"], "uk");
    assert_eq!(json["rooms"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        json["financial"]["projection"].as_array().map(Vec::len),
        Some(11)
    );
    assert!(json["totals"]["required_watts"].as_f64().unwrap() > 0.0);
}

#[test]
fn estimate_with_replacement_catalog() {
    let json = stdout_json(
        heatene()
            .args(["--format", "json", "estimate", "--input"])
            .arg(fixture("us_quick_request.json"))
            .arg("--catalog")
            .arg(fixture("products.csv")),
    );
    let names: Vec<&str> = json["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["coverage"]["sku"]["name"].as_str().unwrap())
        .collect();
    let catalog = ["HeatENE Compact 300", "HeatENE 500", "HeatENE 750", "HeatENE 1200"];
    assert!(names.iter().all(|n| catalog.contains(n)), "{names:?}");
}

#[test]
fn overrides_flag_changes_parameters() {
    let json = stdout_json(
        heatene()
            .arg("--overrides")
            .arg(fixture("overrides.json"))
            .arg("defaults"),
    );
    assert_eq!(json["product"]["watts_per_metre"], 75.0);
    assert_eq!(json["markets"]["uk"]["tariffs"]["electricity"], 0.245);
    assert_eq!(json["climate"]["multiplier"]["uk"]["isle-of-man"], 1.07);
}

#[test]
fn overrides_env_is_honoured() {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("overrides.json");
    fs::write(&path, r#"{"running": {"projection_years": 5}}"#).expect("write overrides");

    let json = stdout_json(
        heatene()
            .env("HEATENE_OVERRIDES", &path)
            .args(["--format", "json", "estimate", "--input"])
            .arg(fixture("uk_detailed_request.json")),
    );
    assert_eq!(
        json["financial"]["projection"].as_array().map(Vec::len),
        Some(6)
    );
}

#[test]
fn shape_change_is_noted_on_stderr() {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("overrides.json");
    fs::write(&path, r#"{"markets": {"uk": {"fuel_prices": {"oil": {"tariff": "gas"}}}}}"#)
        .expect("write overrides");

    heatene()
        .arg("--overrides")
        .arg(&path)
        .arg("defaults")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "override at 'markets.uk.fuel_prices.oil' replaced number with object",
        ));
}

#[test]
fn schema_mismatch_is_rejected() {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("overrides.json");
    fs::write(&path, r#"{"product": "none"}"#).expect("write overrides");

    heatene()
        .arg("--overrides")
        .arg(&path)
        .arg("defaults")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve effective parameters"));
}

#[test]
fn missing_overrides_file_fails() {
    heatene()
        .args(["--overrides", "/nonexistent/heatene/overrides.json", "defaults"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn quick_reports_json_totals() {
    let json = stdout_json(heatene().args([
        "--format",
        "json",
        "quick",
        "--region",
        "wales",
        "--bedrooms",
        "2",
        "--area",
        "75",
        "--annual-cost",
        "1400",
        "--product",
        "reduced",
    ]));
    // living, kitchen, two bedrooms, bathroom, hallway
    assert_eq!(json["totals"]["room_count"], 6);
    assert_eq!(json["product"]["strategy"], "reduced");
    let area = json["totals"]["area_sqm"].as_f64().unwrap();
    assert!((area - 75.0).abs() < 1e-6);
}

#[test]
fn quick_unknown_region_fails_with_suggestion() {
    heatene()
        .args([
            "quick",
            "--region",
            "walse",
            "--bedrooms",
            "2",
            "--area",
            "75",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown climate region key: walse"))
        .stderr(predicate::str::contains("wales"));
}

#[test]
fn quick_rejects_unknown_market() {
    heatene()
        .args(["quick", "--market", "fr", "--region", "x", "--bedrooms", "1", "--area", "40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown market key: fr"));
}

#[test]
fn quick_rejects_both_costs() {
    heatene()
        .args([
            "quick",
            "--region",
            "wales",
            "--bedrooms",
            "1",
            "--area",
            "40",
            "--annual-cost",
            "900",
            "--monthly-cost",
            "80",
        ])
        .assert()
        .failure();
}

#[test]
fn products_lists_market_panels() {
    heatene()
        .args(["products", "--market", "us"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available panels (4):"))
        .stdout(predicate::str::contains("$"));
}

#[test]
fn products_json_from_catalog_file() {
    let json = stdout_json(
        heatene()
            .args(["--format", "json", "products", "--catalog"])
            .arg(fixture("products.csv")),
    );
    assert_eq!(json["currency"], "GBP");
    assert_eq!(json["products"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["products"][0]["name"], "HeatENE Compact 300");
}
