// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: analyse a rooftop photo offline
//!
//! Runs segmentation, feature extraction and the local synthesizer, with
//! climate estimated from latitude when coordinates are given.
//!
//! Usage:
//!   rooftop-analyze <image_path> [options]

use anyhow::{bail, Context, Result};
use rooftop_engine::climate::{estimate_annual_rainfall, estimate_solar_irradiance};
use rooftop_engine::{AnalysisConfig, AnalysisEngine, ClimateContext, LocationRecord};
use std::env;
use std::fs;
use tracing_subscriber::EnvFilter;

struct Options {
    image_path: String,
    lat: Option<f64>,
    lon: Option<f64>,
    rainfall_mm: Option<f64>,
    irradiance: Option<f64>,
    config_path: Option<String>,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        image_path: args[1].clone(),
        lat: None,
        lon: None,
        rainfall_mm: None,
        irradiance: None,
        config_path: None,
        json: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--lat" => options.lat = Some(next_value(args, &mut i)?.parse().context("Invalid --lat")?),
            "--lon" => options.lon = Some(next_value(args, &mut i)?.parse().context("Invalid --lon")?),
            "--rainfall" => {
                options.rainfall_mm = Some(next_value(args, &mut i)?.parse().context("Invalid --rainfall")?)
            }
            "--irradiance" => {
                options.irradiance = Some(next_value(args, &mut i)?.parse().context("Invalid --irradiance")?)
            }
            "--config" => options.config_path = Some(next_value(args, &mut i)?.to_string()),
            "--json" => options.json = true,
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(options)
}

/// Advance past a flag and return its value
fn next_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("Missing value for {}", flag))
}

fn print_usage() {
    println!("Usage: rooftop-analyze <image_path> [options]");
    println!();
    println!("Options:");
    println!("  --lat <deg>          Latitude (climate estimated from it)");
    println!("  --lon <deg>          Longitude");
    println!("  --rainfall <mm>      Annual rainfall override");
    println!("  --irradiance <kWh>   Daily solar irradiance override (kWh/m2/day)");
    println!("  --config <path>      JSON analysis config override");
    println!("  --json               Print the full result as JSON");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }
    let options = parse_args(&args)?;

    let config = match &options.config_path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let engine = AnalysisEngine::new(config);

    let bytes = fs::read(&options.image_path)
        .with_context(|| format!("Cannot read image '{}'", options.image_path))?;
    let grayscale = rooftop_vision::decode_grayscale(&bytes)
        .with_context(|| format!("Cannot decode image '{}'", options.image_path))?;

    let mut climate = ClimateContext::default();
    let location = match (options.lat, options.lon) {
        (Some(lat), Some(lon)) => {
            climate.solar_irradiance = estimate_solar_irradiance(lat, climate.cloud_cover_percent);
            climate.annual_rainfall_mm = estimate_annual_rainfall(lat);
            LocationRecord::from_coordinates(lat, lon)
        }
        (None, None) => LocationRecord::default(),
        _ => bail!("--lat and --lon must be given together"),
    };
    if let Some(rainfall) = options.rainfall_mm {
        climate.annual_rainfall_mm = rainfall;
    }
    if let Some(irradiance) = options.irradiance {
        climate.solar_irradiance = irradiance;
    }

    let result = engine.analyze_locally(&grayscale, climate, location)?;

    if options.json {
        let output = serde_json::json!({
            "features": result.roof.features,
            "report": result.report,
            "impact": result.impact,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let f = &result.roof.features;
    let r = &result.report;

    println!("=== Rooftop Analysis: {} ===", options.image_path);
    println!();
    println!("Roof");
    println!("  Image size:   {}x{} px", result.roof.image_width, result.roof.image_height);
    println!("  Roof area:    {} sqft ({} usable)", f.roof_area_sqft, f.usable_area_sqft);
    println!("  Orientation:  {}", f.orientation);
    println!("  Material:     {}", f.roof_material);
    println!("  Slope:        {}", f.roof_slope);
    println!("  Shading:      {:.1}%", f.shading_percent);
    println!("  Obstacles:    {}", f.obstacle_count);
    println!("  Complexity:   {}/10", f.complexity_score);
    println!();
    println!(
        "Solar       {:>4}/10  {} panels, {} kW, {} kWh/yr, payback {} yrs",
        r.solar.suitability_score,
        r.solar.panel_count,
        r.solar.system_size_kw,
        r.solar.annual_production_kwh,
        r.solar.payback_years
    );
    println!(
        "Rainwater   {:>4}/10  {} L/yr, {} L tank, payback {} yrs",
        r.rainwater.suitability_score,
        r.rainwater.annual_collection_liters,
        r.rainwater.tank_size_needed_liters,
        r.rainwater.payback_years
    );
    println!(
        "Gardening   {:>4}/10  {} sqft, {} kg/yr, crops: {}",
        r.gardening.suitability_score,
        r.gardening.plantable_area_sqft,
        r.gardening.annual_yield_kg,
        r.gardening.recommended_crops.join(", ")
    );
    println!();
    println!(
        "Best: {} (combined {}/10). {}",
        r.overall.best_technology, r.overall.combined_score, r.overall.recommendation
    );
    println!(
        "Investment ${}, savings ${}/yr, CO2 offset {} t/yr",
        r.overall.total_investment_usd,
        r.overall.total_annual_savings_usd,
        result.impact.co2_offset_tons
    );

    Ok(())
}
