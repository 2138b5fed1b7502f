// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environmental equivalents of the technology outputs

use crate::config::ImpactConfig;
use crate::numeric::{non_negative, round_to, whole};
use crate::report::AnalysisReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub co2_offset_tons: f64,
    pub trees_equivalent: f64,
    pub cars_off_road: f64,
    pub groundwater_saved_liters: f64,
    /// One-liter bottles
    pub bottles_equivalent: f64,
    pub food_produced_kg: f64,
    pub meals_equivalent: f64,
}

/// CO2 offset (tons, two decimals), trees and cars for a solar yield
pub fn solar_impact(annual_production_kwh: f64, config: &ImpactConfig) -> (f64, f64, f64) {
    let co2_lbs = non_negative(annual_production_kwh) * config.co2_lbs_per_kwh;
    let co2_tons = if config.lbs_per_ton > 0.0 {
        co2_lbs / config.lbs_per_ton
    } else {
        0.0
    };
    let cars = if config.tons_co2_per_car > 0.0 {
        round_to(co2_tons / config.tons_co2_per_car, 2)
    } else {
        0.0
    };

    (
        round_to(co2_tons, 2),
        whole(co2_tons * config.trees_per_ton_co2),
        cars,
    )
}

/// Combine solar, water and food outputs into one impact record
pub fn aggregate(
    annual_production_kwh: f64,
    annual_collection_liters: f64,
    annual_yield_kg: f64,
    config: &ImpactConfig,
) -> EnvironmentalImpact {
    let (co2_offset_tons, trees_equivalent, cars_off_road) = solar_impact(annual_production_kwh, config);
    let liters = whole(annual_collection_liters);
    let food = whole(annual_yield_kg);

    EnvironmentalImpact {
        co2_offset_tons,
        trees_equivalent,
        cars_off_road,
        groundwater_saved_liters: liters,
        bottles_equivalent: liters,
        food_produced_kg: food,
        meals_equivalent: whole(non_negative(annual_yield_kg) * config.meals_per_kg),
    }
}

/// Impact implied by a finished report, whichever advisor produced it
pub fn from_report(report: &AnalysisReport, config: &ImpactConfig) -> EnvironmentalImpact {
    aggregate(
        report.solar.annual_production_kwh,
        report.rainwater.annual_collection_liters,
        report.gardening.annual_yield_kg,
        config,
    )
}
