// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooftop garden area, yield and setup cost

use crate::config::GardeningConfig;
use crate::numeric::{non_negative, payback_years, whole};
use serde::Serialize;

pub const SMALL_GARDEN_CROPS: &[&str] = &["Herbs", "Lettuce", "Spinach"];
pub const MEDIUM_GARDEN_CROPS: &[&str] = &["Tomatoes", "Peppers", "Lettuce", "Herbs"];
pub const LARGE_GARDEN_CROPS: &[&str] = &["Tomatoes", "Peppers", "Eggplant", "Beans", "Lettuce"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GardeningEstimate {
    pub plantable_area_sqft: f64,
    pub annual_yield_kg: f64,
    pub setup_cost_usd: f64,
    pub annual_value_usd: f64,
    pub recommended_crops: Vec<String>,
    pub payback_years: f64,
}

/// Crop list for a plantable area, smallest tier first
pub fn recommended_crops(plantable_area_sqft: f64, config: &GardeningConfig) -> &'static [&'static str] {
    let tiers = [
        (config.small_garden_below_sqft, SMALL_GARDEN_CROPS),
        (config.medium_garden_below_sqft, MEDIUM_GARDEN_CROPS),
    ];
    tiers
        .iter()
        .find(|(below, _)| plantable_area_sqft < *below)
        .map(|(_, crops)| *crops)
        .unwrap_or(LARGE_GARDEN_CROPS)
}

/// Garden potential for a usable roof area and daily sunlight
pub fn estimate(usable_area_sqft: f64, sunlight_hours: f64, config: &GardeningConfig) -> GardeningEstimate {
    let plantable = non_negative(usable_area_sqft) * config.plantable_fraction;

    let sunlight_factor = if config.ideal_sunlight_hours > 0.0 {
        (non_negative(sunlight_hours) / config.ideal_sunlight_hours).min(1.0)
    } else {
        1.0
    };
    let annual_yield = plantable * config.yield_kg_per_sqft * sunlight_factor;

    let soil_volume_cuft = plantable * (config.soil_depth_inches / 12.0);
    let soil_cost = soil_volume_cuft * config.soil_cost_usd_per_cuft;
    let setup_cost = whole(soil_cost + plantable * config.setup_cost_usd_per_sqft);

    let annual_value = annual_yield * config.crop_value_usd_per_kg;

    GardeningEstimate {
        plantable_area_sqft: whole(plantable),
        annual_yield_kg: whole(annual_yield),
        setup_cost_usd: setup_cost,
        annual_value_usd: whole(annual_value),
        recommended_crops: recommended_crops(plantable, config)
            .iter()
            .map(|crop| crop.to_string())
            .collect(),
        payback_years: payback_years(setup_cost, annual_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NO_PAYBACK_YEARS;

    #[test]
    fn test_reference_garden() {
        let result = estimate(1000.0, 6.0, &GardeningConfig::default());

        assert_eq!(result.plantable_area_sqft, 300.0);
        assert_eq!(result.annual_yield_kg, 600.0);
        // 300 cuft of soil at $40 plus $15/sqft of beds
        assert_eq!(result.setup_cost_usd, 16500.0);
        assert_eq!(result.annual_value_usd, 1800.0);
        assert_eq!(result.payback_years, 9.2);
        assert_eq!(result.recommended_crops, LARGE_GARDEN_CROPS);
    }

    #[test]
    fn test_low_sunlight_scales_yield() {
        let config = GardeningConfig::default();
        let full = estimate(1000.0, 8.0, &config);
        let half = estimate(1000.0, 3.0, &config);

        assert_eq!(full.annual_yield_kg, 600.0);
        assert_eq!(half.annual_yield_kg, 300.0);
        assert_eq!(half.setup_cost_usd, full.setup_cost_usd);
    }

    #[test]
    fn test_crop_tiers() {
        let config = GardeningConfig::default();
        assert_eq!(recommended_crops(0.0, &config), SMALL_GARDEN_CROPS);
        assert_eq!(recommended_crops(49.9, &config), SMALL_GARDEN_CROPS);
        assert_eq!(recommended_crops(50.0, &config), MEDIUM_GARDEN_CROPS);
        assert_eq!(recommended_crops(150.0, &config), LARGE_GARDEN_CROPS);
    }

    #[test]
    fn test_zero_area() {
        let result = estimate(0.0, 6.0, &GardeningConfig::default());

        assert_eq!(result.plantable_area_sqft, 0.0);
        assert_eq!(result.annual_yield_kg, 0.0);
        assert_eq!(result.setup_cost_usd, 0.0);
        assert_eq!(result.payback_years, NO_PAYBACK_YEARS);
    }
}
