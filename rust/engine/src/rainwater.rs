// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rainwater harvesting volume and cost

use crate::config::RainwaterConfig;
use crate::numeric::{non_negative, payback_years, whole};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainwaterEstimate {
    pub annual_collection_liters: f64,
    pub tank_size_liters: f64,
    /// Tank plus fixed fittings
    pub installation_cost_usd: f64,
    pub annual_savings_usd: f64,
    pub payback_years: f64,
    pub self_sufficiency_percent: f64,
}

/// Whole liters collected per year from a catchment
///
/// One millimetre of rain on one square metre is one liter.
pub fn annual_collection(catchment_sqft: f64, annual_rainfall_mm: f64, config: &RainwaterConfig) -> f64 {
    let catchment_m2 = non_negative(catchment_sqft) * config.sqm_per_sqft;
    whole(catchment_m2 * non_negative(annual_rainfall_mm) * config.collection_efficiency)
}

/// Tank sizing, cost and savings for an annual collection volume
pub fn savings(annual_collection_liters: f64, config: &RainwaterConfig) -> RainwaterEstimate {
    let collection = non_negative(annual_collection_liters);
    let annual_savings = collection * config.water_rate_usd_per_liter;

    let divisor = config.tank_divisor();
    let tank_size = if divisor.is_finite() && divisor > 0.0 {
        collection / divisor
    } else {
        0.0
    };
    let total_cost = tank_size * config.tank_cost_usd_per_liter + config.fixed_installation_usd;

    let self_sufficiency = if config.liters_per_sufficiency_percent > 0.0 {
        (collection / config.liters_per_sufficiency_percent).trunc().min(100.0)
    } else {
        0.0
    };

    RainwaterEstimate {
        annual_collection_liters: whole(collection),
        tank_size_liters: whole(tank_size),
        installation_cost_usd: whole(total_cost),
        annual_savings_usd: whole(annual_savings),
        payback_years: payback_years(total_cost, annual_savings),
        self_sufficiency_percent: self_sufficiency,
    }
}

/// Collection and savings for a roof and rainfall total
pub fn estimate(roof_area_sqft: f64, annual_rainfall_mm: f64, config: &RainwaterConfig) -> RainwaterEstimate {
    savings(annual_collection(roof_area_sqft, annual_rainfall_mm, config), config)
}
