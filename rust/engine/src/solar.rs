// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solar PV sizing, production and return on investment

use crate::climate::ClimateContext;
use crate::config::SolarConfig;
use crate::numeric::{non_negative, payback_years, round_to, whole};
use rooftop_vision::{FeatureSet, Orientation};
use serde::Serialize;

/// Sizing and production for one roof
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarEstimate {
    pub panel_count: u32,
    pub system_size_kw: f64,
    /// Whole kWh in the first year
    pub annual_production_kwh: f64,
    pub roi: SolarRoi,
}

/// Financial projection for a system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarRoi {
    pub gross_cost_usd: f64,
    /// Gross cost after the tax credit
    pub net_cost_usd: f64,
    pub annual_savings_usd: f64,
    pub payback_years: f64,
    /// Savings over the projection horizon with degradation and escalation
    pub lifetime_savings_usd: f64,
    pub roi_percent: f64,
}

/// Panel count and system size (kW) that fit on `usable_area_sqft`
///
/// Partial panels are dropped.
pub fn system_size(usable_area_sqft: f64, config: &SolarConfig) -> (f64, u32) {
    if config.panel_area_sqft <= 0.0 {
        return (0.0, 0);
    }
    let panel_count = (non_negative(usable_area_sqft) / config.panel_area_sqft).floor() as u32;
    let system_size_kw = panel_count as f64 * non_negative(config.panel_wattage_w) / 1000.0;
    (system_size_kw, panel_count)
}

/// First-year production in whole kWh
pub fn annual_production(
    system_size_kw: f64,
    solar_irradiance: f64,
    shading_percent: f64,
    orientation: Orientation,
    config: &SolarConfig,
) -> f64 {
    let daily = non_negative(system_size_kw) * non_negative(solar_irradiance) * config.system_efficiency;
    let orientation_factor = config.orientation_factors.factor(orientation);
    let shading_factor = 1.0 - non_negative(shading_percent).min(100.0) / 100.0;

    whole(daily * 365.0 * orientation_factor * shading_factor)
}

/// Cost, savings, payback and lifetime return
pub fn roi(system_size_kw: f64, annual_production_kwh: f64, config: &SolarConfig) -> SolarRoi {
    let gross_cost = non_negative(system_size_kw) * 1000.0 * config.cost_per_watt_usd;
    let net_cost = non_negative(gross_cost - gross_cost * config.tax_credit_rate);
    let production = non_negative(annual_production_kwh);
    let annual_savings = production * config.electricity_rate_usd_per_kwh;

    let lifetime_savings: f64 = (1..=config.projection_years)
        .map(|year| {
            let year = year as i32;
            let year_production = production * (1.0 - config.degradation_rate).powi(year);
            year_production
                * config.electricity_rate_usd_per_kwh
                * (1.0 + config.price_escalation_rate).powi(year)
        })
        .sum();

    let roi_percent = if net_cost > 0.0 {
        round_to((lifetime_savings - net_cost) / net_cost * 100.0, 1)
    } else {
        0.0
    };

    SolarRoi {
        gross_cost_usd: whole(gross_cost),
        net_cost_usd: whole(net_cost),
        annual_savings_usd: whole(annual_savings),
        payback_years: payback_years(net_cost, annual_savings),
        lifetime_savings_usd: whole(lifetime_savings),
        roi_percent,
    }
}

/// Full solar estimate for a roof and climate
pub fn estimate(features: &FeatureSet, climate: &ClimateContext, config: &SolarConfig) -> SolarEstimate {
    let (system_size_kw, panel_count) = system_size(features.usable_area_sqft, config);
    let annual_production_kwh = annual_production(
        system_size_kw,
        climate.solar_irradiance,
        features.shading_percent,
        features.orientation,
        config,
    );

    SolarEstimate {
        panel_count,
        system_size_kw,
        annual_production_kwh,
        roi: roi(system_size_kw, annual_production_kwh, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_system_size_floors_panels() {
        let config = SolarConfig::default();

        let (kw, panels) = system_size(1000.0, &config);
        assert_eq!(panels, 47);
        assert_eq!(kw, 18.8);

        assert_eq!(system_size(20.9, &config), (0.0, 0));
        assert_eq!(system_size(-50.0, &config), (0.0, 0));
    }

    #[test]
    fn test_production_reference_case() {
        let config = SolarConfig::default();
        // 18.8 * 5.5 * 0.75 * 365 * 1.0 * 0.9 = 25475.175
        let kwh = annual_production(18.8, 5.5, 10.0, Orientation::South, &config);
        assert_eq!(kwh, 25475.0);

        let north = annual_production(18.8, 5.5, 10.0, Orientation::North, &config);
        assert!(north < kwh);
    }

    #[test]
    fn test_full_shade_produces_nothing() {
        let config = SolarConfig::default();
        assert_eq!(annual_production(10.0, 5.0, 100.0, Orientation::South, &config), 0.0);
        assert_eq!(annual_production(10.0, 5.0, 250.0, Orientation::South, &config), 0.0);
    }

    #[test]
    fn test_roi() {
        let config = SolarConfig::default();
        let roi = roi(18.8, 25475.0, &config);

        assert_eq!(roi.gross_cost_usd, 65800.0);
        assert_eq!(roi.net_cost_usd, 46060.0);
        assert_eq!(roi.annual_savings_usd, 3311.0);
        // 46060 / 3311.75
        assert_relative_eq!(roi.payback_years, 13.9);
        assert!(roi.lifetime_savings_usd > 25.0 * roi.annual_savings_usd);
        assert!(roi.roi_percent > 0.0);
    }

    #[test]
    fn test_roi_without_system() {
        let roi = roi(0.0, 0.0, &SolarConfig::default());
        assert_eq!(roi.net_cost_usd, 0.0);
        assert_eq!(roi.payback_years, crate::numeric::NO_PAYBACK_YEARS);
        assert_eq!(roi.roi_percent, 0.0);
    }
}
