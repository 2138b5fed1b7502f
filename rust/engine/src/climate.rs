// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Climate snapshot consumed by the calculators
//!
//! Weather providers fill a [`ClimateContext`]; when they cannot, they hand
//! back [`ClimateContext::default`]. Irradiance and annual rainfall are not
//! part of current-weather feeds, so they are estimated from latitude bands.

use crate::numeric::{non_negative, round_to};
use serde::{Deserialize, Serialize};

/// `[low, high)` absolute-latitude bands with typical daily irradiance (kWh/m²/day)
pub const IRRADIANCE_BANDS: [(f64, f64, f64); 5] = [
    (0.0, 15.0, 6.0),
    (15.0, 30.0, 5.5),
    (30.0, 45.0, 4.5),
    (45.0, 60.0, 3.5),
    (60.0, 90.0, 2.5),
];

/// Irradiance for latitudes outside every band
pub const DEFAULT_IRRADIANCE: f64 = 4.5;

/// `[low, high)` absolute-latitude bands with typical annual rainfall (mm)
pub const RAINFALL_BANDS: [(f64, f64, f64); 5] = [
    (0.0, 10.0, 2000.0),
    (10.0, 25.0, 1500.0),
    (25.0, 35.0, 800.0),
    (35.0, 50.0, 600.0),
    (50.0, 90.0, 400.0),
];

pub const DEFAULT_RAINFALL_MM: f64 = 800.0;

/// Cloud cover assumed when a feed omits it
pub const DEFAULT_CLOUD_COVER_PERCENT: f64 = 50.0;

fn band_value(bands: &[(f64, f64, f64)], latitude: f64, fallback: f64) -> f64 {
    if !latitude.is_finite() {
        return fallback;
    }
    // Bands are matched on whole degrees
    let degrees = latitude.abs().trunc();
    bands
        .iter()
        .find(|(low, high, _)| degrees >= *low && degrees < *high)
        .map(|(_, _, value)| *value)
        .unwrap_or(fallback)
}

/// Daily irradiance for a latitude, attenuated by cloud cover (two decimals)
pub fn estimate_solar_irradiance(latitude: f64, cloud_cover_percent: f64) -> f64 {
    let base = band_value(&IRRADIANCE_BANDS, latitude, DEFAULT_IRRADIANCE);
    let clouds = non_negative(cloud_cover_percent).min(100.0);
    round_to(base * (1.0 - clouds / 200.0), 2)
}

/// Typical annual rainfall for a latitude
pub fn estimate_annual_rainfall(latitude: f64) -> f64 {
    band_value(&RAINFALL_BANDS, latitude, DEFAULT_RAINFALL_MM)
}

/// Weather and climate inputs for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateContext {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub cloud_cover_percent: f64,
    pub wind_speed_mps: f64,
    /// Daily solar irradiance (kWh/m²/day)
    pub solar_irradiance: f64,
    pub annual_rainfall_mm: f64,
    pub uv_index: f64,
    pub description: String,
}

impl ClimateContext {
    /// Build a context from current observations, estimating the yearly
    /// quantities from latitude
    pub fn from_observation(
        latitude: f64,
        temperature_c: f64,
        humidity_percent: f64,
        cloud_cover_percent: f64,
        wind_speed_mps: f64,
        uv_index: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            temperature_c: round_to(temperature_c, 1),
            humidity_percent,
            cloud_cover_percent,
            wind_speed_mps: round_to(wind_speed_mps, 1),
            solar_irradiance: estimate_solar_irradiance(latitude, cloud_cover_percent),
            annual_rainfall_mm: estimate_annual_rainfall(latitude),
            uv_index,
            description: description.into(),
        }
    }

    /// Copy with the calculator inputs clamped to sane ranges
    pub fn sanitized(&self) -> Self {
        Self {
            humidity_percent: non_negative(self.humidity_percent).min(100.0),
            cloud_cover_percent: non_negative(self.cloud_cover_percent).min(100.0),
            solar_irradiance: non_negative(self.solar_irradiance),
            annual_rainfall_mm: non_negative(self.annual_rainfall_mm),
            uv_index: non_negative(self.uv_index),
            ..self.clone()
        }
    }
}

impl Default for ClimateContext {
    /// Representative warm, partly cloudy record used when no feed is available
    fn default() -> Self {
        Self {
            temperature_c: 28.5,
            humidity_percent: 65.0,
            cloud_cover_percent: 40.0,
            wind_speed_mps: 3.5,
            solar_irradiance: 5.5,
            annual_rainfall_mm: 800.0,
            uv_index: 7.0,
            description: "Partly Cloudy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_irradiance_bands() {
        assert_relative_eq!(estimate_solar_irradiance(5.0, 0.0), 6.0);
        assert_relative_eq!(estimate_solar_irradiance(-20.0, 0.0), 5.5);
        // New Delhi under 40% cloud: 5.5 * 0.8
        assert_relative_eq!(estimate_solar_irradiance(28.6139, 40.0), 4.4);
        assert_relative_eq!(estimate_solar_irradiance(70.0, 100.0), 1.25);
        assert_relative_eq!(estimate_solar_irradiance(90.0, 0.0), DEFAULT_IRRADIANCE);
    }

    #[test]
    fn test_band_edges_use_whole_degrees() {
        assert_relative_eq!(estimate_annual_rainfall(9.99), 2000.0);
        assert_relative_eq!(estimate_annual_rainfall(10.0), 1500.0);
        assert_relative_eq!(estimate_annual_rainfall(34.9), 800.0);
        assert_relative_eq!(estimate_annual_rainfall(-51.0), 400.0);
        assert_relative_eq!(estimate_annual_rainfall(f64::NAN), DEFAULT_RAINFALL_MM);
    }

    #[test]
    fn test_sanitized_clamps() {
        let climate = ClimateContext {
            annual_rainfall_mm: -200.0,
            solar_irradiance: f64::NAN,
            cloud_cover_percent: 150.0,
            ..ClimateContext::default()
        }
        .sanitized();

        assert_eq!(climate.annual_rainfall_mm, 0.0);
        assert_eq!(climate.solar_irradiance, 0.0);
        assert_eq!(climate.cloud_cover_percent, 100.0);
        assert_eq!(climate.temperature_c, 28.5);
    }
}
