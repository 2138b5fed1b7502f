// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Calculator constants and the aggregate analysis configuration
//!
//! Every rate, cost and threshold used by the calculators lives here. All
//! structs deserialize with `#[serde(default)]`, so an override file only
//! needs the values it changes.

use rooftop_vision::{Orientation, VisionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load an override file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid analysis config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the analysis pipeline can be tuned with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub vision: VisionConfig,
    pub solar: SolarConfig,
    pub rainwater: RainwaterConfig,
    pub gardening: GardeningConfig,
    pub impact: ImpactConfig,
    pub scoring: ScoringConfig,
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON override file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Loaded analysis config");
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub panel_wattage_w: f64,
    pub panel_area_sqft: f64,
    pub cost_per_watt_usd: f64,
    pub electricity_rate_usd_per_kwh: f64,
    /// Fractional production loss per year
    pub degradation_rate: f64,
    /// Fraction of gross cost refunded as tax credit
    pub tax_credit_rate: f64,
    /// Inverter, wiring and temperature losses
    pub system_efficiency: f64,
    /// Yearly electricity price growth
    pub price_escalation_rate: f64,
    pub projection_years: u32,
    pub orientation_factors: OrientationFactors,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            panel_wattage_w: 400.0,
            panel_area_sqft: 21.0,
            cost_per_watt_usd: 3.5,
            electricity_rate_usd_per_kwh: 0.13,
            degradation_rate: 0.005,
            tax_credit_rate: 0.30,
            system_efficiency: 0.75,
            price_escalation_rate: 0.03,
            projection_years: 25,
            orientation_factors: OrientationFactors::default(),
        }
    }
}

/// Production multiplier per roof orientation (northern hemisphere)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationFactors {
    pub south: f64,
    pub south_east: f64,
    pub south_west: f64,
    pub east: f64,
    pub west: f64,
    pub north_east: f64,
    pub north_west: f64,
    pub north: f64,
    pub unknown: f64,
}

impl OrientationFactors {
    pub fn factor(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::South => self.south,
            Orientation::SouthEast => self.south_east,
            Orientation::SouthWest => self.south_west,
            Orientation::East => self.east,
            Orientation::West => self.west,
            Orientation::NorthEast => self.north_east,
            Orientation::NorthWest => self.north_west,
            Orientation::North => self.north,
            Orientation::Unknown => self.unknown,
        }
    }
}

impl Default for OrientationFactors {
    fn default() -> Self {
        Self {
            south: 1.0,
            south_east: 0.95,
            south_west: 0.95,
            east: 0.88,
            west: 0.88,
            north_east: 0.78,
            north_west: 0.78,
            north: 0.68,
            unknown: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainwaterConfig {
    pub sqm_per_sqft: f64,
    pub collection_efficiency: f64,
    pub water_rate_usd_per_liter: f64,
    pub tank_cost_usd_per_liter: f64,
    /// Pipes, filters and pump
    pub fixed_installation_usd: f64,
    /// Months of collection the tank buffers
    pub storage_months: f64,
    /// Annual liters that count as one percent of self-sufficiency
    pub liters_per_sufficiency_percent: f64,
}

impl RainwaterConfig {
    /// Tank volume as a fraction of annual collection
    pub fn tank_divisor(&self) -> f64 {
        12.0 / self.storage_months
    }
}

impl Default for RainwaterConfig {
    fn default() -> Self {
        Self {
            sqm_per_sqft: 0.092903,
            collection_efficiency: 0.85,
            water_rate_usd_per_liter: 0.02,
            tank_cost_usd_per_liter: 0.5,
            fixed_installation_usd: 500.0,
            storage_months: 2.0,
            liters_per_sufficiency_percent: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardeningConfig {
    /// Share of usable area that can hold beds
    pub plantable_fraction: f64,
    pub soil_depth_inches: f64,
    pub soil_cost_usd_per_cuft: f64,
    /// Structure and irrigation per bed square foot
    pub setup_cost_usd_per_sqft: f64,
    pub yield_kg_per_sqft: f64,
    pub crop_value_usd_per_kg: f64,
    pub ideal_sunlight_hours: f64,
    /// Assumed when no sunlight estimate is available
    pub default_sunlight_hours: f64,
    /// Plantable areas below this get the small-bed crop list
    pub small_garden_below_sqft: f64,
    /// Plantable areas below this get the medium-bed crop list
    pub medium_garden_below_sqft: f64,
}

impl Default for GardeningConfig {
    fn default() -> Self {
        Self {
            plantable_fraction: 0.3,
            soil_depth_inches: 12.0,
            soil_cost_usd_per_cuft: 40.0,
            setup_cost_usd_per_sqft: 15.0,
            yield_kg_per_sqft: 2.0,
            crop_value_usd_per_kg: 3.0,
            ideal_sunlight_hours: 6.0,
            default_sunlight_hours: 6.0,
            small_garden_below_sqft: 50.0,
            medium_garden_below_sqft: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Average grid emissions
    pub co2_lbs_per_kwh: f64,
    pub lbs_per_ton: f64,
    pub trees_per_ton_co2: f64,
    pub tons_co2_per_car: f64,
    pub meals_per_kg: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            co2_lbs_per_kwh: 0.92,
            lbs_per_ton: 2204.62,
            trees_per_ton_co2: 16.0,
            tons_co2_per_car: 4.6,
            meals_per_kg: 3.0,
        }
    }
}

/// Heuristic suitability scoring used by the synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_score: f64,
    /// Usable square feet worth one solar point
    pub solar_sqft_per_point: f64,
    pub solar_south_bonus: f64,
    pub solar_other_bonus: f64,
    /// Annual rainfall worth one rainwater point
    pub rainfall_mm_per_point: f64,
    /// Plantable square feet worth one gardening point
    pub garden_sqft_per_point: f64,
    pub garden_base_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_score: 10.0,
            solar_sqft_per_point: 100.0,
            solar_south_bonus: 8.0,
            solar_other_bonus: 6.0,
            rainfall_mm_per_point: 100.0,
            garden_sqft_per_point: 50.0,
            garden_base_score: 5.0,
        }
    }
}
