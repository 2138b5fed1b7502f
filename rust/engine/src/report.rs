// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analysis report schema
//!
//! The same shape is produced by the local synthesizer and parsed from the
//! remote advisor, so callers never need to know which one answered.
//! Deserialization is lenient where advisors tend to be sloppy: missing
//! lists become empty, a missing payback becomes [`NO_PAYBACK_YEARS`], and
//! technology names are matched loosely ("Solar Panels" is `solar`).

use crate::numeric::{clamp_score, non_negative, payback_years, sanitize_payback, NO_PAYBACK_YEARS};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the three assessed technologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Solar,
    Rainwater,
    Gardening,
}

impl Technology {
    /// Tie-break and priority order
    pub const CANONICAL_ORDER: [Technology; 3] =
        [Technology::Solar, Technology::Rainwater, Technology::Gardening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Solar => "solar",
            Technology::Rainwater => "rainwater",
            Technology::Gardening => "gardening",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Technology::Solar => "Solar Panels",
            Technology::Rainwater => "Rainwater Harvesting",
            Technology::Gardening => "Rooftop Gardening",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        if label.contains("solar") {
            Some(Technology::Solar)
        } else if label.contains("rain") {
            Some(Technology::Rainwater)
        } else if label.contains("garden") {
            Some(Technology::Gardening)
        } else {
            None
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Technology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Technology::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown technology '{}'", label)))
    }
}

fn no_payback() -> f64 {
    NO_PAYBACK_YEARS
}

fn canonical_priority() -> Vec<Technology> {
    Technology::CANONICAL_ORDER.to_vec()
}

/// Counts may arrive as floats from an advisor
fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(non_negative(value).trunc().min(u32::MAX as f64) as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarReport {
    pub suitability_score: f64,
    #[serde(default)]
    pub system_size_kw: f64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub panel_count: u32,
    #[serde(default)]
    pub annual_production_kwh: f64,
    #[serde(default)]
    pub installation_cost_usd: f64,
    #[serde(default)]
    pub annual_savings_usd: f64,
    #[serde(default = "no_payback")]
    pub payback_years: f64,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub optimization_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainwaterReport {
    pub suitability_score: f64,
    #[serde(default)]
    pub annual_collection_liters: f64,
    #[serde(default)]
    pub tank_size_needed_liters: f64,
    #[serde(default)]
    pub installation_cost_usd: f64,
    #[serde(default)]
    pub annual_savings_usd: f64,
    #[serde(default)]
    pub water_self_sufficiency_percent: f64,
    #[serde(default = "no_payback")]
    pub payback_years: f64,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub usage_recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardeningReport {
    pub suitability_score: f64,
    #[serde(default)]
    pub plantable_area_sqft: f64,
    #[serde(default)]
    pub recommended_crops: Vec<String>,
    #[serde(default)]
    pub annual_yield_kg: f64,
    #[serde(default)]
    pub setup_cost_usd: f64,
    #[serde(default)]
    pub annual_value_usd: f64,
    #[serde(default = "no_payback")]
    pub payback_years: f64,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub seasonal_tips: Vec<String>,
}

/// Headline environmental figures carried in the overall section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactSummary {
    pub co2_offset_tons_per_year: f64,
    pub water_saved_liters_per_year: f64,
    pub food_produced_kg_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRecommendation {
    pub best_technology: Technology,
    pub combined_score: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default = "canonical_priority")]
    pub implementation_priority: Vec<Technology>,
    #[serde(default)]
    pub environmental_impact: ImpactSummary,
    #[serde(default)]
    pub total_investment_usd: f64,
    #[serde(default)]
    pub total_annual_savings_usd: f64,
}

impl OverallRecommendation {
    /// Years for all three technologies together to pay back
    pub fn combined_payback_years(&self) -> f64 {
        payback_years(self.total_investment_usd, self.total_annual_savings_usd)
    }
}

/// Complete per-technology assessment with an overall recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub solar: SolarReport,
    pub rainwater: RainwaterReport,
    pub gardening: GardeningReport,
    pub overall: OverallRecommendation,
}

impl AnalysisReport {
    /// Suitability score for one technology
    pub fn score(&self, technology: Technology) -> f64 {
        match technology {
            Technology::Solar => self.solar.suitability_score,
            Technology::Rainwater => self.rainwater.suitability_score,
            Technology::Gardening => self.gardening.suitability_score,
        }
    }

    /// Clamp every score into `[0, max_score]`, every quantity to `>= 0`
    /// and every payback to a finite value or the sentinel
    pub fn sanitized(mut self, max_score: f64) -> Self {
        let solar = &mut self.solar;
        solar.suitability_score = clamp_score(solar.suitability_score, max_score);
        solar.system_size_kw = non_negative(solar.system_size_kw);
        solar.annual_production_kwh = non_negative(solar.annual_production_kwh);
        solar.installation_cost_usd = non_negative(solar.installation_cost_usd);
        solar.annual_savings_usd = non_negative(solar.annual_savings_usd);
        solar.payback_years = sanitize_payback(solar.payback_years);

        let rain = &mut self.rainwater;
        rain.suitability_score = clamp_score(rain.suitability_score, max_score);
        rain.annual_collection_liters = non_negative(rain.annual_collection_liters);
        rain.tank_size_needed_liters = non_negative(rain.tank_size_needed_liters);
        rain.installation_cost_usd = non_negative(rain.installation_cost_usd);
        rain.annual_savings_usd = non_negative(rain.annual_savings_usd);
        rain.water_self_sufficiency_percent = non_negative(rain.water_self_sufficiency_percent).min(100.0);
        rain.payback_years = sanitize_payback(rain.payback_years);

        let garden = &mut self.gardening;
        garden.suitability_score = clamp_score(garden.suitability_score, max_score);
        garden.plantable_area_sqft = non_negative(garden.plantable_area_sqft);
        garden.annual_yield_kg = non_negative(garden.annual_yield_kg);
        garden.setup_cost_usd = non_negative(garden.setup_cost_usd);
        garden.annual_value_usd = non_negative(garden.annual_value_usd);
        garden.payback_years = sanitize_payback(garden.payback_years);

        let overall = &mut self.overall;
        overall.combined_score = clamp_score(overall.combined_score, max_score);
        overall.total_investment_usd = non_negative(overall.total_investment_usd);
        overall.total_annual_savings_usd = non_negative(overall.total_annual_savings_usd);
        let impact = &mut overall.environmental_impact;
        impact.co2_offset_tons_per_year = non_negative(impact.co2_offset_tons_per_year);
        impact.water_saved_liters_per_year = non_negative(impact.water_saved_liters_per_year);
        impact.food_produced_kg_per_year = non_negative(impact.food_produced_kg_per_year);

        self
    }
}
