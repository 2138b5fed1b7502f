// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic recommendation synthesizer
//!
//! Runs the three calculators, scores each technology with a simple
//! heuristic and assembles an [`AnalysisReport`]. This is the local
//! [`Advisor`] and the fallback whenever the remote one cannot answer.

use crate::advisor::{Advisor, AdvisorError, AdvisoryInput};
use crate::climate::ClimateContext;
use crate::config::AnalysisConfig;
use crate::numeric::{clamp_score, non_negative, round_to};
use crate::report::{
    AnalysisReport, GardeningReport, ImpactSummary, OverallRecommendation, RainwaterReport,
    SolarReport, Technology,
};
use crate::{gardening, impact, rainwater, solar};
use rooftop_vision::{FeatureSet, Orientation};
use std::future::Future;
use std::sync::Arc;

/// Heuristic suitability per technology, each in `[0, max_score]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnologyScores {
    pub solar: f64,
    pub rainwater: f64,
    pub gardening: f64,
}

impl TechnologyScores {
    /// Area plus orientation bonus for solar, rainfall for rainwater,
    /// plantable area for gardening
    pub fn compute(features: &FeatureSet, climate: &ClimateContext, config: &AnalysisConfig) -> Self {
        let scoring = &config.scoring;
        let usable = non_negative(features.usable_area_sqft);

        let orientation_bonus = if features.orientation == Orientation::South {
            scoring.solar_south_bonus
        } else {
            scoring.solar_other_bonus
        };
        let solar = per_point(usable, scoring.solar_sqft_per_point) + orientation_bonus;
        let rainwater = per_point(non_negative(climate.annual_rainfall_mm), scoring.rainfall_mm_per_point);
        let plantable = usable * config.gardening.plantable_fraction;
        let gardening = per_point(plantable, scoring.garden_sqft_per_point) + scoring.garden_base_score;

        Self {
            solar: clamp_score(solar, scoring.max_score),
            rainwater: clamp_score(rainwater, scoring.max_score),
            gardening: clamp_score(gardening, scoring.max_score),
        }
    }

    pub fn get(&self, technology: Technology) -> f64 {
        match technology {
            Technology::Solar => self.solar,
            Technology::Rainwater => self.rainwater,
            Technology::Gardening => self.gardening,
        }
    }

    /// Highest score; ties go to the earliest technology in canonical order
    pub fn best(&self) -> Technology {
        let mut best = Technology::CANONICAL_ORDER[0];
        for technology in Technology::CANONICAL_ORDER.into_iter().skip(1) {
            if self.get(technology) > self.get(best) {
                best = technology;
            }
        }
        best
    }

    /// Unweighted mean, one decimal
    pub fn combined(&self) -> f64 {
        round_to((self.solar + self.rainwater + self.gardening) / 3.0, 1)
    }
}

fn per_point(value: f64, per_point: f64) -> f64 {
    if per_point > 0.0 {
        value / per_point
    } else {
        0.0
    }
}

/// Format a whole number with thousands separators
fn grouped(value: f64) -> String {
    let digits = (non_negative(value).trunc() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Local, deterministic [`Advisor`]
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: Arc<AnalysisConfig>,
}

impl Synthesizer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build a complete report from features and climate
    pub fn synthesize(&self, input: &AdvisoryInput) -> AnalysisReport {
        let config = &*self.config;
        let features = input.features.clone().sanitized();
        let climate = input.climate.sanitized();

        let solar = solar::estimate(&features, &climate, &config.solar);
        let rain = rainwater::estimate(features.roof_area_sqft, climate.annual_rainfall_mm, &config.rainwater);
        let garden = gardening::estimate(
            features.usable_area_sqft,
            config.gardening.default_sunlight_hours,
            &config.gardening,
        );
        let (co2_offset_tons, _, _) = impact::solar_impact(solar.annual_production_kwh, &config.impact);

        let scores = TechnologyScores::compute(&features, &climate, config);
        let best = scores.best();

        tracing::debug!(
            solar = scores.solar,
            rainwater = scores.rainwater,
            gardening = scores.gardening,
            best = %best,
            "Synthesized technology scores"
        );

        let solar_report = SolarReport {
            suitability_score: round_to(scores.solar, 1),
            system_size_kw: solar.system_size_kw,
            panel_count: solar.panel_count,
            annual_production_kwh: solar.annual_production_kwh,
            installation_cost_usd: solar.roi.net_cost_usd,
            annual_savings_usd: solar.roi.annual_savings_usd,
            payback_years: solar.roi.payback_years,
            key_points: vec![
                format!("{}-facing orientation detected", features.orientation),
                format!("Room for {} solar panels ({} kW)", solar.panel_count, solar.system_size_kw),
                format!("Expected payback period: {} years", solar.roi.payback_years),
            ],
            pros: vec![
                "Reduces electricity bills significantly".to_string(),
                "Low maintenance requirements".to_string(),
            ],
            cons: vec![
                "High initial investment".to_string(),
                format!("{:.1}% shading may reduce efficiency", features.shading_percent),
            ],
            optimization_tips: vec![
                "Consider battery storage for excess power".to_string(),
                "Clean panels regularly".to_string(),
            ],
        };

        let rain_report = RainwaterReport {
            suitability_score: round_to(scores.rainwater, 1),
            annual_collection_liters: rain.annual_collection_liters,
            tank_size_needed_liters: rain.tank_size_liters,
            installation_cost_usd: rain.installation_cost_usd,
            annual_savings_usd: rain.annual_savings_usd,
            water_self_sufficiency_percent: rain.self_sufficiency_percent,
            payback_years: rain.payback_years,
            key_points: vec![
                format!("Annual collection: {} liters", grouped(rain.annual_collection_liters)),
                format!("Tank size needed: {} L", grouped(rain.tank_size_liters)),
                format!("Payback: {} years", rain.payback_years),
            ],
            pros: vec![
                "Reduces water bills".to_string(),
                "Sustainable water source".to_string(),
            ],
            cons: vec![
                "Requires storage space".to_string(),
                "Seasonal availability varies".to_string(),
            ],
            usage_recommendations: vec![
                "Use for gardening and cleaning".to_string(),
                "Install filtration for potable use".to_string(),
            ],
        };

        let garden_report = GardeningReport {
            suitability_score: round_to(scores.gardening, 1),
            plantable_area_sqft: garden.plantable_area_sqft,
            recommended_crops: garden.recommended_crops.clone(),
            annual_yield_kg: garden.annual_yield_kg,
            setup_cost_usd: garden.setup_cost_usd,
            annual_value_usd: garden.annual_value_usd,
            payback_years: garden.payback_years,
            key_points: vec![
                format!("Plantable area: {} sqft", garden.plantable_area_sqft),
                format!("Expected yield: {} kg/year", garden.annual_yield_kg),
                format!("Annual value: ${}", grouped(garden.annual_value_usd)),
            ],
            pros: vec![
                "Fresh organic produce".to_string(),
                "Improves air quality".to_string(),
            ],
            cons: vec![
                "Requires regular maintenance".to_string(),
                "Structural load considerations".to_string(),
            ],
            seasonal_tips: vec![
                "Rotate crops seasonally".to_string(),
                "Use lightweight soil mixes".to_string(),
            ],
        };

        let overall = OverallRecommendation {
            best_technology: best,
            combined_score: scores.combined(),
            recommendation: format!(
                "{} recommended as the primary technology for this roof.",
                best.display_name()
            ),
            // Fixed order, independent of the scores
            implementation_priority: Technology::CANONICAL_ORDER.to_vec(),
            environmental_impact: ImpactSummary {
                co2_offset_tons_per_year: co2_offset_tons,
                water_saved_liters_per_year: rain.annual_collection_liters,
                food_produced_kg_per_year: garden.annual_yield_kg,
            },
            total_investment_usd: solar.roi.net_cost_usd + rain.installation_cost_usd + garden.setup_cost_usd,
            total_annual_savings_usd: solar.roi.annual_savings_usd
                + rain.annual_savings_usd
                + garden.annual_value_usd,
        };

        AnalysisReport {
            solar: solar_report,
            rainwater: rain_report,
            gardening: garden_report,
            overall,
        }
    }
}

impl Advisor for Synthesizer {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn advise(&self, input: &AdvisoryInput) -> impl Future<Output = Result<AnalysisReport, AdvisorError>> + Send {
        std::future::ready(Ok(self.synthesize(input)))
    }
}
