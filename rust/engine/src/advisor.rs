// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advisor capability and remote-response handling
//!
//! An [`Advisor`] turns features, climate and location into an
//! [`AnalysisReport`]. Two implementations exist: a remote generative model
//! (in the server) and the local [`Synthesizer`]. The caller picks one with
//! an [`AdvisorStrategy`]; [`advise_with_fallback`] routes any remote failure
//! to the synthesizer and records it as a warning.

use crate::climate::ClimateContext;
use crate::location::LocationRecord;
use crate::report::AnalysisReport;
use crate::synthesizer::Synthesizer;
use rooftop_vision::FeatureSet;
use serde::Serialize;
use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a remote advisor could not produce a report
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Advisor request failed: {0}")]
    Transport(String),

    #[error("Advisor returned HTTP {0}")]
    Status(u16),

    #[error("Advisor timed out after {0:?}")]
    Timeout(Duration),

    #[error("Advisor response has no candidate text")]
    MissingCandidate,

    #[error("Advisor response contains no JSON object")]
    NoJsonObject,

    #[error("Advisor JSON does not match the report schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Everything an advisor is told about one roof
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryInput {
    pub features: FeatureSet,
    pub climate: ClimateContext,
    pub location: LocationRecord,
}

impl AdvisoryInput {
    pub fn new(features: FeatureSet, climate: ClimateContext, location: LocationRecord) -> Self {
        Self {
            features,
            climate,
            location,
        }
    }
}

/// Produces a structured technology recommendation
pub trait Advisor {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    fn advise(
        &self,
        input: &AdvisoryInput,
    ) -> impl Future<Output = Result<AnalysisReport, AdvisorError>> + Send;
}

/// Which advisor the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisorStrategy {
    /// Ask the remote advisor, falling back to the synthesizer
    #[default]
    Remote,
    /// Synthesizer only
    Local,
}

impl AdvisorStrategy {
    /// `auto`/`remote` → Remote, `local` → Local
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "auto" | "remote" => Some(AdvisorStrategy::Remote),
            "local" | "synthesizer" => Some(AdvisorStrategy::Local),
            _ => None,
        }
    }
}

/// Which implementation produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Advisor,
    Synthesizer,
}

/// A report plus where it came from
#[derive(Debug, Clone)]
pub struct Advice {
    pub report: AnalysisReport,
    pub source: ReportSource,
    pub warnings: Vec<String>,
}

/// Run the chosen strategy
///
/// A remote failure is never fatal: it is logged, added to `warnings`, and
/// the synthesizer answers instead.
pub async fn advise_with_fallback<A: Advisor>(
    strategy: AdvisorStrategy,
    remote: Option<&A>,
    synthesizer: &Synthesizer,
    input: &AdvisoryInput,
) -> Advice {
    let mut warnings = Vec::new();

    if let (AdvisorStrategy::Remote, Some(advisor)) = (strategy, remote) {
        match advisor.advise(input).await {
            Ok(report) => {
                return Advice {
                    report,
                    source: ReportSource::Advisor,
                    warnings,
                };
            }
            Err(err) => {
                tracing::warn!(advisor = advisor.name(), error = %err, "Advisor unavailable, using synthesizer");
                warnings.push(format!("AI analysis unavailable: {}", err));
            }
        }
    } else {
        tracing::debug!(?strategy, has_remote = remote.is_some(), "Using synthesizer");
    }

    Advice {
        report: synthesizer.synthesize(input),
        source: ReportSource::Synthesizer,
        warnings,
    }
}

/// Slice from the first `{` to the last `}`, if both exist in that order
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse free advisor text into a sanitized report
pub fn parse_advisor_response(text: &str, max_score: f64) -> Result<AnalysisReport, AdvisorError> {
    let json = extract_json_object(text).ok_or(AdvisorError::NoJsonObject)?;
    let report: AnalysisReport = serde_json::from_str(json)?;
    Ok(report.sanitized(max_score))
}

/// Prompt asking a generative model for a report in the expected schema
pub fn build_prompt(input: &AdvisoryInput) -> String {
    let f = &input.features;
    let c = &input.climate;
    let l = &input.location;

    let mut prompt = String::with_capacity(4096);
    prompt.push_str(
        "You are an expert in green building technologies. Assess this rooftop for \
         solar panels, rainwater harvesting and rooftop gardening.\n\n",
    );

    let _ = writeln!(prompt, "ROOFTOP:");
    let _ = writeln!(prompt, "- Total area: {} sqft", f.roof_area_sqft);
    let _ = writeln!(prompt, "- Usable area: {} sqft", f.usable_area_sqft);
    let _ = writeln!(prompt, "- Orientation: {}", f.orientation);
    let _ = writeln!(prompt, "- Slope: {}", f.roof_slope);
    let _ = writeln!(prompt, "- Material: {}", f.roof_material);
    let _ = writeln!(prompt, "- Shading: {:.1}%", f.shading_percent);
    let _ = writeln!(prompt, "- Obstacles: {}", f.obstacle_count);
    let _ = writeln!(prompt, "- Complexity: {}/10\n", f.complexity_score);

    let _ = writeln!(prompt, "LOCATION:");
    let _ = writeln!(prompt, "- Address: {}", l.address);
    let _ = writeln!(prompt, "- Coordinates: {}, {}\n", l.lat, l.lon);

    let _ = writeln!(prompt, "CLIMATE:");
    let _ = writeln!(prompt, "- Temperature: {} C", c.temperature_c);
    let _ = writeln!(prompt, "- Humidity: {}%", c.humidity_percent);
    let _ = writeln!(prompt, "- Cloud cover: {}%", c.cloud_cover_percent);
    let _ = writeln!(prompt, "- Solar irradiance: {} kWh/m2/day", c.solar_irradiance);
    let _ = writeln!(prompt, "- Annual rainfall: {} mm", c.annual_rainfall_mm);
    let _ = writeln!(prompt, "- UV index: {}\n", c.uv_index);

    prompt.push_str(RESPONSE_SCHEMA);
    prompt
}

const RESPONSE_SCHEMA: &str = r#"Reply with a single JSON object of this shape:

{
  "solar": {
    "suitability_score": 0-10,
    "system_size_kw": float,
    "panel_count": int,
    "annual_production_kwh": int,
    "installation_cost_usd": int,
    "annual_savings_usd": int,
    "payback_years": float,
    "key_points": [string],
    "pros": [string],
    "cons": [string],
    "optimization_tips": [string]
  },
  "rainwater": {
    "suitability_score": 0-10,
    "annual_collection_liters": int,
    "tank_size_needed_liters": int,
    "installation_cost_usd": int,
    "annual_savings_usd": int,
    "water_self_sufficiency_percent": int,
    "payback_years": float,
    "key_points": [string],
    "pros": [string],
    "cons": [string],
    "usage_recommendations": [string]
  },
  "gardening": {
    "suitability_score": 0-10,
    "plantable_area_sqft": int,
    "recommended_crops": [string],
    "annual_yield_kg": int,
    "setup_cost_usd": int,
    "annual_value_usd": int,
    "payback_years": float,
    "key_points": [string],
    "pros": [string],
    "cons": [string],
    "seasonal_tips": [string]
  },
  "overall": {
    "best_technology": "solar" | "rainwater" | "gardening",
    "combined_score": float,
    "recommendation": string,
    "implementation_priority": ["solar", "rainwater", "gardening"] in your order,
    "environmental_impact": {
      "co2_offset_tons_per_year": float,
      "water_saved_liters_per_year": int,
      "food_produced_kg_per_year": int
    },
    "total_investment_usd": int,
    "total_annual_savings_usd": int
  }
}

Be precise with the numbers and keep the advice practical."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::report::Technology;
    use futures::executor::block_on;
    use rooftop_vision::{Orientation, RoofMaterial, RoofSlope};
    use std::sync::Arc;

    const REPORT_JSON: &str = r#"{
        "solar": { "suitability_score": 8.2, "panel_count": 30, "payback_years": 7.5 },
        "rainwater": { "suitability_score": 12, "annual_collection_liters": 40000 },
        "gardening": { "suitability_score": 6.1 },
        "overall": { "best_technology": "solar", "combined_score": 8.8 }
    }"#;

    fn input() -> AdvisoryInput {
        AdvisoryInput::new(
            FeatureSet {
                roof_area_sqft: 1200.0,
                usable_area_sqft: 1000.0,
                orientation: Orientation::South,
                shading_percent: 12.5,
                roof_material: RoofMaterial::Concrete,
                roof_slope: RoofSlope::Flat,
                complexity_score: 4.2,
                obstacle_count: 2,
            },
            ClimateContext::default(),
            LocationRecord::default(),
        )
    }

    struct FailingAdvisor;

    impl Advisor for FailingAdvisor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn advise(
            &self,
            _input: &AdvisoryInput,
        ) -> impl Future<Output = Result<AnalysisReport, AdvisorError>> + Send {
            std::future::ready(Err(AdvisorError::Timeout(Duration::from_secs(30))))
        }
    }

    struct CannedAdvisor;

    impl Advisor for CannedAdvisor {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn advise(
            &self,
            _input: &AdvisoryInput,
        ) -> impl Future<Output = Result<AnalysisReport, AdvisorError>> + Send {
            std::future::ready(parse_advisor_response(REPORT_JSON, 10.0))
        }
    }

    fn synthesizer() -> Synthesizer {
        Synthesizer::new(Arc::new(AnalysisConfig::default()))
    }

    #[test]
    fn test_extracts_embedded_object() {
        let text = format!("Here is the analysis:\n```json\n{}\n```\nThanks!", REPORT_JSON);
        let report = parse_advisor_response(&text, 10.0).unwrap();

        assert_eq!(report.solar.panel_count, 30);
        assert_eq!(report.overall.best_technology, Technology::Solar);
        // Sanitized on the way in
        assert_eq!(report.rainwater.suitability_score, 10.0);
    }

    #[test]
    fn test_missing_object_is_an_error() {
        assert!(matches!(
            parse_advisor_response("I cannot help with that.", 10.0),
            Err(AdvisorError::NoJsonObject)
        ));
        assert!(matches!(
            parse_advisor_response("} backwards {", 10.0),
            Err(AdvisorError::NoJsonObject)
        ));
    }

    #[test]
    fn test_malformed_object_is_an_error() {
        assert!(matches!(
            parse_advisor_response("{ \"solar\": { } }", 10.0),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(
            parse_advisor_response("{ not json }", 10.0),
            Err(AdvisorError::Malformed(_))
        ));
    }

    #[test]
    fn test_remote_failure_falls_back_with_warning() {
        let synthesizer = synthesizer();
        let input = input();

        let advice = block_on(advise_with_fallback(
            AdvisorStrategy::Remote,
            Some(&FailingAdvisor),
            &synthesizer,
            &input,
        ));

        assert_eq!(advice.source, ReportSource::Synthesizer);
        assert_eq!(advice.warnings.len(), 1);
        assert!(advice.warnings[0].contains("timed out"));
        assert_eq!(advice.report, synthesizer.synthesize(&input));
    }

    #[test]
    fn test_remote_success_is_used() {
        let advice = block_on(advise_with_fallback(
            AdvisorStrategy::Remote,
            Some(&CannedAdvisor),
            &synthesizer(),
            &input(),
        ));

        assert_eq!(advice.source, ReportSource::Advisor);
        assert!(advice.warnings.is_empty());
        assert_eq!(advice.report.solar.panel_count, 30);
    }

    #[test]
    fn test_local_strategy_skips_remote() {
        let advice = block_on(advise_with_fallback(
            AdvisorStrategy::Local,
            Some(&CannedAdvisor),
            &synthesizer(),
            &input(),
        ));
        assert_eq!(advice.source, ReportSource::Synthesizer);

        let none: Option<&CannedAdvisor> = None;
        let advice = block_on(advise_with_fallback(AdvisorStrategy::Remote, none, &synthesizer(), &input()));
        assert_eq!(advice.source, ReportSource::Synthesizer);
        assert!(advice.warnings.is_empty());
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(AdvisorStrategy::from_label("auto"), Some(AdvisorStrategy::Remote));
        assert_eq!(AdvisorStrategy::from_label(" LOCAL "), Some(AdvisorStrategy::Local));
        assert_eq!(AdvisorStrategy::from_label("maybe"), None);
    }

    #[test]
    fn test_prompt_mentions_inputs_and_schema() {
        let prompt = build_prompt(&input());

        assert!(prompt.contains("Usable area: 1000 sqft"));
        assert!(prompt.contains("Orientation: South"));
        assert!(prompt.contains("New Delhi"));
        assert!(prompt.contains("\"water_self_sufficiency_percent\""));
    }
}
