// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooftop green-technology analysis engine
//!
//! Turns a roof [`FeatureSet`] and a [`ClimateContext`] into costed, scored
//! assessments of solar panels, rainwater harvesting and rooftop gardening.
//!
//! - [`solar`], [`rainwater`], [`gardening`]: pure calculators
//! - [`impact`]: CO2, water and food equivalents
//! - [`synthesizer`]: deterministic scoring and report assembly
//! - [`advisor`]: the advisor capability, remote-response parsing and fallback
//!
//! [`AnalysisEngine`] is built once at startup and shared by reference; it
//! owns the configuration and the vision resources.
//!
//! ```rust,ignore
//! use rooftop_engine::{AnalysisConfig, AnalysisEngine, ClimateContext, LocationRecord};
//!
//! let engine = AnalysisEngine::new(AnalysisConfig::default());
//! let result = engine.analyze_locally(&gray, ClimateContext::default(), LocationRecord::default())?;
//! println!("best: {}", result.report.overall.best_technology);
//! ```

pub mod advisor;
pub mod climate;
pub mod config;
pub mod gardening;
pub mod impact;
pub mod location;
pub mod numeric;
pub mod rainwater;
pub mod report;
pub mod solar;
pub mod synthesizer;

pub use advisor::{
    advise_with_fallback, parse_advisor_response, Advice, Advisor, AdvisorError, AdvisorStrategy,
    AdvisoryInput, ReportSource,
};
pub use climate::ClimateContext;
pub use config::{AnalysisConfig, ConfigError};
pub use impact::EnvironmentalImpact;
pub use location::LocationRecord;
pub use numeric::NO_PAYBACK_YEARS;
pub use report::{AnalysisReport, Technology};
pub use rooftop_vision::{Error as VisionError, FeatureSet, RoofAnalysis};
pub use synthesizer::{Synthesizer, TechnologyScores};

use image::GrayImage;
use rooftop_vision::FeatureExtractor;
use std::sync::Arc;

/// Features, report and impact from a fully local run
#[derive(Debug, Clone)]
pub struct LocalAnalysis {
    pub roof: RoofAnalysis,
    pub report: AnalysisReport,
    pub impact: EnvironmentalImpact,
}

/// Process-wide analysis resources
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: Arc<AnalysisConfig>,
    extractor: FeatureExtractor,
    synthesizer: Synthesizer,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let config = Arc::new(config);
        tracing::debug!("Initializing analysis engine");
        Self {
            extractor: FeatureExtractor::new(config.vision.clone()),
            synthesizer: Synthesizer::new(Arc::clone(&config)),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Segment and extract features from a grayscale image
    pub fn analyze_image(&self, grayscale: &GrayImage) -> Result<RoofAnalysis, VisionError> {
        rooftop_vision::analyze_roof(grayscale, &self.extractor)
    }

    /// Decode an uploaded PNG/JPEG and extract features
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<RoofAnalysis, VisionError> {
        rooftop_vision::analyze_roof_bytes(bytes, &self.extractor)
    }

    /// Deterministic report for the given inputs
    pub fn synthesize(&self, input: &AdvisoryInput) -> AnalysisReport {
        self.synthesizer.synthesize(input)
    }

    /// Environmental equivalents of a report
    pub fn impact(&self, report: &AnalysisReport) -> EnvironmentalImpact {
        impact::from_report(report, &self.config.impact)
    }

    /// Image to report without any remote advisor
    pub fn analyze_locally(
        &self,
        grayscale: &GrayImage,
        climate: ClimateContext,
        location: LocationRecord,
    ) -> Result<LocalAnalysis, VisionError> {
        let roof = self.analyze_image(grayscale)?;
        let input = AdvisoryInput::new(roof.features.clone(), climate, location);
        let report = self.synthesize(&input);
        let impact = self.impact(&report);

        Ok(LocalAnalysis { roof, report, impact })
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
