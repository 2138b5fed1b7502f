// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use rooftop_engine::{AnalysisReport, ClimateContext, EnvironmentalImpact, FeatureSet, LocationRecord, ReportSource};
use serde::Serialize;
use uuid::Uuid;

/// Full analysis response.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    /// Unique identifier for this analysis.
    pub analysis_id: Uuid,
    /// Geocoded location (labelling only).
    pub location: LocationRecord,
    /// Short place name for display.
    pub location_label: String,
    /// Climate inputs used by the calculators.
    pub climate: ClimateContext,
    /// Roof features extracted from the image.
    pub features: FeatureSet,
    /// Per-technology assessment and overall recommendation.
    pub report: AnalysisReport,
    /// Environmental equivalents of the report.
    pub impact: EnvironmentalImpact,
    /// Which advisor produced `report`.
    pub source: ReportSource,
    /// Non-fatal problems encountered along the way.
    pub warnings: Vec<String>,
    /// Processing statistics.
    pub timing: TimingStats,
}

/// Processing statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingStats {
    /// Uploaded image size in bytes.
    pub image_bytes: usize,
    pub image_width: u32,
    pub image_height: u32,
    /// Time spent decoding and analysing the image (ms).
    pub vision_time_ms: u64,
    /// Time spent on geocoding and weather (ms).
    pub context_time_ms: u64,
    /// Time spent producing the report (ms).
    pub advisor_time_ms: u64,
    /// Total processing time (ms).
    pub total_time_ms: u64,
}
