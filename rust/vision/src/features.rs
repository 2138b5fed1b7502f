// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof feature extraction
//!
//! Orientation, shading, material, slope and complexity are all derived from
//! the grayscale image and its Canny edge map. The three threshold
//! classifiers are ordered rule tables evaluated first-match-wins, so the
//! order of entries is part of their behaviour.

use crate::config::{ComplexityWeights, MaterialThresholds, SlopeConfig, VisionConfig};
use crate::contours::count_contours;
use crate::error::{Error, Result};
use crate::image_ops::{canny_edges, histogram, texture_stats};
use crate::line_ops::{detect_segments, hough_lines, HoughTables};
use crate::types::{
    FeatureSet, Orientation, RoofMask, RoofMaterial, RoofSlope, Segmentation, TextureStats,
};
use image::GrayImage;

/// Orientation buckets over the mean Hough normal angle in degrees
///
/// Half-open `[low, high)` ranges; the image is assumed north-up.
pub const ORIENTATION_RULES: [(f64, f64, Orientation); 5] = [
    (0.0, 22.5, Orientation::South),
    (22.5, 67.5, Orientation::SouthWest),
    (67.5, 112.5, Orientation::West),
    (112.5, 157.5, Orientation::NorthWest),
    (157.5, 180.0, Orientation::South),
];

/// Used when no line is strong enough, and for angles outside every bucket
pub const DEFAULT_ORIENTATION: Orientation = Orientation::South;

/// One entry of the material rule table
pub struct MaterialRule {
    pub material: RoofMaterial,
    pub matches: fn(&TextureStats, &MaterialThresholds) -> bool,
}

fn is_tile(stats: &TextureStats, t: &MaterialThresholds) -> bool {
    stats.std_dev > t.tile_min_std_dev && stats.edge_density > t.tile_min_edge_density
}

fn is_metal(stats: &TextureStats, t: &MaterialThresholds) -> bool {
    stats.std_dev < t.metal_max_std_dev
}

fn is_concrete(stats: &TextureStats, t: &MaterialThresholds) -> bool {
    stats.edge_density < t.concrete_max_edge_density
}

/// Rough and busy → tile; smooth → metal; few edges → concrete
pub const MATERIAL_RULES: [MaterialRule; 3] = [
    MaterialRule {
        material: RoofMaterial::Tile,
        matches: is_tile,
    },
    MaterialRule {
        material: RoofMaterial::Metal,
        matches: is_metal,
    },
    MaterialRule {
        material: RoofMaterial::Concrete,
        matches: is_concrete,
    },
];

/// Most common covering, used when no rule matches
pub const DEFAULT_MATERIAL: RoofMaterial = RoofMaterial::Asphalt;

/// Map a mean Hough angle to a compass bucket
pub fn classify_orientation(mean_theta_degrees: f64) -> Orientation {
    ORIENTATION_RULES
        .iter()
        .find(|(low, high, _)| (*low..*high).contains(&mean_theta_degrees))
        .map(|(_, _, orientation)| *orientation)
        .unwrap_or(DEFAULT_ORIENTATION)
}

/// Apply [`MATERIAL_RULES`] in order
pub fn classify_material(stats: &TextureStats, thresholds: &MaterialThresholds) -> RoofMaterial {
    MATERIAL_RULES
        .iter()
        .find(|rule| (rule.matches)(stats, thresholds))
        .map(|rule| rule.material)
        .unwrap_or(DEFAULT_MATERIAL)
}

/// Slope buckets as `(exclusive upper bound, slope)`, in evaluation order
pub fn slope_rules(config: &SlopeConfig) -> [(f64, RoofSlope); 3] {
    [
        (config.flat_below_degrees, RoofSlope::Flat),
        (config.low_below_degrees, RoofSlope::Low),
        (config.medium_below_degrees, RoofSlope::Medium),
    ]
}

/// Map a mean absolute segment angle to a slope bucket
pub fn classify_slope(mean_abs_angle_degrees: f64, config: &SlopeConfig) -> RoofSlope {
    slope_rules(config)
        .iter()
        .find(|(below, _)| mean_abs_angle_degrees < *below)
        .map(|(_, slope)| *slope)
        .unwrap_or(RoofSlope::Steep)
}

/// Weighted complexity on a 0-10 scale, one decimal
pub fn complexity_score(
    stats: &TextureStats,
    contour_count: usize,
    weights: &ComplexityWeights,
) -> f64 {
    let edge_score = stats.edge_density * 100.0;
    let contour_score = (contour_count as f64 / weights.contours_per_point).min(10.0);
    let texture_score = (stats.std_dev / weights.std_dev_per_point).min(10.0);

    let combined = edge_score * weights.edge_weight
        + contour_score * weights.contour_weight
        + texture_score * weights.texture_weight;

    let rounded = (combined * 10.0).round() / 10.0;
    if rounded.is_finite() {
        rounded.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

/// Stateless feature extractor
///
/// Holds the configuration and the Hough trigonometry tables, both built
/// once and reused across images.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: VisionConfig,
    tables: HoughTables,
}

impl FeatureExtractor {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            tables: HoughTables::new(),
        }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Canny edge map with the shared thresholds
    pub fn edges(&self, grayscale: &GrayImage) -> GrayImage {
        canny_edges(grayscale, self.config.edges.canny_low, self.config.edges.canny_high)
    }

    /// Extract every feature, combining image statistics with the
    /// segmentation's areas and obstacle count
    pub fn extract(&self, grayscale: &GrayImage, segmentation: &Segmentation) -> Result<FeatureSet> {
        let (width, height) = grayscale.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }
        if let Some(mask) = &segmentation.roof_mask {
            if mask.width() != width || mask.height() != height {
                return Err(Error::MaskMismatch {
                    mask_width: mask.width(),
                    mask_height: mask.height(),
                    image_width: width,
                    image_height: height,
                });
            }
        }

        let edges = self.edges(grayscale);
        let stats = texture_stats(grayscale, &edges);

        let features = FeatureSet {
            roof_area_sqft: segmentation.roof_area_sqft,
            usable_area_sqft: segmentation.usable_area_sqft,
            orientation: self.detect_orientation(&edges),
            shading_percent: self.analyze_shading(grayscale, segmentation.roof_mask.as_ref()),
            roof_material: classify_material(&stats, &self.config.material),
            roof_slope: self.estimate_slope(&edges),
            complexity_score: complexity_score(&stats, count_contours(&edges), &self.config.complexity),
            obstacle_count: segmentation.obstacle_count(),
        };

        tracing::debug!(
            orientation = %features.orientation,
            material = %features.roof_material,
            slope = %features.roof_slope,
            shading = features.shading_percent,
            complexity = features.complexity_score,
            "Extracted roof features"
        );

        Ok(features.sanitized())
    }

    /// Dominant roof direction from the strongest straight lines
    pub fn detect_orientation(&self, edges: &GrayImage) -> Orientation {
        let cfg = &self.config.orientation;
        let lines = hough_lines(edges, &self.tables, cfg.hough_threshold);

        let strongest: Vec<f64> = lines
            .iter()
            .take(cfg.max_lines)
            .map(|l| l.theta_degrees)
            .collect();

        if strongest.is_empty() {
            return DEFAULT_ORIENTATION;
        }

        let mean = strongest.iter().sum::<f64>() / strongest.len() as f64;
        classify_orientation(mean)
    }

    /// Percentage of dark (shadowed) pixels
    ///
    /// Counts only roof pixels when a non-empty mask is given.
    pub fn analyze_shading(&self, grayscale: &GrayImage, mask: Option<&RoofMask>) -> f64 {
        let mask = mask.filter(|m| !m.is_empty());
        let bins = histogram(grayscale, mask);

        let total: u64 = bins.iter().sum();
        if total == 0 {
            return 0.0;
        }

        let threshold = self.config.shading.darkness_threshold as usize;
        let dark: u64 = bins[..threshold].iter().sum();

        (dark as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Texture-based material guess
    pub fn detect_material(&self, grayscale: &GrayImage) -> RoofMaterial {
        let edges = self.edges(grayscale);
        classify_material(&texture_stats(grayscale, &edges), &self.config.material)
    }

    /// Pitch bucket from the mean absolute angle of long segments
    pub fn estimate_slope(&self, edges: &GrayImage) -> RoofSlope {
        let cfg = &self.config.slope;
        let segments = detect_segments(
            edges,
            &self.tables,
            cfg.hough_threshold,
            cfg.min_line_length,
            cfg.max_line_gap,
        );

        let angles: Vec<f64> = segments
            .iter()
            .take(cfg.max_segments)
            .map(|s| s.abs_angle_degrees())
            .collect();

        if angles.is_empty() {
            return RoofSlope::Flat;
        }

        let mean = angles.iter().sum::<f64>() / angles.len() as f64;
        classify_slope(mean, cfg)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(VisionConfig::default())
    }
}
