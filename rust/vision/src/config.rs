// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunable thresholds for segmentation and feature extraction

use serde::{Deserialize, Serialize};

/// Square feet per square metre
pub const SQFT_PER_SQM: f64 = 10.764;

/// All vision parameters in one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub segmentation: SegmentationConfig,
    pub edges: EdgeConfig,
    pub orientation: OrientationConfig,
    pub shading: ShadingConfig,
    pub material: MaterialThresholds,
    pub slope: SlopeConfig,
    pub complexity: ComplexityWeights,
}

/// Canny thresholds shared by every edge-based extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Gaussian sigma applied before edge detection (<= 0 disables)
    pub blur_sigma: f32,
    /// Dilate-then-erode radius used to seal gaps in the edge map (0 disables)
    pub close_radius: u8,
    /// Ground sample distance: metres covered by one pixel side
    pub ground_sample_distance_m: f64,
    /// Contours at or below this many square pixels are noise
    pub min_obstacle_area_px: f64,
    /// Obstacles kept after ranking by area
    pub max_obstacles: usize,
}

impl SegmentationConfig {
    /// Square feet covered by a single pixel
    pub fn sqft_per_pixel(&self) -> f64 {
        self.ground_sample_distance_m * self.ground_sample_distance_m * SQFT_PER_SQM
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1, // OpenCV's sigma for a 5x5 kernel
            close_radius: 1,
            ground_sample_distance_m: 0.3,
            min_obstacle_area_px: 100.0,
            max_obstacles: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Standard Hough vote threshold
    pub hough_threshold: u32,
    /// Strongest lines averaged
    pub max_lines: usize,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            hough_threshold: 200,
            max_lines: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    /// Intensities strictly below this count as shadow
    pub darkness_threshold: u8,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            darkness_threshold: 80,
        }
    }
}

/// Texture thresholds used by the material rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialThresholds {
    pub tile_min_std_dev: f64,
    pub tile_min_edge_density: f64,
    pub metal_max_std_dev: f64,
    pub concrete_max_edge_density: f64,
}

impl Default for MaterialThresholds {
    fn default() -> Self {
        Self {
            tile_min_std_dev: 50.0,
            tile_min_edge_density: 0.15,
            metal_max_std_dev: 30.0,
            concrete_max_edge_density: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeConfig {
    /// Probabilistic Hough vote threshold
    pub hough_threshold: u32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
    /// Segments averaged
    pub max_segments: usize,
    /// Bucket upper bounds in degrees (exclusive)
    pub flat_below_degrees: f64,
    pub low_below_degrees: f64,
    pub medium_below_degrees: f64,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            hough_threshold: 100,
            min_line_length: 100.0,
            max_line_gap: 10.0,
            max_segments: 20,
            flat_below_degrees: 5.0,
            low_below_degrees: 15.0,
            medium_below_degrees: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    pub edge_weight: f64,
    pub contour_weight: f64,
    pub texture_weight: f64,
    /// Contour count that maps to one point
    pub contours_per_point: f64,
    /// Intensity std-dev that maps to one point
    pub std_dev_per_point: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            edge_weight: 0.4,
            contour_weight: 0.3,
            texture_weight: 0.3,
            contours_per_point: 10.0,
            std_dev_per_point: 10.0,
        }
    }
}
