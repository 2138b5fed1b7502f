// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof segmentation and feature extraction from aerial imagery
//!
//! This crate provides the image half of the rooftop analysis pipeline:
//! 1. Decoding an uploaded photo and converting it to grayscale
//! 2. Segmenting the roof outline and the obstacles on it (contours)
//! 3. Estimating orientation and slope (Hough transforms)
//! 4. Estimating shading, material and complexity (intensity statistics)
//!
//! # Usage
//!
//! ```rust,ignore
//! use rooftop_vision::{analyze_roof_bytes, FeatureExtractor, VisionConfig};
//!
//! let extractor = FeatureExtractor::new(VisionConfig::default());
//! let analysis = analyze_roof_bytes(&upload, &extractor)?;
//! println!("usable: {} sqft", analysis.features.usable_area_sqft);
//! ```

pub mod config;
pub mod contours;
pub mod error;
pub mod features;
pub mod image_ops;
pub mod line_ops;
pub mod segmenter;
pub mod types;

pub use config::VisionConfig;
pub use error::{Error, Result};
pub use features::FeatureExtractor;
pub use image_ops::rgb_to_grayscale;
pub use segmenter::segment_roof;
pub use types::{
    BoundingBox, FeatureSet, Obstacle, Orientation, RoofMask, RoofMaterial, RoofSlope,
    Segmentation,
};

use image::{GrayImage, RgbImage};

/// Segmentation plus the features derived from it
#[derive(Debug, Clone)]
pub struct RoofAnalysis {
    pub segmentation: Segmentation,
    pub features: FeatureSet,
    pub image_width: u32,
    pub image_height: u32,
}

/// Run segmentation and feature extraction on a grayscale image
pub fn analyze_roof(grayscale: &GrayImage, extractor: &FeatureExtractor) -> Result<RoofAnalysis> {
    let (width, height) = grayscale.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    let config = extractor.config();
    let segmentation = segment_roof(grayscale, &config.segmentation, &config.edges);
    let features = extractor.extract(grayscale, &segmentation)?;

    Ok(RoofAnalysis {
        segmentation,
        features,
        image_width: width,
        image_height: height,
    })
}

/// Convenience wrapper for RGB input
pub fn analyze_roof_rgb(rgb: &RgbImage, extractor: &FeatureExtractor) -> Result<RoofAnalysis> {
    analyze_roof(&rgb_to_grayscale(rgb), extractor)
}

/// Decode an encoded image (PNG or JPEG) into grayscale
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage> {
    let decoded = image::load_from_memory(bytes)?;
    let gray = rgb_to_grayscale(&decoded.to_rgb8());

    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }
    Ok(gray)
}

/// Decode and analyse an uploaded image in one step
pub fn analyze_roof_bytes(bytes: &[u8], extractor: &FeatureExtractor) -> Result<RoofAnalysis> {
    let gray = decode_grayscale(bytes)?;
    analyze_roof(&gray, extractor)
}
