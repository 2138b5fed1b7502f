// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof segmentation via edge contours
//!
//! The largest closed outline in the edge map is taken as the roof. The next
//! largest outlines above a noise threshold are obstacles (vents, units,
//! skylights) and are subtracted from the usable area.

use crate::config::{EdgeConfig, SegmentationConfig};
use crate::contours::{outer_contours, rasterize};
use crate::image_ops::{canny_edges, gaussian_blur, morphological_close};
use crate::types::{Obstacle, Segmentation};
use image::GrayImage;

/// Segment the roof and its obstacles from a grayscale image
///
/// Never fails: an image without usable contours yields
/// [`Segmentation::empty`].
pub fn segment_roof(
    grayscale: &GrayImage,
    config: &SegmentationConfig,
    edge_config: &EdgeConfig,
) -> Segmentation {
    let (width, height) = grayscale.dimensions();
    if width == 0 || height == 0 {
        return Segmentation::empty();
    }

    // Step 1: Smooth, then find edges
    let blurred = gaussian_blur(grayscale, config.blur_sigma);
    let edges = canny_edges(&blurred, edge_config.canny_low, edge_config.canny_high);

    // Step 2: Seal one-pixel breaks so outlines close
    let closed = morphological_close(&edges, config.close_radius);

    // Step 3: Outlines, largest first
    let contours = outer_contours(&closed);
    let Some((roof, rest)) = contours.split_first() else {
        tracing::debug!(width, height, "No contours found, returning empty segmentation");
        return Segmentation::empty();
    };

    let roof_mask = rasterize(&roof.points, width, height);
    let roof_px = roof_mask.pixel_count() as f64;

    let obstacles: Vec<Obstacle> = rest
        .iter()
        .filter(|c| c.area_px > config.min_obstacle_area_px)
        .take(config.max_obstacles)
        .map(|c| Obstacle {
            bbox: c.bounding_box(),
            area_px: c.area_px,
        })
        .collect();

    let obstacle_px: f64 = obstacles.iter().map(|o| o.area_px).sum();
    let usable_px = (roof_px - obstacle_px).max(0.0);

    let sqft_per_px = config.sqft_per_pixel();
    let roof_area_sqft = (roof_px * sqft_per_px).floor();
    let usable_area_sqft = (usable_px * sqft_per_px).floor().min(roof_area_sqft);

    tracing::debug!(
        roof_px,
        obstacle_count = obstacles.len(),
        roof_area_sqft,
        usable_area_sqft,
        "Segmented roof"
    );

    Segmentation {
        roof_mask: Some(roof_mask),
        obstacles,
        roof_area_sqft,
        usable_area_sqft,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill_rect(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    fn segment(img: &GrayImage) -> Segmentation {
        segment_roof(img, &SegmentationConfig::default(), &EdgeConfig::default())
    }

    #[test]
    fn test_blank_image_is_empty() {
        let img = GrayImage::from_pixel(64, 64, Luma([120]));
        let result = segment(&img);

        assert!(result.roof_mask.is_none());
        assert_eq!(result.roof_area_sqft, 0.0);
        assert_eq!(result.usable_area_sqft, 0.0);
        assert_eq!(result.obstacle_count(), 0);
    }

    #[test]
    fn test_zero_sized_image_is_empty() {
        let result = segment(&GrayImage::new(0, 0));
        assert!(result.roof_mask.is_none());
    }

    #[test]
    fn test_single_roof_area() {
        let mut img = GrayImage::from_pixel(200, 200, Luma([30]));
        fill_rect(&mut img, 50, 50, 100, 80, 200);

        let result = segment(&img);
        let mask = result.roof_mask.as_ref().expect("roof should be found");

        // Outline sits on the step edge, so allow a couple of pixels either side
        let px = mask.pixel_count();
        assert!((7000..=9000).contains(&px), "roof pixels = {}", px);
        assert!(mask.contains(100, 90));
        assert!(!mask.contains(10, 10));

        let expected_sqft = (px as f64 * SegmentationConfig::default().sqft_per_pixel()).floor();
        assert_eq!(result.roof_area_sqft, expected_sqft);
        assert_eq!(result.usable_area_sqft, result.roof_area_sqft);
    }

    #[test]
    fn test_obstacle_reduces_usable_area() {
        let mut img = GrayImage::from_pixel(240, 240, Luma([30]));
        fill_rect(&mut img, 30, 30, 180, 180, 200);
        // Dark rooftop unit
        fill_rect(&mut img, 100, 100, 30, 30, 40);

        let result = segment(&img);

        assert_eq!(result.obstacle_count(), 1);
        assert!(result.obstacles[0].area_px > 100.0);
        assert!(result.usable_area_sqft < result.roof_area_sqft);
        assert!(result.usable_area_sqft >= 0.0);
    }

    #[test]
    fn test_obstacles_capped_to_largest_five() {
        let mut img = GrayImage::from_pixel(400, 400, Luma([30]));
        fill_rect(&mut img, 20, 20, 360, 360, 200);

        // Seven units, all above the noise threshold, each a different size
        let units = [
            (50, 80, 20),
            (110, 80, 24),
            (170, 80, 28),
            (230, 80, 32),
            (290, 80, 36),
            (80, 250, 40),
            (200, 250, 44),
        ];
        for &(x, y, side) in &units {
            fill_rect(&mut img, x, y, side, side, 40);
        }

        let result = segment(&img);
        assert_eq!(result.obstacle_count(), 5);

        let areas: Vec<f64> = result.obstacles.iter().map(|o| o.area_px).collect();
        assert!(areas.windows(2).all(|w| w[0] >= w[1]), "areas = {:?}", areas);

        // The two smallest units are dropped
        for &(x, y, side) in &units[..2] {
            let (cx, cy) = (x + side / 2, y + side / 2);
            assert!(
                !result.obstacles.iter().any(|o| {
                    (o.bbox.x..=o.bbox.x + o.bbox.width).contains(&cx)
                        && (o.bbox.y..=o.bbox.y + o.bbox.height).contains(&cy)
                }),
                "unit at ({}, {}) should not be kept",
                x,
                y
            );
        }
    }

    #[test]
    fn test_tiny_specks_are_not_obstacles() {
        let mut img = GrayImage::from_pixel(200, 200, Luma([30]));
        fill_rect(&mut img, 40, 40, 120, 120, 200);
        fill_rect(&mut img, 90, 90, 3, 3, 40);

        let result = segment(&img);
        assert_eq!(result.obstacle_count(), 0);
    }
}
