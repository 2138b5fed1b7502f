// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations for roof analysis

use crate::types::{RoofMask, TextureStats};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;

/// Gaussian smoothing ahead of edge detection; `sigma <= 0` is a no-op
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Binary Canny edge map (255 on edges)
pub fn canny_edges(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    imageproc::edges::canny(image, low_threshold, high_threshold)
}

/// Seal gaps in an edge map with a square structuring element
pub fn morphological_close(edges: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return edges.clone();
    }
    imageproc::morphology::close(edges, Norm::LInf, radius)
}

/// RGB raster to 8-bit luma
pub fn rgb_to_grayscale(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    })
}

/// Standard luminance formula (ITU-R BT.601)
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let value = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    value.round().clamp(0.0, 255.0) as u8
}

/// 256-bin intensity histogram, optionally restricted to mask pixels
pub fn histogram(image: &GrayImage, mask: Option<&RoofMask>) -> [u64; 256] {
    let mut bins = [0u64; 256];

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask.map_or(true, |m| m.contains(x, y)) {
            bins[pixel.0[0] as usize] += 1;
        }
    }

    bins
}

/// Population standard deviation of pixel intensity
pub fn intensity_std_dev(image: &GrayImage) -> f64 {
    let n = image.width() as f64 * image.height() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let (sum, sum_sq) = image.pixels().fold((0.0f64, 0.0f64), |(s, sq), p| {
        let v = p.0[0] as f64;
        (s + v, sq + v * v)
    });

    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    variance.sqrt()
}

/// Fraction of non-zero pixels in a binary edge map
pub fn edge_density(edges: &GrayImage) -> f64 {
    let total = edges.width() as f64 * edges.height() as f64;
    if total == 0.0 {
        return 0.0;
    }
    let on = edges.pixels().filter(|p| p.0[0] > 0).count();
    on as f64 / total
}

/// Texture statistics used by the material and complexity extractors
pub fn texture_stats(gray: &GrayImage, edges: &GrayImage) -> TextureStats {
    TextureStats {
        std_dev: intensity_std_dev(gray),
        edge_density: edge_density(edges),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    #[test]
    fn test_rgb_to_grayscale() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 255, 255]));
        rgb.put_pixel(1, 0, Rgb([0, 0, 0]));
        rgb.put_pixel(2, 0, Rgb([255, 0, 0]));

        let gray = rgb_to_grayscale(&rgb);

        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
        assert_eq!(gray.get_pixel(2, 0).0[0], 76); // 0.299 * 255
    }

    #[test]
    fn test_std_dev_of_two_levels() {
        let mut img = GrayImage::new(10, 10);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Luma([if x < 5 { 100 } else { 200 }]);
        }

        assert_relative_eq!(intensity_std_dev(&img), 50.0, epsilon = 1e-9);
        assert_eq!(intensity_std_dev(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_edge_density() {
        let mut edges = GrayImage::new(10, 10);
        for x in 0..10 {
            edges.put_pixel(x, 4, Luma([255]));
        }
        assert_relative_eq!(edge_density(&edges), 0.1);
    }

    #[test]
    fn test_histogram_respects_mask() {
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([10]));
        img.put_pixel(2, 0, Luma([200]));
        img.put_pixel(3, 0, Luma([200]));

        let mut mask = RoofMask::new(4, 1);
        mask.set(2, 0);

        let all = histogram(&img, None);
        let masked = histogram(&img, Some(&mask));

        assert_eq!(all[10], 2);
        assert_eq!(masked[10], 0);
        assert_eq!(masked[200], 1);
    }

    #[test]
    fn test_close_with_zero_radius_is_identity() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([255]));
        assert_eq!(morphological_close(&img, 0), img);
    }

    #[test]
    fn test_close_bridges_one_pixel_gap() {
        let mut edges = GrayImage::new(7, 5);
        edges.put_pixel(2, 2, Luma([255]));
        edges.put_pixel(4, 2, Luma([255]));

        let closed = morphological_close(&edges, 1);
        assert_eq!(closed.get_pixel(3, 2).0[0], 255);
    }
}
