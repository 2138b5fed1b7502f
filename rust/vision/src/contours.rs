// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour extraction and polygon helpers

use crate::types::{BoundingBox, RoofMask};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

/// Closed outer border of a foreground region
#[derive(Debug, Clone)]
pub struct RegionContour {
    pub points: Vec<Point<i32>>,
    /// Enclosed area in square pixels (shoelace)
    pub area_px: f64,
}

impl RegionContour {
    pub fn bounding_box(&self) -> BoundingBox {
        bounding_box(&self.points)
    }
}

/// Outer borders of every foreground region, largest area first
///
/// Holes are skipped, so a region nested inside another region's hole
/// (an obstacle sitting on a roof) still appears as its own contour.
pub fn outer_contours(binary: &GrayImage) -> Vec<RegionContour> {
    let mut contours: Vec<RegionContour> = find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| {
            let area_px = polygon_area(&c.points);
            RegionContour {
                points: c.points,
                area_px,
            }
        })
        .collect();

    // Stable sort keeps scan order between equal areas
    contours.sort_by(|a, b| b.area_px.total_cmp(&a.area_px));
    contours
}

/// Number of borders (outer and hole) in a binary image
pub fn count_contours(binary: &GrayImage) -> usize {
    find_contours::<i32>(binary).len()
}

/// Calculate polygon area using shoelace formula
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }

    (area / 2.0).abs()
}

/// Tight axis-aligned box around a point set
pub fn bounding_box(points: &[Point<i32>]) -> BoundingBox {
    if points.is_empty() {
        return BoundingBox {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0).max(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0).max(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0).max(0);

    BoundingBox {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

/// Fill a closed contour into a mask of the given size
pub fn rasterize(points: &[Point<i32>], width: u32, height: u32) -> RoofMask {
    let mut polygon: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &p in points {
        if polygon.last() != Some(&p) {
            polygon.push(p);
        }
    }
    // The polygon filler rejects an explicitly closed ring
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    let mut mask = RoofMask::new(width, height);

    if polygon.len() < 3 {
        for p in &polygon {
            if p.x >= 0 && p.y >= 0 {
                mask.set(p.x as u32, p.y as u32);
            }
        }
        return mask;
    }

    let mut canvas = GrayImage::new(width, height);
    imageproc::drawing::draw_polygon_mut(&mut canvas, &polygon, Luma([255u8]));

    for (x, y, pixel) in canvas.enumerate_pixels() {
        if pixel.0[0] > 0 {
            mask.set(x, y);
        }
    }

    mask
}
