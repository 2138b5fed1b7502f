// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line detection via Hough transforms
//!
//! Two flavours share one accumulator:
//! - [`hough_lines`] returns infinite (rho, theta) lines ranked by votes,
//!   used for roof orientation.
//! - [`detect_segments`] walks the strongest peaks and splits the supporting
//!   edge pixels into finite segments, used for slope estimation.

use crate::types::{DetectedLine, Point2D, PolarLine};
use image::GrayImage;

/// Upper bound on accumulator peaks walked by [`detect_segments`]
const MAX_SEGMENT_PEAKS: usize = 500;

/// Distance (pixels) within which an edge pixel supports a peak line
const PEAK_SUPPORT_DISTANCE: f64 = 2.0;

/// Precomputed sine/cosine tables at 1 degree resolution
///
/// Built once and shared between requests.
#[derive(Debug, Clone)]
pub struct HoughTables {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl HoughTables {
    pub fn new() -> Self {
        let num_thetas = 180;
        let (cos, sin) = (0..num_thetas)
            .map(|i| {
                let theta = (i as f64).to_radians();
                (theta.cos(), theta.sin())
            })
            .unzip();
        Self { cos, sin }
    }

    pub fn num_thetas(&self) -> usize {
        self.cos.len()
    }

    fn rho(&self, x: i32, y: i32, theta_idx: usize) -> f64 {
        x as f64 * self.cos[theta_idx] + y as f64 * self.sin[theta_idx]
    }
}

impl Default for HoughTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Vote accumulator over (theta, rho)
struct Accumulator {
    votes: Vec<u32>,
    num_rhos: usize,
    rho_offset: f64,
}

impl Accumulator {
    fn build(edge_points: &[(i32, i32)], width: u32, height: u32, tables: &HoughTables) -> Self {
        let max_rho = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
        let num_rhos = (2.0 * max_rho) as usize + 1;
        let mut votes = vec![0u32; tables.num_thetas() * num_rhos];

        for &(x, y) in edge_points {
            for theta_idx in 0..tables.num_thetas() {
                let rho_idx = (tables.rho(x, y, theta_idx) + max_rho) as usize;
                if rho_idx < num_rhos {
                    votes[theta_idx * num_rhos + rho_idx] += 1;
                }
            }
        }

        Self {
            votes,
            num_rhos,
            rho_offset: max_rho,
        }
    }

    fn get(&self, theta_idx: isize, rho_idx: isize, num_thetas: usize) -> u32 {
        if theta_idx < 0 || rho_idx < 0 {
            return 0;
        }
        let (t, r) = (theta_idx as usize, rho_idx as usize);
        if t >= num_thetas || r >= self.num_rhos {
            return 0;
        }
        self.votes[t * self.num_rhos + r]
    }

    /// Local maxima strictly above `threshold`, strongest first
    ///
    /// Ties keep accumulator order so results are deterministic.
    fn peaks(&self, threshold: u32, num_thetas: usize) -> Vec<(usize, usize, u32)> {
        let mut peaks = Vec::new();

        for theta_idx in 0..num_thetas {
            for rho_idx in 0..self.num_rhos {
                let votes = self.votes[theta_idx * self.num_rhos + rho_idx];
                if votes <= threshold {
                    continue;
                }
                let (t, r) = (theta_idx as isize, rho_idx as isize);
                let is_local_max = votes > self.get(t, r - 1, num_thetas)
                    && votes >= self.get(t, r + 1, num_thetas)
                    && votes > self.get(t - 1, r, num_thetas)
                    && votes >= self.get(t + 1, r, num_thetas);
                if is_local_max {
                    peaks.push((theta_idx, rho_idx, votes));
                }
            }
        }

        peaks.sort_by(|a, b| b.2.cmp(&a.2));
        peaks
    }

    fn rho_of(&self, rho_idx: usize) -> f64 {
        rho_idx as f64 - self.rho_offset
    }
}

/// Collect coordinates of edge pixels (value > 128)
fn edge_points(edges: &GrayImage) -> Vec<(i32, i32)> {
    edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] > 128)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect()
}

/// Standard Hough transform
///
/// Returns lines whose vote count exceeds `threshold`, strongest first.
pub fn hough_lines(edges: &GrayImage, tables: &HoughTables, threshold: u32) -> Vec<PolarLine> {
    let points = edge_points(edges);
    if points.is_empty() {
        return Vec::new();
    }

    let acc = Accumulator::build(&points, edges.width(), edges.height(), tables);

    acc.peaks(threshold, tables.num_thetas())
        .into_iter()
        .map(|(theta_idx, rho_idx, votes)| PolarLine {
            rho: acc.rho_of(rho_idx),
            theta_degrees: theta_idx as f64,
            votes,
        })
        .collect()
}

/// Probabilistic-style Hough segment detection
///
/// For each accumulator peak, the supporting edge pixels are ordered along
/// the line and split wherever consecutive pixels are further apart than
/// `max_line_gap`. Runs shorter than `min_line_length` are dropped. Pixels
/// claimed by an accepted segment do not vote for later peaks.
pub fn detect_segments(
    edges: &GrayImage,
    tables: &HoughTables,
    threshold: u32,
    min_line_length: f64,
    max_line_gap: f64,
) -> Vec<DetectedLine> {
    let points = edge_points(edges);
    if points.is_empty() {
        return Vec::new();
    }

    let acc = Accumulator::build(&points, edges.width(), edges.height(), tables);
    let peaks = acc.peaks(threshold, tables.num_thetas());

    let mut lines = Vec::new();
    let mut used_points = vec![false; points.len()];

    for &(theta_idx, rho_idx, _votes) in peaks.iter().take(MAX_SEGMENT_PEAKS) {
        let rho = acc.rho_of(rho_idx);

        // Find edge points that belong to this line
        let mut line_points: Vec<(i32, i32, usize)> = points
            .iter()
            .enumerate()
            .filter(|&(i, &(x, y))| {
                !used_points[i] && (tables.rho(x, y, theta_idx) - rho).abs() < PEAK_SUPPORT_DISTANCE
            })
            .map(|(i, &(x, y))| (x, y, i))
            .collect();

        if line_points.len() < 2 {
            continue;
        }

        // Sort points along the line direction
        let cos_t = tables.cos[theta_idx];
        let sin_t = tables.sin[theta_idx];
        line_points.sort_by(|a, b| {
            let proj_a = a.0 as f64 * (-sin_t) + a.1 as f64 * cos_t;
            let proj_b = b.0 as f64 * (-sin_t) + b.1 as f64 * cos_t;
            proj_a.total_cmp(&proj_b)
        });

        // Split into runs at gaps
        let mut segment_start = 0;
        for i in 1..=line_points.len() {
            let at_gap = i == line_points.len() || {
                let dx = (line_points[i].0 - line_points[i - 1].0) as f64;
                let dy = (line_points[i].1 - line_points[i - 1].1) as f64;
                (dx * dx + dy * dy).sqrt() > max_line_gap
            };
            if !at_gap {
                continue;
            }

            if i - segment_start >= 2 {
                let start_pt = &line_points[segment_start];
                let end_pt = &line_points[i - 1];
                let segment = left_to_right(
                    Point2D::new(start_pt.0 as f64, start_pt.1 as f64),
                    Point2D::new(end_pt.0 as f64, end_pt.1 as f64),
                );

                if segment.length() >= min_line_length {
                    for p in &line_points[segment_start..i] {
                        used_points[p.2] = true;
                    }
                    lines.push(segment);
                }
            }
            segment_start = i;
        }
    }

    lines
}

/// Orient a segment so it starts at its leftmost (then topmost) endpoint,
/// keeping absolute angles within [0, 90] degrees
fn left_to_right(a: Point2D, b: Point2D) -> DetectedLine {
    if (b.x, b.y) < (a.x, a.y) {
        DetectedLine::new(b, a)
    } else {
        DetectedLine::new(a, b)
    }
}
