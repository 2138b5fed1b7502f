// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for roof segmentation and feature extraction

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A 2D point in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Line segment found by the probabilistic Hough pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLine {
    pub start: Point2D,
    pub end: Point2D,
}

impl DetectedLine {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Direction in radians, in (-PI, PI]
    pub fn angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    /// Absolute direction in degrees, in [0, 180]
    pub fn abs_angle_degrees(&self) -> f64 {
        self.angle().to_degrees().abs()
    }
}

/// Infinite line in Hough (rho, theta) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarLine {
    /// Signed distance from the image origin in pixels
    pub rho: f64,
    /// Normal angle in degrees, in [0, 180)
    pub theta_degrees: f64,
    /// Accumulator votes
    pub votes: u32,
}

/// Axis-aligned bounding box in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Boolean raster congruent to the source image, `true` on roof pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoofMask {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl RoofMask {
    /// Empty mask (no roof pixels)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = true;
        }
    }

    /// Number of roof pixels
    pub fn pixel_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Non-roof region detected on or around the roof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub bbox: BoundingBox,
    /// Enclosed contour area in square pixels
    pub area_px: f64,
}

/// Output of the roof segmenter
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// `None` when no contour was found
    pub roof_mask: Option<RoofMask>,
    /// Sorted by area, largest first
    pub obstacles: Vec<Obstacle>,
    pub roof_area_sqft: f64,
    pub usable_area_sqft: f64,
}

impl Segmentation {
    /// Zero-area result used when nothing could be segmented
    pub fn empty() -> Self {
        Self {
            roof_mask: None,
            obstacles: Vec::new(),
            roof_area_sqft: 0.0,
            usable_area_sqft: 0.0,
        }
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}

/// Compass direction the roof faces (image assumed north-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    North,
    #[serde(rename = "North-East")]
    NorthEast,
    East,
    #[serde(rename = "South-East")]
    SouthEast,
    South,
    #[serde(rename = "South-West")]
    SouthWest,
    West,
    #[serde(rename = "North-West")]
    NorthWest,
    Unknown,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::North => "North",
            Orientation::NorthEast => "North-East",
            Orientation::East => "East",
            Orientation::SouthEast => "South-East",
            Orientation::South => "South",
            Orientation::SouthWest => "South-West",
            Orientation::West => "West",
            Orientation::NorthWest => "North-West",
            Orientation::Unknown => "Unknown",
        }
    }

    /// Parse a compass label ("South-West", "south west", "SW").
    /// Anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "north" | "n" => Orientation::North,
            "northeast" | "ne" => Orientation::NorthEast,
            "east" | "e" => Orientation::East,
            "southeast" | "se" => Orientation::SouthEast,
            "south" | "s" => Orientation::South,
            "southwest" | "sw" => Orientation::SouthWest,
            "west" | "w" => Orientation::West,
            "northwest" | "nw" => Orientation::NorthWest,
            _ => Orientation::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Orientation::from_label(&label))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roof covering inferred from texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofMaterial {
    Asphalt,
    Metal,
    Tile,
    Concrete,
}

impl fmt::Display for RoofMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoofMaterial::Asphalt => "Asphalt",
            RoofMaterial::Metal => "Metal",
            RoofMaterial::Tile => "Tile",
            RoofMaterial::Concrete => "Concrete",
        };
        f.write_str(name)
    }
}

/// Pitch bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofSlope {
    Flat,
    Low,
    Medium,
    Steep,
}

impl fmt::Display for RoofSlope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoofSlope::Flat => "Flat",
            RoofSlope::Low => "Low",
            RoofSlope::Medium => "Medium",
            RoofSlope::Steep => "Steep",
        };
        f.write_str(name)
    }
}

/// Global texture statistics of a grayscale image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureStats {
    /// Population standard deviation of intensity
    pub std_dev: f64,
    /// Fraction of edge pixels, in [0, 1]
    pub edge_density: f64,
}

/// Everything downstream calculators need to know about a roof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub roof_area_sqft: f64,
    pub usable_area_sqft: f64,
    pub orientation: Orientation,
    pub shading_percent: f64,
    pub roof_material: RoofMaterial,
    pub roof_slope: RoofSlope,
    pub complexity_score: f64,
    pub obstacle_count: usize,
}

impl FeatureSet {
    /// Enforce the bounds downstream code relies on.
    ///
    /// Non-finite values become zero, areas are non-negative with
    /// usable area never above roof area, shading stays in [0, 100]
    /// and complexity in [0, 10].
    pub fn sanitized(mut self) -> Self {
        self.roof_area_sqft = non_negative(self.roof_area_sqft);
        self.usable_area_sqft = non_negative(self.usable_area_sqft).min(self.roof_area_sqft);
        self.shading_percent = non_negative(self.shading_percent).min(100.0);
        self.complexity_score = non_negative(self.complexity_score).min(10.0);
        self
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
