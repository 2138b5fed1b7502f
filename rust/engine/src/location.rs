// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geocoded location record, used for labelling only

use serde::{Deserialize, Serialize};

pub const UNKNOWN_CITY: &str = "Unknown City";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationRecord {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
}

impl LocationRecord {
    /// Record carrying nothing but the coordinates
    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            address: format!("{}, {}", lat, lon),
            city: String::new(),
            state: String::new(),
            country: String::new(),
            postcode: String::new(),
        }
    }

    /// Best short name for display
    ///
    /// Falls back to the first comma-separated part of the address, then to
    /// [`UNKNOWN_CITY`].
    pub fn city_label(&self) -> &str {
        let city = self.city.trim();
        if !city.is_empty() {
            return city;
        }
        if self.address.contains(',') {
            if let Some(first) = self.address.split(',').next().map(str::trim) {
                if !first.is_empty() {
                    return first;
                }
            }
        }
        UNKNOWN_CITY
    }
}

impl Default for LocationRecord {
    /// New Delhi, used when geocoding fails
    fn default() -> Self {
        Self {
            lat: 28.6139,
            lon: 77.2090,
            address: "New Delhi, Delhi, India".to_string(),
            city: "New Delhi".to_string(),
            state: "Delhi".to_string(),
            country: "India".to_string(),
            postcode: "110001".to_string(),
        }
    }
}

/// Parse a `"lat, lon"` pair, rejecting out-of-range values
pub fn parse_coordinates(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split(',');
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    let lon: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    valid_coordinates(lat, lon).then_some((lat, lon))
}

pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_label_fallbacks() {
        assert_eq!(LocationRecord::default().city_label(), "New Delhi");

        let mut record = LocationRecord::from_coordinates(12.97, 77.59);
        record.address = "Bengaluru Urban, Karnataka, India".to_string();
        assert_eq!(record.city_label(), "Bengaluru Urban");

        record.address = "somewhere".to_string();
        assert_eq!(record.city_label(), UNKNOWN_CITY);
    }

    #[test]
    fn test_bare_coordinates_record() {
        let record = LocationRecord::from_coordinates(1.5, -2.25);
        assert_eq!(record.address, "1.5, -2.25");
        assert_eq!(record.city_label(), "1.5");
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates("28.61, 77.20"), Some((28.61, 77.20)));
        assert_eq!(parse_coordinates(" -33.9,18.4 "), Some((-33.9, 18.4)));
        assert_eq!(parse_coordinates("Mumbai, India"), None);
        assert_eq!(parse_coordinates("1, 2, 3"), None);
        assert_eq!(parse_coordinates("95, 10"), None);
    }
}
