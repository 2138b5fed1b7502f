// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nominatim (OpenStreetMap) geocoding.
//!
//! Free-form addresses are searched, `"lat, lon"` strings are reverse
//! geocoded. The location only labels the report, so lookups never fail:
//! a failed search yields [`LocationRecord::default`] and a failed reverse
//! lookup yields the bare coordinates.

use rooftop_engine::location::parse_coordinates;
use rooftop_engine::LocationRecord;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying agent.
pub const USER_AGENT: &str = concat!("RooftopAnalyzer/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    #[error("No match for '{0}'")]
    NotFound(String),

    #[error("Invalid coordinate '{0}' in geocoding result")]
    BadCoordinate(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressParts {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

impl AddressParts {
    /// City, else town, else village
    pub fn locality(&self) -> String {
        [&self.city, &self.town, &self.village]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// One `search` hit. Nominatim sends coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: AddressParts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReversePlace {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: AddressParts,
}

pub fn record_from_place(place: &Place) -> Result<LocationRecord, GeocodingError> {
    let coordinate = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|_| GeocodingError::BadCoordinate(text.to_string()))
    };

    Ok(LocationRecord {
        lat: coordinate(&place.lat)?,
        lon: coordinate(&place.lon)?,
        address: place.display_name.clone(),
        city: place.address.locality(),
        state: place.address.state.clone().unwrap_or_default(),
        country: place.address.country.clone().unwrap_or_default(),
        postcode: place.address.postcode.clone().unwrap_or_default(),
    })
}

pub fn record_from_reverse(lat: f64, lon: f64, place: &ReversePlace) -> LocationRecord {
    let mut record = LocationRecord::from_coordinates(lat, lon);
    if let Some(name) = place.display_name.as_deref().filter(|n| !n.is_empty()) {
        record.address = name.to_string();
    }
    record.city = place.address.locality();
    record.state = place.address.state.clone().unwrap_or_default();
    record.country = place.address.country.clone().unwrap_or_default();
    record.postcode = place.address.postcode.clone().unwrap_or_default();
    record
}

/// Nominatim client.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl GeocodingClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.to_string(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Geocode an address or a `"lat, lon"` string.
    pub async fn resolve(&self, query: &str) -> LocationRecord {
        if let Some((lat, lon)) = parse_coordinates(query) {
            return self.reverse(lat, lon).await;
        }

        match self.search(query).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, query, "Geocoding failed, using default location");
                LocationRecord::default()
            }
        }
    }

    /// Reverse geocode, keeping the coordinates on failure.
    pub async fn reverse(&self, lat: f64, lon: f64) -> LocationRecord {
        let query = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
        ];

        match self.get::<ReversePlace>("reverse", &query).await {
            Ok(place) => record_from_reverse(lat, lon, &place),
            Err(e) => {
                tracing::warn!(error = %e, lat, lon, "Reverse geocoding failed");
                LocationRecord::from_coordinates(lat, lon)
            }
        }
    }

    async fn search(&self, address: &str) -> Result<LocationRecord, GeocodingError> {
        let query = [
            ("q", address.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("addressdetails", "1".to_string()),
        ];

        let places: Vec<Place> = self.get("search", &query).await?;
        let place = places
            .first()
            .ok_or_else(|| GeocodingError::NotFound(address.to_string()))?;
        record_from_place(place)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, GeocodingError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodingError::Status(resp.status().as_u16()));
        }

        Ok(resp.json().await?)
    }
}
