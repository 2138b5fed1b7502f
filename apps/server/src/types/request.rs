// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use crate::error::ApiError;
use bytes::Bytes;
use rooftop_engine::location::valid_coordinates;
use rooftop_engine::AdvisorStrategy;

/// Fields of a `POST /api/v1/analyze` multipart form.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeForm {
    pub file: Option<Bytes>,
    pub address: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub advisor: Option<String>,
}

/// Where the roof is, as far as the request says.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    Address(String),
    Unspecified,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn coordinate(field: &'static str, value: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::InvalidField {
            field,
            message: format!("'{}' is not a number", value),
        })
}

impl AnalyzeForm {
    /// Coordinates win over an address; one of `lat`/`lon` alone is an error.
    pub fn location_query(&self) -> Result<LocationQuery, ApiError> {
        match (non_blank(&self.lat), non_blank(&self.lon)) {
            (Some(lat), Some(lon)) => {
                let lat = coordinate("lat", lat)?;
                let lon = coordinate("lon", lon)?;
                if !valid_coordinates(lat, lon) {
                    return Err(ApiError::InvalidField {
                        field: "lat",
                        message: format!("({}, {}) is outside the valid range", lat, lon),
                    });
                }
                Ok(LocationQuery::Coordinates { lat, lon })
            }
            (Some(_), None) | (None, Some(_)) => Err(ApiError::InvalidField {
                field: "lat",
                message: "lat and lon must be given together".to_string(),
            }),
            (None, None) => Ok(non_blank(&self.address)
                .map(|a| LocationQuery::Address(a.to_string()))
                .unwrap_or(LocationQuery::Unspecified)),
        }
    }

    /// `auto` (default) or `local`.
    pub fn strategy(&self) -> Result<AdvisorStrategy, ApiError> {
        let label = non_blank(&self.advisor).unwrap_or("auto");
        AdvisorStrategy::from_label(label).ok_or_else(|| ApiError::InvalidField {
            field: "advisor",
            message: format!("unknown advisor '{}', expected auto or local", label),
        })
    }
}
