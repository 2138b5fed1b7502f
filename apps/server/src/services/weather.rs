// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenWeatherMap client producing a [`ClimateContext`].
//!
//! Current conditions come from the `weather` endpoint and the UV index from
//! `onecall`. Yearly irradiance and rainfall are estimated from latitude.
//! Any failure yields the default climate record.

use rooftop_engine::ClimateContext;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// UV index assumed when the one-call endpoint has none.
pub const DEFAULT_UV_INDEX: f64 = 5.0;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Weather API returned HTTP {0}")]
    Status(u16),
}

/// Subset of the `weather` response we read.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub main: MainReadings,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    pub all: f64,
}

impl Default for Clouds {
    fn default() -> Self {
        Self {
            all: rooftop_engine::climate::DEFAULT_CLOUD_COVER_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OneCall {
    #[serde(default)]
    current: Option<OneCallCurrent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OneCallCurrent {
    #[serde(default)]
    uvi: Option<f64>,
}

/// Map an observation at `lat` to the climate record the engine consumes
pub fn climate_from_current(lat: f64, current: &CurrentWeather, uv_index: Option<f64>) -> ClimateContext {
    let description = current
        .weather
        .first()
        .map(|c| title_case(&c.description))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    ClimateContext::from_observation(
        lat,
        current.main.temp,
        current.main.humidity,
        current.clouds.all,
        current.wind.speed,
        uv_index.unwrap_or(DEFAULT_UV_INDEX),
        description,
    )
}

/// "scattered clouds" -> "Scattered Clouds"
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// OpenWeatherMap client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Climate at (lat, lon), or the default record when unavailable.
    pub async fn climate(&self, lat: f64, lon: f64) -> ClimateContext {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No OpenWeather API key, using default climate");
            return ClimateContext::default();
        };

        match self.fetch(api_key, lat, lon).await {
            Ok(climate) => climate,
            Err(e) => {
                tracing::warn!(error = %e, lat, lon, "Weather lookup failed, using default climate");
                ClimateContext::default()
            }
        }
    }

    async fn fetch(&self, api_key: &str, lat: f64, lon: f64) -> Result<ClimateContext, WeatherError> {
        let mut query = vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", api_key.to_string()),
            ("units", "metric".to_string()),
        ];
        let current: CurrentWeather = self.get("weather", &query).await?;

        query.push(("exclude", "minutely,alerts".to_string()));
        let uv_index = match self.get::<OneCall>("onecall", &query).await {
            Ok(one_call) => one_call.current.and_then(|c| c.uvi),
            Err(e) => {
                tracing::debug!(error = %e, "UV lookup failed, using default UV index");
                None
            }
        };

        let climate = climate_from_current(lat, &current, uv_index);
        tracing::debug!(
            temperature_c = climate.temperature_c,
            cloud_cover = climate.cloud_cover_percent,
            irradiance = climate.solar_irradiance,
            "Fetched weather"
        );
        Ok(climate)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WeatherError::Status(resp.status().as_u16()));
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "main": {"temp": 31.46, "feels_like": 35.0, "humidity": 58, "pressure": 1008},
        "clouds": {"all": 20},
        "wind": {"speed": 4.12, "deg": 250},
        "weather": [{"description": "few clouds", "icon": "02d"}],
        "name": "Jaipur"
    }"#;

    #[test]
    fn test_maps_observation_to_climate() {
        let current: CurrentWeather = serde_json::from_str(SAMPLE).unwrap();
        let climate = climate_from_current(26.9, &current, Some(9.3));

        assert_eq!(climate.temperature_c, 31.5);
        assert_eq!(climate.humidity_percent, 58.0);
        assert_eq!(climate.wind_speed_mps, 4.1);
        // 5.5 * (1 - 20 / 200)
        assert_eq!(climate.solar_irradiance, 4.95);
        assert_eq!(climate.annual_rainfall_mm, 800.0);
        assert_eq!(climate.uv_index, 9.3);
        assert_eq!(climate.description, "Few Clouds");
    }

    #[test]
    fn test_missing_optional_sections() {
        let current: CurrentWeather = serde_json::from_str(r#"{"main": {"temp": 10.0, "humidity": 80}}"#).unwrap();
        let climate = climate_from_current(-52.0, &current, None);

        assert_eq!(climate.cloud_cover_percent, 50.0);
        // 3.5 * 0.75
        assert_eq!(climate.solar_irradiance, 2.63);
        assert_eq!(climate.annual_rainfall_mm, 400.0);
        assert_eq!(climate.uv_index, DEFAULT_UV_INDEX);
        assert_eq!(climate.description, "Unknown");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("light RAIN"), "Light Rain");
        assert_eq!(title_case(""), "");
    }

    #[tokio::test]
    async fn test_without_key_uses_default_climate() {
        let client = WeatherClient::new(None, Duration::from_millis(10));
        assert_eq!(client.climate(12.0, 77.0).await, ClimateContext::default());
    }

    #[tokio::test]
    async fn test_unreachable_service_uses_default_climate() {
        let client = WeatherClient::new(Some("key".into()), Duration::from_millis(200))
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(client.climate(12.0, 77.0).await, ClimateContext::default());
    }
}
