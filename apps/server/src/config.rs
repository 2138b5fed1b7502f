// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use std::time::Duration;

const MULTIPART_HEADROOM_BYTES: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Maximum uploaded image size in MB.
    pub max_image_size_mb: usize,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for weather and geocoding calls in seconds.
    pub weather_timeout_secs: u64,
    /// Timeout for the remote advisor in seconds.
    pub advisor_timeout_secs: u64,
    /// OpenWeatherMap key. Without it the default climate record is used.
    pub openweather_api_key: Option<String>,
    /// Gemini key. Without it every analysis uses the local synthesizer.
    pub gemini_api_key: Option<String>,
    /// Gemini model name.
    pub gemini_model: String,
    /// Optional JSON file overriding the analysis constants.
    pub analysis_config_path: Option<String>,
    /// Allowed CORS origins (comma-separated, or "*" for all).
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".into())
                .parse()
                .unwrap_or(8080),
            max_image_size_mb: lookup("MAX_IMAGE_SIZE_MB")
                .unwrap_or_else(|| "20".into())
                .parse()
                .unwrap_or(20),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".into())
                .parse()
                .unwrap_or(120),
            weather_timeout_secs: lookup("WEATHER_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".into())
                .parse()
                .unwrap_or(10),
            advisor_timeout_secs: lookup("ADVISOR_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".into())
                .parse()
                .unwrap_or(30),
            openweather_api_key: secret("OPENWEATHER_API_KEY"),
            gemini_api_key: secret("GEMINI_API_KEY"),
            gemini_model: secret("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash-exp".into()),
            analysis_config_path: secret("ANALYSIS_CONFIG_PATH"),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| {
                    // Default: allow common development origins
                    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_size_mb * 1024 * 1024
    }

    /// Request body limit: the image plus room for multipart framing and text fields.
    pub fn max_body_bytes(&self) -> usize {
        self.max_image_bytes() + MULTIPART_HEADROOM_BYTES
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather_timeout_secs)
    }

    pub fn advisor_timeout(&self) -> Duration {
        Duration::from_secs(self.advisor_timeout_secs)
    }

    /// True when any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_image_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.max_body_bytes(), 21 * 1024 * 1024);
        assert_eq!(config.weather_timeout(), Duration::from_secs(10));
        assert_eq!(config.advisor_timeout(), Duration::from_secs(30));
        assert_eq!(config.gemini_model, "gemini-2.0-flash-exp");
        assert!(config.openweather_api_key.is_none());
        assert!(config.gemini_api_key.is_none());
        assert!(config.analysis_config_path.is_none());
        assert_eq!(config.cors_origins.len(), 4);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = config(&[
            ("PORT", "9000"),
            ("MAX_IMAGE_SIZE_MB", "lots"),
            ("GEMINI_API_KEY", "  abc  "),
            ("OPENWEATHER_API_KEY", "   "),
            ("CORS_ORIGINS", "*, "),
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.max_image_size_mb, 20);
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert!(config.openweather_api_key.is_none());
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(config.allows_any_origin());
    }
}
