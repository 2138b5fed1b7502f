// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooftop Server - green-technology analysis over HTTP.
//!
//! Accepts a rooftop photo and an optional location, extracts roof features,
//! looks up climate, and returns costed solar, rainwater and gardening
//! assessments. Reports come from the Gemini advisor when one is configured,
//! otherwise (or when it fails) from the local synthesizer.
//!
//! # Endpoints
//!
//! - `GET /` - API information
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/analyze` - Analyse a rooftop image (multipart)

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use rooftop_engine::{AnalysisConfig, AnalysisEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::{GeminiAdvisor, GeocodingClient, WeatherClient};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub config: Arc<Config>,
    pub weather: Arc<WeatherClient>,
    pub geocoder: Arc<GeocodingClient>,
    /// Remote advisor; `None` when no API key is configured.
    pub advisor: Option<Arc<GeminiAdvisor>>,
}

impl AppState {
    pub fn new(config: Config, analysis: AnalysisConfig) -> Self {
        let engine = Arc::new(AnalysisEngine::new(analysis));
        let advisor = config.gemini_api_key.as_deref().map(|key| {
            Arc::new(GeminiAdvisor::new(
                key,
                &config.gemini_model,
                config.advisor_timeout(),
                engine.config().scoring.max_score,
            ))
        });

        Self {
            weather: Arc::new(WeatherClient::new(
                config.openweather_api_key.clone(),
                config.weather_timeout(),
            )),
            geocoder: Arc::new(GeocodingClient::new(config.weather_timeout())),
            advisor,
            engine,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

fn router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Analysis
        .route("/api/v1/analyze", post(routes::analyze::analyze))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_body_bytes()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,rooftop_server=debug,rooftop_engine=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    let analysis = match &config.analysis_config_path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load analysis config from {}", path))?,
        None => AnalysisConfig::default(),
    };

    tracing::info!(
        port = config.port,
        max_image_size_mb = config.max_image_size_mb,
        weather = config.openweather_api_key.is_some(),
        advisor = config.gemini_api_key.is_some(),
        model = %config.gemini_model,
        "Starting Rooftop Server"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config, analysis));

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "rooftop-test-boundary";

    fn state(pairs: &[(&str, &str)]) -> AppState {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppState::new(Config::from_lookup(|key| vars.get(key).cloned()), AnalysisConfig::default())
    }

    fn roof_png() -> Vec<u8> {
        let mut img = GrayImage::from_pixel(160, 160, Luma([30]));
        for y in 30..130 {
            for x in 20..140 {
                img.put_pixel(x, y, Luma([210]));
            }
        }
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    fn multipart(file: Option<&[u8]>, fields: &[(&str, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }
        if let Some(bytes) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"roof.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_advisor_only_with_key() {
        assert!(state(&[]).advisor.is_none());
        assert!(state(&[("GEMINI_API_KEY", "k")]).advisor.is_some());
    }

    #[test]
    fn test_router_builds_with_either_cors_mode() {
        let _ = router(state(&[("CORS_ORIGINS", "https://example.org,*")]));
        let _ = router(state(&[("CORS_ORIGINS", "https://example.org")]));
    }

    #[tokio::test]
    async fn test_health_reports_fallbacks() {
        let response = router(state(&[]))
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health = json_body(response).await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["weather"], "default");
        assert_eq!(health["advisor"], "synthesizer");
    }

    #[tokio::test]
    async fn test_analyze_without_file() {
        let response = router(state(&[]))
            .oneshot(multipart(None, &[("advisor", "local")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "MISSING_FILE");
    }

    #[tokio::test]
    async fn test_analyze_rejects_undecodable_image() {
        let response = router(state(&[]))
            .oneshot(multipart(Some(b"not an image"), &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["code"], "INVALID_IMAGE");
    }

    #[tokio::test]
    async fn test_analyze_offline() {
        let png = roof_png();
        let response = router(state(&[]))
            .oneshot(multipart(Some(&png), &[("advisor", "auto")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;

        assert_eq!(body["source"], "synthesizer");
        assert_eq!(body["warnings"].as_array().map(Vec::len), Some(0));
        assert_eq!(body["location"]["city"], "New Delhi");
        assert_eq!(body["climate"]["annual_rainfall_mm"], 800.0);
        assert_eq!(body["timing"]["image_width"], 160);
        assert!(body["features"]["roof_area_sqft"].as_f64().unwrap() > 0.0);
        assert_eq!(
            body["report"]["overall"]["implementation_priority"],
            serde_json::json!(["solar", "rainwater", "gardening"])
        );
        assert_eq!(
            body["impact"]["groundwater_saved_liters"],
            body["report"]["rainwater"]["annual_collection_liters"]
        );
        assert!(uuid::Uuid::parse_str(body["analysis_id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_upload() {
        let app = router(state(&[("MAX_IMAGE_SIZE_MB", "1")]));

        // Within the body limit, over the image limit
        let response = app
            .clone()
            .oneshot(multipart(Some(&vec![0u8; 1536 * 1024]), &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["code"], "FILE_TOO_LARGE");

        // Over the body limit itself
        let response = app
            .oneshot(multipart(Some(&vec![0u8; 2 * 1024 * 1024]), &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["code"], "FILE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_analyze_rejects_unknown_advisor() {
        let png = roof_png();
        let response = router(state(&[]))
            .oneshot(multipart(Some(&png), &[("advisor", "oracle")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_FIELD");
    }
}
