// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gemini `generateContent` client implementing [`Advisor`].

use rooftop_engine::advisor::build_prompt;
use rooftop_engine::{parse_advisor_response, Advisor, AdvisorError, AdvisoryInput, AnalysisReport};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Request body for one prompt.
pub fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "temperature": 0.4,
            "topK": 32,
            "topP": 1,
            "maxOutputTokens": 4096
        }
    })
}

/// Turn a raw `generateContent` body into a sanitized report.
pub fn report_from_body(body: &str, max_score: f64) -> Result<AnalysisReport, AdvisorError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text = response.text().ok_or(AdvisorError::MissingCandidate)?;
    parse_advisor_response(text, max_score)
}

/// Remote advisor backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    max_score: f64,
    http: reqwest::Client,
}

impl GeminiAdvisor {
    pub fn new(api_key: &str, model: &str, timeout: Duration, max_score: f64) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout,
            max_score,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn transport_error(&self, err: reqwest::Error) -> AdvisorError {
        if err.is_timeout() {
            AdvisorError::Timeout(self.timeout)
        } else {
            AdvisorError::Transport(err.to_string())
        }
    }

    async fn generate(&self, input: &AdvisoryInput) -> Result<AnalysisReport, AdvisorError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = request_body(&build_prompt(input));

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            return Err(AdvisorError::Status(resp.status().as_u16()));
        }

        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        let report = report_from_body(&text, self.max_score)?;

        tracing::debug!(model = %self.model, best = %report.overall.best_technology, "Advisor report received");
        Ok(report)
    }
}

impl Advisor for GeminiAdvisor {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn advise(&self, input: &AdvisoryInput) -> impl Future<Output = Result<AnalysisReport, AdvisorError>> + Send {
        self.generate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rooftop_engine::{AnalysisEngine, ClimateContext, LocationRecord, Technology};
    use rooftop_vision::{FeatureSet, Orientation, RoofMaterial, RoofSlope};

    fn input() -> AdvisoryInput {
        let features = FeatureSet {
            roof_area_sqft: 1200.0,
            usable_area_sqft: 950.0,
            orientation: Orientation::South,
            shading_percent: 12.0,
            roof_material: RoofMaterial::Concrete,
            roof_slope: RoofSlope::Flat,
            complexity_score: 3.5,
            obstacle_count: 2,
        };
        AdvisoryInput::new(features, ClimateContext::default(), LocationRecord::default())
    }

    fn wrap(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn test_generation_settings() {
        let body = request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.4);
        assert_eq!(body["generationConfig"]["topK"], 32);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_report_inside_prose_and_fences() {
        let report = AnalysisEngine::default().synthesize(&input());
        let text = format!(
            "Here is the analysis:\n```json\n{}\n```\nLet me know!",
            serde_json::to_string_pretty(&report).unwrap()
        );

        let parsed = report_from_body(&wrap(&text), 10.0).unwrap();
        assert_eq!(parsed.overall.best_technology, report.overall.best_technology);
        assert_eq!(parsed.solar.panel_count, report.solar.panel_count);
        assert_eq!(parsed.gardening.recommended_crops, report.gardening.recommended_crops);
        assert_eq!(parsed.rainwater.key_points, report.rainwater.key_points);
    }

    #[test]
    fn test_out_of_range_values_are_sanitized() {
        let text = r#"{
            "solar": {"suitability_score": 14, "panel_count": 40.6, "annual_savings_usd": -10},
            "rainwater": {"suitability_score": 6},
            "gardening": {"suitability_score": -2},
            "overall": {"best_technology": "Solar Panels", "combined_score": 11, "recommendation": "Go solar"}
        }"#;

        let report = report_from_body(&wrap(text), 10.0).unwrap();
        assert_eq!(report.solar.suitability_score, 10.0);
        assert_eq!(report.solar.annual_savings_usd, 0.0);
        assert_eq!(report.gardening.suitability_score, 0.0);
        assert_eq!(report.rainwater.payback_years, 99.0);
        assert_eq!(report.overall.best_technology, Technology::Solar);
        assert!(report.overall.combined_score <= 10.0);
    }

    #[test]
    fn test_missing_candidate() {
        assert!(matches!(
            report_from_body(r#"{"candidates": []}"#, 10.0),
            Err(AdvisorError::MissingCandidate)
        ));
        assert!(matches!(
            report_from_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#, 10.0),
            Err(AdvisorError::MissingCandidate)
        ));
    }

    #[test]
    fn test_text_without_object() {
        assert!(matches!(
            report_from_body(&wrap("I cannot analyse this roof."), 10.0),
            Err(AdvisorError::NoJsonObject)
        ));
        assert!(matches!(
            report_from_body(&wrap("{ not json }"), 10.0),
            Err(AdvisorError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let advisor = GeminiAdvisor::new("key", "test-model", Duration::from_millis(200), 10.0)
            .with_base_url("http://127.0.0.1:9");

        let result = advisor.advise(&input()).await;
        assert!(matches!(
            result,
            Err(AdvisorError::Transport(_)) | Err(AdvisorError::Timeout(_))
        ));
    }
}
