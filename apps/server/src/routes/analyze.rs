// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooftop analysis endpoint.

use crate::error::ApiError;
use crate::types::{AnalyzeForm, AnalyzeResponse, LocationQuery, TimingStats};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use rooftop_engine::{advise_with_fallback, AdvisoryInput, ClimateContext, LocationRecord};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Collect the known multipart fields, ignoring anything else.
async fn extract_form(multipart: &mut Multipart) -> Result<AnalyzeForm, ApiError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        tracing::debug!(field_name = %field_name, "Processing multipart field");

        match field_name.as_str() {
            "file" => {
                let bytes = field.bytes().await?;
                tracing::debug!(size = bytes.len(), "Extracted image from multipart");
                form.file = Some(bytes);
            }
            "address" => form.address = Some(field.text().await?),
            "lat" => form.lat = Some(field.text().await?),
            "lon" => form.lon = Some(field.text().await?),
            "advisor" => form.advisor = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// Location and climate for a request. Never fails; lookups degrade to defaults.
async fn resolve_context(state: &AppState, query: LocationQuery) -> (LocationRecord, ClimateContext) {
    let location = match query {
        LocationQuery::Coordinates { lat, lon } => state.geocoder.reverse(lat, lon).await,
        LocationQuery::Address(address) => state.geocoder.resolve(&address).await,
        LocationQuery::Unspecified => LocationRecord::default(),
    };
    let climate = state.weather.climate(location.lat, location.lon).await;
    (location, climate)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// POST /api/v1/analyze - Full rooftop analysis.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let total_start = Instant::now();
    let analysis_id = Uuid::new_v4();

    let form = extract_form(&mut multipart)
        .await
        .map_err(|err| err.with_upload_limit(state.config.max_image_size_mb))?;
    let image = form.file.clone().ok_or_else(|| {
        tracing::warn!("No 'file' field found in multipart request");
        ApiError::MissingFile
    })?;

    // Check file size
    if image.len() > state.config.max_image_bytes() {
        return Err(ApiError::FileTooLarge {
            max_mb: state.config.max_image_size_mb,
        });
    }

    let strategy = form.strategy()?;
    let query = form.location_query()?;
    let image_bytes = image.len();

    tracing::info!(%analysis_id, size = image_bytes, ?strategy, "Starting analysis");

    // Vision is CPU-bound: run it on the blocking pool while the lookups run here
    let engine = Arc::clone(&state.engine);
    let vision = async move {
        let start = Instant::now();
        let roof = tokio::task::spawn_blocking(move || engine.analyze_bytes(&image)).await?;
        Ok::<_, ApiError>((roof?, elapsed_ms(start)))
    };
    let context = async {
        let start = Instant::now();
        let resolved = resolve_context(&state, query).await;
        (resolved, elapsed_ms(start))
    };

    let (vision, ((location, climate), context_time_ms)) = tokio::join!(vision, context);
    let (roof, vision_time_ms) = vision?;

    let advisor_start = Instant::now();
    let input = AdvisoryInput::new(roof.features.clone(), climate, location);
    let advice = advise_with_fallback(
        strategy,
        state.advisor.as_deref(),
        state.engine.synthesizer(),
        &input,
    )
    .await;
    let advisor_time_ms = elapsed_ms(advisor_start);

    let impact = state.engine.impact(&advice.report);

    let response = AnalyzeResponse {
        analysis_id,
        location_label: input.location.city_label().to_string(),
        location: input.location,
        climate: input.climate,
        features: input.features,
        report: advice.report,
        impact,
        source: advice.source,
        warnings: advice.warnings,
        timing: TimingStats {
            image_bytes,
            image_width: roof.image_width,
            image_height: roof.image_height,
            vision_time_ms,
            context_time_ms,
            advisor_time_ms,
            total_time_ms: elapsed_ms(total_start),
        },
    };

    tracing::info!(
        %analysis_id,
        best = %response.report.overall.best_technology,
        combined_score = response.report.overall.combined_score,
        source = ?response.source,
        warnings = response.warnings.len(),
        total_time_ms = response.timing.total_time_ms,
        "Analysis complete"
    );

    Ok(Json(response))
}
