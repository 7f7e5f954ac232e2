//! Prediction Routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use site_record::AttributeRecord;

/// Error payload for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Predict rockfall risk
pub async fn predict_risk(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AttributeRecord>,
) -> Response {
    let resolver = state.resolver.read().await.clone();

    match risk_engine::score_risk(&resolver, &record) {
        Ok(assessment) => {
            info!(
                risk_level = assessment.risk_level.as_str(),
                probability = assessment.high_risk_probability,
                "risk prediction"
            );
            Json(assessment).into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}

/// Predict slope stability
pub async fn predict_stability(
    State(state): State<Arc<AppState>>,
    Json(record): Json<AttributeRecord>,
) -> Response {
    let resolver = state.resolver.read().await.clone();

    match stability_engine::score_stability(&resolver, &record) {
        Ok(assessment) => {
            info!(
                status = assessment.stability_status.as_str(),
                factor = assessment.factor_of_safety,
                "stability prediction"
            );
            Json(assessment).into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}
