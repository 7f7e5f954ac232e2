//! Health, Options and Reload Routes

use axum::extract::State;
use axum::Json;
use model_store::{CategoryOptions, HealthSnapshot, ResolverState};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub resolver: HealthSnapshot,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let resolver = state.resolver.read().await.clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "GeoShield ML Service".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        resolver: resolver.health(),
    })
}

/// Valid category values per field, for client choice lists
pub async fn options(State(state): State<Arc<AppState>>) -> Json<CategoryOptions> {
    let resolver = state.resolver.read().await.clone();
    Json(resolver.options())
}

/// Rebuild the resolver state and swap it in atomically
pub async fn reload(State(state): State<Arc<AppState>>) -> Json<HealthSnapshot> {
    let rebuilt = Arc::new(ResolverState::initialize(&state.resolver_config));
    let snapshot = rebuilt.health();

    *state.resolver.write().await = rebuilt;
    info!(
        risk_tier = snapshot.risk_tier.as_str(),
        stability_tier = snapshot.stability_tier.as_str(),
        "resolver reloaded"
    );

    Json(snapshot)
}
