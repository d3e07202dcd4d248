use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "stockboard-inventory-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Health including the state of the served snapshot.
///
/// Reports `degraded` while the placeholder dataset or no data is served.
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.service.snapshot().await;

    let data_status = if snapshot.origin.is_placeholder() || snapshot.inventory.is_empty() {
        "degraded"
    } else {
        "healthy"
    };

    Json(json!({
        "status": data_status,
        "service": "stockboard-inventory-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "inventory": {
                "status": data_status,
                "generation": snapshot.generation,
                "origin": snapshot.origin,
                "records": snapshot.inventory.summary.record_count,
            }
        }
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.service.metrics().encode()
}
