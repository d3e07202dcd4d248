//! Load Handlers
//!
//! Replace the served inventory from an uploaded spreadsheet, from tables
//! parsed by the caller, or by re-reading the configured data file.

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use tracing::info;

use stockboard_models::RawTable;
use stockboard_utils::{validate_file_size, validate_file_type, SourceFormat, StockboardError};

use crate::error::ApiResult;
use crate::service::LoadReport;
use crate::AppState;

/// POST /api/v1/inventory/upload
pub async fn upload_inventory(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<LoadReport>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| StockboardError::validation("file", format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| StockboardError::validation("file", "No file provided"))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = field.content_type().map(|s| s.to_string());

    // Extension first, then the part's content type.
    let format = SourceFormat::from_extension(Path::new(&filename))
        .or_else(|| content_type.as_deref().and_then(SourceFormat::from_content_type))
        .ok_or_else(|| StockboardError::unsupported_format(&filename))?;
    validate_file_type(format.extension(), &state.config.inventory.allowed_extensions())?;

    let data = field
        .bytes()
        .await
        .map_err(|e| StockboardError::validation("file", format!("Failed to read file data: {}", e)))?;
    validate_file_size(data.len() as u64, state.config.server.max_request_size as u64)?;

    info!(filename = %filename, bytes = data.len(), "Inventory upload received");
    let report = state
        .service
        .load_upload(filename, data.to_vec(), Some(format))
        .await?;

    Ok(Json(report))
}

/// POST /api/v1/inventory/tables
pub async fn load_tables(
    State(state): State<AppState>,
    Json(tables): Json<Vec<RawTable>>,
) -> ApiResult<Json<LoadReport>> {
    let report = state.service.load_tables(tables).await?;
    Ok(Json(report))
}

/// POST /api/v1/inventory/reload
pub async fn reload_inventory(State(state): State<AppState>) -> ApiResult<Json<LoadReport>> {
    let path = state.config.inventory.data_file.clone();
    let report = state.service.load_file(path).await?;
    Ok(Json(report))
}
