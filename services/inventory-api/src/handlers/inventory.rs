//! Inventory Handlers
//!
//! Read-only views over the current snapshot: dashboard summary, ranked and
//! searchable record list, per-source detail and CSV export.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockboard_models::{AggregateSummary, InventoryRecord};
use stockboard_utils::{
    category_breakdown, export_file_name, filter_source, rank_by_quantity, search,
    source_overview, to_delimited_text, CategoryTotal, DataOrigin, ExportScope, SourceOverview,
    StockboardError, TOP_CHART_LIMIT,
};

use crate::error::ApiResult;
use crate::AppState;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

// ===== Summary =====

#[derive(Debug, Serialize)]
pub struct InventorySummaryResponse {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub origin: DataOrigin,
    pub placeholder: bool,
    pub summary: AggregateSummary,
    pub categories: Vec<CategoryTotal>,
}

/// GET /api/v1/inventory/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<InventorySummaryResponse> {
    let snapshot = state.service.snapshot().await;
    let summary = snapshot.inventory.summary.clone();

    Json(InventorySummaryResponse {
        generation: snapshot.generation,
        loaded_at: snapshot.loaded_at,
        origin: snapshot.origin.clone(),
        placeholder: snapshot.origin.is_placeholder(),
        categories: category_breakdown(&summary),
        summary,
    })
}

// ===== Records =====

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecordView {
    pub rank: usize,
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub low_stock: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub records: Vec<RecordView>,
    /// Records matching the query before the limit was applied.
    pub matched: usize,
    pub low_stock_threshold: u64,
}

fn ranked_views(records: Vec<&InventoryRecord>, limit: usize, threshold: u64) -> Vec<RecordView> {
    rank_by_quantity(records, limit)
        .into_iter()
        .enumerate()
        .map(|(index, record)| RecordView {
            rank: index + 1,
            record: record.clone(),
            low_stock: record.is_low_stock(threshold),
        })
        .collect()
}

/// GET /api/v1/inventory/records?q=&limit=
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> Json<RecordListResponse> {
    let snapshot = state.service.snapshot().await;
    let threshold = state.service.low_stock_threshold();
    let limit = query.limit.unwrap_or(state.config.inventory.ranking_limit);

    let matched = search(&snapshot.inventory.records, query.q.as_deref().unwrap_or(""));
    let matched_count = matched.len();

    Json(RecordListResponse {
        records: ranked_views(matched, limit, threshold),
        matched: matched_count,
        low_stock_threshold: threshold,
    })
}

/// GET /api/v1/inventory/top
///
/// Chart series: the largest stock lines.
pub async fn top_records(State(state): State<AppState>) -> Json<Vec<RecordView>> {
    let snapshot = state.service.snapshot().await;
    let threshold = state.service.low_stock_threshold();
    let records = snapshot.inventory.records.iter().collect();

    Json(ranked_views(records, TOP_CHART_LIMIT, threshold))
}

// ===== Sources =====

/// GET /api/v1/inventory/sources
pub async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceOverview>> {
    let snapshot = state.service.snapshot().await;
    Json(source_overview(&snapshot.inventory))
}

#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceDetailResponse {
    pub source: String,
    pub total: usize,
    pub records: Vec<InventoryRecord>,
}

/// GET /api/v1/inventory/sources/:name?q=
pub async fn get_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<SourceQuery>,
) -> ApiResult<Json<SourceDetailResponse>> {
    let snapshot = state.service.snapshot().await;
    let records = snapshot
        .inventory
        .source(&name)
        .ok_or_else(|| StockboardError::not_found(format!("source '{}'", name)))?;

    let filtered: Vec<InventoryRecord> = filter_source(records, query.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(SourceDetailResponse {
        source: name,
        total: records.len(),
        records: filtered,
    }))
}

// ===== Export =====

/// GET /api/v1/inventory/export
pub async fn export_inventory(State(state): State<AppState>) -> ApiResult<Response> {
    let snapshot = state.service.snapshot().await;
    let body = to_delimited_text(&snapshot.inventory.records)?;
    Ok(csv_attachment(export_file_name(ExportScope::All), body))
}

/// GET /api/v1/inventory/sources/:name/export
pub async fn export_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let snapshot = state.service.snapshot().await;
    let records = snapshot
        .inventory
        .source(&name)
        .ok_or_else(|| StockboardError::not_found(format!("source '{}'", name)))?;

    let body = to_delimited_text(records)?;
    Ok(csv_attachment(export_file_name(ExportScope::Source(&name)), body))
}

fn csv_attachment(filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(filename)
    )
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
