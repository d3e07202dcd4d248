use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health/detailed", get(detailed_health_check))
        .nest("/inventory", inventory_routes())
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/records", get(list_records))
        .route("/top", get(top_records))
        .route("/sources", get(list_sources))
        .route("/sources/:name", get(get_source))
        .route("/sources/:name/export", get(export_source))
        .route("/export", get(export_inventory))
        .route("/upload", post(upload_inventory))
        .route("/tables", post(load_tables))
        .route("/reload", post(reload_inventory))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use stockboard_utils::{AppConfig, NormalizerConfig};

    use crate::{create_app, AppState};

    fn test_app() -> Router {
        let mut config = AppConfig::default();
        config.inventory.data_file = "/nonexistent/stockboard/data.xlsx".into();
        config.inventory.normalizer = NormalizerConfig::spreadsheet_layout(1000).with_skip_rows(0);

        let state = AppState::new(config.clone()).unwrap();
        create_app(state, &config)
    }

    fn stock_tables() -> Value {
        json!([
            {
                "name": "Bolts",
                "rows": [
                    ["1", "Bolt", "M6x20", "Steel", "", "", "1500", "pcs"],
                    ["2", "Bolt", "M8x30", "Steel", "", "", "300", "pcs"],
                    ["3", "Bolt", "", "Steel", "", "", "900", "pcs"]
                ]
            },
            {
                "name": "Nuts",
                "rows": [
                    ["1", "Nut", "M6", "Brass", "", "", "0", "pcs"],
                    ["2", "Nut", "M8", "Brass", "", "", "2500", "pcs"]
                ]
            },
            {
                "name": "总汇-2024",
                "rows": [["", "Total", "All", "", "", "", "99999", "pcs"]]
            }
        ])
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_tables(app: &Router) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/tables")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(stock_tables().to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn multipart_upload(filename: &str, content: &[u8]) -> Request<Body> {
        multipart_upload_typed(filename, "application/octet-stream", content)
    }

    fn multipart_upload_typed(filename: &str, content_type: &str, content: &[u8]) -> Request<Body> {
        let boundary = "stockboard-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = test_app();
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_tables_then_summary() {
        let app = test_app();
        let (status, report) = post_tables(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["committed"], true);

        let (status, body) = get_json(&app, "/api/v1/inventory/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placeholder"], false);
        assert_eq!(body["origin"]["kind"], "tables");
        assert_eq!(body["summary"]["total_quantity"], 4300);
        assert_eq!(body["summary"]["record_count"], 3);
        assert_eq!(body["summary"]["group_count"], 2);
        assert_eq!(body["summary"]["low_stock_count"], 1);
        assert_eq!(body["categories"][0]["category"], "Nut");
        assert_eq!(body["categories"][0]["quantity"], 2500);
    }

    #[tokio::test]
    async fn test_records_search_and_ranking() {
        let app = test_app();
        post_tables(&app).await;

        let (_, body) = get_json(&app, "/api/v1/inventory/records").await;
        assert_eq!(body["matched"], 3);
        assert_eq!(body["records"][0]["specification"], "M8");
        assert_eq!(body["records"][0]["rank"], 1);
        assert_eq!(body["records"][2]["low_stock"], true);

        let (_, body) = get_json(&app, "/api/v1/inventory/records?q=bolt%20steel&limit=1").await;
        assert_eq!(body["matched"], 2);
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["records"][0]["specification"], "M6x20");
    }

    #[tokio::test]
    async fn test_sources() {
        let app = test_app();
        post_tables(&app).await;

        let (_, body) = get_json(&app, "/api/v1/inventory/sources").await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["source"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bolts", "Nuts"]);

        let (status, body) = get_json(&app, "/api/v1/inventory/sources/Nuts?q=m6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["records"][0]["quantity"], 0);

        let (status, body) = get_json(&app, "/api/v1/inventory/sources/Washers").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let app = test_app();
        post_tables(&app).await;

        let request = Request::builder()
            .uri("/api/v1/inventory/export")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("inventory-export.csv"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with('\u{FEFF}'));
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("1,Bolt,M6x20,Steel,1500,pcs"));
    }

    #[tokio::test]
    async fn test_unreadable_upload_serves_placeholder() {
        let app = test_app();
        post_tables(&app).await;

        let (status, body) = send(&app, multipart_upload("stock.xlsx", b"not a workbook")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "SOURCE_UNREADABLE");

        let (_, summary) = get_json(&app, "/api/v1/inventory/summary").await;
        assert_eq!(summary["placeholder"], true);
        assert_eq!(summary["origin"]["kind"], "placeholder");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_format() {
        let app = test_app();
        let (status, body) = send(&app, multipart_upload("notes.txt", b"hello")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "UNSUPPORTED_FORMAT");

        let (_, summary) = get_json(&app, "/api/v1/inventory/summary").await;
        assert_eq!(summary["origin"]["kind"], "empty");
    }

    #[tokio::test]
    async fn test_upload_rejects_format_not_allowed() {
        let mut config = AppConfig::default();
        config.inventory.allowed_extensions = vec!["xlsx".to_string()];
        let state = AppState::new(config.clone()).unwrap();
        let app = create_app(state, &config);

        let (status, _) = send(&app, multipart_upload("stock.csv", b"1,Bolt,M6,,,,5,pcs\n")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, summary) = get_json(&app, "/api/v1/inventory/summary").await;
        assert_eq!(summary["origin"]["kind"], "empty");
    }

    #[tokio::test]
    async fn test_upload_format_from_content_type() {
        let app = test_app();
        let csv = "1,Washer,M10,Zinc,,,750,pcs\n";

        let (status, body) =
            send(&app, multipart_upload_typed("stock-export", "text/csv", csv.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["summary"]["total_quantity"], 750);
    }

    #[tokio::test]
    async fn test_tables_with_numeric_and_null_cells() {
        let app = test_app();
        let tables = json!([
            {
                "name": "Bolts",
                "rows": [
                    ["1", "Bolt", "M6x20", "Steel", "", "", 1500, "pcs"],
                    [2, null, "M8x30", null, null, null, 300.0, null]
                ]
            }
        ]);
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/tables")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(tables.to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["summary"]["total_quantity"], 1800);
        assert_eq!(report["summary"]["record_count"], 2);

        let (_, detail) = get_json(&app, "/api/v1/inventory/sources/Bolts?q=m8").await;
        assert_eq!(detail["records"][0]["category"], "Bolts");
        assert_eq!(detail["records"][0]["unit"], "pcs");
        assert_eq!(detail["records"][0]["sequence"], "2");
    }

    #[tokio::test]
    async fn test_records_zero_limit_is_empty() {
        let app = test_app();
        post_tables(&app).await;

        let (status, body) = get_json(&app, "/api/v1/inventory/records?limit=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], 3);
        assert!(body["records"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_csv_upload() {
        let app = test_app();
        let csv = "1,Washer,M10,Zinc,,,750,pcs\n2,Washer,M12,Zinc,,,1200,pcs\n";

        let (status, body) = send(&app, multipart_upload("washers.csv", csv.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["origin"]["kind"], "upload");
        assert_eq!(report["summary"]["total_quantity"], 1950);

        let (status, body) = get_json(&app, "/api/v1/inventory/sources/washers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_reload_missing_file_falls_back() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/inventory/reload")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, health) = get_json(&app, "/api/v1/health/detailed").await;
        assert_eq!(health["status"], "degraded");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = test_app();
        post_tables(&app).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("stockboard_inventory_total_quantity 4300"));
    }
}
