use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use stockboard_utils::{ErrorResponse, StockboardError};

/// Maps domain errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub StockboardError);

impl From<StockboardError> for ApiError {
    fn from(error: StockboardError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
