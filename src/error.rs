use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("market {0} not found")]
    MarketNotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match self {
            ApiError::MarketNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}
