use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tallyslip_ocr::ExtractError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NothingToParse,
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::EmptyInput => ApiError::NothingToParse,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NothingToParse => {
                (StatusCode::UNPROCESSABLE_ENTITY, "nothing to parse".to_string())
            }
        };
        tracing::warn!(status = status.as_u16(), %message, "request rejected");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
