use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tallyslip_ocr::{
    AmountSource, DateFormat, Extractor, OcrLine, ParsedReceipt, RawText, VendorSource,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Extractor,
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/health", get(health))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Recognized text, lines separated by `\n`.
    pub text: Option<String>,
    /// Recognized lines, optionally with per-line confidence.
    pub lines: Option<Vec<LineInput>>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LineInput {
    Plain(String),
    Scored(OcrLine),
}

impl AnalyzeRequest {
    fn raw_text(&self) -> Result<RawText, ApiError> {
        match (&self.text, &self.lines) {
            (_, Some(lines)) => Ok(RawText::from_lines(
                lines
                    .iter()
                    .map(|l| match l {
                        LineInput::Plain(text) => OcrLine::new(text.as_str()),
                        LineInput::Scored(line) => line.clone(),
                    })
                    .collect(),
            )),
            (Some(text), None) => Ok(RawText::from_text(text)),
            (None, None) => Err(ApiError::BadRequest(
                "request must carry `text` or `lines`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: ParsedReceipt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ExtractionDetails>,
}

#[derive(Debug, Serialize)]
pub struct ExtractionDetails {
    pub amount_source: Option<AmountSource>,
    pub date_format: Option<DateFormat>,
    pub vendor_source: VendorSource,
}

#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload?;
    let text = req.raw_text()?;
    let extraction = state.extractor.extract_details(&text)?;
    tracing::info!(
        lines = text.len(),
        category = %extraction.receipt.category,
        has_total = extraction.receipt.total.is_some(),
        has_date = extraction.receipt.date.is_some(),
        "receipt analyzed"
    );

    let details = req.debug.then(|| ExtractionDetails {
        amount_source: extraction.amount.map(|a| a.source),
        date_format: extraction.date.map(|d| d.matched_format),
        vendor_source: extraction.vendor.source(),
    });

    Ok(Json(AnalyzeResponse { success: true, data: extraction.receipt, details }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "catalog_entries": state.extractor.catalog().len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tallyslip_core::{CatalogEntry, VendorCatalog};
    use tower::ServiceExt;

    fn app() -> Router {
        let catalog = VendorCatalog::new(vec![
            CatalogEntry::new("walmart", "Retail"),
            CatalogEntry::new("shell", "Gas"),
        ])
        .unwrap();
        let state = AppState { extractor: Extractor::new(Arc::new(catalog)) };
        router(state, 64 * 1024)
    }

    async fn post_json(body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn analyze_text_blob() {
        let (status, json) = post_json(json!({
            "text": "WALMART SUPERCENTER\n03/15/2024\nTOTAL $12.34"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["vendor"], "WALMART SUPERCENTER");
        assert_eq!(json["data"]["category"], "Retail");
        assert_eq!(json["data"]["total"], 12.34);
        assert_eq!(json["data"]["date"], "2024-03-15");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn analyze_scored_lines_with_details() {
        let (status, json) = post_json(json!({
            "lines": [
                { "text": "SHELL 0042", "confidence": 0.91 },
                "PUMP 4",
                { "text": "FUEL $38.20" }
            ],
            "debug": true
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["category"], "Gas");
        assert_eq!(json["data"]["total"], 38.2);
        assert_eq!(json["data"]["date"], Value::Null);
        assert_eq!(json["details"]["amount_source"], "fallback-max");
        assert_eq!(json["details"]["vendor_source"], "catalog");
        assert_eq!(json["details"]["date_format"], Value::Null);
    }

    #[tokio::test]
    async fn absent_fields_are_null_and_category_is_other() {
        let (status, json) = post_json(json!({ "text": "Corner Cafe\nthanks!" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["vendor"], "Corner Cafe");
        assert_eq!(json["data"]["category"], "Other");
        assert_eq!(json["data"]["total"], Value::Null);
        assert_eq!(json["data"]["date"], Value::Null);
    }

    #[tokio::test]
    async fn empty_text_is_unprocessable() {
        let (status, json) = post_json(json!({ "text": "" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "nothing to parse");

        let (status, _) = post_json(json!({ "lines": [] })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_text_is_bad_request() {
        let (status, json) = post_json(json!({ "image": "aGVsbG8=" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["catalog_entries"], 2);
    }
}
