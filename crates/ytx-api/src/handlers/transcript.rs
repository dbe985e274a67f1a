//! Transcript explanation handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use ytx_models::{ExplanationResult, FailedUrl, FetchTranscriptRequest};

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Successful explanation response.
#[derive(Debug, Serialize)]
pub struct FetchTranscriptResponse {
    pub success: bool,
    pub response: ExplanationResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_urls: Vec<FailedUrl>,
}

/// Fetch transcripts for the submitted URLs and explain them.
///
/// The body must be a JSON object whose `urls` field is a single URL or a
/// list of URLs.
pub async fn fetch_transcript(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<FetchTranscriptResponse>> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJson
        }
    })?;
    let urls = parse_urls(&body)?;
    info!(urls = urls.len(), "Processing transcript request");

    let output = match request_id {
        Some(Extension(RequestId(id))) => state.pipeline.run_for_request(urls, &id).await,
        None => state.pipeline.run(urls).await,
    }?;

    if !output.failed_urls.is_empty() {
        warn!(failed = output.failed_urls.len(), "Some URLs could not be processed");
    }

    Ok(Json(FetchTranscriptResponse {
        success: true,
        response: output.explanation,
        failed_urls: output.failed_urls,
    }))
}

/// Method fallback for the transcript route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn parse_urls(body: &[u8]) -> ApiResult<Vec<String>> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;

    // A struct also deserializes from a JSON array, so check the shape first.
    if !value.is_object() {
        return Err(ApiError::InvalidJson);
    }

    let request: FetchTranscriptRequest =
        serde_json::from_value(value).map_err(|_| ApiError::InvalidJson)?;

    request.into_urls().ok_or(ApiError::NoUrls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urls_accepts_string_and_list() {
        assert_eq!(parse_urls(br#"{"urls":"a"}"#).unwrap(), vec!["a"]);
        assert_eq!(parse_urls(br#"{"urls":["a","b"]}"#).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_urls_rejects_bad_json() {
        assert!(matches!(parse_urls(b"{not json"), Err(ApiError::InvalidJson)));
        assert!(matches!(parse_urls(br#"["a"]"#), Err(ApiError::InvalidJson)));
        assert!(matches!(parse_urls(br#"{"urls":42}"#), Err(ApiError::InvalidJson)));
    }

    #[test]
    fn test_parse_urls_requires_urls() {
        assert!(matches!(parse_urls(b"{}"), Err(ApiError::NoUrls)));
        assert!(matches!(parse_urls(br#"{"urls":[]}"#), Err(ApiError::NoUrls)));
        assert!(matches!(parse_urls(br#"{"urls":""}"#), Err(ApiError::NoUrls)));
        assert!(matches!(parse_urls(br#"{"urls":null}"#), Err(ApiError::NoUrls)));
    }
}
