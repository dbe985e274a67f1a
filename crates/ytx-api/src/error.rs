//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use ytx_models::FailedUrl;
use ytx_pipeline::PipelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Only POST method is allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON data in request")]
    InvalidJson,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    RequestTimeout,

    #[error("No YouTube URLs provided")]
    NoUrls,

    #[error("Could not fetch any transcripts")]
    NoTranscripts { failed_urls: Vec<FailedUrl> },

    #[error("Error processing with Gemini: {detail}")]
    Explanation {
        detail: String,
        transcripts_retrieved: bool,
        failed_urls: Vec<FailedUrl>,
    },

    #[error("Server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Internal error whose detail is withheld from clients in production.
    pub fn internal_for(msg: impl Into<String>, hide_detail: bool) -> Self {
        if hide_detail {
            Self::internal("an internal error occurred")
        } else {
            Self::internal(msg)
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::InvalidJson | ApiError::NoUrls | ApiError::NoTranscripts { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Explanation { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoUrlsProvided => ApiError::NoUrls,
            PipelineError::NoTranscriptsFetched { failed_urls } => ApiError::NoTranscripts { failed_urls },
            PipelineError::ExplanationFailed {
                detail,
                transcripts_retrieved,
                failed_urls,
            } => ApiError::Explanation {
                detail,
                transcripts_retrieved,
                failed_urls,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_urls: Option<Vec<FailedUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcripts_retrieved: Option<bool>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();

        let (failed_urls, transcripts_retrieved) = match self {
            ApiError::NoTranscripts { failed_urls } => (Some(failed_urls), None),
            ApiError::Explanation {
                transcripts_retrieved,
                failed_urls,
                ..
            } => (Some(failed_urls), Some(transcripts_retrieved)),
            _ => (None, None),
        };

        let body = ErrorResponse {
            success: false,
            error,
            failed_urls,
            transcripts_retrieved,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::InvalidJson.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NoTranscripts { failed_urls: vec![] }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::RequestTimeout.status_code(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_internal_detail_hidden_when_requested() {
        assert_eq!(
            ApiError::internal_for("db exploded", false).to_string(),
            "Server error: db exploded"
        );
        assert_eq!(
            ApiError::internal_for("db exploded", true).to_string(),
            "Server error: an internal error occurred"
        );
    }

    #[test]
    fn test_pipeline_error_conversion() {
        let err: ApiError = PipelineError::ExplanationFailed {
            detail: "quota exceeded".into(),
            transcripts_retrieved: true,
            failed_urls: vec![],
        }
        .into();

        assert_eq!(err.to_string(), "Error processing with Gemini: quota exceeded");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
