//! Pipeline error types.

use thiserror::Error;
use ytx_models::{FailedUrl, FailureReason};

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised by a transcript source for one video.
#[derive(Debug, Clone, Error)]
pub enum TranscriptError {
    #[error("Subtitles are disabled for this video")]
    TranscriptsDisabled,

    #[error("No transcript found for language '{language}'")]
    NoTranscriptFound { language: String },

    #[error("Video is unavailable")]
    VideoUnavailable,

    #[error("Too many requests to YouTube")]
    TooManyRequests,

    #[error("Timed out fetching transcript")]
    Timeout,

    #[error("Transcript request failed: {0}")]
    Request(String),

    #[error("Failed to parse transcript: {0}")]
    Parse(String),
}

impl TranscriptError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Check if error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TranscriptError::Request(_) | TranscriptError::TooManyRequests
        )
    }

    /// Map onto the per-URL failure record.
    pub fn to_failure_reason(&self) -> FailureReason {
        match self {
            TranscriptError::TranscriptsDisabled | TranscriptError::NoTranscriptFound { .. } => {
                FailureReason::NoTranscript
            }
            TranscriptError::VideoUnavailable => FailureReason::VideoUnavailable,
            TranscriptError::Timeout => FailureReason::Timeout,
            other => FailureReason::Other(other.to_string()),
        }
    }
}

/// Errors raised by the explanation generator.
#[derive(Debug, Clone, Error)]
pub enum ExplanationError {
    #[error("Gemini API request failed: {0}")]
    Request(String),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No content in Gemini response")]
    EmptyResponse,

    #[error("Failed to parse Gemini response: {0}")]
    Parse(String),

    #[error("Gemini request timed out")]
    Timeout,
}

impl ExplanationError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Network failures, rate limiting and server errors are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ExplanationError::Request(_) | ExplanationError::Timeout => true,
            ExplanationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Configuration errors, raised at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Request-level pipeline failures.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("No YouTube URLs provided")]
    NoUrlsProvided,

    #[error("Could not fetch any transcripts")]
    NoTranscriptsFetched { failed_urls: Vec<FailedUrl> },

    #[error("Error processing with Gemini: {detail}")]
    ExplanationFailed {
        detail: String,
        transcripts_retrieved: bool,
        failed_urls: Vec<FailedUrl>,
    },
}
