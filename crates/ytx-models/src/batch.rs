//! Per-request batch results and failure records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a single URL in a batch produced no transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No video ID could be extracted from the URL.
    InvalidUrl,
    /// Captions are disabled, or none exist in any accepted language.
    NoTranscript,
    /// The video itself cannot be played.
    VideoUnavailable,
    /// The transcript source did not answer in time.
    Timeout,
    /// Any other transcript source error.
    Other(String),
}

impl FailureReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::InvalidUrl => "invalid_url",
            FailureReason::NoTranscript => "no_transcript",
            FailureReason::VideoUnavailable => "video_unavailable",
            FailureReason::Timeout => "timeout",
            FailureReason::Other(_) => "transcript_error",
        }
    }

    /// Human-readable message shown to API clients.
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidUrl => "Invalid YouTube URL format".to_string(),
            FailureReason::NoTranscript => "No subtitles available for this video".to_string(),
            FailureReason::VideoUnavailable => "Video is unavailable".to_string(),
            FailureReason::Timeout => "Timed out fetching transcript".to_string(),
            FailureReason::Other(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// A URL that failed, as reported in `failed_urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUrl {
    pub url: String,
    pub error: String,
    pub code: String,
}

impl FailedUrl {
    pub fn new(url: impl Into<String>, reason: &FailureReason) -> Self {
        Self {
            url: url.into(),
            error: reason.message(),
            code: reason.code().to_string(),
        }
    }
}

/// Chunks and failures accumulated over every URL of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Chunks in URL order, then chunk order within a URL.
    pub chunks: Vec<String>,
    /// Failures in URL order.
    pub failed_urls: Vec<FailedUrl>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chunks(&mut self, chunks: impl IntoIterator<Item = String>) {
        self.chunks.extend(chunks);
    }

    pub fn push_failure(&mut self, url: impl Into<String>, reason: &FailureReason) {
        self.failed_urls.push(FailedUrl::new(url, reason));
    }

    pub fn has_chunks(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// True when nothing was fetched and at least one URL failed.
    pub fn is_exhausted(&self) -> bool {
        self.chunks.is_empty() && !self.failed_urls.is_empty()
    }

    /// All chunks joined with a blank line between them.
    pub fn combined_text(&self) -> String {
        self.chunks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason_messages() {
        assert_eq!(FailureReason::InvalidUrl.message(), "Invalid YouTube URL format");
        assert_eq!(
            FailureReason::NoTranscript.message(),
            "No subtitles available for this video"
        );
        assert_eq!(FailureReason::VideoUnavailable.message(), "Video is unavailable");
        assert_eq!(FailureReason::Other("boom".into()).message(), "boom");
    }

    #[test]
    fn test_failed_url_serialization() {
        let failed = FailedUrl::new("https://x", &FailureReason::NoTranscript);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["url"], "https://x");
        assert_eq!(json["error"], "No subtitles available for this video");
        assert_eq!(json["code"], "no_transcript");
    }

    #[test]
    fn test_batch_exhaustion() {
        let mut batch = BatchResult::new();
        assert!(!batch.is_exhausted());

        batch.push_failure("bad", &FailureReason::InvalidUrl);
        assert!(batch.is_exhausted());

        batch.push_chunks(vec!["text".to_string()]);
        assert!(!batch.is_exhausted());
        assert!(batch.has_chunks());
    }

    #[test]
    fn test_combined_text_uses_blank_line_separator() {
        let mut batch = BatchResult::new();
        batch.push_chunks(vec!["one".to_string(), "two".to_string()]);
        batch.push_chunks(vec!["three".to_string()]);
        assert_eq!(batch.combined_text(), "one\n\ntwo\n\nthree");
    }
}
