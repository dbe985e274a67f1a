//! YouTube video ID extraction.
//!
//! URLs are untrusted input. Extraction never panics: an unrecognised URL
//! yields [`VideoIdError::InvalidUrl`], which callers record per URL.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters in a YouTube video ID.
pub const VIDEO_ID_LEN: usize = 11;

/// Extraction patterns in priority order. Each captures exactly one
/// 11-character ID token.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // watch?v=ID, youtu.be/ID, /v/ID and any other trailing path segment
        Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"embed/([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"shorts/([0-9A-Za-z_-]{11})").unwrap(),
    ]
});

/// Errors that can occur during video ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoIdError {
    /// No supported pattern matched the URL.
    #[error("Invalid YouTube URL format")]
    InvalidUrl,
}

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate and wrap a bare ID token.
    pub fn parse(id: &str) -> Result<Self, VideoIdError> {
        if is_valid_video_id(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(VideoIdError::InvalidUrl)
        }
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video ID from a YouTube URL.
///
/// Supported forms include:
/// - https://www.youtube.com/watch?v=VIDEO_ID (extra query params allowed)
/// - https://youtu.be/VIDEO_ID
/// - https://www.youtube.com/embed/VIDEO_ID
/// - https://www.youtube.com/shorts/VIDEO_ID
/// - https://www.youtube.com/v/VIDEO_ID
///
/// The first pattern that matches wins.
pub fn extract_video_id(url: &str) -> Result<VideoId, VideoIdError> {
    let url = url.trim();

    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
        .ok_or(VideoIdError::InvalidUrl)
}

/// Check that a bare token has the shape of a video ID.
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
