//! Shared data models for the YTExplains backend.
//!
//! This crate provides:
//! - Video ID extraction from YouTube URLs
//! - Transcript entries and the greedy chunker
//! - Markdown normalization for generated explanations
//! - Batch, failure and response schemas

pub mod batch;
pub mod explanation;
pub mod markdown;
pub mod request;
pub mod transcript;
pub mod video_id;

// Re-export common types
pub use batch::{BatchResult, FailedUrl, FailureReason};
pub use explanation::{ExplanationResult, DEFAULT_DIAGRAM};
pub use markdown::normalize_markdown;
pub use request::{FetchTranscriptRequest, UrlsInput};
pub use transcript::{chunk_transcript, TranscriptChunker, TranscriptEntry, DEFAULT_CHUNK_MAX_LENGTH};
pub use video_id::{extract_video_id, is_valid_video_id, VideoId, VideoIdError};
