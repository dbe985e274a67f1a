//! Transcript pipeline.
//!
//! This crate provides:
//! - YouTube transcript fetching with language fallback
//! - Gemini explanation client with model fallback
//! - Retry with exponential backoff for transient collaborator errors
//! - Batch orchestration that records per-URL failures

pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod retry;
pub mod transcript;

pub use config::PipelineConfig;
pub use error::{ConfigError, ExplanationError, PipelineError, PipelineResult, TranscriptError};
pub use gemini::{ExplanationGenerator, GeminiClient};
pub use logging::BatchLogger;
pub use pipeline::{PipelineOutput, PipelineStage, TranscriptPipeline};
pub use retry::{retry_async_if, RetryConfig};
pub use transcript::{fetch_with_fallback, TranscriptSource, YoutubeTranscriptSource};
