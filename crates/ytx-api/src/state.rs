//! Application state.

use std::sync::Arc;

use anyhow::Context;
use ytx_pipeline::{GeminiClient, PipelineConfig, TranscriptPipeline, YoutubeTranscriptSource};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<TranscriptPipeline>,
}

impl AppState {
    /// Build state around an existing pipeline.
    pub fn new(config: ApiConfig, pipeline: Arc<TranscriptPipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Create application state with the YouTube and Gemini collaborators.
    pub fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let pipeline_config = PipelineConfig::from_env().context("Invalid pipeline configuration")?;

        let transcripts = YoutubeTranscriptSource::new(&pipeline_config)
            .context("Failed to create YouTube transcript source")?;
        let explainer =
            GeminiClient::new(&pipeline_config).context("Failed to create Gemini client")?;

        let pipeline = TranscriptPipeline::new(
            pipeline_config,
            Arc::new(transcripts),
            Arc::new(explainer),
        );

        Ok(Self::new(config, Arc::new(pipeline)))
    }
}
