//! Transcript pipeline orchestration.
//!
//! One request runs `Collecting → Fetching → Chunking → Aggregating →
//! Explaining → Done`, or ends in `Failed`. URLs are processed one at a
//! time in input order; a failing URL is recorded and never aborts the
//! batch. Fetching shares one collection deadline, so a run never takes
//! longer than [`PipelineConfig::max_request_duration`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, Instrument};
use ytx_models::{
    chunk_transcript, extract_video_id, normalize_markdown, BatchResult, ExplanationResult,
    FailedUrl, FailureReason,
};

use crate::config::PipelineConfig;
use crate::error::{ExplanationError, PipelineError, PipelineResult, TranscriptError};
use crate::gemini::ExplanationGenerator;
use crate::logging::BatchLogger;
use crate::metrics::{record_explanation, record_transcript_outcome};
use crate::transcript::{fetch_with_fallback, TranscriptSource};

/// Stage of a single request, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Collecting,
    Fetching,
    Chunking,
    Aggregating,
    Explaining,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Collecting => "collecting",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Chunking => "chunking",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Explaining => "explaining",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub explanation: ExplanationResult,
    /// URLs that failed, in input order.
    pub failed_urls: Vec<FailedUrl>,
}

/// Orchestrates transcript collection and explanation for a batch of URLs.
pub struct TranscriptPipeline {
    config: PipelineConfig,
    transcripts: Arc<dyn TranscriptSource>,
    explainer: Arc<dyn ExplanationGenerator>,
}

impl TranscriptPipeline {
    pub fn new(
        config: PipelineConfig,
        transcripts: Arc<dyn TranscriptSource>,
        explainer: Arc<dyn ExplanationGenerator>,
    ) -> Self {
        Self {
            config,
            transcripts,
            explainer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline with a generated request ID.
    pub async fn run(&self, urls: Vec<String>) -> PipelineResult<PipelineOutput> {
        self.run_with_logger(urls, BatchLogger::generate("fetch_transcript"))
            .await
    }

    /// Run the whole pipeline, logging under the caller's request ID.
    pub async fn run_for_request(
        &self,
        urls: Vec<String>,
        request_id: &str,
    ) -> PipelineResult<PipelineOutput> {
        self.run_with_logger(urls, BatchLogger::new(request_id, "fetch_transcript"))
            .await
    }

    async fn run_with_logger(
        &self,
        urls: Vec<String>,
        logger: BatchLogger,
    ) -> PipelineResult<PipelineOutput> {
        let span = logger.create_span();

        async move {
            logger.log_stage(
                PipelineStage::Collecting,
                &format!("Received {} URL(s)", urls.len()),
            );
            if urls.is_empty() {
                logger.log_error(PipelineStage::Failed, "No URLs provided");
                return Err(PipelineError::NoUrlsProvided);
            }

            let batch = self.collect_with_logger(&urls, &logger).await;
            let result = self.explain_with_logger(batch, &logger).await;

            match &result {
                Ok(output) => logger.log_stage(
                    PipelineStage::Done,
                    &format!("Explanation ready, {} URL(s) failed", output.failed_urls.len()),
                ),
                Err(e) => logger.log_error(PipelineStage::Failed, &e.to_string()),
            }

            result
        }
        .instrument(span)
        .await
    }

    /// Fetch and chunk every URL, recording failures without aborting.
    pub async fn collect(&self, urls: &[String]) -> BatchResult {
        let logger = BatchLogger::generate("collect");
        self.collect_with_logger(urls, &logger).await
    }

    async fn collect_with_logger(&self, urls: &[String], logger: &BatchLogger) -> BatchResult {
        let mut batch = BatchResult::new();
        let deadline = tokio::time::Instant::now() + self.config.collect_deadline;

        for url in urls {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let budget = remaining.min(self.config.transcript_timeout);

            match self.fetch_chunks(url, budget, logger).await {
                Ok(chunks) => {
                    record_transcript_outcome("success");
                    batch.push_chunks(chunks);
                }
                Err(reason) => {
                    record_transcript_outcome(reason.code());
                    logger.log_url_failure(url, &reason.message());
                    batch.push_failure(url.as_str(), &reason);
                }
            }
        }

        logger.log_stage(
            PipelineStage::Aggregating,
            &format!(
                "Collected {} chunk(s), {} failed URL(s)",
                batch.chunks.len(),
                batch.failed_urls.len()
            ),
        );

        batch
    }

    async fn fetch_chunks(
        &self,
        url: &str,
        budget: Duration,
        logger: &BatchLogger,
    ) -> Result<Vec<String>, FailureReason> {
        let video_id = extract_video_id(url).map_err(|_| FailureReason::InvalidUrl)?;

        // Collection deadline already spent
        if budget.is_zero() {
            return Err(FailureReason::Timeout);
        }

        logger.log_stage(PipelineStage::Fetching, &format!("Fetching transcript for {}", video_id));

        let fetch = fetch_with_fallback(
            self.transcripts.as_ref(),
            &video_id,
            &self.config.transcript_languages,
        );
        let entries = match timeout(budget, fetch).await {
            Ok(result) => result,
            Err(_) => Err(TranscriptError::Timeout),
        }
        .map_err(|e| e.to_failure_reason())?;

        let chunks = chunk_transcript(&entries, self.config.chunk_max_length);
        debug!(
            video_id = %video_id,
            entries = entries.len(),
            chunks = chunks.len(),
            stage = %PipelineStage::Chunking,
            "Transcript chunked"
        );

        if chunks.is_empty() {
            return Err(FailureReason::NoTranscript);
        }

        Ok(chunks)
    }

    /// Aggregate a collected batch and generate the explanation.
    pub async fn explain(&self, batch: BatchResult) -> PipelineResult<PipelineOutput> {
        let logger = BatchLogger::generate("explain");
        self.explain_with_logger(batch, &logger).await
    }

    async fn explain_with_logger(
        &self,
        batch: BatchResult,
        logger: &BatchLogger,
    ) -> PipelineResult<PipelineOutput> {
        if !batch.has_chunks() {
            return Err(PipelineError::NoTranscriptsFetched {
                failed_urls: batch.failed_urls,
            });
        }

        let combined = batch.combined_text();
        logger.log_stage(
            PipelineStage::Explaining,
            &format!("Requesting explanation for {} characters", combined.chars().count()),
        );

        let started = Instant::now();
        let result = match timeout(self.config.explanation_timeout, self.explainer.explain(&combined)).await {
            Ok(result) => result,
            Err(_) => Err(ExplanationError::Timeout),
        };
        record_explanation(started.elapsed().as_secs_f64(), result.is_ok());

        let text = result.map_err(|e| PipelineError::ExplanationFailed {
            detail: e.to_string(),
            transcripts_retrieved: true,
            failed_urls: batch.failed_urls.clone(),
        })?;

        info!(
            stage = %PipelineStage::Explaining,
            chars = text.chars().count(),
            "Explanation generated"
        );

        Ok(PipelineOutput {
            explanation: ExplanationResult::new(normalize_markdown(&text)),
            failed_urls: batch.failed_urls,
        })
    }
}
