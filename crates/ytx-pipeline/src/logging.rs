//! Structured batch logging utilities.
//!
//! Provides consistent, structured logging for one request's batch with
//! a request ID and the current pipeline stage on every line.

use tracing::{error, info, warn, Span};

use crate::pipeline::PipelineStage;

/// Batch logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct BatchLogger {
    request_id: String,
    operation: String,
}

impl BatchLogger {
    /// Create a new batch logger.
    ///
    /// # Arguments
    /// * `request_id` - Correlation ID (the `X-Request-ID` when known)
    /// * `operation` - The operation (e.g., "fetch_transcript")
    pub fn new(request_id: impl Into<String>, operation: &str) -> Self {
        Self {
            request_id: request_id.into(),
            operation: operation.to_string(),
        }
    }

    /// Create a logger with a freshly generated request ID.
    pub fn generate(operation: &str) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), operation)
    }

    pub fn log_stage(&self, stage: PipelineStage, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            stage = %stage,
            "{}", message
        );
    }

    pub fn log_url_failure(&self, url: &str, reason: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            url = %url,
            reason = %reason,
            "URL failed"
        );
    }

    pub fn log_error(&self, stage: PipelineStage, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            stage = %stage,
            "Batch error: {}", message
        );
    }

    /// Get the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Get the operation type.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this batch.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "batch",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_logger_creation() {
        let logger = BatchLogger::new("req-123", "fetch_transcript");

        assert_eq!(logger.request_id(), "req-123");
        assert_eq!(logger.operation(), "fetch_transcript");
    }

    #[test]
    fn test_generated_request_ids_differ() {
        let a = BatchLogger::generate("op");
        let b = BatchLogger::generate("op");
        assert_ne!(a.request_id(), b.request_id());
    }
}
