//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder that exports them.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const TRANSCRIPTS_TOTAL: &str = "ytx_transcripts_total";
    pub const EXPLANATION_DURATION_SECONDS: &str = "ytx_explanation_duration_seconds";
    pub const EXPLANATION_FAILURES_TOTAL: &str = "ytx_explanation_failures_total";
}

/// Record the outcome of one URL ("success" or a failure code).
pub fn record_transcript_outcome(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::TRANSCRIPTS_TOTAL, &labels).increment(1);
}

/// Record an explanation call.
pub fn record_explanation(duration_secs: f64, success: bool) {
    histogram!(names::EXPLANATION_DURATION_SECONDS).record(duration_secs);
    if !success {
        counter!(names::EXPLANATION_FAILURES_TOTAL).increment(1);
    }
}
