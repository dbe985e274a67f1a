//! Explanation output returned to API clients.

use serde::{Deserialize, Serialize};

/// Fixed Mermaid diagram attached to every explanation.
pub const DEFAULT_DIAGRAM: &str = r#"graph TD;
    A[Start] --> B{Is it working?};
    B -- Yes --> C[Great!];
    B -- No --> D[Fix it];
    D --> B;
"#;

/// Normalized explanation plus diagram definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationResult {
    /// Normalized markdown explanation.
    pub transcript: String,
    /// Mermaid diagram definition.
    pub diagram: String,
}

impl ExplanationResult {
    /// Build a result with the default diagram.
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            diagram: DEFAULT_DIAGRAM.to_string(),
        }
    }
}
