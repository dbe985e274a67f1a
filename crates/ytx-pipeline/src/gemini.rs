//! Gemini AI client for transcript explanations.
//!
//! This module provides integration with Google's Gemini API to turn a
//! combined video transcript into a simplified markdown explanation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::ExplanationError;
use crate::retry::{retry_async_if, RetryConfig};

/// Generates an explanation for a block of transcript text.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn explain(&self, transcript: &str) -> Result<String, ExplanationError>;
}

/// Gemini API client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    models: Vec<String>,
    client: Client,
    retry: RetryConfig,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: &PipelineConfig) -> Result<Self, ExplanationError> {
        let client = Client::builder()
            .timeout(config.explanation_timeout)
            .build()
            .map_err(|e| ExplanationError::request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            models: config.gemini_models.clone(),
            client,
            retry: RetryConfig::from_pipeline(config, "gemini_generate"),
        })
    }

    /// Call Gemini API.
    async fn call_gemini_api(&self, model: &str, prompt: &str) -> Result<String, ExplanationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "text/plain".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExplanationError::Timeout
                } else {
                    // Strip the URL so the API key never reaches logs or clients.
                    ExplanationError::request(e.without_url().to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExplanationError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ExplanationError::Parse(e.without_url().to_string()))?;

        let text: String = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ExplanationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl ExplanationGenerator for GeminiClient {
    async fn explain(&self, transcript: &str) -> Result<String, ExplanationError> {
        let prompt = build_explanation_prompt(transcript);
        let mut last_error = None;

        for model in &self.models {
            info!("Attempting Gemini API with model: {}", model);
            let result = retry_async_if(&self.retry, ExplanationError::is_transient, || {
                self.call_gemini_api(model, &prompt)
            })
            .await;

            match result {
                Ok(text) => {
                    info!("Successfully generated explanation from {}", model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExplanationError::request("No Gemini models configured")))
    }
}

/// Build the explanation prompt for a combined transcript.
pub fn build_explanation_prompt(transcript: &str) -> String {
    format!(
        r#"Explain the following video transcript in clear, simple English, as if you were talking to a ten year old.

Formatting rules:
- Write valid markdown.
- Use ** for bold terms (for example **key idea**).
- Use ``` fenced blocks for any code.
- Leave a space after header and list markers.
- Answer in English only, whatever the language of the transcript.

Organise the answer into sections. Define technical terms when they first appear, give examples or comparisons where they help, and finish with a short summary of the key points.

Transcript:
{transcript}"#
    )
}
