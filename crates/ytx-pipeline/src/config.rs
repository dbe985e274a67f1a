//! Pipeline configuration.

use std::time::Duration;

use ytx_models::DEFAULT_CHUNK_MAX_LENGTH;

use crate::error::ConfigError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Transcript and explanation pipeline configuration.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Gemini API key
    pub gemini_api_key: String,
    /// Gemini models, tried in order
    pub gemini_models: Vec<String>,
    /// Gemini REST base URL
    pub gemini_base_url: String,
    /// YouTube base URL for watch pages
    pub youtube_base_url: String,
    /// Transcript languages, tried in order
    pub transcript_languages: Vec<String>,
    /// Advisory chunk length in characters
    pub chunk_max_length: usize,
    /// Timeout for one video's transcript fetch
    pub transcript_timeout: Duration,
    /// Overall budget for fetching every URL of one request
    pub collect_deadline: Duration,
    /// Timeout for the explanation call
    pub explanation_timeout: Duration,
    /// Retries after the first attempt for transient collaborator errors
    pub retry_max_attempts: u32,
    /// Base backoff delay
    pub retry_base_delay: Duration,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_models", &self.gemini_models)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("transcript_languages", &self.transcript_languages)
            .field("chunk_max_length", &self.chunk_max_length)
            .field("transcript_timeout", &self.transcript_timeout)
            .field("collect_deadline", &self.collect_deadline)
            .field("explanation_timeout", &self.explanation_timeout)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl PipelineConfig {
    /// Build a config with defaults for everything but the credential.
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            gemini_models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.5-flash-lite".to_string(),
            ],
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            transcript_languages: vec!["en".to_string(), "hi".to_string()],
            chunk_max_length: DEFAULT_CHUNK_MAX_LENGTH,
            transcript_timeout: Duration::from_secs(30),
            collect_deadline: Duration::from_secs(45),
            explanation_timeout: Duration::from_secs(90),
            retry_max_attempts: 2,
            retry_base_delay: Duration::from_millis(250),
        }
    }

    /// Upper bound on one request's pipeline run.
    pub fn max_request_duration(&self) -> Duration {
        self.collect_deadline + self.explanation_timeout
    }

    /// Create config from environment variables.
    ///
    /// Fails when `GEMINI_API_KEY` is missing so the server refuses to start
    /// instead of failing every request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let mut config = Self::new(api_key);

        if let Some(models) = lookup("GEMINI_MODELS").map(|s| split_list(&s)) {
            if models.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "GEMINI_MODELS",
                    value: String::new(),
                });
            }
            config.gemini_models = models;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            config.gemini_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("YOUTUBE_BASE_URL") {
            config.youtube_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(langs) = lookup("TRANSCRIPT_LANGUAGES").map(|s| split_list(&s)) {
            if langs.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "TRANSCRIPT_LANGUAGES",
                    value: String::new(),
                });
            }
            config.transcript_languages = langs;
        }
        if let Some(len) = parse_var(&lookup, "CHUNK_MAX_LENGTH")? {
            config.chunk_max_length = len;
        }
        if let Some(secs) = parse_var(&lookup, "TRANSCRIPT_TIMEOUT_SECS")? {
            config.transcript_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "COLLECT_DEADLINE_SECS")? {
            config.collect_deadline = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "EXPLANATION_TIMEOUT_SECS")? {
            config.explanation_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var(&lookup, "RETRY_MAX_ATTEMPTS")? {
            config.retry_max_attempts = retries;
        }
        if let Some(ms) = parse_var(&lookup, "RETRY_BASE_DELAY_MS")? {
            config.retry_base_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = PipelineConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));

        let err = PipelineConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.gemini_api_key, "k");
        assert_eq!(config.transcript_languages, vec!["en", "hi"]);
        assert_eq!(config.chunk_max_length, 1000);
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.max_request_duration(), Duration::from_secs(135));
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODELS", "gemini-pro, gemini-2.5-pro"),
            ("TRANSCRIPT_LANGUAGES", "de"),
            ("CHUNK_MAX_LENGTH", "500"),
            ("TRANSCRIPT_TIMEOUT_SECS", "5"),
            ("COLLECT_DEADLINE_SECS", "12"),
            ("YOUTUBE_BASE_URL", "http://localhost:9000/"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_models, vec!["gemini-pro", "gemini-2.5-pro"]);
        assert_eq!(config.transcript_languages, vec!["de"]);
        assert_eq!(config.chunk_max_length, 500);
        assert_eq!(config.transcript_timeout, Duration::from_secs(5));
        assert_eq!(config.collect_deadline, Duration::from_secs(12));
        assert_eq!(config.youtube_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("CHUNK_MAX_LENGTH", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CHUNK_MAX_LENGTH", .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = PipelineConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
