//! Inbound request schema.

use serde::{Deserialize, Serialize};

/// One URL or an ordered list of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlsInput {
    One(String),
    Many(Vec<String>),
}

impl UrlsInput {
    pub fn is_empty(&self) -> bool {
        match self {
            UrlsInput::One(url) => url.is_empty(),
            UrlsInput::Many(urls) => urls.is_empty(),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            UrlsInput::One(url) => vec![url],
            UrlsInput::Many(urls) => urls,
        }
    }
}

/// Body of `POST /fetch-transcript/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchTranscriptRequest {
    #[serde(default)]
    pub urls: Option<UrlsInput>,
}

impl FetchTranscriptRequest {
    /// URLs to process, or `None` when the field is missing or empty.
    pub fn into_urls(self) -> Option<Vec<String>> {
        self.urls
            .filter(|urls| !urls.is_empty())
            .map(UrlsInput::into_vec)
    }
}
