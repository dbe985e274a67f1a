//! Transcript source collaborator.
//!
//! [`YoutubeTranscriptSource`] reads the caption track list embedded in the
//! watch page and downloads the selected timedtext track.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};
use ytx_models::{TranscriptEntry, VideoId};

use crate::config::PipelineConfig;
use crate::error::TranscriptError;
use crate::retry::{retry_async_if, RetryConfig};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).unwrap());

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static PLAYABILITY_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""playabilityStatus":\s*\{\s*"status":\s*"([A-Z_]+)""#).unwrap());

/// Source of timed transcript entries for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript in exactly one language.
    ///
    /// Returns [`TranscriptError::NoTranscriptFound`] when the video has
    /// captions but none in `language`.
    async fn fetch(
        &self,
        video_id: &VideoId,
        language: &str,
    ) -> Result<Vec<TranscriptEntry>, TranscriptError>;
}

/// Fetch a transcript, trying each language in order.
///
/// Only a missing language advances to the next one; any other error is
/// returned immediately.
pub async fn fetch_with_fallback(
    source: &dyn TranscriptSource,
    video_id: &VideoId,
    languages: &[String],
) -> Result<Vec<TranscriptEntry>, TranscriptError> {
    for language in languages {
        match source.fetch(video_id, language).await {
            Ok(entries) => {
                debug!(video_id = %video_id, language = %language, entries = entries.len(), "Transcript fetched");
                return Ok(entries);
            }
            Err(TranscriptError::NoTranscriptFound { .. }) => {
                debug!(video_id = %video_id, language = %language, "No transcript in language, trying next");
            }
            Err(e) => return Err(e),
        }
    }

    Err(TranscriptError::NoTranscriptFound {
        language: languages.join(","),
    })
}

/// One entry of the watch page's caption track list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    /// Auto-generated (speech recognition) track.
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// Transcript source backed by youtube.com.
pub struct YoutubeTranscriptSource {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl YoutubeTranscriptSource {
    /// Create a new YouTube transcript source.
    pub fn new(config: &PipelineConfig) -> Result<Self, TranscriptError> {
        let client = Client::builder()
            .timeout(config.transcript_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TranscriptError::request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.youtube_base_url.clone(),
            retry: RetryConfig::from_pipeline(config, "youtube_transcript"),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, TranscriptError> {
        let client = &self.client;

        retry_async_if(&self.retry, TranscriptError::is_transient, || async move {
            let response = client
                .get(url)
                .header(ACCEPT_LANGUAGE, "en-US")
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        TranscriptError::Timeout
                    } else {
                        TranscriptError::request(e.to_string())
                    }
                })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(TranscriptError::TooManyRequests);
            }
            if !status.is_success() {
                return Err(TranscriptError::request(format!("YouTube returned {}", status)));
            }

            response
                .text()
                .await
                .map_err(|e| TranscriptError::request(format!("Failed to read response body: {}", e)))
        })
        .await
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch(
        &self,
        video_id: &VideoId,
        language: &str,
    ) -> Result<Vec<TranscriptEntry>, TranscriptError> {
        info!(video_id = %video_id, language = %language, "Fetching transcript from YouTube");

        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let html = self.get_text(&watch_url).await?;

        let tracks = parse_caption_tracks(&html)?;
        let track = select_track(&tracks, language).ok_or_else(|| TranscriptError::NoTranscriptFound {
            language: language.to_string(),
        })?;

        let track_url = track.base_url.replace("&fmt=srv3", "");
        let xml = self.get_text(&track_url).await?;

        parse_timedtext(&xml)
    }
}

/// Extract the caption track list from a watch page.
pub fn parse_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, rest)) = html.split_once("\"captions\":") else {
        return Err(classify_missing_captions(html));
    };

    let json = rest
        .split_once(",\"videoDetails")
        .map(|(json, _)| json)
        .ok_or_else(|| TranscriptError::parse("captions block is not terminated"))?;

    let captions: CaptionsJson = serde_json::from_str(json)
        .map_err(|e| TranscriptError::parse(format!("invalid captions JSON: {}", e)))?;

    match captions.player_captions_tracklist_renderer {
        Some(renderer) if !renderer.caption_tracks.is_empty() => Ok(renderer.caption_tracks),
        _ => Err(TranscriptError::TranscriptsDisabled),
    }
}

fn classify_missing_captions(html: &str) -> TranscriptError {
    if html.contains("class=\"g-recaptcha\"") {
        return TranscriptError::TooManyRequests;
    }

    match PLAYABILITY_STATUS.captures(html) {
        Some(caps) if &caps[1] == "OK" => TranscriptError::TranscriptsDisabled,
        _ => TranscriptError::VideoUnavailable,
    }
}

/// Pick a track for `language`, preferring manual captions over generated.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matching = || tracks.iter().filter(move |t| t.language_code == language);

    matching()
        .find(|t| !t.is_generated())
        .or_else(|| matching().next())
}

/// Parse a timedtext XML document into entries.
pub fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptEntry>, TranscriptError> {
    if !xml.contains("<transcript") && !xml.contains("<text") {
        return Err(TranscriptError::parse("not a timedtext document"));
    }

    let mut entries = Vec::new();

    for caps in TEXT_ELEMENT.captures_iter(xml) {
        let Some(raw_text) = caps.get(2) else {
            continue;
        };

        let mut start = 0.0;
        let mut duration = 0.0;
        for attr in ATTRIBUTE.captures_iter(&caps[1]) {
            match &attr[1] {
                "start" => start = attr[2].parse().unwrap_or(0.0),
                "dur" => duration = attr[2].parse().unwrap_or(0.0),
                _ => {}
            }
        }

        // Caption text is escaped once for XML and once more for HTML.
        let text = unescape_entities(&unescape_entities(raw_text.as_str()));
        let text = TAG.replace_all(&text, "");

        entries.push(TranscriptEntry::new(text.into_owned(), start, duration));
    }

    Ok(entries)
}

fn unescape_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let hex = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"));
                    let code = if let Some(hex) = hex {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity[1..].parse().ok()
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn watch_page(tracks_json: &str) -> String {
        format!(
            r#"<html><script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{tracks_json}}}}},"videoDetails":{{"videoId":"dQw4w9WgXcQ"}}}};</script></html>"#
        )
    }

    const TIMEDTEXT: &str = r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.5">Hello &amp;amp; welcome</text><text start="2" dur="3.25">it&amp;#39;s <font color="#E5E5E5">great</font></text><text start="6" dur="1"/></transcript>"##;

    #[test]
    fn test_parse_timedtext() {
        let entries = parse_timedtext(TIMEDTEXT).unwrap();
        assert_eq!(
            entries,
            vec![
                TranscriptEntry::new("Hello & welcome", 0.5, 1.5),
                TranscriptEntry::new("it's great", 2.0, 3.25),
            ]
        );
    }

    #[test]
    fn test_parse_timedtext_rejects_garbage() {
        assert!(matches!(parse_timedtext("{}"), Err(TranscriptError::Parse(_))));
    }

    #[test]
    fn test_unescape_numeric_entities() {
        assert_eq!(unescape_entities("&#65;&#x42;&lt;c&gt;"), "AB<c>");
        assert_eq!(unescape_entities("&#xZZ; stays"), "&#xZZ; stays");
    }

    #[test]
    fn test_parse_caption_tracks() {
        let html = watch_page(
            r#"[{"baseUrl":"https://example.com/tt?lang=en&v=x","languageCode":"en","kind":"asr"},{"baseUrl":"https://example.com/tt?lang=hi","languageCode":"hi"}]"#,
        );
        let tracks = parse_caption_tracks(&html).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://example.com/tt?lang=en&v=x");
        assert!(tracks[0].is_generated());
        assert!(!tracks[1].is_generated());
    }

    #[test]
    fn test_missing_captions_classification() {
        let disabled = r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{}}"#;
        assert!(matches!(
            parse_caption_tracks(disabled),
            Err(TranscriptError::TranscriptsDisabled)
        ));

        let unavailable = r#"{"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}}"#;
        assert!(matches!(
            parse_caption_tracks(unavailable),
            Err(TranscriptError::VideoUnavailable)
        ));

        assert!(matches!(
            parse_caption_tracks("<html></html>"),
            Err(TranscriptError::VideoUnavailable)
        ));

        assert!(matches!(
            parse_caption_tracks(r#"<div class="g-recaptcha"></div>"#),
            Err(TranscriptError::TooManyRequests)
        ));
    }

    #[test]
    fn test_empty_track_list_means_disabled() {
        let html = watch_page("[]");
        assert!(matches!(
            parse_caption_tracks(&html),
            Err(TranscriptError::TranscriptsDisabled)
        ));
    }

    #[test]
    fn test_select_track_prefers_manual_captions() {
        let tracks = vec![
            CaptionTrack {
                base_url: "asr".into(),
                language_code: "en".into(),
                kind: Some("asr".into()),
            },
            CaptionTrack {
                base_url: "manual".into(),
                language_code: "en".into(),
                kind: None,
            },
        ];

        assert_eq!(select_track(&tracks, "en").unwrap().base_url, "manual");
        assert_eq!(select_track(&tracks[..1], "en").unwrap().base_url, "asr");
        assert!(select_track(&tracks, "hi").is_none());
    }

    struct MapSource {
        by_language: HashMap<String, Result<Vec<TranscriptEntry>, TranscriptError>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TranscriptSource for MapSource {
        async fn fetch(
            &self,
            _video_id: &VideoId,
            language: &str,
        ) -> Result<Vec<TranscriptEntry>, TranscriptError> {
            self.calls.lock().unwrap().push(language.to_string());
            self.by_language
                .get(language)
                .cloned()
                .unwrap_or(Err(TranscriptError::NoTranscriptFound {
                    language: language.to_string(),
                }))
        }
    }

    fn langs() -> Vec<String> {
        vec!["en".to_string(), "hi".to_string()]
    }

    #[tokio::test]
    async fn test_fallback_to_second_language() {
        let source = MapSource {
            by_language: HashMap::from([(
                "hi".to_string(),
                Ok(vec![TranscriptEntry::new("namaste", 0.0, 1.0)]),
            )]),
            calls: Mutex::new(Vec::new()),
        };
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let entries = fetch_with_fallback(&source, &id, &langs()).await.unwrap();
        assert_eq!(entries[0].text, "namaste");
        assert_eq!(*source.calls.lock().unwrap(), vec!["en", "hi"]);
    }

    #[tokio::test]
    async fn test_fallback_stops_on_other_errors() {
        let source = MapSource {
            by_language: HashMap::from([("en".to_string(), Err(TranscriptError::VideoUnavailable))]),
            calls: Mutex::new(Vec::new()),
        };
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let err = fetch_with_fallback(&source, &id, &langs()).await.unwrap_err();
        assert!(matches!(err, TranscriptError::VideoUnavailable));
        assert_eq!(*source.calls.lock().unwrap(), vec!["en"]);
    }

    #[tokio::test]
    async fn test_fallback_exhausted() {
        let source = MapSource {
            by_language: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        };
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let err = fetch_with_fallback(&source, &id, &langs()).await.unwrap_err();
        assert!(matches!(err, TranscriptError::NoTranscriptFound { ref language } if language == "en,hi"));
    }

    fn test_config(base_url: &str) -> PipelineConfig {
        let mut config = PipelineConfig::new("test-key");
        config.youtube_base_url = base_url.to_string();
        config.transcript_timeout = Duration::from_secs(5);
        config.retry_base_delay = Duration::from_millis(1);
        config
    }

    #[tokio::test]
    async fn test_youtube_source_fetches_track() {
        let server = MockServer::start().await;
        let tracks = format!(
            r#"[{{"baseUrl":"{}/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}}]"#,
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_string(watch_page(&tracks)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .and(query_param("lang", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TIMEDTEXT))
            .mount(&server)
            .await;

        let source = YoutubeTranscriptSource::new(&test_config(&server.uri())).unwrap();
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let entries = source.fetch(&id, "en").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Hello & welcome");

        let err = source.fetch(&id, "hi").await.unwrap_err();
        assert!(matches!(err, TranscriptError::NoTranscriptFound { .. }));
    }

    #[tokio::test]
    async fn test_youtube_source_retries_server_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let source = YoutubeTranscriptSource::new(&test_config(&server.uri())).unwrap();
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let err = source.fetch(&id, "en").await.unwrap_err();
        assert!(matches!(err, TranscriptError::Request(_)));
    }
}
