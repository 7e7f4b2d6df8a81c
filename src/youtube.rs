use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::VideoDetails;
use crate::error::FetchError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Looks up video metadata. `Ok(None)` means the video does not exist.
#[async_trait]
pub trait VideoInfoFetcher: Send + Sync {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoDetails>, FetchError>;
}

/// Fetches the flattened caption text. `Ok(None)` means no transcript text exists.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<String>, FetchError>;
}

/// YouTube Data API v3 client for video snippets
pub struct DataApiFetcher {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl DataApiFetcher {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    /// Read `YOUTUBE_API_KEY` (or `YOUTUBE_API_KEY_ENV_VAR`); a missing key surfaces on first fetch
    pub fn from_env(http: reqwest::Client) -> Self {
        let api_key = std::env::var("YOUTUBE_API_KEY")
            .or_else(|_| std::env::var("YOUTUBE_API_KEY_ENV_VAR"))
            .ok()
            .filter(|k| !k.is_empty());
        Self::new(http, api_key)
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    #[serde(default)]
    channel_title: String,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[async_trait]
impl VideoInfoFetcher for DataApiFetcher {
    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoDetails>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingCredential)?;
        debug!("Fetching video snippet for {video_id}");

        let resp = self
            .http
            .get(DATA_API_URL)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key)])
            .send()
            .await
            .map_err(|e| {
                warn!("YouTube Data API request failed: {e}");
                FetchError::VideoFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!("Failed to read YouTube Data API response: {e}");
            FetchError::VideoFailed
        })?;

        if !status.is_success() {
            warn!("YouTube Data API returned {status}: {body}");
            return Err(classify_data_api_error(status.as_u16(), &body));
        }

        parse_video_list(video_id, &body)
    }
}

fn parse_video_list(video_id: &str, body: &str) -> Result<Option<VideoDetails>, FetchError> {
    let list: VideoListResponse = serde_json::from_str(body).map_err(|e| {
        warn!("Unexpected YouTube Data API response: {e}");
        FetchError::VideoFailed
    })?;

    Ok(list.items.into_iter().next().map(|item| {
        let snippet = item.snippet;
        let thumbs = snippet.thumbnails;
        let thumbnail_url = thumbs
            .high
            .or(thumbs.medium)
            .or(thumbs.default)
            .map(|t| t.url)
            .unwrap_or_default();
        VideoDetails {
            video_id: video_id.to_string(),
            title: snippet.title,
            description: snippet.description,
            thumbnail_url,
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
        }
    }))
}

fn classify_data_api_error(status: u16, body: &str) -> FetchError {
    let error_status = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/status").and_then(|s| s.as_str()).map(str::to_string))
        .unwrap_or_default();

    if status == 429 || error_status == "RESOURCE_EXHAUSTED" || body.contains("quotaExceeded") {
        FetchError::QuotaExceeded
    } else if status == 403 || error_status == "PERMISSION_DENIED" {
        FetchError::PermissionDenied
    } else {
        FetchError::VideoFailed
    }
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Transcript from YouTube's built-in captions via the InnerTube API
pub struct CaptionFetcher {
    http: reqwest::Client,
    lang: String,
}

impl CaptionFetcher {
    pub fn new(http: reqwest::Client, lang: impl Into<String>) -> Self {
        Self {
            http,
            lang: lang.into(),
        }
    }
}

fn transcript_failed(context: &str, err: impl std::fmt::Display) -> FetchError {
    warn!("{context}: {err}");
    FetchError::TranscriptFailed
}

#[async_trait]
impl TranscriptFetcher for CaptionFetcher {
    async fn fetch_transcript(&self, video_id: &str) -> Result<Option<String>, FetchError> {
        let lang = self.lang.as_str();

        // The watch page carries the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .http
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transcript_failed("watch page request failed", e))?
            .text()
            .await
            .map_err(|e| transcript_failed("watch page read failed", e))?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .http
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transcript_failed("player request failed", e))?
            .json()
            .await
            .map_err(|e| transcript_failed("player response malformed", e))?;

        let Some(tracks) = caption_tracks(resp)? else {
            return Ok(None);
        };

        // Prefer the requested language, else the first track
        let Some(track) = tracks
            .iter()
            .find(|t| t.language_code == lang)
            .or_else(|| tracks.first())
        else {
            return Err(FetchError::NoCaptions);
        };
        debug!("Using caption track: lang={}", track.language_code);

        let caption_xml = self
            .http
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| transcript_failed("caption request failed", e))?
            .text()
            .await
            .map_err(|e| transcript_failed("caption read failed", e))?;

        let transcript = parse_caption_xml(&caption_xml)?.join(" ");
        if transcript.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(transcript))
    }
}

/// Caption tracks from a player response; `None` when the video itself is unavailable
fn caption_tracks(resp: InnerTubePlayerResponse) -> Result<Option<Vec<CaptionTrack>>, FetchError> {
    if let Some(playability) = &resp.playability_status {
        let status = playability.status.as_deref().unwrap_or("OK");
        let reason = playability.reason.as_deref().unwrap_or_default().to_lowercase();
        if status == "LOGIN_REQUIRED" || reason.contains("private") {
            return Err(FetchError::PrivateVideo);
        }
        if status == "ERROR" {
            debug!("Video unplayable: {reason}");
            return Ok(None);
        }
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(FetchError::NoCaptions);
    }
    Ok(Some(tracks))
}

fn extract_api_key(html: &str) -> Result<String, FetchError> {
    let patterns = [
        r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#,
        r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#,
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| transcript_failed("bad api key pattern", e))?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }
    Err(transcript_failed(
        "watch page",
        "could not extract InnerTube API key",
    ))
}

/// Text of every `<text>` element, entity-decoded, in document order
fn parse_caption_xml(xml: &str) -> Result<Vec<String>, FetchError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => in_text = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => in_text = false,
            Ok(Event::Text(ref e)) if in_text => {
                let raw_text = e.unescape().unwrap_or_default().to_string();
                let text = html_escape::decode_html_entities(&raw_text).trim().to_string();
                if !text.is_empty() {
                    texts.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(transcript_failed("error parsing caption XML", e)),
            _ => {}
        }
    }

    Ok(texts)
}
