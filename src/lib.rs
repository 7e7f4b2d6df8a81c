pub mod cache;
pub mod config;
pub mod error;
pub mod generate;
pub mod length;
pub mod output;
pub mod server;
pub mod style;
pub mod synthesize;
pub mod youtube;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use length::{BlogLength, WordCountTarget};
pub use style::BlogStyle;

/// Metadata for a single YouTube video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
}

/// A generated blog post, as cached and returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogGenerationResult {
    pub video_details: VideoDetails,
    pub blog_content: String,
    pub style: BlogStyle,
    pub is_fallback_generation: bool,
}

const FALLBACK_NOTICE: &str =
    "Using fallback generation mode due to API limits. Content quality may be reduced.";

const ANIMATED_FALLBACK_NOTICE: &str = "The animated style features (like visual effects and dynamic content) \
are limited in fallback mode. Some animations and styling may not display correctly.";

impl BlogGenerationResult {
    /// Wrap generated content, flagging it as fallback output when it carries the disclaimer.
    pub fn new(video_details: VideoDetails, blog_content: String, style: BlogStyle) -> Self {
        let is_fallback_generation = is_fallback_content(&blog_content);
        Self {
            video_details,
            blog_content,
            style,
            is_fallback_generation,
        }
    }

    /// User-facing notices describing degraded output, most general first.
    pub fn notices(&self) -> Vec<&'static str> {
        let mut notices = Vec::new();
        if self.is_fallback_generation {
            notices.push(FALLBACK_NOTICE);
            if self.style == BlogStyle::Animated {
                notices.push(ANIMATED_FALLBACK_NOTICE);
            }
        }
        notices
    }
}

/// True when the HTML was produced by the template synthesizer rather than the LLM.
pub fn is_fallback_content(blog_content: &str) -> bool {
    blog_content.contains(synthesize::DISCLAIMER_MARKER)
}

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^([a-zA-Z0-9_-]{11})$",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("video id pattern is valid"))
    .collect()
});

/// Extract video ID from a bare ID or any of the common YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_video() -> VideoDetails {
        VideoDetails {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Rust in Production".to_string(),
            description: "A talk about shipping Rust.".to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string(),
            channel_title: "RustConf".to_string(),
            published_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_and_embed_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(extract_video_id("not-a-valid-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = BlogGenerationResult::new(sample_video(), "<h1>Hi</h1>".to_string(), BlogStyle::Casual);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["videoDetails"]["channelTitle"], "RustConf");
        assert_eq!(json["videoDetails"]["publishedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(json["style"], "casual");
        assert_eq!(json["isFallbackGeneration"], false);
    }

    #[test]
    fn test_notices_for_fallback_animated() {
        let content = format!("<p>{}</p>", synthesize::DISCLAIMER_MARKER);
        let result = BlogGenerationResult::new(sample_video(), content, BlogStyle::Animated);
        assert!(result.is_fallback_generation);
        assert_eq!(result.notices().len(), 2);

        let plain = BlogGenerationResult::new(sample_video(), "<h1>AI</h1>".to_string(), BlogStyle::Animated);
        assert!(plain.notices().is_empty());
    }
}
