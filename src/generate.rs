use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::CompletionError;
use crate::synthesize::{FallbackSynthesizer, RngSource};
use crate::{BlogLength, BlogStyle, VideoDetails};

/// Transcript characters embedded in the prompt before truncation
pub const DEFAULT_PROMPT_TRANSCRIPT_CHARS: usize = 8000;

const MAX_TOKENS: u32 = 4000;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// One prompt for a remote completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A remote text-completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Pick the backend from the model name and read its key from the environment
pub fn client_for_model(http: reqwest::Client, model: &str) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    if is_anthropic_model(model) {
        Ok(Arc::new(AnthropicClient::from_env(http, model)?))
    } else {
        Ok(Arc::new(OpenAiClient::from_env(http, model)?))
    }
}

fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_env(http: reqwest::Client, model: &str) -> Result<Self, CompletionError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY_ENV_VAR"))
            .map_err(|_| CompletionError::MissingApiKey("OPENAI_API_KEY"))?;
        Ok(Self::new(http, api_key, model))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!("Generating via OpenAI API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature
        });

        let resp = self
            .http
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, body));
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_env(http: reqwest::Client, model: &str) -> Result<Self, CompletionError> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| CompletionError::MissingApiKey("ANTHROPIC_API_KEY"))?;
        Ok(Self::new(http, api_key, model))
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!("Generating via Anthropic API with model {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system,
            "messages": [
                { "role": "user", "content": request.prompt }
            ]
        });

        let resp = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, body));
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String, CompletionError> {
    let content = json
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or(CompletionError::MalformedResponse)?;

    let text: String = content
        .iter()
        .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(text)
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String, CompletionError> {
    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or(CompletionError::MalformedResponse)?;

    match message.get("content").and_then(|t| t.as_str()) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(CompletionError::EmptyResponse),
    }
}

/// Build the system message and prompt for one blog post
pub fn build_prompt(
    transcript: &str,
    video: &VideoDetails,
    length: BlogLength,
    style: BlogStyle,
    transcript_chars: usize,
) -> CompletionRequest {
    let transcript = match transcript.char_indices().nth(transcript_chars) {
        Some((idx, _)) => format!("{}... (transcript truncated due to length)", &transcript[..idx]),
        None => transcript.to_string(),
    };
    let words = length.word_count();

    let animated_guidance = if style.is_animated() {
        "For the animated style:
- Add emojis to headings and important points
- Use vibrant, energetic language throughout
- Create a sense of movement and excitement in your writing
- Include visually descriptive language that helps readers visualize content
- Add CSS styling with gradients, animations, and visual flair
- Make the content feel dynamic and engaging, like it's \"coming alive\" on the page
"
    } else {
        ""
    };
    let animated_css = if style.is_animated() {
        "Include inline CSS for animations and visual effects that make the content more lively."
    } else {
        ""
    };

    let prompt = format!(
        "You are a skilled content writer creating a well-structured blog post based on a YouTube video.

Video Title: {title}
Video Creator: {channel}
Video Description: {description}

Here is the transcript of the video:
{transcript}

Please generate a {length} blog post ({min}-{max} words, target: {target} words) based on this video.

Writing Style: {style} - Write {tone}

{animated_guidance}
The blog post should:
1. Have a catchy title related to the content
2. Include an introduction that hooks the reader
3. Be structured with proper headings and subheadings (using h1, h2, h3 HTML tags)
4. Cover the key points from the video in a well-organized manner
5. Include lists and bullet points where appropriate
6. Have a strong conclusion that summarizes the main points
7. Be written in the specified style: {style}

Format the blog post with proper HTML tags for structure (h1, h2, h3, p, ul, li, etc.) so it's ready for web publishing.
{animated_css}
Do not include any meta information, instructions, or notes - respond only with the formatted blog post content.
",
        title = video.title,
        channel = video.channel_title,
        description = video.description,
        min = words.min,
        max = words.max,
        target = words.target,
        tone = style.tone(),
    );

    CompletionRequest {
        system: format!(
            "You are an {style} blog writer who specializes in creating {} content from video transcripts.",
            style.persona()
        ),
        prompt,
        max_tokens: MAX_TOKENS,
        temperature: style.temperature(),
    }
}

/// LLM generation that degrades to the template synthesizer on any failure
pub struct BlogGenerator {
    client: Option<Arc<dyn CompletionClient>>,
    synthesizer: FallbackSynthesizer,
    prompt_chars: usize,
}

impl BlogGenerator {
    /// `None` means no backend is configured and every post is synthesized locally.
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            client,
            synthesizer: FallbackSynthesizer::default(),
            prompt_chars: DEFAULT_PROMPT_TRANSCRIPT_CHARS,
        }
    }

    pub fn offline() -> Self {
        Self::new(None)
    }

    pub fn with_synthesizer(mut self, synthesizer: FallbackSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_prompt_chars(mut self, prompt_chars: usize) -> Self {
        self.prompt_chars = prompt_chars;
        self
    }

    /// Generate a post. Never fails: any backend error yields the fallback synthesis.
    pub async fn generate(&self, transcript: &str, video: &VideoDetails, length: BlogLength, style: BlogStyle) -> String {
        let Some(client) = &self.client else {
            warn!("LLM API key is missing. Using fallback blog generation.");
            return self.fallback(transcript, video, length, style);
        };

        let request = build_prompt(transcript, video, length, style, self.prompt_chars);
        info!(
            "Requesting {length} {style} blog for {} from {}",
            video.video_id,
            client.name()
        );

        match client.complete(&request).await {
            Ok(content) => content,
            Err(e) => {
                log_failure(client.name(), &e);
                self.fallback(transcript, video, length, style)
            }
        }
    }

    pub fn fallback(&self, transcript: &str, video: &VideoDetails, length: BlogLength, style: BlogStyle) -> String {
        let mut rng = RngSource::from_entropy();
        self.synthesizer.synthesize(transcript, video, length, style, &mut rng)
    }
}

fn log_failure(backend: &str, err: &CompletionError) {
    match err {
        CompletionError::QuotaExceeded => {
            warn!("{backend} API quota exceeded. Using fallback blog generation.")
        }
        CompletionError::AccessTerminated => {
            warn!("{backend} API access terminated. Using fallback blog generation.")
        }
        CompletionError::Unauthorized | CompletionError::MissingApiKey(_) => {
            warn!("Invalid {backend} API key. Using fallback blog generation.")
        }
        CompletionError::Server(status) => {
            warn!("{backend} server error ({status}). Using fallback blog generation.")
        }
        other => warn!("Failed to generate blog with {backend}: {other}. Using fallback blog generation."),
    }
}
