//! HTTP surface: one generation endpoint plus a liveness probe.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use eyre::{Result, WrapErr};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::cache::{BlogCache, CacheKey};
use crate::config::Config;
use crate::error::{ApiError, ApiResult, CompletionError};
use crate::generate::{BlogGenerator, client_for_model};
use crate::synthesize::FallbackSynthesizer;
use crate::youtube::{CaptionFetcher, DataApiFetcher, TranscriptFetcher, VideoInfoFetcher};
use crate::{BlogGenerationResult, BlogLength, BlogStyle, extract_video_id};

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoInfoFetcher>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub generator: Arc<BlogGenerator>,
    pub cache: Arc<BlogCache>,
}

impl AppState {
    pub fn new(
        videos: Arc<dyn VideoInfoFetcher>,
        transcripts: Arc<dyn TranscriptFetcher>,
        generator: BlogGenerator,
    ) -> Self {
        Self {
            videos,
            transcripts,
            generator: Arc::new(generator),
            cache: Arc::new(BlogCache::new()),
        }
    }

    /// Wire the real YouTube fetchers and LLM backend from config and environment
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = config.http_client()?;
        let generator = build_generator(config, http.clone(), false);
        Ok(Self::new(
            Arc::new(DataApiFetcher::from_env(http.clone())),
            Arc::new(CaptionFetcher::new(http, config.lang.clone())),
            generator,
        ))
    }
}

/// Generator for `config`. Without an API key (or with `offline`) every post is synthesized locally.
pub fn build_generator(config: &Config, http: reqwest::Client, offline: bool) -> BlogGenerator {
    let client = if offline {
        None
    } else {
        match client_for_model(http, &config.model) {
            Ok(client) => Some(client),
            Err(CompletionError::MissingApiKey(var)) => {
                warn!("{var} is not set; blog posts will use fallback generation");
                None
            }
            Err(e) => {
                warn!("LLM client unavailable ({e}); blog posts will use fallback generation");
                None
            }
        }
    };

    BlogGenerator::new(client)
        .with_synthesizer(FallbackSynthesizer::with_budgets(config.char_budgets()))
        .with_prompt_chars(config.ai_transcript_chars)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-blog", post(generate_blog))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlogRequest {
    pub video_id: Option<String>,
    pub length: Option<String>,
    pub style: Option<String>,
}

impl GenerateBlogRequest {
    /// Resolve the request into a cache key, rejecting bad input before any side effect
    pub fn validate(&self) -> ApiResult<CacheKey> {
        let raw_id = self
            .video_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::validation("Video ID is required"))?;
        let video_id =
            extract_video_id(raw_id).ok_or_else(|| ApiError::validation("Invalid YouTube video ID or URL"))?;

        let length = self
            .length
            .as_deref()
            .and_then(|l| l.parse::<BlogLength>().ok())
            .ok_or_else(|| ApiError::validation("Valid length (short, medium, long) is required"))?;

        let style = match self.style.as_deref() {
            None => BlogStyle::default(),
            Some(s) => s.parse::<BlogStyle>().map_err(|e| {
                ApiError::validation(format!("Invalid style. Must be one of: {}", e.options))
            })?,
        };

        Ok(CacheKey::new(video_id, length, style))
    }
}

async fn generate_blog(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBlogRequest>, JsonRejection>,
) -> ApiResult<Json<BlogGenerationResult>> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let key = request.validate()?;

    if let Some(cached) = state.cache.get(&key) {
        return Ok(Json(cached));
    }
    info!("Generating blog post for {key}");

    let video = state
        .videos
        .fetch_video(&key.video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Failed to fetch video details"))?;

    let transcript = state
        .transcripts
        .fetch_transcript(&key.video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Failed to fetch video transcript"))?;

    let content = state.generator.generate(&transcript, &video, key.length, key.style).await;
    let result = BlogGenerationResult::new(video, content, key.style);
    if result.is_fallback_generation {
        info!("Served fallback generation for {key}");
    }

    state.cache.insert(key, result.clone());
    Ok(Json(result))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
