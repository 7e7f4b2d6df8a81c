//! Error types shared across fetchers, the LLM client and the HTTP layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// An enumerated option (length, style) received an unknown value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} '{value}'. Must be one of: {options}")]
pub struct ParseOptionError {
    pub field: &'static str,
    pub value: String,
    pub options: String,
}

impl ParseOptionError {
    pub fn new<'a>(field: &'static str, value: &str, options: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            field,
            value: value.to_string(),
            options: options.into_iter().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Failures from the YouTube video-info and transcript fetchers.
///
/// A video or transcript that simply does not exist is `Ok(None)`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("YouTube API key is missing. Please provide a valid API key")]
    MissingCredential,

    #[error("YouTube API key is invalid or has insufficient permissions")]
    PermissionDenied,

    #[error("YouTube API quota exceeded. The API key has reached its usage limit")]
    QuotaExceeded,

    #[error("Failed to fetch video information from YouTube")]
    VideoFailed,

    #[error("No captions available for this video. Please try a different video with subtitles.")]
    NoCaptions,

    #[error("Cannot access transcript for a private video.")]
    PrivateVideo,

    #[error("Failed to fetch video transcript. Please ensure the video has captions/subtitles.")]
    TranscriptFailed,
}

/// Failures from a remote completion call. All of these end in fallback generation.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("invalid API key (HTTP 401)")]
    Unauthorized,

    #[error("API quota exceeded or rate limited")]
    QuotaExceeded,

    #[error("API access terminated")]
    AccessTerminated,

    #[error("API server error (HTTP {0})")]
    Server(u16),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("unexpected API response format")]
    MalformedResponse,
}

impl CompletionError {
    /// Classify a non-success HTTP response from a completion API
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || body.contains("insufficient_quota") {
            CompletionError::QuotaExceeded
        } else if body.contains("access_terminated") {
            CompletionError::AccessTerminated
        } else if status == 401 {
            CompletionError::Unauthorized
        } else if (500..600).contains(&status) {
            CompletionError::Server(status)
        } else {
            CompletionError::Api { status, body }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] FetchError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_classification() {
        assert!(matches!(
            CompletionError::from_status(429, String::new()),
            CompletionError::QuotaExceeded
        ));
        assert!(matches!(
            CompletionError::from_status(400, r#"{"error":{"type":"insufficient_quota"}}"#.to_string()),
            CompletionError::QuotaExceeded
        ));
        assert!(matches!(
            CompletionError::from_status(403, r#"{"error":{"type":"access_terminated"}}"#.to_string()),
            CompletionError::AccessTerminated
        ));
        assert!(matches!(
            CompletionError::from_status(401, String::new()),
            CompletionError::Unauthorized
        ));
        assert!(matches!(
            CompletionError::from_status(503, String::new()),
            CompletionError::Server(503)
        ));
        assert!(matches!(
            CompletionError::from_status(400, "bad".to_string()),
            CompletionError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(FetchError::QuotaExceeded).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = ApiError::from(FetchError::PrivateVideo);
        assert_eq!(err.to_string(), "Cannot access transcript for a private video.");
    }
}
