//! Error types for the tweet publishing pipeline.
//!
//! Every failure in an invocation is represented by a [`BotError`]. Errors raised while
//! constructing a client keep the original cause as their [`source`](std::error::Error::source)
//! while presenting a generic summary, so the HTTP response never leaks client internals but the
//! full chain is still available to logs and to development-mode diagnostics.

use axum::http::StatusCode;
use std::fmt::Write as _;

/// Boxed error used for causes attached to [`BotError`] variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of a [`BotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Configuration,
    Prompt,
    GenerationClientInit,
    PostingClientConfig,
    PostingClientInit,
    GenerationRequest,
    PostingRequest,
}

/// An error that aborts a tweet invocation.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The caller did not present the expected cron secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// One or more required environment variables are absent or empty.
    /// Holds every missing name in declaration order.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    /// The prompt override file could not be read.
    #[error("Failed to load prompt from {path}")]
    Prompt {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The Gemini client could not be constructed.
    #[error("Gemini initialization failed")]
    GenerationClientInit(#[source] BoxError),

    /// The Twitter consumer key or secret is missing.
    #[error("Twitter consumer tokens are missing")]
    PostingClientConfig,

    /// The Twitter client could not be constructed.
    #[error("Twitter client initialization failed")]
    PostingClientInit(#[source] BoxError),

    /// The generation call failed or returned unusable output.
    #[error("{message}")]
    GenerationRequest {
        message: String,
        /// HTTP status returned by the Gemini API, if a response was received.
        status: Option<u16>,
    },

    /// The publish call failed.
    #[error("{message}")]
    PostingRequest {
        message: String,
        /// HTTP status returned by the Twitter API, if a response was received.
        status: Option<u16>,
    },
}

impl BotError {
    pub fn generation(message: impl Into<String>) -> Self {
        BotError::GenerationRequest {
            message: message.into(),
            status: None,
        }
    }

    pub fn posting(message: impl Into<String>) -> Self {
        BotError::PostingRequest {
            message: message.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::Unauthorized => ErrorKind::Unauthorized,
            BotError::Configuration(_) => ErrorKind::Configuration,
            BotError::Prompt { .. } => ErrorKind::Prompt,
            BotError::GenerationClientInit(_) => ErrorKind::GenerationClientInit,
            BotError::PostingClientConfig => ErrorKind::PostingClientConfig,
            BotError::PostingClientInit(_) => ErrorKind::PostingClientInit,
            BotError::GenerationRequest { .. } => ErrorKind::GenerationRequest,
            BotError::PostingRequest { .. } => ErrorKind::PostingRequest,
        }
    }

    /// Maps the error to the HTTP status of the failure response.
    ///
    /// | Error                                          | Status |
    /// |------------------------------------------------|--------|
    /// | `Unauthorized`                                 | 401    |
    /// | `GenerationRequest` / `PostingRequest` with upstream 401 | 401 |
    /// | everything else                                | 500    |
    pub fn status_code(&self) -> StatusCode {
        match self {
            BotError::Unauthorized => StatusCode::UNAUTHORIZED,
            BotError::GenerationRequest {
                status: Some(401), ..
            }
            | BotError::PostingRequest {
                status: Some(401), ..
            } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error kind and its full source chain for diagnostics.
    pub fn details(&self) -> String {
        let mut out = format!("{:?}: {}", self.kind(), self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let _ = write!(out, "\ncaused by: {}", cause);
            source = cause.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_lists_all_names() {
        let err = BotError::Configuration(vec!["TWITTER_APP_KEY", "GEMINI_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: TWITTER_APP_KEY, GEMINI_API_KEY"
        );
    }

    #[test]
    fn test_status_code_table() {
        assert_eq!(BotError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BotError::PostingRequest {
                message: "Twitter API error (401 Unauthorized)".into(),
                status: Some(401),
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BotError::GenerationRequest {
                message: "Gemini API error (403 Forbidden)".into(),
                status: Some(403),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BotError::PostingClientConfig.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BotError::Configuration(vec!["GEMINI_API_KEY"]).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_init_error_keeps_cause_out_of_message() {
        let err = BotError::GenerationClientInit("tls backend unavailable".into());
        assert_eq!(err.to_string(), "Gemini initialization failed");

        let details = err.details();
        assert!(details.starts_with("GenerationClientInit: Gemini initialization failed"));
        assert!(details.contains("caused by: tls backend unavailable"));
    }
}
