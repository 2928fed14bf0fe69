//! # Botx Library
//!
//! A Rust web service library that generates a short post with the Google Gemini API and
//! publishes it to Twitter/X. Each call of the tweet endpoint is one independent invocation,
//! normally triggered by an external scheduler.
//!
//! ## Features
//!
//! - `GET /api/tweet`: generate, truncate to 280 characters and publish one tweet
//! - `GET /health`: service health status
//! - OAuth 1.0a user-context signing for the Twitter API v2
//! - Structured logging
//!
//! ## Configuration
//!
//! Required environment variables, re-read on every invocation:
//! - `TWITTER_APP_KEY`, `TWITTER_APP_SECRET`: Twitter consumer credentials
//! - `TWITTER_ACCESS_TOKEN`, `TWITTER_ACCESS_SECRET`: Twitter user credentials
//! - `GEMINI_API_KEY`: Gemini API key
//!
//! Optional:
//! - `NODE_ENV=development` (or `APP_ENV=development`): include error chains in failure responses
//! - `CRON_SECRET`: require `Authorization: Bearer <secret>` on the tweet endpoint
//! - `GEMINI_MODEL`: model id (defaults to `gemini-1.5-pro`)
//! - `PROMPT_FILE`: replace the built-in persona prompt
//! - `PORT`: server port (defaults to 3000)

pub mod bot;
pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod oauth;
pub mod prompt;
mod text;
pub mod twitter;

// Re-export commonly used types and functions
pub use bot::{invoke, run_tweet_job, ClientFactory, LiveClients, TweetOutcome};
pub use config::{get_server_port, BotConfig, Environment, RuntimeMode};
pub use error::{BotError, ErrorKind};
pub use gemini::{ContentGenerator, GeminiClient};
pub use handlers::{build_router, AppState};
pub use twitter::{TweetPublisher, TwitterClient};
