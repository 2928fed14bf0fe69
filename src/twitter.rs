//! Twitter/X API integration module.
//!
//! This module posts tweets through the Twitter/X API v2 endpoint using OAuth 1.0a
//! user-context authentication (app key/secret plus access token/secret).

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::{TwitterCredentials, MAX_DURATION_SECS};
use crate::error::BotError;
use crate::oauth::{build_oauth1_header, OAuthNonce};
use crate::text::sanitize_for_logging;

const TWEETS_URL: &str = "https://api.x.com/2/tweets";

/// Publishes a post and returns the new post's id.
#[async_trait]
pub trait TweetPublisher: Send + Sync {
    async fn post_tweet(&self, text: &str) -> Result<String, BotError>;
}

/// Twitter API v2 client signed with OAuth 1.0a.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: Client,
    credentials: TwitterCredentials,
}

impl TwitterClient {
    /// Builds a client from the four user-context credentials.
    ///
    /// # Errors
    ///
    /// - [`BotError::PostingClientConfig`] if the app key or app secret is empty
    /// - [`BotError::PostingClientInit`] if the HTTP client cannot be constructed
    pub fn new(credentials: TwitterCredentials) -> Result<Self, BotError> {
        info!("Initializing Twitter client");

        if credentials.app_key.is_empty() || credentials.app_secret.is_empty() {
            error!("Failed to initialize Twitter client: consumer tokens are missing");
            return Err(BotError::PostingClientConfig);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(MAX_DURATION_SECS))
            .build()
            .map_err(|e| {
                error!("Failed to initialize Twitter client: {}", e);
                BotError::PostingClientInit(Box::new(e))
            })?;

        Ok(TwitterClient { http, credentials })
    }
}

#[async_trait]
impl TweetPublisher for TwitterClient {
    /// Posts a tweet to Twitter/X using the API v2 endpoint.
    ///
    /// Errors are returned as [`BotError::PostingRequest`]; an HTTP error status is kept in the
    /// error so a rejected credential (401) can be told apart from other failures.
    async fn post_tweet(&self, text: &str) -> Result<String, BotError> {
        info!("Starting tweet post operation ({} characters)", text.chars().count());

        let payload = json!({ "text": text });
        debug!("Tweet payload: {}", payload);

        let auth_header = build_oauth1_header(
            "POST",
            TWEETS_URL,
            &[],
            &self.credentials,
            &OAuthNonce::generate(),
        )
        .map_err(|e| BotError::posting(format!("Failed to sign Twitter request: {}", e)))?;

        info!("Sending POST request to Twitter API v2");
        debug!("Request headers: Authorization: OAuth [REDACTED], Content-Type: application/json");

        let response = self
            .http
            .post(TWEETS_URL)
            .header("Authorization", auth_header)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Twitter request failed: {}", e);
                BotError::posting(format!("Twitter request failed: {}", e))
            })?;

        let status = response.status();
        info!("Received response with status: {}", status);

        let body = response.text().await.map_err(|e| {
            error!("Failed to read Twitter response body: {}", e);
            BotError::posting(format!("Failed to read Twitter response: {}", e))
        })?;

        if !status.is_success() {
            error!("Tweet posting failed - Status: {}", status);
            debug!("Error response: {}", sanitize_for_logging(&body, 200));
            return Err(api_error(status, &body));
        }

        let tweet_id = parse_tweet_id(&body)?;
        info!("Tweet posted successfully with id {}", tweet_id);
        Ok(tweet_id)
    }
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Extracts `data.id` from a create-tweet response body.
fn parse_tweet_id(body: &str) -> Result<String, BotError> {
    serde_json::from_str::<CreateTweetResponse>(body)
        .map(|response| response.data.id)
        .map_err(|e| {
            error!(
                "Unexpected Twitter response: {} ({})",
                e,
                sanitize_for_logging(body, 200)
            );
            BotError::posting(format!("Invalid Twitter response: {}", e))
        })
}

/// Maps a non-success response to a [`BotError::PostingRequest`] that keeps the status.
fn api_error(status: StatusCode, body: &str) -> BotError {
    let detail = api_error_message(body).unwrap_or_else(|| status.to_string());
    BotError::PostingRequest {
        message: format!("Twitter API error ({}): {}", status, detail),
        status: Some(status.as_u16()),
    }
}

/// Extracts a readable message from a Twitter v2 problem body.
///
/// v2 errors carry `detail` and `title`; older endpoints use `errors[0].message`.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("detail")
        .or_else(|| value.get("title"))
        .or_else(|| value.get("errors")?.get(0)?.get("message"))?
        .as_str()?;
    Some(sanitize_for_logging(message, 200))
}
