//! HTTP route handlers for the botx service.
//!
//! This module contains the HTTP route handler functions and the router that wires them
//! together. The tweet endpoint is meant to be hit by an external scheduler.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::bot::{invoke, ClientFactory, TweetOutcome};
use crate::config::{Environment, RuntimeMode, MAX_DURATION_SECS};
use crate::error::BotError;

/// Fallback error text for errors whose message is empty.
const DEFAULT_ERROR_MESSAGE: &str = "Failed to post tweet";

/// Shared state of the HTTP application.
pub struct AppState<F> {
    /// Builds the API clients for each invocation.
    pub factory: Arc<F>,
    /// Produces the environment snapshot for each invocation.
    pub environment: Arc<dyn Fn() -> Environment + Send + Sync>,
}

impl<F> AppState<F> {
    /// State that reads the process environment on every request.
    pub fn from_process(factory: F) -> Self {
        AppState {
            factory: Arc::new(factory),
            environment: Arc::new(Environment::from_process),
        }
    }
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        AppState {
            factory: Arc::clone(&self.factory),
            environment: Arc::clone(&self.environment),
        }
    }
}

/// Builds the application router.
///
/// - `GET /api/tweet`: generates and publishes a tweet, bounded by [`MAX_DURATION_SECS`]
/// - `GET /health`: liveness check
/// - anything else: JSON 404
pub fn build_router<F: ClientFactory>(state: AppState<F>) -> Router {
    Router::new()
        .route(
            "/api/tweet",
            get(handle_tweet::<F>).layer(TimeoutLayer::new(Duration::from_secs(
                MAX_DURATION_SECS,
            ))),
        )
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Body of a successful tweet invocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetSuccess {
    pub success: bool,
    pub message: String,
    pub content: String,
    pub tweet_id: String,
}

/// Body of a failed tweet invocation.
#[derive(Debug, Serialize)]
pub struct TweetFailure {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handles GET requests to the `/api/tweet` endpoint.
///
/// Runs one invocation with a fresh environment snapshot and renders the outcome.
///
/// # Success Response (200)
///
/// ```json
/// {
///   "success": true,
///   "message": "Tweet posted successfully",
///   "content": "<published text>",
///   "tweetId": "<id>"
/// }
/// ```
///
/// # Error Response (401 or 500)
///
/// ```json
/// {
///   "success": false,
///   "error": "<message>",
///   "details": "<error chain, development mode only>"
/// }
/// ```
pub async fn handle_tweet<F: ClientFactory>(
    State(state): State<AppState<F>>,
    headers: HeaderMap,
) -> Response {
    let env = (state.environment)();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let outcome = invoke(&env, authorization, state.factory.as_ref()).await;
    render_outcome(outcome, RuntimeMode::from_environment(&env))
}

/// Converts an invocation outcome into the HTTP response.
pub fn render_outcome(outcome: Result<TweetOutcome, BotError>, mode: RuntimeMode) -> Response {
    match outcome {
        Ok(TweetOutcome { content, tweet_id }) => {
            info!("Tweet posted successfully");
            Json(TweetSuccess {
                success: true,
                message: "Tweet posted successfully".to_string(),
                content,
                tweet_id,
            })
            .into_response()
        }
        Err(e) => {
            error!("Error in tweet posting: {}", e.details());
            let message = e.to_string();
            let body = TweetFailure {
                success: false,
                error: if message.is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    message
                },
                details: mode.includes_details().then(|| e.details()),
            };
            (e.status_code(), Json(body)).into_response()
        }
    }
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "botx"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "botx"}))
}

/// Fallback for unmatched routes.
pub async fn handle_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": "Not found"})),
    )
}
