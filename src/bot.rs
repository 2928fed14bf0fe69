//! Tweet invocation pipeline.
//!
//! One invocation runs strictly in order: authorize the caller, validate configuration,
//! build both clients, generate content, publish it. The first failure ends the invocation.
//! The generator and publisher are injected through [`ClientFactory`] so the pipeline can run
//! against test doubles.

use log::{error, info, warn};
use sha2::{Digest, Sha256};

use crate::config::{BotConfig, Environment, CRON_SECRET};
use crate::error::BotError;
use crate::gemini::{ContentGenerator, GeminiClient};
use crate::prompt::{truncate_chars, Prompt, MAX_TWEET_CHARS};
use crate::twitter::{TweetPublisher, TwitterClient};

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetOutcome {
    /// The published text.
    pub content: String,
    /// Id of the created tweet.
    pub tweet_id: String,
}

/// Builds the generation and posting clients for one invocation.
pub trait ClientFactory: Send + Sync + 'static {
    type Generator: ContentGenerator;
    type Publisher: TweetPublisher;

    /// Builds the content generator from the validated configuration.
    fn generator(&self, config: &BotConfig) -> Result<Self::Generator, BotError>;
    /// Builds the tweet publisher from the validated configuration.
    fn publisher(&self, config: &BotConfig) -> Result<Self::Publisher, BotError>;
}

/// Builds real Gemini and Twitter clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveClients;

impl ClientFactory for LiveClients {
    type Generator = GeminiClient;
    type Publisher = TwitterClient;

    fn generator(&self, config: &BotConfig) -> Result<GeminiClient, BotError> {
        GeminiClient::new(&config.gemini_api_key, &config.gemini_model)
    }

    fn publisher(&self, config: &BotConfig) -> Result<TwitterClient, BotError> {
        TwitterClient::new(config.twitter.clone())
    }
}

/// Checks the caller's `Authorization` header against `CRON_SECRET`.
///
/// When `CRON_SECRET` is unset the check is skipped. Otherwise the header must equal
/// `Bearer <secret>`. Both sides are hashed before comparison so the comparison time does not
/// depend on how much of the secret matched.
pub fn authorize(env: &Environment, authorization: Option<&str>) -> Result<(), BotError> {
    let Some(secret) = env.get(CRON_SECRET) else {
        return Ok(());
    };

    let expected = Sha256::digest(format!("Bearer {}", secret).as_bytes());
    let presented = Sha256::digest(authorization.unwrap_or_default().as_bytes());

    if expected == presented {
        Ok(())
    } else {
        warn!("Rejected invocation with missing or invalid cron secret");
        Err(BotError::Unauthorized)
    }
}

/// Asks the generator for a tweet and truncates it to [`MAX_TWEET_CHARS`].
pub async fn generate_tweet_content<G>(generator: &G, prompt: &Prompt) -> Result<String, BotError>
where
    G: ContentGenerator + ?Sized,
{
    info!("Generating tweet content");
    match generator.generate(prompt.as_str()).await {
        Ok(text) => {
            let content = truncate_chars(&text, MAX_TWEET_CHARS).to_string();
            info!(
                "Generated {} characters, using {}",
                text.chars().count(),
                content.chars().count()
            );
            Ok(content)
        }
        Err(e) => {
            error!("Error generating tweet content: {}", e);
            Err(e)
        }
    }
}

/// Generates one tweet and publishes it.
///
/// The publisher is only called once generation has succeeded.
pub async fn run_tweet_job<G, P>(
    generator: &G,
    publisher: &P,
    prompt: &Prompt,
) -> Result<TweetOutcome, BotError>
where
    G: ContentGenerator + ?Sized,
    P: TweetPublisher + ?Sized,
{
    let content = generate_tweet_content(generator, prompt).await?;
    let tweet_id = publisher.post_tweet(&content).await?;
    Ok(TweetOutcome { content, tweet_id })
}

/// Runs one full invocation against the given environment snapshot.
///
/// # Parameters
///
/// - `env`: Environment snapshot taken for this request
/// - `authorization`: The request's `Authorization` header, if any
/// - `factory`: Builds the generator and publisher
pub async fn invoke<F: ClientFactory>(
    env: &Environment,
    authorization: Option<&str>,
    factory: &F,
) -> Result<TweetOutcome, BotError> {
    authorize(env, authorization)?;

    let config = BotConfig::from_environment(env)?;
    let prompt = Prompt::from_environment(env)?;

    let generator = factory.generator(&config)?;
    let publisher = factory.publisher(&config)?;

    run_tweet_job(&generator, &publisher, &prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_is_inert_without_secret() {
        let env = Environment::default();
        assert!(authorize(&env, None).is_ok());
        assert!(authorize(&env, Some("Bearer anything")).is_ok());
    }

    #[test]
    fn test_authorize_with_secret() {
        let env = Environment::from_pairs([(CRON_SECRET, "s3cret")]);
        assert!(authorize(&env, Some("Bearer s3cret")).is_ok());
        assert!(matches!(
            authorize(&env, Some("Bearer wrong")),
            Err(BotError::Unauthorized)
        ));
        assert!(matches!(authorize(&env, None), Err(BotError::Unauthorized)));
        assert!(matches!(
            authorize(&env, Some("s3cret")),
            Err(BotError::Unauthorized)
        ));
    }
}
