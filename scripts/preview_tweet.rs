//! Tweet Preview Script
//!
//! Generates a tweet with the configured prompt and prints it without posting anything.
//! Only `GEMINI_API_KEY` is required; `GEMINI_MODEL` and `PROMPT_FILE` are honored.

use botx::bot::generate_tweet_content;
use botx::config::{Environment, DEFAULT_GEMINI_MODEL, GEMINI_API_KEY, GEMINI_MODEL};
use botx::prompt::{Prompt, MAX_TWEET_CHARS};
use botx::{BotError, GeminiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🐦 Tweet Preview Tool");
    println!("=====================");

    let env = Environment::from_process();
    let Some(api_key) = env.get(GEMINI_API_KEY) else {
        println!("❌ {} is not set!", GEMINI_API_KEY);
        return Err(BotError::Configuration(vec![GEMINI_API_KEY]).into());
    };
    let model = env.get(GEMINI_MODEL).unwrap_or(DEFAULT_GEMINI_MODEL);

    let prompt = Prompt::from_environment(&env)?;
    let client = GeminiClient::new(api_key, model)?;

    println!("🚀 Generating with {}...", model);
    match generate_tweet_content(&client, &prompt).await {
        Ok(content) => {
            println!(
                "\n📏 Length: {} characters (max {})",
                content.chars().count(),
                MAX_TWEET_CHARS
            );
            println!("📝 Preview:\n\n{}", content);
        }
        Err(e) => {
            println!("\n💥 Failed to generate tweet: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
