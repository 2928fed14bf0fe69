//! Configuration module for the botx service.
//!
//! This module contains the configuration structures and environment variable handling
//! for the Twitter/X and Gemini integrations. The environment is re-read on every
//! invocation; nothing here is cached between requests.

use log::{debug, error, info};
use std::collections::HashMap;
use std::env;

use crate::error::BotError;

/// Twitter consumer (application) key.
pub const TWITTER_APP_KEY: &str = "TWITTER_APP_KEY";
/// Twitter consumer (application) secret.
pub const TWITTER_APP_SECRET: &str = "TWITTER_APP_SECRET";
/// Twitter user access token.
pub const TWITTER_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
/// Twitter user access token secret.
pub const TWITTER_ACCESS_SECRET: &str = "TWITTER_ACCESS_SECRET";
/// Google Gemini API key.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Every variable that must be present for an invocation, in reporting order.
pub const REQUIRED_ENV_VARS: [&str; 5] = [
    TWITTER_APP_KEY,
    TWITTER_APP_SECRET,
    TWITTER_ACCESS_TOKEN,
    TWITTER_ACCESS_SECRET,
    GEMINI_API_KEY,
];

/// Selects whether failure responses carry diagnostic details.
pub const NODE_ENV: &str = "NODE_ENV";
/// Alias of [`NODE_ENV`].
pub const APP_ENV: &str = "APP_ENV";
/// Shared secret expected in the `Authorization` header, when set.
pub const CRON_SECRET: &str = "CRON_SECRET";
/// Overrides the Gemini model id.
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
/// Path to a file that replaces the built-in prompt.
pub const PROMPT_FILE: &str = "PROMPT_FILE";

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Maximum wall-clock time allowed for one invocation, in seconds.
pub const MAX_DURATION_SECS: u64 = 300;

/// A snapshot of environment variables.
///
/// Handlers take a fresh snapshot per request with [`Environment::from_process`]; tests build one
/// from literal pairs so they never touch the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: env::vars_os()
                .filter_map(|(key, value)| {
                    Some((key.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
        }
    }

    /// Builds a snapshot from literal key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of `key` if it is set and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Twitter OAuth 1.0a user-context credentials.
#[derive(Clone)]
pub struct TwitterCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("app_key", &mask_secret(&self.app_key))
            .field("app_secret", &"[REDACTED]")
            .field("access_token", &mask_secret(&self.access_token))
            .field("access_secret", &"[REDACTED]")
            .finish()
    }
}

/// Validated configuration for a single invocation.
#[derive(Clone)]
pub struct BotConfig {
    pub twitter: TwitterCredentials,
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("twitter", &self.twitter)
            .field("gemini_api_key", &"[REDACTED]")
            .field("gemini_model", &self.gemini_model)
            .finish()
    }
}

impl BotConfig {
    /// Builds the configuration from an environment snapshot.
    ///
    /// All five required variables are checked before failing, so the returned
    /// [`BotError::Configuration`] names every missing variable, not only the first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use botx::config::{BotConfig, Environment};
    ///
    /// let env = Environment::from_pairs([("TWITTER_APP_KEY", "key")]);
    /// let err = BotConfig::from_environment(&env).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Missing required environment variables: TWITTER_APP_SECRET, TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_SECRET, GEMINI_API_KEY"
    /// );
    /// ```
    pub fn from_environment(env: &Environment) -> Result<Self, BotError> {
        info!("Validating required environment variables");

        let missing: Vec<&'static str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|name| env.get(name).is_none())
            .collect();

        if !missing.is_empty() {
            error!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
            return Err(BotError::Configuration(missing));
        }

        let value = |name: &str| env.get(name).unwrap_or_default().to_string();

        let config = BotConfig {
            twitter: TwitterCredentials {
                app_key: value(TWITTER_APP_KEY),
                app_secret: value(TWITTER_APP_SECRET),
                access_token: value(TWITTER_ACCESS_TOKEN),
                access_secret: value(TWITTER_ACCESS_SECRET),
            },
            gemini_api_key: value(GEMINI_API_KEY),
            gemini_model: env
                .get(GEMINI_MODEL)
                .unwrap_or(DEFAULT_GEMINI_MODEL)
                .to_string(),
        };

        debug!(
            "Twitter app key (masked): {}, access token (masked): {}",
            mask_secret(&config.twitter.app_key),
            mask_secret(&config.twitter.access_token)
        );
        info!("Configuration loaded, using model {}", config.gemini_model);
        Ok(config)
    }
}

/// Whether the service runs in development mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// `NODE_ENV=development` (or `APP_ENV=development`) selects development mode; anything
    /// else is production. The match is exact and case-sensitive.
    pub fn from_environment(env: &Environment) -> Self {
        let development = [NODE_ENV, APP_ENV]
            .iter()
            .any(|key| env.get(key) == Some("development"));
        if development {
            RuntimeMode::Development
        } else {
            RuntimeMode::Production
        }
    }

    pub fn includes_details(self) -> bool {
        self == RuntimeMode::Development
    }
}

/// Masks a credential for logging, keeping at most the first four characters.
pub(crate) fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    if secret.chars().count() > 8 {
        format!("{}...", prefix)
    } else {
        "...".to_string()
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set it defaults to 3000.
///
/// # Panics
///
/// This function will panic if the `PORT` environment variable is set to a value
/// that cannot be parsed as a valid port number.
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("PORT must be a valid number")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_environment() -> Vec<(&'static str, &'static str)> {
        vec![
            (TWITTER_APP_KEY, "app-key-123456"),
            (TWITTER_APP_SECRET, "app-secret"),
            (TWITTER_ACCESS_TOKEN, "access-token-123456"),
            (TWITTER_ACCESS_SECRET, "access-secret"),
            (GEMINI_API_KEY, "gemini-key"),
        ]
    }

    #[test]
    fn test_from_environment_with_all_variables() {
        let config = BotConfig::from_environment(&Environment::from_pairs(full_environment()))
            .unwrap();
        assert_eq!(config.twitter.app_key, "app-key-123456");
        assert_eq!(config.twitter.access_secret, "access-secret");
        assert_eq!(config.gemini_api_key, "gemini-key");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_every_subset_of_missing_variables_is_reported_in_order() {
        // Each bit of the mask drops one required variable.
        for mask in 1u32..(1 << REQUIRED_ENV_VARS.len()) {
            let pairs: Vec<_> = full_environment()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) == 0)
                .map(|(_, pair)| pair)
                .collect();
            let expected: Vec<&str> = REQUIRED_ENV_VARS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| *name)
                .collect();

            match BotConfig::from_environment(&Environment::from_pairs(pairs)) {
                Err(BotError::Configuration(missing)) => assert_eq!(missing, expected),
                other => panic!("mask {:b}: expected configuration error, got {:?}", mask, other),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut pairs = full_environment();
        pairs[1] = (TWITTER_APP_SECRET, "");
        let err = BotConfig::from_environment(&Environment::from_pairs(pairs)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: TWITTER_APP_SECRET"
        );
    }

    #[test]
    fn test_model_override() {
        let mut pairs = full_environment();
        pairs.push((GEMINI_MODEL, "gemini-1.5-flash"));
        let config = BotConfig::from_environment(&Environment::from_pairs(pairs)).unwrap();
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
    }

    #[test]
    fn test_runtime_mode() {
        let mode = |pairs: Vec<(&str, &str)>| {
            RuntimeMode::from_environment(&Environment::from_pairs(pairs))
        };

        assert_eq!(mode(vec![(NODE_ENV, "development")]), RuntimeMode::Development);
        assert_eq!(mode(vec![(APP_ENV, "development")]), RuntimeMode::Development);
        assert_eq!(mode(vec![(NODE_ENV, "production")]), RuntimeMode::Production);
        assert_eq!(mode(vec![(NODE_ENV, "Development")]), RuntimeMode::Production);
        assert_eq!(mode(vec![(APP_ENV, "DEVELOPMENT")]), RuntimeMode::Production);
        assert_eq!(mode(vec![]), RuntimeMode::Production);
    }

    #[cfg(unix)]
    #[test]
    fn test_from_process_skips_non_utf8_variables() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("BOTX_TEST_NON_UTF8", OsStr::from_bytes(b"\xff\xfe"));
        env::set_var("BOTX_TEST_UTF8", "readable");

        let snapshot = Environment::from_process();

        assert_eq!(snapshot.get("BOTX_TEST_UTF8"), Some("readable"));
        assert_eq!(snapshot.get("BOTX_TEST_NON_UTF8"), None);

        env::remove_var("BOTX_TEST_NON_UTF8");
        env::remove_var("BOTX_TEST_UTF8");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = BotConfig::from_environment(&Environment::from_pairs(full_environment()))
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("gemini-key"));
        assert!(!rendered.contains("app-secret"));
        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("access-token-123456"));
    }
}
