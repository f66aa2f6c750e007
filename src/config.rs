//! Configuration and settings management
//!
//! Loads settings from optional config files and environment variables and
//! defines tuning constants for the Telegram and Gemini integrations.

use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub bot_token: String,

    /// Gemini API key
    pub ai_api_key: String,

    /// Gemini model used for both text and image requests
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Send the fixed assistant preamble as a synthetic first turn
    #[serde(default)]
    pub system_preamble_enabled: bool,

    /// Timeout for a single AI request
    #[serde(default = "default_llm_http_timeout_secs")]
    pub llm_http_timeout_secs: u64,

    /// Upper bound for generated tokens per answer
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Idle lifetime of a pending analysis mode
    #[serde(default = "default_mode_ttl_secs")]
    pub mode_ttl_secs: u64,

    /// Maximum number of users with a pending analysis mode
    #[serde(default = "default_mode_store_capacity")]
    pub mode_store_capacity: u64,
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

const fn default_llm_http_timeout_secs() -> u64 {
    60
}

const fn default_max_output_tokens() -> u32 {
    2048
}

const fn default_mode_ttl_secs() -> u64 {
    3600
}

const fn default_mode_store_capacity() -> u64 {
    10_000
}

impl Settings {
    /// Create new settings by loading from files and the process environment
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use signal_assistant_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("BOT_TOKEN and AI_API_KEY must be set");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required secret is missing or a value
    /// has the wrong type.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Same as [`Settings::new`], but plain environment variables are read
    /// from `vars` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required key is missing.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let isolated = vars.is_some();

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false));

        if !isolated {
            // Eg. `APP__GEMINI_MODEL=gemini-2.0-flash` sets `gemini_model`
            builder = builder.add_source(Environment::with_prefix("APP").separator("__"));
        }

        // Environment::default() maps UPPER_SNAKE_CASE to snake_case;
        // empty variables count as unset so a blank BOT_TOKEN is still fatal
        let s = builder
            .add_source(Environment::default().ignore_empty(true).source(vars))
            .build()?;

        let settings: Self = s.try_deserialize()?;

        if settings.bot_token.trim().is_empty() {
            return Err(ConfigError::Message("BOT_TOKEN is empty".to_string()));
        }
        if settings.ai_api_key.trim().is_empty() {
            return Err(ConfigError::Message("AI_API_KEY is empty".to_string()));
        }

        Ok(settings)
    }
}


/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Temperature for text answers
pub const GEMINI_CHAT_TEMPERATURE: f32 = 0.7;
/// Temperature for chart analysis, lower to keep the signal format stable
pub const GEMINI_IMAGE_TEMPERATURE: f32 = 0.4;

// Telegram API retry configuration
/// Maximum attempts for Telegram file downloads and sends
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff between Telegram retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Backoff ceiling between Telegram retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
