//! AI provider access
//!
//! `LlmProvider` is the seam to a concrete inference API, `AiGateway` wraps a
//! provider with the bot's request settings and turns every failure into
//! [`AiReply::Unavailable`].

mod http_utils;
/// Implementations of specific AI providers
pub mod providers;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::Settings;
use crate::prompt::SYSTEM_PREAMBLE;

/// Errors that can occur during AI provider calls
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Error during network communication, including timeouts
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Error during JSON serialization or deserialization
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Any other unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A turn in an AI conversation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender (user or assistant)
    pub role: String,
    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    /// Create a new assistant message
    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

/// Interface for AI providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a text answer for `user_message` after `history`
    async fn chat_completion(
        &self,
        history: &[Message],
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Answer `text_prompt` about a JPEG image
    async fn analyze_image(
        &self,
        image_jpeg: Vec<u8>,
        text_prompt: &str,
        history: &[Message],
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

/// Outcome of an [`AiGateway::ask`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiReply {
    /// Text produced by the model
    Text(String),
    /// The provider failed; details were logged by the gateway
    Unavailable,
}

/// Fault-swallowing front door to the AI provider
#[derive(Clone)]
pub struct AiGateway {
    provider: Arc<dyn LlmProvider>,
    model_id: String,
    max_tokens: u32,
    preamble: Vec<Message>,
}

impl AiGateway {
    /// Create a gateway over an arbitrary provider
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model_id: impl Into<String>,
        max_tokens: u32,
        include_preamble: bool,
    ) -> Self {
        let preamble = if include_preamble {
            vec![Message::user(SYSTEM_PREAMBLE)]
        } else {
            Vec::new()
        };

        Self {
            provider,
            model_id: model_id.into(),
            max_tokens,
            preamble,
        }
    }

    /// Create the production gateway backed by Gemini
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let provider = providers::GeminiProvider::new(
            settings.ai_api_key.clone(),
            settings.llm_http_timeout_secs,
        );
        info!(
            model = %settings.gemini_model,
            preamble = settings.system_preamble_enabled,
            "AI gateway initialized"
        );

        Self::new(
            Arc::new(provider),
            settings.gemini_model.clone(),
            settings.max_output_tokens,
            settings.system_preamble_enabled,
        )
    }

    /// Ask the model. Text-only without `image`, multimodal otherwise.
    ///
    /// Never fails: provider errors are logged and reported as
    /// [`AiReply::Unavailable`].
    #[instrument(skip_all, fields(model = %self.model_id, has_image = image.is_some()))]
    pub async fn ask(&self, prompt: &str, image: Option<Vec<u8>>) -> AiReply {
        let result = match image {
            Some(bytes) => {
                self.provider
                    .analyze_image(bytes, prompt, &self.preamble, &self.model_id, self.max_tokens)
                    .await
            }
            None => {
                self.provider
                    .chat_completion(&self.preamble, prompt, &self.model_id, self.max_tokens)
                    .await
            }
        };

        match result {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.chars().count(), "AI answered");
                AiReply::Text(text)
            }
            Ok(_) => {
                error!("AI returned an empty answer");
                AiReply::Unavailable
            }
            Err(e) => {
                error!(error = %e, "AI request failed");
                AiReply::Unavailable
            }
        }
    }
}
