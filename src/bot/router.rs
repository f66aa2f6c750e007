//! Command & media router
//!
//! Maps an inbound event to a handler. The router owns its collaborators
//! (AI gateway, mode store, sanitizer) and answers through whatever
//! [`ChatTransport`] the caller passes in, so it never touches teloxide
//! directly.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::bot::commands::Command;
use crate::bot::media::normalize_photo;
use crate::bot::state::{AnalysisMode, ModeStore};
use crate::bot::transport::ChatTransport;
use crate::bot::views::{self, MenuAction};
use crate::llm::{AiGateway, AiReply};
use crate::prompt::{build_prompt, Intent};
use crate::utils::strip_markdown;

/// Post-processing applied to every AI answer before it is sent
pub type Sanitizer = fn(&str) -> String;

/// An event from the messaging platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text message, command or not
    Text {
        /// Sender
        user_id: i64,
        /// Message text
        text: String,
    },
    /// An inline button press
    Callback {
        /// Sender
        user_id: i64,
        /// Callback data of the pressed button
        payload: String,
    },
    /// A photo; `file_id` refers to the largest available size
    Photo {
        /// Sender
        user_id: i64,
        /// Platform file id to download
        file_id: String,
    },
}

/// Dispatches inbound events to handlers
#[derive(Clone)]
pub struct Router {
    gateway: AiGateway,
    modes: Arc<dyn ModeStore>,
    sanitize: Sanitizer,
    bot_username: Option<String>,
}

impl Router {
    /// Create a router that strips markdown from AI answers
    #[must_use]
    pub fn new(gateway: AiGateway, modes: Arc<dyn ModeStore>) -> Self {
        Self {
            gateway,
            modes,
            sanitize: strip_markdown,
            bot_username: None,
        }
    }

    /// Replace the answer sanitizer
    #[must_use]
    pub fn with_sanitizer(mut self, sanitize: Sanitizer) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Only accept `/command@name` mentions addressed to this bot
    #[must_use]
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Handle one event, replying through `transport`.
    ///
    /// AI and media failures are answered with an apology and do not surface
    /// here.
    ///
    /// # Errors
    ///
    /// Returns an error only if the reply itself cannot be sent.
    pub async fn dispatch(&self, transport: &dyn ChatTransport, event: Inbound) -> Result<()> {
        match event {
            Inbound::Text { user_id, text } => {
                match Command::parse(&text, self.bot_username.as_deref()) {
                    Some(command) => self.on_command(transport, user_id, command).await,
                    None => {
                        debug!(user_id, "Ignoring plain text");
                        transport.send_text(views::UNKNOWN_INPUT).await
                    }
                }
            }
            Inbound::Callback { user_id, payload } => {
                self.on_callback(transport, user_id, &payload).await
            }
            Inbound::Photo { user_id, file_id } => {
                self.on_photo(transport, user_id, &file_id).await
            }
        }
    }

    async fn on_command(
        &self,
        transport: &dyn ChatTransport,
        user_id: i64,
        command: Command,
    ) -> Result<()> {
        match command {
            Command::Start => {
                info!(user_id, "Start");
                transport
                    .send_menu(views::WELCOME, views::main_menu_keyboard())
                    .await
            }
            Command::Help => transport.send_text(views::HELP).await,
            Command::Chat(text) => self.on_ai_command(transport, user_id, Intent::Chat, &text).await,
            Command::Summarize(text) => {
                self.on_ai_command(transport, user_id, Intent::Summarize, &text)
                    .await
            }
            Command::Code(text) => self.on_ai_command(transport, user_id, Intent::Code, &text).await,
            Command::Unknown(name) => {
                debug!(user_id, command = %name, "Unknown command");
                transport.send_text(views::UNKNOWN_INPUT).await
            }
        }
    }

    async fn on_ai_command(
        &self,
        transport: &dyn ChatTransport,
        user_id: i64,
        intent: Intent,
        text: &str,
    ) -> Result<()> {
        if text.trim().is_empty() {
            debug!(user_id, ?intent, "AI command without argument");
            return transport.send_text(views::empty_argument(intent)).await;
        }

        info!(user_id, ?intent, "AI command");
        let prompt = build_prompt(intent, text);
        let reply = self.ask(transport, intent, &prompt, None).await;
        transport.send_text(&reply).await
    }

    async fn on_callback(
        &self,
        transport: &dyn ChatTransport,
        user_id: i64,
        payload: &str,
    ) -> Result<()> {
        let Some(action) = MenuAction::from_payload(payload) else {
            debug!(user_id, payload, "Ignoring unknown callback");
            return Ok(());
        };

        info!(user_id, ?action, "Menu button");
        match action {
            MenuAction::Chat => transport.send_text(views::CHAT_USAGE).await,
            MenuAction::Summarize => transport.send_text(views::SUMMARIZE_USAGE).await,
            MenuAction::Code => transport.send_text(views::CODE_USAGE).await,
            MenuAction::Trade => {
                self.modes.set(user_id, AnalysisMode::Quick).await;
                transport.send_text(views::SEND_PHOTO_QUICK).await
            }
            MenuAction::Detailed => {
                self.modes.set(user_id, AnalysisMode::Detailed).await;
                transport.send_text(views::SEND_PHOTO_DETAILED).await
            }
        }
    }

    async fn on_photo(
        &self,
        transport: &dyn ChatTransport,
        user_id: i64,
        file_id: &str,
    ) -> Result<()> {
        let mode = self.modes.get(user_id).await.unwrap_or_default();
        info!(user_id, ?mode, "Photo received");

        let outcome = self.analyze_photo(transport, mode.intent(), file_id).await;
        self.modes.clear(user_id).await;

        let reply = outcome.unwrap_or_else(|e| {
            warn!(user_id, error = %e, "Photo processing failed");
            views::PHOTO_FAILED.to_string()
        });
        transport.send_text(&reply).await
    }

    async fn analyze_photo(
        &self,
        transport: &dyn ChatTransport,
        intent: Intent,
        file_id: &str,
    ) -> Result<String> {
        let bytes = transport.download_photo(file_id).await?;
        let jpeg = normalize_photo(&bytes)?;
        let prompt = build_prompt(intent, "");
        Ok(self.ask(transport, intent, &prompt, Some(jpeg)).await)
    }

    /// Calls the gateway and renders the outcome as reply text.
    ///
    /// Generated code is sent as is; the sanitizer would eat `*args` or
    /// `__init__`.
    async fn ask(
        &self,
        transport: &dyn ChatTransport,
        intent: Intent,
        prompt: &str,
        image: Option<Vec<u8>>,
    ) -> String {
        if let Err(e) = transport.send_typing().await {
            debug!(error = %e, "Failed to send typing action");
        }

        match self.gateway.ask(prompt, image).await {
            AiReply::Text(text) if intent == Intent::Code => text,
            AiReply::Text(text) => (self.sanitize)(&text),
            AiReply::Unavailable => views::AI_UNAVAILABLE.to_string(),
        }
    }
}
