//! Outbound side of a conversation
//!
//! The router talks to a [`ChatTransport`] bound to one chat. The Telegram
//! implementation wraps `teloxide`; tests plug in a recording fake.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, FileId, InlineKeyboardMarkup};

use crate::utils::{retry_telegram_operation, split_long_message};

/// Maximum message length for Telegram with safety margin.
/// The official limit is 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Operations the router needs from the messaging platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends plain text, splitting it if it exceeds the platform limit
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Sends text with an inline keyboard
    async fn send_menu(&self, text: &str, keyboard: InlineKeyboardMarkup) -> Result<()>;

    /// Downloads a photo by its file id
    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Shows the "typing…" indicator; best effort
    async fn send_typing(&self) -> Result<()> {
        Ok(())
    }
}

/// Telegram transport bound to a single chat
pub struct TelegramTransport {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramTransport {
    /// Create a Telegram transport for `chat_id`
    pub const fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, text: &str) -> Result<()> {
        for part in split_long_message(text, TELEGRAM_MESSAGE_LIMIT) {
            retry_telegram_operation(|| async {
                self.bot
                    .send_message(self.chat_id, part.clone())
                    .await
                    .map(|_| ())
                    .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
            })
            .await?;
        }
        Ok(())
    }

    async fn send_menu(&self, text: &str, keyboard: InlineKeyboardMarkup) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn download_photo(&self, file_id: &str) -> Result<Vec<u8>> {
        retry_telegram_operation(|| async {
            let file = self.bot.get_file(FileId(file_id.to_string())).await?;
            let mut buf = Vec::new();
            self.bot.download_file(&file.path, &mut buf).await?;
            Ok(buf)
        })
        .await
    }

    async fn send_typing(&self) -> Result<()> {
        self.bot
            .send_chat_action(self.chat_id, ChatAction::Typing)
            .await?;
        Ok(())
    }
}
