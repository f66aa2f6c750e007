//! teloxide endpoints
//!
//! Converts Telegram updates into [`Inbound`] events for the [`Router`] and
//! keeps handler errors away from the dispatcher.

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error};

use crate::bot::router::{Inbound, Router};
use crate::bot::transport::TelegramTransport;

/// Sender id of a message, falling back to the chat id for anonymous posts
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map_or(msg.chat.id.0, |u| u.id.0.cast_signed())
}

/// Builds the dispatcher tree
#[must_use]
pub fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(handle_photo),
                )
                .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text)),
        )
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    router: Arc<Router>,
) -> Result<(), teloxide::RequestError> {
    let event = Inbound::Text {
        user_id: get_user_id_safe(&msg),
        text: msg.text().unwrap_or_default().to_string(),
    };
    let transport = TelegramTransport::new(bot, msg.chat.id);

    if let Err(e) = router.dispatch(&transport, event).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}

async fn handle_photo(
    bot: Bot,
    msg: Message,
    router: Arc<Router>,
) -> Result<(), teloxide::RequestError> {
    // Telegram lists sizes from smallest to largest
    let Some(photo) = msg.photo().and_then(<[_]>::last) else {
        return respond(());
    };

    let event = Inbound::Photo {
        user_id: get_user_id_safe(&msg),
        file_id: photo.file.id.0.clone(),
    };
    let transport = TelegramTransport::new(bot, msg.chat.id);

    if let Err(e) = router.dispatch(&transport, event).await {
        error!("Photo handler error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    router: Arc<Router>,
) -> Result<(), teloxide::RequestError> {
    // Stops the loading spinner on the button
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        debug!("Failed to answer callback query: {}", e);
    }

    let Some(payload) = q.data.clone() else {
        return respond(());
    };
    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        debug!("Callback without a message, nothing to answer");
        return respond(());
    };

    let event = Inbound::Callback {
        user_id: q.from.id.0.cast_signed(),
        payload,
    };
    let transport = TelegramTransport::new(bot, chat_id);

    if let Err(e) = router.dispatch(&transport, event).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
