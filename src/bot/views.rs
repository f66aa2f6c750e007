//! User-facing texts and keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::prompt::Intent;

// ─────────────────────────────────────────────────────────────────────────────
// Callback payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Callback data of the "chat" button
pub const CALLBACK_CHAT: &str = "chat";
/// Callback data of the "summarize" button
pub const CALLBACK_SUMMARIZE: &str = "summarize";
/// Callback data of the "code" button
pub const CALLBACK_CODE: &str = "code";
/// Callback data of the quick signal button
pub const CALLBACK_TRADE: &str = "trade";
/// Callback data of the detailed analysis button
pub const CALLBACK_DETAILED: &str = "detailed";

/// Buttons of the `/start` menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Explain `/chat`
    Chat,
    /// Explain `/summarize`
    Summarize,
    /// Explain `/code`
    Code,
    /// Quick chart signal, waits for a photo
    Trade,
    /// Detailed chart report, waits for a photo
    Detailed,
}

impl MenuAction {
    /// All buttons, in menu order
    pub const ALL: [Self; 5] = [
        Self::Chat,
        Self::Summarize,
        Self::Code,
        Self::Trade,
        Self::Detailed,
    ];

    /// Parses callback data; unknown payloads yield `None`
    #[must_use]
    pub fn from_payload(payload: &str) -> Option<Self> {
        match payload {
            CALLBACK_CHAT => Some(Self::Chat),
            CALLBACK_SUMMARIZE => Some(Self::Summarize),
            CALLBACK_CODE => Some(Self::Code),
            CALLBACK_TRADE => Some(Self::Trade),
            CALLBACK_DETAILED => Some(Self::Detailed),
            _ => None,
        }
    }

    /// Callback data sent by the button
    #[must_use]
    pub const fn payload(self) -> &'static str {
        match self {
            Self::Chat => CALLBACK_CHAT,
            Self::Summarize => CALLBACK_SUMMARIZE,
            Self::Code => CALLBACK_CODE,
            Self::Trade => CALLBACK_TRADE,
            Self::Detailed => CALLBACK_DETAILED,
        }
    }

    /// Button caption
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chat => "💬 Задать вопрос",
            Self::Summarize => "📝 Сократить текст",
            Self::Code => "👨‍💻 Сгенерировать код",
            Self::Trade => "📈 Быстрый сигнал",
            Self::Detailed => "📊 Подробный анализ",
        }
    }
}

/// Inline keyboard attached to the `/start` greeting
#[must_use]
pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    let button = |action: MenuAction| InlineKeyboardButton::callback(action.label(), action.payload());

    InlineKeyboardMarkup::new(vec![
        vec![button(MenuAction::Chat)],
        vec![button(MenuAction::Summarize), button(MenuAction::Code)],
        vec![button(MenuAction::Trade), button(MenuAction::Detailed)],
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Texts
// ─────────────────────────────────────────────────────────────────────────────

/// Greeting for `/start`
pub const WELCOME: &str = "Привет! Я умный помощник 🤖. Готов помочь тебе с любыми задачами.\n\
Выбери действие ниже или напиши /help, чтобы узнать команды.";

/// Reply to `/help`
pub const HELP: &str = "Команды:
/start — главное меню
/help — список команд
/chat <вопрос> — задать вопрос
/summarize <текст> — сократить текст
/code <описание> — сгенерировать код

Анализ графика: нажми «📈 Быстрый сигнал» или «📊 Подробный анализ» в меню /start и пришли скриншот графика.
Фото без выбора режима анализируется как быстрый сигнал.";

/// Corrective reply for `/chat` without a question
pub const CHAT_EMPTY: &str = "Напиши вопрос после /chat.";
/// Corrective reply for `/summarize` without text
pub const SUMMARIZE_EMPTY: &str = "Напиши текст для сжатия после /summarize.";
/// Corrective reply for `/code` without a description
pub const CODE_EMPTY: &str = "Опиши, какой код нужен, после /code.";

/// Usage hint for the chat button
pub const CHAT_USAGE: &str = "Напиши /chat и свой вопрос, например:\n/chat Как работает блокчейн?";
/// Usage hint for the summarize button
pub const SUMMARIZE_USAGE: &str = "Напиши /summarize и текст, который нужно сократить.";
/// Usage hint for the code button
pub const CODE_USAGE: &str = "Напиши /code и описание задачи, например:\n/code функция сортировки списка на Python";

/// Asks for a chart after the quick signal button
pub const SEND_PHOTO_QUICK: &str = "📈 Пришли скриншот графика, и я дам быстрый сигнал.";
/// Asks for a chart after the detailed analysis button
pub const SEND_PHOTO_DETAILED: &str = "📊 Пришли скриншот графика, и я сделаю подробный анализ.";

/// Shown when the AI gateway is unavailable
pub const AI_UNAVAILABLE: &str = "⚠️ Не удалось получить ответ от ИИ. Попробуй ещё раз позже.";
/// Shown when a photo could not be downloaded or decoded
pub const PHOTO_FAILED: &str = "⚠️ Не удалось обработать изображение. Попробуй отправить его ещё раз.";
/// Reply to plain text and unknown commands
pub const UNKNOWN_INPUT: &str = "Не понимаю 🤔 Напиши /help, чтобы узнать команды.";

/// Corrective reply for an AI command sent without an argument
#[must_use]
pub const fn empty_argument(intent: Intent) -> &'static str {
    match intent {
        Intent::Summarize => SUMMARIZE_EMPTY,
        Intent::Code => CODE_EMPTY,
        Intent::Chat | Intent::QuickTrade | Intent::DetailedTrade => CHAT_EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_payload_round_trip() {
        for action in MenuAction::ALL {
            assert_eq!(MenuAction::from_payload(action.payload()), Some(action));
        }
        assert_eq!(MenuAction::from_payload("bogus"), None);
    }

    #[test]
    fn test_main_menu_has_every_action() {
        let keyboard = main_menu_keyboard();
        let payloads: Vec<String> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(payloads, vec!["chat", "summarize", "code", "trade", "detailed"]);
    }

    #[test]
    fn test_help_lists_all_commands() {
        for command in ["/start", "/help", "/chat", "/summarize", "/code"] {
            assert!(HELP.contains(command), "help is missing {command}");
        }
    }
}
