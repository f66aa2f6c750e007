//! Slash commands
//!
//! Commands are parsed by hand instead of through `BotCommands`, because an
//! empty argument (`/chat` alone) must reach the router as a command with an
//! empty payload rather than as a parse failure.

use teloxide::types::BotCommand;

/// A recognised slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/chat <question>`
    Chat(String),
    /// `/summarize <text>`
    Summarize(String),
    /// `/code <description>`
    Code(String),
    /// Any other `/something`
    Unknown(String),
}

/// Name and menu description of every supported command, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    ("start", "Начать работу"),
    ("help", "Список команд"),
    ("chat", "Задать вопрос"),
    ("summarize", "Сократить текст"),
    ("code", "Сгенерировать код"),
];

impl Command {
    /// Parses `text` as a command.
    ///
    /// Returns `None` if `text` does not start with `/`. A `@botname` suffix
    /// is accepted only when it matches `bot_username` (or when no username
    /// is known).
    ///
    /// # Examples
    ///
    /// ```
    /// use signal_assistant_bot::bot::commands::Command;
    ///
    /// assert_eq!(
    ///     Command::parse("/chat@my_bot Как дела?", Some("my_bot")),
    ///     Some(Command::Chat("Как дела?".to_string()))
    /// );
    /// assert_eq!(Command::parse("/code", None), Some(Command::Code(String::new())));
    /// assert_eq!(Command::parse("привет", None), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;

        let (head, args) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], rest[pos..].trim()),
            None => (rest, ""),
        };

        let name = match head.split_once('@') {
            Some((name, mention)) => {
                if let Some(username) = bot_username {
                    if !mention.eq_ignore_ascii_case(username) {
                        return None;
                    }
                }
                name
            }
            None => head,
        };

        let args = args.to_string();
        Some(match name.to_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "chat" => Self::Chat(args),
            "summarize" => Self::Summarize(args),
            "code" => Self::Code(args),
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Command list registered with Telegram for the client-side menu
#[must_use]
pub fn bot_commands() -> Vec<BotCommand> {
    COMMANDS
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(Command::parse("/start", None), Some(Command::Start));
        assert_eq!(Command::parse("/help", None), Some(Command::Help));
        assert_eq!(Command::parse("/HELP", None), Some(Command::Help));
    }

    #[test]
    fn test_parse_keeps_argument_text() {
        assert_eq!(
            Command::parse("/summarize первая строка\nвторая строка", None),
            Some(Command::Summarize("первая строка\nвторая строка".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_and_whitespace_arguments() {
        assert_eq!(Command::parse("/chat", None), Some(Command::Chat(String::new())));
        assert_eq!(Command::parse("/chat    ", None), Some(Command::Chat(String::new())));
        assert_eq!(Command::parse("/code \n\t", None), Some(Command::Code(String::new())));
    }

    #[test]
    fn test_parse_bot_mention() {
        assert_eq!(
            Command::parse("/code@SignalBot sort", Some("signalbot")),
            Some(Command::Code("sort".to_string()))
        );
        assert_eq!(Command::parse("/code@other_bot sort", Some("signalbot")), None);
    }

    #[test]
    fn test_parse_unknown_and_plain_text() {
        assert_eq!(
            Command::parse("/weather", None),
            Some(Command::Unknown("weather".to_string()))
        );
        assert_eq!(Command::parse("hello /chat", None), None);
    }

    #[test]
    fn test_bot_commands_cover_all_entries() {
        let commands = bot_commands();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[2].command, "chat");
    }
}
