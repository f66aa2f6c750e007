//! Prompt templates
//!
//! Every request to the model is one of five fixed templates combined with
//! the user's text (or an attached chart image for the trade intents).

/// Assistant persona, sent as a synthetic first turn when enabled in settings
pub const SYSTEM_PREAMBLE: &str = "Ты — умный виртуальный помощник. Не упоминай свою разработку, \
название модели, компанию Google или любую другую организацию, не рассказывай о своей \
архитектуре и не говори, что ты языковая модель. Отвечай кратко, дружелюбно и понятно.";

/// Instruction placed before text for `/summarize`
pub const SUMMARIZE_INSTRUCTION: &str = "Кратко и понятно сожми и перескажи следующий текст:";

/// Instruction placed before the description for `/code`
pub const CODE_INSTRUCTION: &str = "Напиши код по описанию:";

/// Chart analysis that fits in one short signal
pub const QUICK_TRADE_PROMPT: &str = r"Ты — опытный трейдер. На изображении график торгового инструмента.
Проанализируй его по шагам:
1. Определи текущий тренд (восходящий, нисходящий или боковой).
2. Найди ближайшие уровни поддержки и сопротивления.
3. Оцени силу движения по свечам и объёму, если он виден.
4. Прими решение: BUY или SELL.

Ответ дай строго в формате:
Сигнал: BUY или SELL
Вход: цена входа
TP: цена тейк-профита
SL: цена стоп-лосса
Обоснование: 1–2 предложения

Правила оформления:
- не используй markdown: никаких звёздочек, подчёркиваний, решёток и тильд;
- не используй таблицы и блоки кода;
- пиши обычным текстом, каждое поле с новой строки;
- если на изображении нет графика, так и напиши.";

/// Full report on a chart with two scenarios
pub const DETAILED_TRADE_PROMPT: &str = r"Ты — профессиональный аналитик финансовых рынков. На изображении график торгового инструмента.
Составь подробный отчёт из следующих разделов:

1. Технический анализ
- тренд на видимом таймфрейме и его сила;
- ключевые уровни поддержки и сопротивления;
- графические и свечные паттерны;
- индикаторы, если они есть на графике (скользящие средние, RSI, MACD и другие);
- объёмы, если они видны.

2. Сценарий на покупку (BUY)
- условие входа и цена входа;
- TP (тейк-профит) и SL (стоп-лосс);
- соотношение риск/прибыль.

3. Сценарий на продажу (SELL)
- условие входа и цена входа;
- TP (тейк-профит) и SL (стоп-лосс);
- соотношение риск/прибыль.

4. Рекомендация
- какой сценарий вероятнее и почему;
- на что обратить внимание, чтобы сценарий отменился.

Правила оформления:
- не используй markdown: никаких звёздочек, подчёркиваний, решёток и тильд;
- не используй таблицы и блоки кода;
- заголовки разделов пиши обычным текстом с номером;
- если на изображении нет графика, так и напиши.";

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Free-form question
    Chat,
    /// Shorten a text
    Summarize,
    /// Generate code from a description
    Code,
    /// Short BUY/SELL signal for a chart
    QuickTrade,
    /// Multi-section chart report
    DetailedTrade,
}

/// Builds the final prompt for `intent`.
///
/// `text` is the user's argument; the trade intents ignore it because their
/// payload is the attached image.
///
/// # Examples
///
/// ```
/// use signal_assistant_bot::prompt::{build_prompt, Intent};
///
/// assert_eq!(build_prompt(Intent::Chat, "Как дела?"), "Как дела?");
/// assert!(build_prompt(Intent::Code, "сортировка пузырьком").ends_with("сортировка пузырьком"));
/// ```
#[must_use]
pub fn build_prompt(intent: Intent, text: &str) -> String {
    match intent {
        Intent::Chat => text.to_string(),
        Intent::Summarize => format!("{SUMMARIZE_INSTRUCTION}\n{text}"),
        Intent::Code => format!("{CODE_INSTRUCTION}\n{text}"),
        Intent::QuickTrade => QUICK_TRADE_PROMPT.to_string(),
        Intent::DetailedTrade => DETAILED_TRADE_PROMPT.to_string(),
    }
}
