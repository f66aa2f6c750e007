//! Text processing helpers and Telegram retry support.
//!
//! Regex patterns are declared with `lazy_regex!`, so they are validated at
//! compile time and built on first use.

// lazy_regex! uses once_cell internally
#![allow(clippy::non_std_lazy_statics)]

use anyhow::Result;
use lazy_regex::lazy_regex;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Match fenced (```...```) or inline (`...`) code
static RE_CODE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?s)```.*?```|`[^`\n]+`");

/// Match bold text: **text**
static RE_BOLD: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"\*\*(.+?)\*\*");

/// Match italic text: *text*
static RE_ITALIC: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"\*(.+?)\*");

/// Match underline-style emphasis: _text_
static RE_UNDERLINE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"_(.+?)_");

/// Match strikethrough: ~~text~~
static RE_STRIKE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"~~(.+?)~~");

/// Removes markdown emphasis delimiters from model output, keeping the text.
///
/// Bold, italic, underline and strikethrough are stripped in that order, and
/// the four passes repeat until nothing changes, so the result is a fixed
/// point. A pair never spans a line break. Code spans, fenced or inline, are
/// copied verbatim. This is a best-effort filter, not a markdown parser.
///
/// # Examples
///
/// ```
/// use signal_assistant_bot::utils::strip_markdown;
///
/// assert_eq!(strip_markdown("**Сигнал:** BUY"), "Сигнал: BUY");
/// assert_eq!(strip_markdown("~~старый~~ новый"), "старый новый");
/// assert_eq!(strip_markdown("вызови `__init__`"), "вызови `__init__`");
/// ```
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for code in RE_CODE.find_iter(text) {
        out.push_str(&strip_emphasis(&text[last..code.start()]));
        out.push_str(code.as_str());
        last = code.end();
    }
    out.push_str(&strip_emphasis(&text[last..]));
    out
}

/// Applies the emphasis passes until the text stops changing.
///
/// Every effective pass removes delimiters, so the loop terminates.
fn strip_emphasis(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_emphasis_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_emphasis_once(text: &str) -> String {
    let text = RE_BOLD.replace_all(text, "$1");
    let text = RE_ITALIC.replace_all(&text, "$1");
    let text = RE_UNDERLINE.replace_all(&text, "$1");
    RE_STRIKE.replace_all(&text, "$1").into_owned()
}

/// Splits a long message into parts that fit within Telegram's message limit.
///
/// Code fences (triple backticks) are closed at the end of a part and
/// reopened at the start of the next one. Lines longer than `max_length`
/// are cut on grapheme cluster boundaries.
///
/// # Examples
///
/// ```
/// use signal_assistant_bot::utils::split_long_message;
/// let long_msg = "A very long message...\n".repeat(300);
/// let parts = split_long_message(&long_msg, 4000);
/// assert!(parts.len() > 1);
/// assert!(parts.iter().all(|p| p.len() <= 4000));
/// ```
#[must_use]
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }

    if message.len() <= max_length {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current_message = String::new();
    let mut code_block = false;
    let code_fence = "```";

    // Room for a closing fence plus a reopened one
    let fence_reserve = 2 * (code_fence.len() + 1);

    for line in message.lines() {
        if line.len() > max_length.saturating_sub(fence_reserve) {
            if !current_message.is_empty() {
                if code_block {
                    current_message.push_str(code_fence);
                    current_message.push('\n');
                }
                parts.push(current_message.trim_end().to_string());
                current_message.clear();
                if code_block {
                    current_message.push_str(code_fence);
                    current_message.push('\n');
                }
            }

            let mut chunk = String::new();
            for grapheme in line.graphemes(true) {
                if chunk.len() + grapheme.len() > max_length {
                    parts.push(chunk.trim_end().to_string());
                    chunk.clear();
                }
                chunk.push_str(grapheme);
            }
            if !chunk.is_empty() {
                current_message.push_str(&chunk);
                current_message.push('\n');
            }
            continue;
        }

        let is_fence = line.starts_with(code_fence);
        let reserve = if code_block || is_fence {
            code_fence.len() + 1
        } else {
            0
        };
        let new_length = current_message.len() + line.len() + 1 + reserve;

        if new_length > max_length && !current_message.is_empty() {
            if code_block {
                current_message.push_str(code_fence);
                current_message.push('\n');
            }

            parts.push(current_message.trim_end().to_string());
            current_message.clear();

            if code_block {
                if is_fence {
                    // The block was already closed above
                    code_block = false;
                    continue;
                }
                current_message.push_str(code_fence);
                current_message.push('\n');
            }
        }

        if is_fence {
            code_block = !code_block;
        }
        current_message.push_str(line);
        current_message.push('\n');
    }

    if !current_message.is_empty() {
        if code_block {
            current_message.push_str(code_fence);
            current_message.push('\n');
        }
        parts.push(current_message.trim_end().to_string());
    }

    parts.retain(|part| !part.is_empty());
    parts
}

/// Safely truncates a string to a maximum character length (not bytes).
///
/// # Examples
///
/// ```
/// use signal_assistant_bot::utils::truncate_str;
/// let s = "Привет, мир!";
/// assert_eq!(truncate_str(s, 6), "Привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Retry a Telegram API operation with exponential backoff and jitter.
///
/// Meant for file downloads and message sends, which fail on transient
/// network errors. AI requests are never retried.
///
/// # Errors
///
/// Returns the last error once `TELEGRAM_API_MAX_RETRIES` attempts failed.
///
/// # Examples
///
/// ```no_run
/// use signal_assistant_bot::utils::retry_telegram_operation;
/// use anyhow::Result;
///
/// async fn download_file() -> Result<Vec<u8>> {
///     Ok(vec![])
/// }
///
/// # async fn example() -> Result<()> {
/// let buffer = retry_telegram_operation(|| async {
///     download_file().await
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    // `take` counts retries, the first attempt is not included
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES - 1);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            "Telegram API operation failed after {} attempts: {}",
            TELEGRAM_API_MAX_RETRIES, e
        );
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_strip_markdown_each_style() {
        assert_eq!(strip_markdown("**bold**"), "bold");
        assert_eq!(strip_markdown("*it*"), "it");
        assert_eq!(strip_markdown("_u_"), "u");
        assert_eq!(strip_markdown("~~s~~"), "s");
    }

    #[test]
    fn test_strip_markdown_mixed_line() {
        let input = "**Сигнал:** BUY, *вход* 1.0850, _TP_ 1.0900, ~~SL~~ 1.0820";
        assert_eq!(
            strip_markdown(input),
            "Сигнал: BUY, вход 1.0850, TP 1.0900, SL 1.0820"
        );
    }

    #[test]
    fn test_strip_markdown_plain_text_unchanged() {
        let input = "Сигнал: SELL\nВход: 64000\nTP: 62500\nSL: 64800";
        assert_eq!(strip_markdown(input), input);
    }

    #[test]
    fn test_strip_markdown_is_idempotent() {
        for input in [
            "**a** *b* _c_ ~~d~~",
            "***both***",
            "*_nested_*",
            "2 * 3 = 6",
            "**незакрытый",
            "_*_a_*_",
            "`*код*` и *текст*",
        ] {
            let once = strip_markdown(input);
            assert_eq!(strip_markdown(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_strip_markdown_reaches_fixed_point() {
        // The italic pass exposes a new underline pair
        assert_eq!(strip_markdown("_*_a_*_"), "a");
        assert_eq!(strip_markdown("a"), "a");
    }

    #[test]
    fn test_strip_markdown_keeps_code_spans() {
        let fenced = "```python\ndef my_func(*args, **kwargs):\n    total_sum = a * b * c\n    return __init__\n```";
        assert_eq!(strip_markdown(fenced), fenced);

        let input = format!("**Пример:**\n{fenced}\nВызови `__init__` и _готово_");
        assert_eq!(
            strip_markdown(&input),
            format!("Пример:\n{fenced}\nВызови `__init__` и готово")
        );
    }

    #[test]
    fn test_strip_markdown_does_not_cross_lines() {
        let input = "* пункт один\n* пункт два";
        assert_eq!(strip_markdown(input), input);
    }

    #[test]
    fn test_strip_markdown_keeps_lone_delimiters() {
        assert_eq!(strip_markdown("**"), "**");
        assert_eq!(strip_markdown("a * b"), "a * b");
    }

    #[test]
    fn test_truncate_str_unicode() {
        let s = "Привет, мир!";
        assert_eq!(truncate_str(s, 6), "Привет");
        assert_eq!(truncate_str(s, 100), s);
    }

    #[test]
    fn test_split_long_message_simple() {
        let msg = "line\n".repeat(10);
        let parts = split_long_message(&msg, 12);
        assert!(parts.len() > 1);
        assert!(parts.iter().all(|p| p.len() <= 12));
    }

    #[test]
    fn test_split_long_message_short_is_single_part() {
        assert_eq!(split_long_message("short", 4000), vec!["short".to_string()]);
        assert!(split_long_message("", 4000).is_empty());
    }

    #[test]
    fn test_split_long_message_with_code_block() {
        let msg = format!("intro\n```rust\n{}```\noutro", "let x = 1;\n".repeat(20));
        let parts = split_long_message(&msg, 80);
        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.len() <= 80, "part too long: {}", part.len());
            assert_eq!(part.matches("```").count() % 2, 0, "unbalanced fence: {part}");
        }
    }

    #[test]
    fn test_split_very_long_line() {
        let msg = "x".repeat(250);
        let parts = split_long_message(&msg, 100);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.concat(), msg);
    }

    #[test]
    fn test_split_unicode_graphemes() {
        let msg = "я".repeat(100);
        let parts = split_long_message(&msg, 51);
        assert!(parts.iter().all(|p| p.len() <= 51));
        assert_eq!(parts.concat(), msg);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_telegram_operation_recovers() -> Result<()> {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let value = retry_telegram_operation(move || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("connection reset");
            }
            Ok(42)
        })
        .await?;

        assert_eq!(value, 42);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_telegram_operation_gives_up() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<()> = retry_telegram_operation(move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("timeout")
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            counter.load(Ordering::SeqCst),
            crate::config::TELEGRAM_API_MAX_RETRIES
        );
    }
}
