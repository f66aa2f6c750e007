use proptest::prelude::*;
use signal_assistant_bot::prompt::{build_prompt, Intent};
use signal_assistant_bot::utils::{split_long_message, strip_markdown};

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

proptest! {
    /// strip_markdown does not crash on any valid UTF-8 input.
    #[test]
    fn strip_does_not_crash(s in "\\PC*") {
        let _ = strip_markdown(&s);
    }

    /// Text without emphasis delimiters passes through untouched.
    #[test]
    fn delimiter_free_text_is_unchanged(s in "[^*_~]*") {
        prop_assert_eq!(strip_markdown(&s), s);
    }

    /// Sanitizing sanitized text changes nothing.
    #[test]
    fn sanitized_text_is_fixed_point(s in "[a-z*_~ ]{0,40}") {
        let once = strip_markdown(&s);
        prop_assert_eq!(strip_markdown(&once), once);
    }

    /// Inline code keeps its delimiters.
    #[test]
    fn inline_code_is_untouched(code in "[a-z*_~ ]{1,30}") {
        let input = format!("**x** `{code}`");
        prop_assert_eq!(strip_markdown(&input), format!("x `{code}`"));
    }

    /// Stripping only ever removes characters.
    #[test]
    fn output_is_never_longer(s in "\\PC*") {
        prop_assert!(strip_markdown(&s).len() <= s.len());
    }

    /// A bold word inside plain text loses exactly its delimiters.
    #[test]
    fn bold_word_is_unwrapped(
        prefix in "[a-zA-Zа-яА-Я0-9 .,:]*",
        word in "[a-zA-Zа-яА-Я0-9]+",
        suffix in "[a-zA-Zа-яА-Я0-9 .,:]*"
    ) {
        let input = format!("{prefix}**{word}**{suffix}");
        prop_assert_eq!(strip_markdown(&input), format!("{prefix}{word}{suffix}"));
    }

    /// Text commands always carry the user's words to the model.
    #[test]
    fn text_prompts_contain_user_text(text in "\\PC+") {
        for intent in [Intent::Chat, Intent::Summarize, Intent::Code] {
            let prompt = build_prompt(intent, &text);
            prop_assert!(prompt.contains(&text), "{:?} prompt lost the text", intent);
        }
    }

    /// Plain text is split into parts within the limit without losing content.
    #[test]
    fn split_respects_limit(
        message in "[a-zA-Zа-я0-9 .,\n]{0,3000}",
        max_length in 100usize..600
    ) {
        let parts = split_long_message(&message, max_length);

        for part in &parts {
            prop_assert!(part.len() <= max_length, "part of {} bytes", part.len());
        }
        prop_assert_eq!(non_whitespace(&parts.concat()), non_whitespace(&message));
    }
}
