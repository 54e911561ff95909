//! Post-processing of raw model output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::relay::language::Language;

/// Shortest reply worth sending, in characters (period included).
pub const MIN_REPLY_CHARS: usize = 20;

/// Fewest whitespace-delimited words in a reply worth sending.
pub const MIN_REPLY_WORDS: usize = 5;

/// Trailing whitespace and sentence punctuation, collapsed into one period.
static TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s.,;:!?…]+$").expect("static regex"));

/// Raw and cleaned model output for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub raw_output: String,
    pub cleaned_output: String,
    /// True when `cleaned_output` is the canned fallback.
    pub is_fallback: bool,
}

/// Clean `raw_output`, returning only the reply text.
#[allow(dead_code)]
pub fn clean(raw_output: &str, prompt: &str, output_lang: Language) -> String {
    clean_result(raw_output, prompt, output_lang).cleaned_output
}

/// Strip the echoed prompt, normalize the ending, and swap degenerate
/// output for the fallback message in `output_lang`.
pub fn clean_result(raw_output: &str, prompt: &str, output_lang: Language) -> GenerationResult {
    let without_prompt = strip_prompt(raw_output, prompt);

    let cleaned = normalize_ending(without_prompt).filter(|text| !is_degenerate(text));

    match cleaned {
        Some(cleaned_output) => GenerationResult {
            raw_output: raw_output.to_string(),
            cleaned_output,
            is_fallback: false,
        },
        None => GenerationResult {
            raw_output: raw_output.to_string(),
            cleaned_output: output_lang.generation_fallback().to_string(),
            is_fallback: true,
        },
    }
}

/// Remove the first occurrence of `prompt` and trim.
fn strip_prompt<'a>(raw_output: &'a str, prompt: &str) -> Cow<'a, str> {
    if prompt.is_empty() || !raw_output.contains(prompt) {
        return Cow::Borrowed(raw_output.trim());
    }
    Cow::Owned(raw_output.replacen(prompt, "", 1).trim().to_string())
}

/// End the text with exactly one period. `None` if nothing is left once
/// the trailing punctuation is gone.
fn normalize_ending(text: impl AsRef<str>) -> Option<String> {
    let body = TRAILING_PUNCTUATION.replace(text.as_ref().trim_end(), "");
    if body.is_empty() {
        return None;
    }
    Some(format!("{body}."))
}

fn is_degenerate(text: &str) -> bool {
    text.chars().count() < MIN_REPLY_CHARS || text.split_whitespace().count() < MIN_REPLY_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "Question: What is Rust?\nAnswer (clear and concise):";

    #[test]
    fn test_strips_echoed_prompt() {
        let raw = format!("{PROMPT} Rust is a systems programming language focused on safety.");
        assert_eq!(
            clean(&raw, PROMPT, Language::En),
            "Rust is a systems programming language focused on safety."
        );
    }

    #[test]
    fn test_strips_only_first_occurrence() {
        let raw = format!("{PROMPT} one two three four five {PROMPT}");
        let result = clean(&raw, PROMPT, Language::En);
        assert!(result.starts_with("one two three four five Question:"));
    }

    #[test]
    fn test_appends_period() {
        let raw = "Rust is a language without a garbage collector";
        assert_eq!(
            clean(raw, PROMPT, Language::En),
            "Rust is a language without a garbage collector."
        );
    }

    #[test]
    fn test_collapses_trailing_punctuation() {
        let raw = "Rust is a language without a garbage collector!!! ...  \n";
        assert_eq!(
            clean(raw, PROMPT, Language::En),
            "Rust is a language without a garbage collector."
        );
    }

    #[test]
    fn test_keeps_closing_brackets() {
        let raw = "Rust has ownership and borrowing (see the book)";
        assert_eq!(
            clean(raw, PROMPT, Language::En),
            "Rust has ownership and borrowing (see the book)."
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_ending("Some sentence here.").unwrap();
        assert_eq!(once, "Some sentence here.");
        assert_eq!(normalize_ending(&once).unwrap(), once);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inputs = [
            "Rust is a language without a garbage collector",
            "Rust is fast, safe and fun to write?!",
            "",
            "too short",
            "   ...   ",
        ];
        for lang in Language::ALL {
            for input in inputs {
                let once = clean(input, PROMPT, lang);
                assert_eq!(clean(&once, PROMPT, lang), once, "input {input:?} lang {lang}");
            }
        }
    }

    #[test]
    fn test_empty_output_falls_back() {
        let result = clean_result("", PROMPT, Language::En);
        assert!(result.is_fallback);
        assert_eq!(result.cleaned_output, Language::En.generation_fallback());
    }

    #[test]
    fn test_prompt_only_output_falls_back() {
        let result = clean_result(PROMPT, PROMPT, Language::Uk);
        assert!(result.is_fallback);
        assert_eq!(result.cleaned_output, Language::Uk.generation_fallback());
    }

    #[test]
    fn test_punctuation_only_output_falls_back() {
        assert!(clean_result(" ?! ... ", PROMPT, Language::En).is_fallback);
    }

    #[test]
    fn test_too_few_words_falls_back() {
        // long enough in chars, but only four words
        let result = clean_result("Extraordinarily comprehensive documentation available", PROMPT, Language::De);
        assert!(result.is_fallback);
        assert_eq!(result.cleaned_output, Language::De.generation_fallback());
    }

    #[test]
    fn test_too_few_chars_falls_back() {
        // five words, under twenty chars
        assert!(clean_result("a b c d e", PROMPT, Language::En).is_fallback);
    }

    #[test]
    fn test_fallback_is_language_specific() {
        let en = clean("", PROMPT, Language::En);
        let uk = clean("", PROMPT, Language::Uk);
        assert_ne!(en, uk);
    }

    #[test]
    fn test_fallbacks_pass_own_checks() {
        for lang in Language::ALL {
            let fallback = lang.generation_fallback();
            assert_eq!(normalize_ending(fallback).as_deref(), Some(fallback));
            assert!(!is_degenerate(fallback), "{lang} fallback is degenerate");
        }
    }

    #[test]
    fn test_keeps_raw_output() {
        let raw = format!("{PROMPT} fine answer with enough words here");
        let result = clean_result(&raw, PROMPT, Language::En);
        assert_eq!(result.raw_output, raw);
        assert!(!result.is_fallback);
    }
}
