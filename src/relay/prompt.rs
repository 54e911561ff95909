//! Prompt construction for the text-generation model.

/// Format user text (already in English) into a question/answer prompt.
///
/// The text is embedded verbatim. Length limits are left to the
/// generator's truncation policy.
pub fn build_prompt(english_text: &str) -> String {
    format!("Question: {english_text}\nAnswer (clear and concise):")
}
