//! Input validation, run before any translation or generation work.

/// Longest accepted message, in characters.
pub const MAX_INPUT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message too long: {length} chars (limit {limit})")]
    TooLong { length: usize, limit: usize },
}

/// Reject input longer than [`MAX_INPUT_CHARS`] characters.
///
/// Counts chars rather than bytes, so Cyrillic text gets the same limit
/// as ASCII.
pub fn validate(raw_text: &str) -> Result<(), ValidationError> {
    let length = raw_text.chars().count();
    if length > MAX_INPUT_CHARS {
        return Err(ValidationError::TooLong {
            length,
            limit: MAX_INPUT_CHARS,
        });
    }
    Ok(())
}
