//! Validation of the alert threshold entered during the start dialog.

use thiserror::Error;

/// Largest accepted threshold, in ppm.
pub const MAX_THRESHOLD: u32 = 10_000;

/// Reasons a threshold reply is rejected.
///
/// The `Display` text is the prompt sent back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("Integer expected. Try again.")]
    NotInteger,

    #[error("Expected value more than 0. Try again.")]
    NotPositive,

    #[error("Value can`t be more than 10000. Try again.")]
    TooLarge,
}

/// Parses a threshold reply: an integer in `1..=10000`.
pub fn parse_threshold(text: &str) -> Result<u32, ThresholdError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| ThresholdError::NotInteger)?;

    if value <= 0 {
        return Err(ThresholdError::NotPositive);
    }
    if value > i64::from(MAX_THRESHOLD) {
        return Err(ThresholdError::TooLarge);
    }

    // In range, so the conversion cannot fail.
    u32::try_from(value).map_err(|_| ThresholdError::TooLarge)
}
