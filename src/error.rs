//! Error types for capture and record construction.

use thiserror::Error;

/// Precondition violations raised while constructing capture or record types.
///
/// Converting and sanitizing never produce these; they only surface when a
/// caller builds a frame, descriptor or event with required data missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("{0} must be non-empty")]
    EmptyField(&'static str),
    #[error("Invalid routine identity: {0:?} (expected `module.function`)")]
    InvalidRoutine(String),
    #[error("Event id must not be nil")]
    NilEventId,
}

/// Ensure a required string field is non-empty.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), CaptureError> {
    if value.is_empty() {
        return Err(CaptureError::EmptyField(field));
    }
    Ok(())
}
