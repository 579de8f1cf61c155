use thiserror::Error;

/// Failures of the recurrence engine. User-facing rejections such as a
/// duplicate log are not errors; see [`crate::habit::PerformOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HabitError {
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("invalid frequency `{0}`")]
    InvalidFrequency(String),

    #[error("frequency `{0}` requires an explicit strict flag")]
    MissingStrictFlag(String),

    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, HabitError>;
