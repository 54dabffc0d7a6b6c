// Error types for the calendar event engine

use thiserror::Error;

/// Calendar event expression parse errors
///
/// Each variant carries the offending literal so the rendered message
/// reproduces the exact diagnostic shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty calendar event expression")]
    EmptyExpression,

    #[error("unused parts '{0}' in calendar event")]
    UnusedParts(String),

    #[error("invalid time specification '{0}'")]
    InvalidTimeSpec(String),

    #[error("value {0} out of range")]
    ValueOutOfRange(u32),

    #[error("range bound {0} out of range")]
    RangeOutOfRange(u32),

    #[error("repetition {0} out of range")]
    RepetitionOutOfRange(u32),

    #[error("wrong order in range '{0}'")]
    WrongOrderInRange(String),
}

/// Next-occurrence search errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("no matching occurrence within {0} search steps")]
    SearchExhausted(u32),
}
