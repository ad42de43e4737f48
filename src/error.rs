// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use thiserror::Error;

/// Type name used in "Incorrect {type} value" messages for datetime values.
pub const DATETIME_STR: &str = "datetime";
/// Type name used in "Incorrect {type} value" messages for time values.
pub const TIME_STR: &str = "time";

/// Errors produced by vectorized temporal evaluation.
///
/// `Display` output reproduces the historical MySQL message text so that
/// clients matching on message strings keep working. The variant itself is
/// the machine-checkable kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Scratch buffer growth hit resource exhaustion. Always fatal.
    #[error("failed to allocate evaluation buffer for {rows} rows")]
    Alloc { rows: usize },

    /// An explicit fsp argument exceeded the maximum. Always fatal.
    #[error("Too-big precision {fsp} specified for '{func}'. Maximum is {max}.")]
    TooBigPrecision {
        fsp: i64,
        func: &'static str,
        max: u8,
    },

    /// An explicit fsp argument was negative. Always fatal.
    #[error("Invalid negative {0} specified, must in [0, 6].")]
    NegativePrecision(i64),

    /// An fsp value outside [0, 6] reached a conversion routine.
    #[error("Invalid fsp {0} specified, must in [0, 6].")]
    InvalidFsp(i8),

    /// A computed or parsed datetime is zero or calendar-invalid. Routed
    /// through `EvalContext::handle_invalid_time_error` at the call site.
    #[error("Incorrect datetime value: '{0}'")]
    IncorrectDatetimeValue(String),

    /// A time (duration) value or unit tag is invalid for its function.
    #[error("Incorrect time value: '{0}'")]
    IncorrectTimeValue(String),

    /// A value was truncated while converting to its target type.
    #[error("Truncated incorrect {tp} value: '{val}'")]
    TruncatedWrongValue { tp: &'static str, val: String },

    /// Input could not be decoded as a value of the expected shape.
    #[error("Data truncated")]
    Truncated,

    /// Structurally invalid arguments, e.g. a malformed period. Always fatal.
    #[error("Incorrect arguments to {0}")]
    IncorrectArgs(&'static str),

    /// The session @@default_week_format variable is not an integer.
    #[error("invalid week mode format: '{0}'")]
    InvalidWeekModeFormat(String),

    /// A string argument is not valid UTF-8.
    #[error("Invalid character string: '{0}'")]
    Encoding(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn incorrect_datetime_value(v: impl std::fmt::Display) -> Error {
        Error::IncorrectDatetimeValue(v.to_string())
    }

    pub fn incorrect_time_value(v: impl std::fmt::Display) -> Error {
        Error::IncorrectTimeValue(v.to_string())
    }

    pub fn truncated_wrong_value(tp: &'static str, v: impl std::fmt::Display) -> Error {
        Error::TruncatedWrongValue {
            tp,
            val: v.to_string(),
        }
    }

    pub fn truncated() -> Error {
        Error::Truncated
    }

    pub fn encoding(v: impl std::fmt::Display) -> Error {
        Error::Encoding(v.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
