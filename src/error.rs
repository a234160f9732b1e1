//! Engine error types

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvError>;

/// Conversion engine errors
///
/// Per-rule decode failures are normally captured into that rule's
/// `ConversionResult` and never abort a batch; only rule-set validation and
/// the `stop_on_error` batch policy surface as `Err` to the caller.
#[derive(Debug, Error)]
pub enum ConvError {
    /// Rule set failed static validation
    #[error("rule set validation failed: {}", .errors.join("; "))]
    InvalidRuleSet { errors: Vec<String> },

    /// Snapshot shorter than the rule's register window
    #[error(
        "insufficient registers for rule '{rule}': need {required} starting at {start}, snapshot has {available}"
    )]
    InsufficientRegisters {
        rule: String,
        start: usize,
        required: usize,
        available: usize,
    },

    /// Register content is not valid packed decimal
    #[error("invalid BCD word 0x{word:04X}: nibble out of 0-9 range")]
    InvalidBcd { word: u16 },

    /// Decoded value rejected by the configured range check
    #[error("value {value} outside configured range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// Decoded value is NaN and the rule does not allow NaN
    #[error("value is NaN and allow_nan is not set")]
    NanRejected,

    /// Value cannot be encoded into the rule's register layout
    #[error("cannot encode {value} as {data_type}: {reason}")]
    Unencodable {
        data_type: &'static str,
        value: String,
        reason: String,
    },

    /// First invalid result under the stop_on_error batch policy
    #[error("rule '{rule}' failed: {message}")]
    BatchStopped { rule: String, message: String },
}
