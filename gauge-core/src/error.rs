//! Classified errors for parsing and formatting
//!
//! Errors are values. Every parse entry point returns them instead of
//! panicking, and each one carries the offending text so callers can show the
//! user's input back to them.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const MALFORMED_FORMAT: &str = "MALFORMED_FORMAT";
    pub const UNIT_MISMATCH: &str = "UNIT_MISMATCH";
    pub const INCOMPLETE_PARSE: &str = "INCOMPLETE_PARSE";
    pub const UNKNOWN_SYMBOL: &str = "UNKNOWN_SYMBOL";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const MISSING_SYMBOL: &str = "MISSING_SYMBOL";
    pub const UNIT_NOT_ALLOWED: &str = "UNIT_NOT_ALLOWED";
}

/// Build the standard diagnostic for a format that cannot be used.
///
/// The message always embeds the literal `format` text and the `target` type
/// name, e.g. `Invalid format: 'F2x' cannot be used to format f64`.
pub fn format_error_string(format: &str, target: &str) -> String {
    format!("Invalid format: '{}' cannot be used to format {}", format, target)
}

/// Error type for parsing and formatting quantities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaugeError {
    /// A value or symbol segment of a format was not recognized
    #[error("{}: {reason}", format_error_string(.format, .target))]
    MalformedFormat {
        format: String,
        target: String,
        reason: String,
    },

    /// An explicit unit conflicts with the unit named by a format or quantity
    #[error("Unit mismatch: expected '{expected}' but '{format}' uses '{found}'")]
    UnitMismatch {
        expected: String,
        found: String,
        format: String,
    },

    /// Input was only partially consumed
    #[error("Could not parse '{text}' into {target}: unexpected text at position {position}")]
    IncompleteParse {
        text: String,
        target: String,
        position: usize,
    },

    /// Text does not match any registered symbol of the kind
    #[error("Unknown symbol '{symbol}' for {kind}")]
    UnknownSymbol { symbol: String, kind: String },

    /// No numeric literal where one was required
    #[error("Could not parse '{text}' into {target}: expected a number")]
    InvalidNumber { text: String, target: String },

    /// A unit symbol was required but the text has none
    #[error("Could not parse '{text}' into {kind}: a unit symbol is required")]
    MissingSymbol { text: String, kind: String },

    /// A unit symbol was written where only a scalar is accepted
    #[error("'{text}' has the unit '{unit}' but only a scalar value is allowed")]
    UnitNotAllowed { text: String, unit: String },
}

impl GaugeError {
    /// Machine-readable code, one of [`codes`]
    pub fn code(&self) -> &'static str {
        match self {
            GaugeError::MalformedFormat { .. } => codes::MALFORMED_FORMAT,
            GaugeError::UnitMismatch { .. } => codes::UNIT_MISMATCH,
            GaugeError::IncompleteParse { .. } => codes::INCOMPLETE_PARSE,
            GaugeError::UnknownSymbol { .. } => codes::UNKNOWN_SYMBOL,
            GaugeError::InvalidNumber { .. } => codes::INVALID_NUMBER,
            GaugeError::MissingSymbol { .. } => codes::MISSING_SYMBOL,
            GaugeError::UnitNotAllowed { .. } => codes::UNIT_NOT_ALLOWED,
        }
    }

    /// Suggestion for fixing the error
    pub fn suggestion(&self) -> String {
        match self {
            GaugeError::MalformedFormat { .. } => {
                "Use a numeric format like 'F2' followed by a unit symbol, e.g. 'F2 kg/s'".to_string()
            }
            GaugeError::UnitMismatch { expected, .. } => {
                format!("Use a format with the symbol '{}' or remove the explicit unit", expected)
            }
            GaugeError::IncompleteParse { .. } => {
                "Remove trailing characters after the quantity".to_string()
            }
            GaugeError::UnknownSymbol { kind, .. } => {
                format!("Use one of the registered {} symbols", kind)
            }
            GaugeError::InvalidNumber { .. } => {
                "Check the decimal separator for the current culture".to_string()
            }
            GaugeError::MissingSymbol { .. } => "Add a unit symbol after the value".to_string(),
            GaugeError::UnitNotAllowed { .. } => "Enter the value without a unit symbol".to_string(),
        }
    }

    // ========== Common Error Constructors ==========

    pub fn malformed_format(format: &str, target: &str, reason: impl Into<String>) -> Self {
        GaugeError::MalformedFormat {
            format: format.to_string(),
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    pub fn incomplete(text: &str, target: &str, position: usize) -> Self {
        GaugeError::IncompleteParse {
            text: text.to_string(),
            target: target.to_string(),
            position,
        }
    }

    pub fn invalid_number(text: &str, target: &str) -> Self {
        GaugeError::InvalidNumber {
            text: text.to_string(),
            target: target.to_string(),
        }
    }

    pub fn unknown_symbol(symbol: &str, kind: &str) -> Self {
        GaugeError::UnknownSymbol {
            symbol: symbol.to_string(),
            kind: kind.to_string(),
        }
    }
}
