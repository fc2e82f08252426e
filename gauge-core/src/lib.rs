//! Gauge Core - Culture-aware numeric text
//!
//! This crate provides the building blocks shared by the quantity layer:
//! - `Culture`: decimal/group separators, signs and special symbols
//! - `NumberStyles`: which parts of a numeric literal are accepted
//! - `reader`: cursor-based reading of whitespace and doubles
//! - `value_format`: standard and custom numeric format strings
//! - `GaugeError`: classified errors with stable messages

mod culture;
mod error;
mod styles;
pub mod reader;
pub mod value_format;

pub use culture::Culture;
pub use error::{codes, format_error_string, GaugeError};
pub use reader::{parse_double, read_double, read_whitespace};
pub use styles::NumberStyles;
pub use value_format::{can_format_f64, format_f64};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Culture, GaugeError, NumberStyles};
    pub use crate::error::codes;
}
