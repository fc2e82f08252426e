//! Gauge Units - Quantities with culture-aware parsing and formatting
//!
//! Provides unit-aware quantities of a fixed set of kinds:
//! - Length (m, mm, km, in, mi, etc.)
//! - Mass (kg, g, t, etc.)
//! - Time (s, ms, min, h, etc.)
//! - MassFlow (kg/s, kg/h, etc.)
//! - Angle (rad, °)
//! - Pressure (Pa, kPa, bar, N/mm², etc.)
//! - Torque (N⋅m, kN⋅m)
//! - Stiffness (N/m, N/mm, etc.)
//! - LuminousFlux (lm)
//! - AmountOfSubstance (mol, mmol, kmol)
//! - Frequency (Hz, kHz, etc.)
//! - Data (b, B, kB, etc.)
//! - SpecificEnergy (J/kg, kJ/kg, etc.)
//! - Speed (m/s, km/h, etc.)
//! - Force (N, kN, etc.)
//! - Energy (J, kJ, kWh, etc.)
//! - Temperature (K, °C, °F)
//! - Volume (m³, L, etc.)
//!
//! Text such as `12.5 kg/s` is parsed with [`parse_quantity`]; quantities are
//! rendered with formats like `F2 kg/s`, cached per registry.

mod kind;
mod unit;
mod units;
mod symbol;
mod quantity;
mod cache;
mod parse;
pub mod format;

pub use kind::QuantityKind;
pub use unit::{SymbolFormat, Unit, UnitPart};
pub use units::{UnitRegistry, UnitRegistryBuilder, UNITS};
pub use quantity::Quantity;
pub use cache::FormatCache;
pub use parse::UnitInput;
pub use format::{parse_format, parse_format_for_unit, QuantityFormat};

use gauge_core::{Culture, GaugeError, NumberStyles};

/// Parse `text` as a quantity of `kind` with the global registry
pub fn parse_quantity(text: &str, kind: QuantityKind, culture: &Culture) -> Result<Quantity, GaugeError> {
    UNITS.parse_quantity(text, kind, NumberStyles::FLOAT, culture)
}

/// Parse `text` according to `input` with the global registry
pub fn try_parse_quantity(text: &str, default_unit: Unit, input: UnitInput, culture: &Culture) -> Result<Quantity, GaugeError> {
    UNITS.try_parse_quantity(text, default_unit, input, culture)
}

/// Parse a unit symbol of `kind` with the global registry
pub fn parse_unit(text: &str, kind: QuantityKind) -> Result<Unit, GaugeError> {
    UNITS.parse_unit(text, kind)
}

/// Render `quantity` with a format string through the global format cache
pub fn format_quantity(quantity: &Quantity, format: Option<&str>, culture: &Culture) -> String {
    quantity.to_string_with(format, culture)
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Quantity, QuantityFormat, QuantityKind, Unit, UnitInput, UNITS};
    pub use gauge_core::prelude::*;
}
