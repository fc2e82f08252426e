//! Quantity type - a value with an associated unit

use std::fmt;
use serde::Serialize;
use gauge_core::{Culture, GaugeError};
use crate::format::{QuantityFormat, INVALID_FORMAT_TEXT};
use crate::units::UNITS;
use crate::{QuantityKind, SymbolFormat, Unit};

/// A physical quantity: a value in a unit
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    pub fn kind(&self) -> QuantityKind {
        self.unit.kind
    }

    /// The value in the kind's SI unit
    pub fn si_value(&self) -> f64 {
        self.unit.to_si(self.value)
    }

    /// The value expressed in `unit`, which must be of the same kind
    pub fn value_in(&self, unit: Unit) -> f64 {
        if unit == self.unit {
            self.value
        } else {
            unit.from_si(self.si_value())
        }
    }

    /// Convert to another unit of the same kind
    pub fn convert_to(&self, unit: Unit) -> Result<Quantity, GaugeError> {
        if unit.kind != self.kind() {
            return Err(GaugeError::UnitMismatch {
                expected: unit.symbol.to_string(),
                found: self.unit.symbol.to_string(),
                format: self.to_string(),
            });
        }
        Ok(Quantity::new(self.value_in(unit), unit))
    }

    /// Render with `format`, converting to the format's unit first.
    ///
    /// An invalid format, or one for another kind, renders the placeholder
    /// text instead of failing.
    pub fn format(&self, format: &QuantityFormat, culture: &Culture) -> String {
        match format.unit() {
            Some(unit) if unit.kind == self.kind() => format.render(self.value_in(unit), culture),
            _ => INVALID_FORMAT_TEXT.to_string(),
        }
    }

    /// Render with a format string, parsed through the global format cache
    pub fn to_string_with(&self, format: Option<&str>, culture: &Culture) -> String {
        self.format(&UNITS.format(self.kind(), format), culture)
    }

    /// Render in `unit` with a value format and symbol notation, through the
    /// global format cache
    pub fn to_string_in(
        &self,
        value_format: Option<&str>,
        unit: Unit,
        symbol_format: SymbolFormat,
        culture: &Culture,
    ) -> String {
        let format = UNITS.cache().get_or_create_for_unit(value_format, unit, symbol_format);
        self.format(&format, culture)
    }
}

/// Equal when of the same kind with the same SI value
impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.si_value() == other.si_value()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = QuantityFormat::default_for(self.unit);
        f.write_str(&format.render(self.value, Culture::invariant()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuantityKind::*;

    fn unit(kind: QuantityKind, symbol: &str) -> Unit {
        UNITS.get(kind, symbol).unwrap()
    }

    #[test]
    fn test_si_value() {
        let q = Quantity::new(1.2, unit(Length, "km"));
        assert_eq!(q.si_value(), 1200.0);
        assert_eq!(q.kind(), Length);
    }

    #[test]
    fn test_convert_within_kind() {
        let q = Quantity::new(1500.0, unit(Length, "mm"));
        let m = q.convert_to(unit(Length, "m")).unwrap();
        assert!((m.value - 1.5).abs() < 1e-12);
        assert_eq!(m.unit.symbol, "m");
    }

    #[test]
    fn test_convert_across_kinds_fails() {
        let q = Quantity::new(1.0, unit(Length, "m"));
        let err = q.convert_to(unit(Mass, "kg")).unwrap_err();
        assert_eq!(err.code(), gauge_core::codes::UNIT_MISMATCH);
    }

    #[test]
    fn test_temperature_offset() {
        let q = Quantity::new(100.0, unit(Temperature, "°C"));
        assert!((q.si_value() - 373.15).abs() < 1e-9);
        let f = q.convert_to(unit(Temperature, "°F")).unwrap();
        assert!((f.value - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_equality_by_si_value() {
        let a = Quantity::new(1.0, unit(Length, "m"));
        let b = Quantity::new(100.0, unit(Length, "cm"));
        let c = Quantity::new(1.0, unit(Mass, "kg"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_uses_own_unit() {
        let q = Quantity::new(1.2, unit(MassFlow, "kg/s"));
        assert_eq!(q.to_string(), "1.2\u{00A0}kg/s");
    }

    #[test]
    fn test_to_string_with_converts() {
        let q = Quantity::new(1.2, unit(Length, "m"));
        assert_eq!(q.to_string_with(Some("F0 mm"), Culture::invariant()), "1200 mm");
        assert_eq!(q.to_string_with(Some("F2"), Culture::invariant()), "1.20\u{00A0}m");
        assert_eq!(q.to_string_with(None, Culture::invariant()), "1.2\u{00A0}m");

        let sv = Culture::get("sv-SE").unwrap();
        assert_eq!(q.to_string_with(Some("F1 cm"), sv), "120,0 cm");
    }

    #[test]
    fn test_to_string_with_invalid_format() {
        let q = Quantity::new(1.2, unit(Length, "m"));
        assert_eq!(q.to_string_with(Some("F2 kgx"), Culture::invariant()), INVALID_FORMAT_TEXT);
    }

    #[test]
    fn test_format_of_other_kind() {
        let q = Quantity::new(1.2, unit(Length, "m"));
        let format = QuantityFormat::default_for(unit(Mass, "kg"));
        assert_eq!(q.format(&format, Culture::invariant()), INVALID_FORMAT_TEXT);
    }

    #[test]
    fn test_to_string_in_symbol_format() {
        let q = Quantity::new(2.0, unit(Speed, "m/s"));
        let text = q.to_string_in(Some("F1"), unit(Speed, "km/h"), SymbolFormat::SignedSuperScript, Culture::invariant());
        assert_eq!(text, "7.2\u{00A0}km⋅h⁻¹");
    }
}
