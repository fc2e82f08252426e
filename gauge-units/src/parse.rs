//! Parsing quantities like `12.5 kg/s` from text

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use gauge_core::reader::{read_double, read_whitespace};
use gauge_core::{Culture, GaugeError, NumberStyles};
use crate::{Quantity, QuantityKind, Unit, UnitRegistry};

/// Whether quantity text may or must carry a unit symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitInput {
    /// Only a number; the default unit applies
    ScalarOnly,
    /// A number with or without a symbol
    #[default]
    SymbolAllowed,
    /// A number followed by a symbol
    SymbolRequired,
}

impl UnitInput {
    pub fn name(self) -> &'static str {
        match self {
            UnitInput::ScalarOnly => "ScalarOnly",
            UnitInput::SymbolAllowed => "SymbolAllowed",
            UnitInput::SymbolRequired => "SymbolRequired",
        }
    }
}

impl fmt::Display for UnitInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [UnitInput::ScalarOnly, UnitInput::SymbolAllowed, UnitInput::SymbolRequired]
            .into_iter()
            .find(|input| input.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown unit input '{}', expected ScalarOnly, SymbolAllowed or SymbolRequired", s))
    }
}

impl UnitRegistry {
    /// Parse `text` as a number followed by a symbol of `kind`.
    ///
    /// Whitespace is allowed before, between and after; nothing else may
    /// follow the symbol.
    pub fn parse_quantity(
        &self,
        text: &str,
        kind: QuantityKind,
        styles: NumberStyles,
        culture: &Culture,
    ) -> Result<Quantity, GaugeError> {
        let result = self.read_quantity(text, kind, styles, culture);
        if let Err(err) = &result {
            tracing::debug!(code = err.code(), text, kind = kind.name(), "quantity parse failed");
        }
        result
    }

    /// Parse `text` according to `input`, using `default_unit` for bare numbers
    pub fn try_parse_quantity(
        &self,
        text: &str,
        default_unit: Unit,
        input: UnitInput,
        culture: &Culture,
    ) -> Result<Quantity, GaugeError> {
        let result = match input {
            UnitInput::ScalarOnly => self.read_scalar(text, default_unit, culture),
            UnitInput::SymbolAllowed => read_bare_number(text, culture)
                .map(|value| Quantity::new(value, default_unit))
                .map_or_else(|| self.read_quantity(text, default_unit.kind, NumberStyles::FLOAT, culture), Ok),
            UnitInput::SymbolRequired => self.read_quantity(text, default_unit.kind, NumberStyles::FLOAT, culture),
        };
        if let Err(err) = &result {
            tracing::debug!(code = err.code(), text, input = input.name(), "quantity parse failed");
        }
        result
    }

    fn read_quantity(
        &self,
        text: &str,
        kind: QuantityKind,
        styles: NumberStyles,
        culture: &Culture,
    ) -> Result<Quantity, GaugeError> {
        let target = kind.name();
        let mut pos = 0;
        read_whitespace(text, &mut pos);
        let value = read_double(text, &mut pos, styles, culture)
            .ok_or_else(|| GaugeError::invalid_number(text, target))?;
        read_whitespace(text, &mut pos);

        if pos == text.len() {
            return Err(GaugeError::MissingSymbol {
                text: text.to_string(),
                kind: target.to_string(),
            });
        }

        let unit = self
            .read_symbol(text, &mut pos, kind)
            .ok_or_else(|| GaugeError::incomplete(text, target, pos))?;
        read_whitespace(text, &mut pos);
        if pos != text.len() {
            return Err(GaugeError::incomplete(text, target, pos));
        }
        Ok(Quantity::new(value, unit))
    }

    fn read_scalar(&self, text: &str, default_unit: Unit, culture: &Culture) -> Result<Quantity, GaugeError> {
        if let Some(value) = read_bare_number(text, culture) {
            return Ok(Quantity::new(value, default_unit));
        }

        // Report a written unit distinctly from plain garbage
        if let Ok(quantity) = self.read_quantity(text, default_unit.kind, NumberStyles::FLOAT, culture) {
            return Err(GaugeError::UnitNotAllowed {
                text: text.to_string(),
                unit: quantity.unit.symbol.to_string(),
            });
        }

        let target = default_unit.kind.name();
        let mut pos = 0;
        read_whitespace(text, &mut pos);
        if read_double(text, &mut pos, NumberStyles::FLOAT, culture).is_none() {
            return Err(GaugeError::invalid_number(text, target));
        }
        read_whitespace(text, &mut pos);
        Err(GaugeError::incomplete(text, target, pos))
    }
}

/// A number surrounded only by whitespace
fn read_bare_number(text: &str, culture: &Culture) -> Option<f64> {
    let mut pos = 0;
    read_whitespace(text, &mut pos);
    let value = read_double(text, &mut pos, NumberStyles::FLOAT, culture)?;
    read_whitespace(text, &mut pos);
    (pos == text.len()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::codes;
    use crate::UNITS;
    use QuantityKind::*;

    fn unit(kind: QuantityKind, symbol: &str) -> Unit {
        UNITS.get(kind, symbol).unwrap()
    }

    fn parse(text: &str, kind: QuantityKind) -> Result<Quantity, GaugeError> {
        UNITS.parse_quantity(text, kind, NumberStyles::FLOAT, Culture::invariant())
    }

    #[test]
    fn test_parse_with_symbol() {
        let q = parse("12.5 kg/s", MassFlow).unwrap();
        assert_eq!(q.value, 12.5);
        assert_eq!(q.unit.symbol, "kg/s");

        let q = parse("  1.2e3mm  ", Length).unwrap();
        assert_eq!(q.value, 1200.0);
        assert_eq!(q.unit.symbol, "mm");
    }

    #[test]
    fn test_longest_symbol_after_number() {
        let q = parse("5min", Time).unwrap();
        assert_eq!(q.value, 5.0);
        assert_eq!(q.unit.symbol, "min");
    }

    #[test]
    fn test_alternate_symbol_notation() {
        let q = parse("2 kg⋅s⁻¹", MassFlow).unwrap();
        assert_eq!(q.unit.symbol, "kg/s");
        let q = parse("-3 m^3", Volume).unwrap();
        assert_eq!(q.value, -3.0);
        assert_eq!(q.unit.symbol, "m³");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("kg/s", MassFlow).unwrap_err().code(), codes::INVALID_NUMBER);
        assert_eq!(parse("12.5", MassFlow).unwrap_err().code(), codes::MISSING_SYMBOL);
        assert_eq!(parse("12.5 kg/sx", MassFlow).unwrap_err(), GaugeError::incomplete("12.5 kg/sx", "MassFlow", 9));
        assert_eq!(parse("12.5 xyz", MassFlow).unwrap_err(), GaugeError::incomplete("12.5 xyz", "MassFlow", 5));
    }

    #[test]
    fn test_culture_decimal_separator() {
        let sv = Culture::get("sv-SE").unwrap();
        let q = UNITS.parse_quantity("12,5 mm", Length, NumberStyles::FLOAT, sv).unwrap();
        assert_eq!(q.value, 12.5);

        let en = Culture::get("en-US").unwrap();
        let err = UNITS.parse_quantity("12,5 mm", Length, NumberStyles::FLOAT, en).unwrap_err();
        assert_eq!(err.code(), codes::INCOMPLETE_PARSE);

        let q = UNITS.parse_quantity("1,250 mm", Length, NumberStyles::ANY, en).unwrap();
        assert_eq!(q.value, 1250.0);
    }

    #[test]
    fn test_scalar_only() {
        let mm = unit(Length, "mm");
        let parse = |text| UNITS.try_parse_quantity(text, mm, UnitInput::ScalarOnly, Culture::invariant());

        let q = parse(" 12.5 ").unwrap();
        assert_eq!(q.value, 12.5);
        assert_eq!(q.unit, mm);

        let err = parse("12.5 mm").unwrap_err();
        assert_eq!(err.code(), codes::UNIT_NOT_ALLOWED);
        let err = parse("12.5 cm").unwrap_err();
        assert_eq!(err, GaugeError::UnitNotAllowed { text: "12.5 cm".to_string(), unit: "cm".to_string() });

        assert_eq!(parse("abc").unwrap_err().code(), codes::INVALID_NUMBER);
        assert_eq!(parse("12.5 kgx").unwrap_err().code(), codes::INCOMPLETE_PARSE);
    }

    #[test]
    fn test_symbol_allowed() {
        let mm = unit(Length, "mm");
        let parse = |text| UNITS.try_parse_quantity(text, mm, UnitInput::SymbolAllowed, Culture::invariant());

        assert_eq!(parse("12.5").unwrap().unit, mm);
        let q = parse("12.5 cm").unwrap();
        assert_eq!(q.unit.symbol, "cm");
        assert_eq!(q.value, 12.5);
        assert_eq!(parse("12.5 kg").unwrap_err().code(), codes::INCOMPLETE_PARSE);
    }

    #[test]
    fn test_symbol_required() {
        let mm = unit(Length, "mm");
        let parse = |text| UNITS.try_parse_quantity(text, mm, UnitInput::SymbolRequired, Culture::invariant());

        assert_eq!(parse("12.5").unwrap_err().code(), codes::MISSING_SYMBOL);
        assert_eq!(parse("12.5 m").unwrap().unit.symbol, "m");
        assert_eq!(parse("").unwrap_err().code(), codes::INVALID_NUMBER);
    }

    #[test]
    fn test_round_trip_through_format() {
        let q = Quantity::new(1.2345, unit(Pressure, "kPa"));
        let sv = Culture::get("sv-SE").unwrap();
        let text = q.to_string_with(Some("F4 kPa"), sv);
        let back = UNITS.parse_quantity(&text, Pressure, NumberStyles::FLOAT, sv).unwrap();
        assert_eq!(back.unit, q.unit);
        assert!((back.value - q.value).abs() < 1e-12);
    }

    #[test]
    fn test_every_unit_formats_back_to_its_text() {
        let culture = Culture::invariant();
        for kind in UNITS.kinds() {
            let si = UNITS.si_unit(kind).unwrap();
            for unit in UNITS.units(kind) {
                let text = format!("1.5 {}", unit.symbol);
                let q = UNITS.try_parse_quantity(&text, si, UnitInput::SymbolRequired, culture).unwrap();
                assert_eq!(q.unit, *unit, "{}", text);
                assert_eq!(q.to_string_with(Some(&format!("F1 {}", unit.symbol)), culture), text);

                let symbol_only = crate::parse_format(&UNITS, kind, Some(unit.symbol)).unwrap();
                assert_eq!(symbol_only.value_format(), None, "{}", unit.symbol);
                assert_eq!(symbol_only.unit(), Some(*unit));
            }
        }
    }

    #[test]
    fn test_unit_input_from_str() {
        assert_eq!("scalaronly".parse::<UnitInput>(), Ok(UnitInput::ScalarOnly));
        assert_eq!(" SymbolRequired ".parse::<UnitInput>(), Ok(UnitInput::SymbolRequired));
        assert!("maybe".parse::<UnitInput>().is_err());
        assert_eq!(UnitInput::default(), UnitInput::SymbolAllowed);
    }
}
