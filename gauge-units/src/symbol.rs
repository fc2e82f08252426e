//! Reading unit symbols from text
//!
//! A symbol is matched two ways and the longer match wins:
//! - exactly, against the registered symbols and aliases of the kind
//! - through its parts, so `kg⋅s⁻¹`, `kg*s^-1` and `kg / s` all read as `kg/s`

use gauge_core::reader::{read_char, read_whitespace};
use gauge_core::GaugeError;
use crate::unit::{normalize_parts, superscript_digit};
use crate::{QuantityKind, Unit, UnitPart, UnitRegistry};

impl UnitRegistry {
    /// Read the longest symbol of `kind` starting at `pos`.
    ///
    /// Whitespace before the symbol is not skipped and trailing whitespace is
    /// not consumed. On failure `pos` is unchanged.
    pub fn read_symbol(&self, text: &str, pos: &mut usize, kind: QuantityKind) -> Option<Unit> {
        let rest = text.get(*pos..)?;

        let exact = self
            .symbol_table(kind)
            .iter()
            .find(|(symbol, _)| rest.starts_with(symbol.as_str()))
            .map(|(symbol, unit)| (symbol.len(), *unit));
        let composed = read_parts(rest, self.part_symbols())
            .and_then(|(parts, len)| self.unit_with_parts(kind, &parts).map(|unit| (len, unit)));

        let (len, unit) = match (exact, composed) {
            (Some(exact), Some(composed)) if composed.0 > exact.0 => composed,
            (Some(exact), _) => exact,
            (None, Some(composed)) => composed,
            (None, None) => return None,
        };
        *pos += len;
        Some(unit)
    }

    /// Parse a whole text as a unit of `kind`, allowing surrounding whitespace
    pub fn parse_unit(&self, text: &str, kind: QuantityKind) -> Result<Unit, GaugeError> {
        let mut pos = 0;
        read_whitespace(text, &mut pos);
        let unit = self
            .read_symbol(text, &mut pos, kind)
            .ok_or_else(|| GaugeError::unknown_symbol(text.trim(), kind.name()))?;
        read_whitespace(text, &mut pos);
        if pos != text.len() {
            return Err(GaugeError::incomplete(text, &kind.unit_type_name(), pos));
        }
        Ok(unit)
    }
}

/// Read a product of parts such as `kg⋅m/s²`.
///
/// Returns the normalized parts and the number of bytes read. A trailing
/// operator that is not followed by a part is left unread.
fn read_parts(text: &str, part_symbols: &[&'static str]) -> Option<(Vec<UnitPart>, usize)> {
    let mut pos = 0;
    let mut parts = Vec::new();
    let mut divided = false;

    let mut part = read_part(text, &mut pos, part_symbols)?;
    loop {
        if divided {
            part.power = part.power.checked_neg()?;
        }
        parts.push(part);
        let end = pos;

        let mut next = pos;
        read_whitespace(text, &mut next);
        let divides = if read_char(text, &mut next, '⋅') || read_char(text, &mut next, '·') || read_char(text, &mut next, '*') {
            false
        } else if !divided && read_char(text, &mut next, '/') {
            true
        } else {
            pos = end;
            break;
        };
        read_whitespace(text, &mut next);

        match read_part(text, &mut next, part_symbols) {
            Some(next_part) => {
                divided |= divides;
                part = next_part;
                pos = next;
            }
            None => {
                pos = end;
                break;
            }
        }
    }

    Some((normalize_parts(parts), pos))
}

/// Read one base symbol with an optional power
fn read_part(text: &str, pos: &mut usize, part_symbols: &[&'static str]) -> Option<UnitPart> {
    let rest = text.get(*pos..)?;
    let symbol = *part_symbols.iter().find(|s| rest.starts_with(**s))?;
    let mut end = *pos + symbol.len();
    let power = read_power(text, &mut end).unwrap_or(1);
    *pos = end;
    Some(UnitPart { symbol, power })
}

/// Read `²`, `⁻¹`, `^2` or `^-1`; `pos` is unchanged when there is no power
fn read_power(text: &str, pos: &mut usize) -> Option<i8> {
    let mut next = *pos;
    let power = if read_char(text, &mut next, '^') {
        let negative = if read_char(text, &mut next, '-') {
            true
        } else {
            read_char(text, &mut next, '+');
            false
        };
        let rest = text.get(next..)?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let value: i32 = rest[..digits].parse().ok()?;
        next += digits;
        if negative { -value } else { value }
    } else {
        let negative = if read_char(text, &mut next, '⁻') {
            true
        } else {
            read_char(text, &mut next, '⁺');
            false
        };
        let mut value: i32 = 0;
        let mut digits = 0;
        while let Some(c) = text.get(next..).and_then(|r| r.chars().next()) {
            let Some(digit) = superscript_digit(c) else {
                break;
            };
            value = value.checked_mul(10)?.checked_add(digit as i32)?;
            next += c.len_utf8();
            digits += 1;
        }
        if digits == 0 {
            return None;
        }
        if negative { -value } else { value }
    };

    let power = i8::try_from(power).ok()?;
    *pos = next;
    Some(power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNITS;
    use QuantityKind::*;

    fn read(text: &str, kind: QuantityKind) -> Option<(&'static str, usize)> {
        let mut pos = 0;
        UNITS.read_symbol(text, &mut pos, kind).map(|unit| (unit.symbol, pos))
    }

    #[test]
    fn test_longest_exact_match() {
        assert_eq!(read("mm", Length), Some(("mm", 2)));
        assert_eq!(read("min", Time), Some(("min", 3)));
        assert_eq!(read("ms", Time), Some(("ms", 2)));
        assert_eq!(read("nmi", Length), Some(("nmi", 3)));
    }

    #[test]
    fn test_minutes_not_metres_then_inches() {
        let text = "5min";
        let mut pos = 1;
        let unit = UNITS.read_symbol(text, &mut pos, Time).unwrap();
        assert_eq!(unit.symbol, "min");
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(read("um", Length), Some(("µm", 2)));
        assert_eq!(read("μm", Length), Some(("µm", "μm".len())));
        assert_eq!(read("mph", Speed), Some(("mi/h", 3)));
    }

    #[test]
    fn test_alternate_notations() {
        let symbols = ["kg/s", "kg⋅s⁻¹", "kg·s⁻¹", "kg*s^-1", "kg / s", "kg * s^-1"];
        for text in symbols {
            assert_eq!(read(text, MassFlow), Some(("kg/s", text.len())), "{}", text);
        }
        assert_eq!(read("m^3", Volume), Some(("m³", 3)));
        assert_eq!(read("N*m", Torque), Some(("N⋅m", 3)));
        assert_eq!(read("m⋅N", Torque), Some(("N⋅m", "m⋅N".len())));
        assert_eq!(read("N⋅mm⁻²", Pressure), Some(("N/mm²", "N⋅mm⁻²".len())));
    }

    #[test]
    fn test_trailing_whitespace_not_consumed() {
        assert_eq!(read("kg/s ", MassFlow), Some(("kg/s", 4)));
        assert_eq!(read("kg/ ", MassFlow), None);
        assert_eq!(read("mm ", Length), Some(("mm", 2)));
    }

    #[test]
    fn test_leading_whitespace_not_skipped() {
        assert_eq!(read(" mm", Length), None);
    }

    #[test]
    fn test_unit_of_other_kind_fails() {
        assert_eq!(read("kg", Length), None);
        assert_eq!(read("s", Length), None);
    }

    #[test]
    fn test_exact_prefix_when_parts_are_another_kind() {
        // "m/s" is a speed, so only "m" reads as a length
        assert_eq!(read("m/s", Length), Some(("m", 1)));
    }

    #[test]
    fn test_failed_read_leaves_position() {
        let mut pos = 2;
        assert!(UNITS.read_symbol("12xyz", &mut pos, Length).is_none());
        assert_eq!(pos, 2);
        let mut pos = 99;
        assert!(UNITS.read_symbol("m", &mut pos, Length).is_none());
        assert_eq!(pos, 99);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(UNITS.parse_unit(" mm ", Length).map(|u| u.symbol), Ok("mm"));
        assert_eq!(UNITS.parse_unit("kg*s^-1", MassFlow).map(|u| u.symbol), Ok("kg/s"));

        let err = UNITS.parse_unit("xyz", Length).unwrap_err();
        assert_eq!(err.code(), gauge_core::codes::UNKNOWN_SYMBOL);

        let err = UNITS.parse_unit("mm x", Length).unwrap_err();
        assert_eq!(err, GaugeError::incomplete("mm x", "LengthUnit", 3));
    }

    #[test]
    fn test_read_power() {
        let mut pos = 0;
        assert_eq!(read_power("²", &mut pos), Some(2));
        assert_eq!(pos, "²".len());

        let mut pos = 0;
        assert_eq!(read_power("^-12", &mut pos), Some(-12));
        assert_eq!(pos, 4);

        let mut pos = 0;
        assert_eq!(read_power("^x", &mut pos), None);
        assert_eq!(pos, 0);

        let mut pos = 0;
        assert_eq!(read_power("^999", &mut pos), None);
        assert_eq!(pos, 0);
    }
}
