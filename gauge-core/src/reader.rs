//! Cursor-based reading of whitespace and numeric literals
//!
//! Every function takes the text and a byte position. A successful read
//! advances the position past what it consumed; a failed read leaves it
//! untouched. Nothing here skips whitespace implicitly.

use crate::{Culture, GaugeError, NumberStyles};

/// Advance `pos` past a run of whitespace (possibly empty).
///
/// Always succeeds and returns the consumed slice. U+00A0 and the other
/// Unicode spaces count as whitespace.
pub fn read_whitespace<'a>(text: &'a str, pos: &mut usize) -> &'a str {
    let start = *pos;
    let Some(rest) = text.get(start..) else {
        return "";
    };
    let len = rest.len() - rest.trim_start().len();
    *pos += len;
    &text[start..*pos]
}

/// Advance `pos` past `expected` if the text continues with it
pub fn read_char(text: &str, pos: &mut usize, expected: char) -> bool {
    match text.get(*pos..).and_then(|rest| rest.chars().next()) {
        Some(c) if c == expected => {
            *pos += c.len_utf8();
            true
        }
        _ => false,
    }
}

/// Advance `pos` past `expected` if the text continues with it
pub fn read_str(text: &str, pos: &mut usize, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    match text.get(*pos..) {
        Some(rest) if rest.starts_with(expected) => {
            *pos += expected.len();
            true
        }
        _ => false,
    }
}

/// Read the longest floating-point literal starting at `pos`.
///
/// The literal follows `culture`'s separators and signs and the parts allowed
/// by `styles`. Whitespace flags are ignored here; callers read whitespace
/// themselves. On failure `pos` is unchanged.
pub fn read_double(text: &str, pos: &mut usize, styles: NumberStyles, culture: &Culture) -> Option<f64> {
    let rest = text.get(*pos..)?;
    let (value, len) = scan_double(rest, styles, culture)?;
    *pos += len;
    Some(value)
}

/// Parse an entire text as a double.
///
/// Leading and trailing whitespace is accepted when `styles` allows it.
pub fn parse_double(text: &str, styles: NumberStyles, culture: &Culture) -> Result<f64, GaugeError> {
    let mut pos = 0;
    if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) {
        read_whitespace(text, &mut pos);
    }
    let value = read_double(text, &mut pos, styles, culture)
        .ok_or_else(|| GaugeError::invalid_number(text, "f64"))?;
    if styles.contains(NumberStyles::ALLOW_TRAILING_WHITE) {
        read_whitespace(text, &mut pos);
    }
    if pos != text.len() {
        return Err(GaugeError::incomplete(text, "f64", pos));
    }
    Ok(value)
}

fn scan_double(s: &str, styles: NumberStyles, culture: &Culture) -> Option<(f64, usize)> {
    let mut i = 0;
    let mut negative = false;
    let mut signed = false;

    if styles.contains(NumberStyles::ALLOW_LEADING_SIGN) {
        if let Some(len) = match_any(s, &culture.negative_signs()) {
            negative = true;
            signed = true;
            i += len;
        } else if let Some(len) = match_any(s, &[culture.positive_sign.as_str()]) {
            signed = true;
            i += len;
        }
    }

    // Special values
    if let Some(len) = match_any(&s[i..], &[culture.positive_infinity_symbol.as_str()]) {
        let value = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some((value, i + len));
    }
    if !signed {
        if let Some(len) = match_any(s, &[culture.negative_infinity_symbol.as_str()]) {
            return Some((f64::NEG_INFINITY, len));
        }
        if let Some(len) = match_any(s, &[culture.nan_symbol.as_str()]) {
            return Some((f64::NAN, len));
        }
    }

    let mut buf = LiteralBuf::new();
    if negative {
        buf.push(b'-');
    }

    // Integer part
    let group = culture.group_separator.as_str();
    let thousands = styles.contains(NumberStyles::ALLOW_THOUSANDS) && !group.is_empty();
    let mut int_digits = 0;
    loop {
        let rest = &s[i..];
        match rest.bytes().next() {
            Some(b) if b.is_ascii_digit() => {
                buf.push(b);
                int_digits += 1;
                i += 1;
            }
            _ if thousands
                && int_digits > 0
                && rest.starts_with(group)
                && rest[group.len()..].starts_with(|c: char| c.is_ascii_digit()) =>
            {
                i += group.len();
            }
            _ => break,
        }
    }

    // Fraction part
    let mut frac_digits = 0;
    let decimal = culture.decimal_separator.as_str();
    if styles.contains(NumberStyles::ALLOW_DECIMAL_POINT) && !decimal.is_empty() && s[i..].starts_with(decimal) {
        let mut j = i + decimal.len();
        let mark = buf.len();
        buf.push(b'.');
        while let Some(b) = s[j..].bytes().next().filter(u8::is_ascii_digit) {
            buf.push(b);
            frac_digits += 1;
            j += 1;
        }
        if int_digits + frac_digits > 0 {
            i = j;
        } else {
            buf.truncate(mark);
        }
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    // Exponent, only consumed when it has digits
    if styles.contains(NumberStyles::ALLOW_EXPONENT) && s[i..].starts_with(['e', 'E']) {
        let mut j = i + 1;
        let mark = buf.len();
        buf.push(b'e');
        if let Some(len) = match_any(&s[j..], &culture.negative_signs()) {
            buf.push(b'-');
            j += len;
        } else if let Some(len) = match_any(&s[j..], &[culture.positive_sign.as_str()]) {
            j += len;
        }
        let mut exp_digits = 0;
        while let Some(b) = s[j..].bytes().next().filter(u8::is_ascii_digit) {
            buf.push(b);
            exp_digits += 1;
            j += 1;
        }
        if exp_digits > 0 {
            i = j;
        } else {
            buf.truncate(mark);
        }
    }

    let value = buf.as_str().parse::<f64>().ok()?;
    Some((value, i))
}

/// Length of the first non-empty candidate that `s` starts with
fn match_any(s: &str, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find(|c| !c.is_empty() && s.starts_with(**c))
        .map(|c| c.len())
}

/// ASCII copy of a literal in Rust's float grammar.
///
/// Typical literals fit on the stack; very long ones spill to the heap.
struct LiteralBuf {
    stack: [u8; 64],
    len: usize,
    heap: Option<String>,
}

impl LiteralBuf {
    fn new() -> Self {
        LiteralBuf { stack: [0; 64], len: 0, heap: None }
    }

    fn len(&self) -> usize {
        match &self.heap {
            Some(heap) => heap.len(),
            None => self.len,
        }
    }

    fn push(&mut self, b: u8) {
        if let Some(heap) = &mut self.heap {
            heap.push(b as char);
        } else if self.len < self.stack.len() {
            self.stack[self.len] = b;
            self.len += 1;
        } else {
            let mut heap = String::with_capacity(self.len * 2);
            heap.push_str(self.stack_str());
            heap.push(b as char);
            self.heap = Some(heap);
        }
    }

    fn truncate(&mut self, len: usize) {
        match &mut self.heap {
            Some(heap) => heap.truncate(len),
            None => self.len = self.len.min(len),
        }
    }

    fn stack_str(&self) -> &str {
        std::str::from_utf8(&self.stack[..self.len]).unwrap_or("")
    }

    fn as_str(&self) -> &str {
        match &self.heap {
            Some(heap) => heap,
            None => self.stack_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str, styles: NumberStyles, culture: &str) -> (Option<f64>, usize) {
        let culture = Culture::get(culture).unwrap();
        let mut pos = 0;
        let value = read_double(text, &mut pos, styles, culture);
        (value, pos)
    }

    #[test]
    fn test_read_whitespace() {
        let text = " \t\u{00A0}kg";
        let mut pos = 0;
        let ws = read_whitespace(text, &mut pos);
        assert_eq!(ws, " \t\u{00A0}");
        assert_eq!(&text[pos..], "kg");

        // Nothing to consume still succeeds
        let consumed = read_whitespace(text, &mut pos);
        assert_eq!(consumed, "");
        assert_eq!(&text[pos..], "kg");
    }

    #[test]
    fn test_read_whitespace_past_end() {
        let mut pos = 10;
        assert_eq!(read_whitespace("abc", &mut pos), "");
        assert_eq!(pos, 10);
    }

    #[test]
    fn test_read_simple_double() {
        assert_eq!(read("12.5 kg/s", NumberStyles::FLOAT, "en-US"), (Some(12.5), 4));
        assert_eq!(read("-3", NumberStyles::FLOAT, "en-US"), (Some(-3.0), 2));
        assert_eq!(read("+3", NumberStyles::FLOAT, "en-US"), (Some(3.0), 2));
        assert_eq!(read(".5", NumberStyles::FLOAT, ""), (Some(0.5), 2));
        assert_eq!(read("5.", NumberStyles::FLOAT, ""), (Some(5.0), 2));
    }

    #[test]
    fn test_failure_leaves_position() {
        let mut pos = 2;
        let value = read_double("x abc", &mut pos, NumberStyles::FLOAT, Culture::invariant());
        assert!(value.is_none());
        assert_eq!(pos, 2);

        assert_eq!(read(".", NumberStyles::FLOAT, ""), (None, 0));
        assert_eq!(read("-", NumberStyles::FLOAT, ""), (None, 0));
    }

    #[test]
    fn test_sign_requires_style() {
        assert_eq!(read("-3", NumberStyles::ALLOW_DECIMAL_POINT, ""), (None, 0));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(read("1.5e3", NumberStyles::FLOAT, ""), (Some(1500.0), 5));
        assert_eq!(read("1.5E-3kg", NumberStyles::FLOAT, ""), (Some(0.0015), 6));
        // 'e' without digits is left for the caller
        assert_eq!(read("1em", NumberStyles::FLOAT, ""), (Some(1.0), 1));
        assert_eq!(read("1e+", NumberStyles::FLOAT, ""), (Some(1.0), 1));
        // exponent not allowed
        assert_eq!(read("1e3", NumberStyles::NUMBER, ""), (Some(1.0), 1));
    }

    #[test]
    fn test_comma_decimal_culture() {
        assert_eq!(read("12,5", NumberStyles::FLOAT, "sv-SE"), (Some(12.5), 4));
        assert_eq!(read("12,5", NumberStyles::FLOAT, "de-DE"), (Some(12.5), 4));
        // '.' is not the decimal separator in sv-SE
        assert_eq!(read("12.5", NumberStyles::FLOAT, "sv-SE"), (Some(12.0), 2));
    }

    #[test]
    fn test_comma_group_culture() {
        // Without thousands the comma ends the literal
        assert_eq!(read("12,5", NumberStyles::FLOAT, "en-US"), (Some(12.0), 2));
        // With thousands the comma is a group separator
        assert_eq!(read("12,5", NumberStyles::ANY, "en-US"), (Some(125.0), 4));
        assert_eq!(read("1,234,567.5", NumberStyles::ANY, "en-US"), (Some(1234567.5), 11));
        assert_eq!(read("1.234,5", NumberStyles::ANY, "de-DE"), (Some(1234.5), 7));
        // A separator must sit between digits
        assert_eq!(read("12, 5", NumberStyles::ANY, "en-US"), (Some(12.0), 2));
        assert_eq!(read(",5", NumberStyles::ANY, "en-US"), (None, 0));
    }

    #[test]
    fn test_minus_sign() {
        assert_eq!(read("\u{2212}3,5", NumberStyles::FLOAT, "sv-SE"), (Some(-3.5), 6));
        assert_eq!(read("-3,5", NumberStyles::FLOAT, "sv-SE"), (Some(-3.5), 4));
        assert_eq!(read("1e\u{2212}2", NumberStyles::FLOAT, "sv-SE"), (Some(0.01), 6));
    }

    #[test]
    fn test_special_values() {
        assert_eq!(read("Infinity", NumberStyles::FLOAT, ""), (Some(f64::INFINITY), 8));
        assert_eq!(read("-Infinity", NumberStyles::FLOAT, ""), (Some(f64::NEG_INFINITY), 9));
        assert_eq!(read("∞ m", NumberStyles::FLOAT, "sv-SE"), (Some(f64::INFINITY), 3));
        let (nan, pos) = read("NaN", NumberStyles::FLOAT, "");
        assert!(nan.unwrap().is_nan());
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_long_literal_spills() {
        let text = format!("1{}", "0".repeat(100));
        let (value, pos) = read(&text, NumberStyles::FLOAT, "");
        assert_eq!(value, Some(1e100));
        assert_eq!(pos, 101);
    }

    #[test]
    fn test_parse_double() {
        let c = Culture::invariant();
        assert_eq!(parse_double(" 1.5 ", NumberStyles::FLOAT, c), Ok(1.5));
        assert!(matches!(
            parse_double("1.5 m", NumberStyles::FLOAT, c),
            Err(GaugeError::IncompleteParse { position: 4, .. })
        ));
        assert!(matches!(
            parse_double("m", NumberStyles::FLOAT, c),
            Err(GaugeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_read_char_and_str() {
        let text = "µm/s";
        let mut pos = 0;
        assert!(read_char(text, &mut pos, 'µ'));
        assert!(!read_char(text, &mut pos, 'x'));
        assert!(read_str(text, &mut pos, "m/"));
        assert_eq!(&text[pos..], "s");
        assert!(!read_str(text, &mut pos, ""));
    }
}
