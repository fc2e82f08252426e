//! Quantity formats: a value format, a unit symbol and the padding around them
//!
//! Accepted forms:
//! - `[ws][value-format][ws]<symbol>[ws]`, e.g. `F2 kg/s`, `mm`
//! - `[ws]<value-format>[ws]`, e.g. `F2` (the unit's symbol is appended)
//! - `{0[:value-format]}<padding><symbol>`, e.g. `{0:F2} kg/s`
//!
//! A value format containing characters outside the custom-format set, such
//! as `#,##0.00;(#,##0.00) kPa`, is split at the last whitespace run that
//! leaves a valid value format before it and a symbol after it.
//!
//! Whitespace around the symbol is kept exactly as written.

use std::fmt;
use gauge_core::reader::{read_char, read_str, read_whitespace};
use gauge_core::value_format::{read_value_format, PROBE_VALUE};
use gauge_core::{can_format_f64, format_f64, Culture, GaugeError};
use crate::{QuantityKind, SymbolFormat, Unit, UnitRegistry};

pub use gauge_core::format_error_string;

/// Rendered in place of a quantity when its format could not be parsed
pub const INVALID_FORMAT_TEXT: &str = "{value: ??} {unit: ??}";

/// Padding between value and symbol when the format writes no symbol
pub const DEFAULT_PADDING: &str = "\u{00A0}";

/// A parsed quantity format
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityFormat {
    pre_padding: String,
    value_format: Option<String>,
    padding: String,
    symbol_format: Option<String>,
    post_padding: String,
    unit: Option<Unit>,
    error: Option<GaugeError>,
}

impl QuantityFormat {
    /// Default format for `unit`: shortest value, no-break space, symbol
    pub fn default_for(unit: Unit) -> Self {
        QuantityFormat {
            pre_padding: String::new(),
            value_format: None,
            padding: DEFAULT_PADDING.to_string(),
            symbol_format: None,
            post_padding: String::new(),
            unit: Some(unit),
            error: None,
        }
    }

    /// Format for `unit` with an optional value format and a symbol notation
    pub fn for_unit(value_format: Option<&str>, unit: Unit, symbol_format: SymbolFormat) -> Result<Self, GaugeError> {
        let value_format = value_format.filter(|f| !f.is_empty());
        if let Some(format) = value_format {
            verify_value_format(format)?;
        }
        let symbol_format = match symbol_format {
            SymbolFormat::Default => None,
            other => Some(unit.symbol_in(other)),
        };
        Ok(QuantityFormat {
            value_format: value_format.map(str::to_string),
            symbol_format,
            ..QuantityFormat::default_for(unit)
        })
    }

    /// A format that failed to parse; it renders [`INVALID_FORMAT_TEXT`]
    pub fn invalid(unit: Option<Unit>, error: GaugeError) -> Self {
        QuantityFormat {
            pre_padding: String::new(),
            value_format: None,
            padding: String::new(),
            symbol_format: None,
            post_padding: String::new(),
            unit,
            error: Some(error),
        }
    }

    pub fn pre_padding(&self) -> &str {
        &self.pre_padding
    }

    pub fn value_format(&self) -> Option<&str> {
        self.value_format.as_deref()
    }

    pub fn padding(&self) -> &str {
        &self.padding
    }

    /// The symbol exactly as written in the format
    pub fn symbol_format(&self) -> Option<&str> {
        self.symbol_format.as_deref()
    }

    pub fn post_padding(&self) -> &str {
        &self.post_padding
    }

    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }

    pub fn error(&self) -> Option<&GaugeError> {
        self.error.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Symbol text to render after the padding
    pub fn symbol(&self) -> &str {
        match (&self.symbol_format, self.unit) {
            (Some(symbol), _) => symbol,
            (None, Some(unit)) => unit.symbol,
            (None, None) => "",
        }
    }

    /// Equivalent braced composite format, e.g. `{0:F2} kg/s`
    pub fn composite_format(&self) -> String {
        if self.error.is_some() {
            return INVALID_FORMAT_TEXT.to_string();
        }
        let value = match &self.value_format {
            Some(format) => format!("{{0:{}}}", format),
            None => "{0}".to_string(),
        };
        format!("{}{}{}{}{}", self.pre_padding, value, self.padding, self.symbol(), self.post_padding)
    }

    /// Render a value already expressed in this format's unit
    pub fn render(&self, value: f64, culture: &Culture) -> String {
        if self.error.is_some() {
            return INVALID_FORMAT_TEXT.to_string();
        }
        match format_f64(value, self.value_format.as_deref(), culture) {
            Ok(number) => format!(
                "{}{}{}{}{}",
                self.pre_padding,
                number,
                self.padding,
                self.symbol(),
                self.post_padding
            ),
            Err(_) => INVALID_FORMAT_TEXT.to_string(),
        }
    }
}

impl fmt::Display for QuantityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite_format())
    }
}

/// Parse a quantity format for `kind`.
///
/// An absent or empty format gives the default format of the kind's SI unit.
/// A format that is entirely a symbol of the kind is read as a symbol, so
/// `"N"` means newtons for force but the `N` number format for length.
pub fn parse_format(registry: &UnitRegistry, kind: QuantityKind, format: Option<&str>) -> Result<QuantityFormat, GaugeError> {
    let text = format.unwrap_or("");
    let target = kind.unit_type_name();
    let malformed = |reason: String| GaugeError::malformed_format(text, &target, reason);

    let si = registry
        .si_unit(kind)
        .ok_or_else(|| malformed(format!("no units are registered for {}", kind)))?;
    if text.is_empty() {
        return Ok(QuantityFormat::default_for(si));
    }

    let mut pos = 0;
    let pre_padding = read_whitespace(text, &mut pos).to_string();

    if read_char(text, &mut pos, '{') {
        let value_format = read_braced_value(text, &mut pos).ok_or_else(|| {
            malformed("expected '{0}' or '{0:<value-format>}'".to_string())
        })?;
        return finish(registry, kind, text, pos, pre_padding, value_format, &malformed);
    }

    // Symbol only
    let mut symbol_end = pos;
    if let Some(unit) = registry.read_symbol(text, &mut symbol_end, kind) {
        let mut end = symbol_end;
        let post_padding = read_whitespace(text, &mut end);
        if end == text.len() {
            return Ok(QuantityFormat {
                pre_padding,
                value_format: None,
                padding: DEFAULT_PADDING.to_string(),
                symbol_format: Some(text[pos..symbol_end].to_string()),
                post_padding: post_padding.to_string(),
                unit: Some(unit),
                error: None,
            });
        }
    }

    let start = pos;
    read_value_format(text, &mut pos)
        .ok_or_else(|| malformed(format!("expected a value format or a {} symbol at position {}", kind, start)))
        .and_then(|value_format| finish(registry, kind, text, pos, pre_padding.clone(), Some(value_format), &malformed))
        .or_else(|err| split_at_whitespace(registry, kind, text, start, &pre_padding, &malformed).ok_or(err))
}

/// Try each whitespace run after `start`, rightmost first, as the boundary
/// between a custom value format and the symbol
fn split_at_whitespace(
    registry: &UnitRegistry,
    kind: QuantityKind,
    text: &str,
    start: usize,
    pre_padding: &str,
    malformed: &dyn Fn(String) -> GaugeError,
) -> Option<QuantityFormat> {
    let rest = text.get(start..)?;
    let boundaries: Vec<usize> = rest
        .char_indices()
        .filter(|&(i, c)| c.is_whitespace() && !rest[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| start + i)
        .collect();

    boundaries.into_iter().rev().find_map(|boundary| {
        let value_format = &text[start..boundary];
        if !has_digit_placeholder(value_format) {
            return None;
        }
        finish(registry, kind, text, boundary, pre_padding.to_string(), Some(value_format), malformed)
            .ok()
            .filter(|format| format.symbol_format.is_some())
    })
}

/// Whether a custom format has a `0` or `#` outside quotes and escapes
fn has_digit_placeholder(format: &str) -> bool {
    let mut quote = None;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\\') => {
                chars.next();
            }
            (None, '\'' | '"') => quote = Some(c),
            (None, '0' | '#') => return true,
            _ => {}
        }
    }
    false
}

/// Read `0}` or `0:<value-format>}` after an opening brace
fn read_braced_value<'a>(text: &'a str, pos: &mut usize) -> Option<Option<&'a str>> {
    let mut next = *pos;
    if read_str(text, &mut next, "0}") {
        *pos = next;
        return Some(None);
    }
    if !read_str(text, &mut next, "0:") {
        return None;
    }
    let rest = text.get(next..)?;
    let len = rest.find('}')?;
    *pos = next + len + 1;
    Some(Some(&rest[..len]).filter(|f| !f.is_empty()))
}

/// Validate the value format and read the optional symbol after it
fn finish(
    registry: &UnitRegistry,
    kind: QuantityKind,
    text: &str,
    mut pos: usize,
    pre_padding: String,
    value_format: Option<&str>,
    malformed: &dyn Fn(String) -> GaugeError,
) -> Result<QuantityFormat, GaugeError> {
    if let Some(format) = value_format {
        if !can_format_f64(format) {
            return Err(malformed(format!("'{}' is not a valid value format", format)));
        }
    }

    let padding = read_whitespace(text, &mut pos).to_string();
    let si = registry
        .si_unit(kind)
        .ok_or_else(|| malformed(format!("no units are registered for {}", kind)))?;

    if pos == text.len() {
        return Ok(QuantityFormat {
            pre_padding,
            value_format: value_format.map(str::to_string),
            padding: DEFAULT_PADDING.to_string(),
            symbol_format: None,
            post_padding: padding,
            unit: Some(si),
            error: None,
        });
    }

    let symbol_start = pos;
    let unit = registry
        .read_symbol(text, &mut pos, kind)
        .ok_or_else(|| malformed(format!("unknown {} symbol at position {}", kind, symbol_start)))?;
    let symbol_end = pos;
    let post_padding = read_whitespace(text, &mut pos).to_string();
    if pos != text.len() {
        return Err(malformed(format!("unexpected text at position {}", pos)));
    }

    Ok(QuantityFormat {
        pre_padding,
        value_format: value_format.map(str::to_string),
        padding,
        symbol_format: Some(text[symbol_start..symbol_end].to_string()),
        post_padding,
        unit: Some(unit),
        error: None,
    })
}

/// Parse a format that must name `unit`, if it names a unit at all.
///
/// Fails with [`GaugeError::UnitMismatch`] when the format's symbol is
/// another unit of the same kind.
pub fn parse_format_for_unit(registry: &UnitRegistry, unit: Unit, format: Option<&str>) -> Result<QuantityFormat, GaugeError> {
    let text = format.unwrap_or("");
    if text.is_empty() {
        return Ok(QuantityFormat::default_for(unit));
    }

    let parsed = parse_format(registry, unit.kind, Some(text))?;
    match parsed.unit {
        Some(found) if parsed.symbol_format.is_some() && found != unit => Err(GaugeError::UnitMismatch {
            expected: unit.symbol.to_string(),
            found: found.symbol.to_string(),
            format: text.to_string(),
        }),
        _ => Ok(QuantityFormat {
            unit: Some(unit),
            ..parsed
        }),
    }
}

/// Check a value format, returning the classified error
pub fn verify_value_format(format: &str) -> Result<(), GaugeError> {
    format_f64(PROBE_VALUE, Some(format), Culture::invariant()).map(|_| ())
}

/// Check a quantity format for `kind`, returning the classified error
pub fn verify_quantity_format(registry: &UnitRegistry, kind: QuantityKind, format: &str) -> Result<(), GaugeError> {
    parse_format(registry, kind, Some(format)).map(|_| ())
}

/// Check whether `format` can format a double
pub fn can_parse_value_format(format: &str) -> bool {
    can_format_f64(format)
}
