//! Unit representation with conversion factors and symbol rendering

use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};
use crate::QuantityKind;

/// One factor of a unit written as a product, e.g. `s⁻¹` in `kg⋅s⁻¹`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UnitPart {
    pub symbol: &'static str,
    pub power: i8,
}

/// How a unit symbol is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymbolFormat {
    /// The registered symbol, e.g. `kg/s`
    #[default]
    Default,
    /// `kg⋅s⁻¹`
    SignedSuperScript,
    /// `kg/s`, `m/s²`
    FractionSuperScript,
    /// `kg*s^-1`
    SignedHatPowers,
    /// `kg/s`, `m/s^2`
    FractionHatPowers,
}

/// A unit of one quantity kind.
///
/// `value_si = value * to_si_factor + to_si_offset`. Two units are equal when
/// they have the same kind and symbol.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Unit {
    pub symbol: &'static str,
    pub name: &'static str,
    pub kind: QuantityKind,
    pub to_si_factor: f64,
    /// Non-zero only for units like degrees Celsius
    pub to_si_offset: f64,
    #[serde(skip)]
    parts: &'static [UnitPart],
}

impl Unit {
    /// Create a unit whose symbol is a single base symbol
    pub const fn new(symbol: &'static str, name: &'static str, kind: QuantityKind, to_si_factor: f64) -> Self {
        Unit {
            symbol,
            name,
            kind,
            to_si_factor,
            to_si_offset: 0.0,
            parts: &[],
        }
    }

    /// Create a unit written as a product of parts, e.g. `kg/s`
    pub const fn derived(
        symbol: &'static str,
        name: &'static str,
        kind: QuantityKind,
        to_si_factor: f64,
        parts: &'static [UnitPart],
    ) -> Self {
        Unit {
            symbol,
            name,
            kind,
            to_si_factor,
            to_si_offset: 0.0,
            parts,
        }
    }

    /// Builder: set the offset for non-proportional units
    pub const fn with_offset(mut self, to_si_offset: f64) -> Self {
        self.to_si_offset = to_si_offset;
        self
    }

    /// Check if this unit converts to SI without scaling
    pub fn is_si(&self) -> bool {
        self.to_si_factor == 1.0 && self.to_si_offset == 0.0
    }

    pub fn to_si(&self, value: f64) -> f64 {
        value * self.to_si_factor + self.to_si_offset
    }

    pub fn from_si(&self, value_si: f64) -> f64 {
        (value_si - self.to_si_offset) / self.to_si_factor
    }

    /// The parts of the symbol, a single part for plain units
    pub fn parts(&self) -> Vec<UnitPart> {
        if self.parts.is_empty() {
            vec![UnitPart { symbol: self.symbol, power: 1 }]
        } else {
            self.parts.to_vec()
        }
    }

    /// Render the symbol in `format`.
    ///
    /// Fraction formats fall back to the signed form when no part has a
    /// positive power.
    pub fn symbol_in(&self, format: SymbolFormat) -> String {
        let parts = self.parts();
        match format {
            SymbolFormat::Default => self.symbol.to_string(),
            SymbolFormat::SignedSuperScript => signed(&parts, "⋅", superscript),
            SymbolFormat::SignedHatPowers => signed(&parts, "*", hat),
            SymbolFormat::FractionSuperScript => fraction(&parts, "⋅", superscript),
            SymbolFormat::FractionHatPowers => fraction(&parts, "*", hat),
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.symbol == other.symbol
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.symbol.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

/// Sort parts by symbol, merge repeated symbols and drop zero powers
pub(crate) fn normalize_parts(parts: impl IntoIterator<Item = UnitPart>) -> Vec<UnitPart> {
    let mut parts: Vec<UnitPart> = parts.into_iter().collect();
    parts.sort_by(|a, b| a.symbol.cmp(b.symbol));
    let mut merged: Vec<UnitPart> = Vec::with_capacity(parts.len());
    for part in parts {
        match merged.last_mut() {
            Some(last) if last.symbol == part.symbol => last.power = last.power.saturating_add(part.power),
            _ => merged.push(part),
        }
    }
    merged.retain(|p| p.power != 0);
    merged
}

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Value of a superscript digit
pub(crate) fn superscript_digit(c: char) -> Option<u32> {
    SUPERSCRIPT_DIGITS.iter().position(|d| *d == c).map(|i| i as u32)
}

fn superscript(power: i8) -> String {
    let mut out = String::new();
    if power < 0 {
        out.push('⁻');
    }
    for digit in power.unsigned_abs().to_string().bytes() {
        out.push(SUPERSCRIPT_DIGITS[(digit - b'0') as usize]);
    }
    out
}

fn hat(power: i8) -> String {
    format!("^{}", power)
}

fn write_part(out: &mut String, part: &UnitPart, power: i8, render: fn(i8) -> String) {
    out.push_str(part.symbol);
    if power != 1 {
        out.push_str(&render(power));
    }
}

fn signed(parts: &[UnitPart], separator: &str, render: fn(i8) -> String) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_part(&mut out, part, part.power, render);
    }
    out
}

fn fraction(parts: &[UnitPart], separator: &str, render: fn(i8) -> String) -> String {
    let (numerator, denominator): (Vec<&UnitPart>, Vec<&UnitPart>) = parts.iter().partition(|p| p.power > 0);
    if numerator.is_empty() {
        return signed(parts, separator, render);
    }

    let mut out = String::new();
    for (i, part) in numerator.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_part(&mut out, part, part.power, render);
    }
    for (i, part) in denominator.iter().enumerate() {
        out.push_str(if i == 0 { "/" } else { separator });
        write_part(&mut out, part, -part.power, render);
    }
    out
}
