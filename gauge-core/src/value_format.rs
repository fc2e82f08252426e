//! Formatting doubles with numeric format strings
//!
//! Supports the standard specifiers `F`, `N`, `E`, `G`, `R` and `P` with an
//! optional precision, and custom formats built from `0`, `#`, `.`, `,`, `%`,
//! `‰`, exponents, escapes, quoted literals and `;` sections.
//!
//! Whether a format is usable is decided by formatting a probe value, see
//! [`can_format_f64`].

use crate::{Culture, GaugeError};

/// Value formatted when probing a format for validity
pub const PROBE_VALUE: f64 = 1.2;

const MAX_PRECISION: usize = 99;
const DEFAULT_EXPONENT_PRECISION: usize = 6;
/// Shortest round-trip output switches to scientific notation at 1E+15
const ROUND_TRIP_THRESHOLD: i32 = 15;

/// Format `value` with `format` using `culture`'s symbols.
///
/// `None` or an empty format gives the shortest round-trip representation.
pub fn format_f64(value: f64, format: Option<&str>, culture: &Culture) -> Result<String, GaugeError> {
    let text = format.unwrap_or("");
    let parsed = NumberFormat::parse(text)
        .map_err(|reason| GaugeError::malformed_format(text, "f64", reason))?;

    if !value.is_finite() {
        return Ok(special_value(value, culture));
    }

    Ok(match parsed {
        NumberFormat::Standard { kind, upper, precision } => {
            format_standard(value, kind, upper, precision, culture)
        }
        NumberFormat::Custom(sections) => format_custom(value, &sections, culture),
    })
}

/// Check whether `format` can format a double, by formatting [`PROBE_VALUE`]
pub fn can_format_f64(format: &str) -> bool {
    format_f64(PROBE_VALUE, Some(format), Culture::invariant()).is_ok()
}

/// Read a value-format token at `pos`.
///
/// A token is either a standard specifier (letter plus digits) or a run of
/// custom format characters. Reading stops at whitespace and at anything that
/// cannot belong to a numeric format, so `"F2kg"` yields `"F2"`. The token is
/// not validated; see [`can_format_f64`].
pub fn read_value_format<'a>(text: &'a str, pos: &mut usize) -> Option<&'a str> {
    let rest = text.get(*pos..)?;
    let len = standard_len(rest).or_else(|| custom_len(rest))?;
    *pos += len;
    Some(&rest[..len])
}

fn standard_len(rest: &str) -> Option<usize> {
    let first = rest.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let digits = rest[1..].bytes().take_while(u8::is_ascii_digit).count();
    // A bare letter followed by more letters is a word, not a specifier
    if digits == 0 && rest[1..].starts_with(char::is_alphabetic) {
        return None;
    }
    Some(1 + digits)
}

fn custom_len(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().peekable();
    let mut end = 0;
    while let Some((i, c)) = chars.next() {
        match c {
            '0' | '#' | '.' | ',' | '%' | '‰' | ';' => end = i + c.len_utf8(),
            '\\' => match chars.next() {
                Some((j, escaped)) => end = j + escaped.len_utf8(),
                None => end = i + 1,
            },
            '\'' | '"' => {
                end = rest.len();
                for (j, q) in chars.by_ref() {
                    if q == c {
                        end = j + 1;
                        break;
                    }
                }
            }
            'E' | 'e' if end > 0 && exponent_follows(&rest[i + 1..]) => {
                end = i + 1;
                if let Some(&(_, '+' | '-')) = chars.peek() {
                    chars.next();
                    end += 1;
                }
            }
            _ => break,
        }
    }
    (end > 0).then_some(end)
}

fn exponent_follows(rest: &str) -> bool {
    let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    rest.starts_with('0')
}

// ========== Format Parsing ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standard {
    Fixed,
    Number,
    Exponential,
    General,
    RoundTrip,
    Percent,
}

#[derive(Debug)]
enum NumberFormat {
    Standard {
        kind: Standard,
        upper: bool,
        precision: Option<usize>,
    },
    Custom(Vec<Section>),
}

impl NumberFormat {
    fn parse(format: &str) -> Result<Self, String> {
        let Some(first) = format.chars().next() else {
            return Ok(NumberFormat::Standard {
                kind: Standard::General,
                upper: true,
                precision: None,
            });
        };

        let rest = &format[first.len_utf8()..];
        if !first.is_ascii_alphabetic() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return parse_sections(format).map(NumberFormat::Custom);
        }

        if rest.len() > 2 {
            return Err(format!("precision '{}' is larger than {}", rest, MAX_PRECISION));
        }
        let precision = if rest.is_empty() { None } else { rest.parse().ok() };
        let kind = match first.to_ascii_uppercase() {
            'F' => Standard::Fixed,
            'N' => Standard::Number,
            'E' => Standard::Exponential,
            'G' => Standard::General,
            'R' => Standard::RoundTrip,
            'P' => Standard::Percent,
            other => return Err(format!("'{}' is not a standard format specifier for f64", other)),
        };
        Ok(NumberFormat::Standard {
            kind,
            upper: first.is_ascii_uppercase(),
            precision,
        })
    }
}

fn special_value(value: f64, culture: &Culture) -> String {
    if value.is_nan() {
        culture.nan_symbol.clone()
    } else if value > 0.0 {
        culture.positive_infinity_symbol.clone()
    } else {
        culture.negative_infinity_symbol.clone()
    }
}

// ========== Standard Formats ==========

fn format_standard(value: f64, kind: Standard, upper: bool, precision: Option<usize>, culture: &Culture) -> String {
    let abs = value.abs();
    let body = match kind {
        Standard::Fixed => fixed(abs, precision.unwrap_or(culture.decimal_digits), false, culture),
        Standard::Number => fixed(abs, precision.unwrap_or(culture.decimal_digits), true, culture),
        Standard::Percent => {
            if !(abs * 100.0).is_finite() {
                return special_value(value * 100.0, culture);
            }
            let number = fixed(abs * 100.0, precision.unwrap_or(culture.decimal_digits), true, culture);
            if culture.percent_spacing {
                format!("{} {}", number, culture.percent_symbol)
            } else {
                format!("{}{}", number, culture.percent_symbol)
            }
        }
        Standard::Exponential => {
            exponential(abs, precision.unwrap_or(DEFAULT_EXPONENT_PRECISION), upper, culture)
        }
        Standard::General => match precision {
            Some(p) if p > 0 => {
                let (digits, exponent) = decimal_digits(abs, Some(p));
                general(&digits, exponent, p as i32, upper, culture)
            }
            _ => {
                let (digits, exponent) = decimal_digits(abs, None);
                general(&digits, exponent, ROUND_TRIP_THRESHOLD, upper, culture)
            }
        },
        Standard::RoundTrip => {
            let (digits, exponent) = decimal_digits(abs, None);
            general(&digits, exponent, ROUND_TRIP_THRESHOLD, upper, culture)
        }
    };

    if value.is_sign_negative() {
        format!("{}{}", culture.negative_sign, body)
    } else {
        body
    }
}

/// Significant digits and decimal exponent of `abs`.
///
/// With `significant` the digits are rounded to that many places, otherwise
/// they are the shortest digits that round-trip.
fn decimal_digits(abs: f64, significant: Option<usize>) -> (String, i32) {
    let repr = match significant {
        Some(n) => format!("{:.*e}", n.saturating_sub(1), abs),
        None => format!("{:e}", abs),
    };
    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
    let digits = mantissa.chars().filter(char::is_ascii_digit).collect();
    (digits, exponent.parse().unwrap_or(0))
}

fn general(digits: &str, exponent: i32, threshold: i32, upper: bool, culture: &Culture) -> String {
    let digits = digits.trim_end_matches('0');
    if digits.is_empty() {
        return "0".to_string();
    }

    if exponent >= threshold || exponent <= -5 {
        let mut out = digits[..1].to_string();
        if digits.len() > 1 {
            out.push_str(&culture.decimal_separator);
            out.push_str(&digits[1..]);
        }
        out.push(if upper { 'E' } else { 'e' });
        out.push_str(if exponent < 0 { &culture.negative_sign } else { &culture.positive_sign });
        out.push_str(&format!("{:02}", exponent.abs()));
        return out;
    }

    let separator = &culture.decimal_separator;
    if exponent < 0 {
        return format!("0{}{}{}", separator, "0".repeat((-exponent - 1) as usize), digits);
    }
    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{}{}", digits, "0".repeat(int_len - digits.len()))
    } else {
        format!("{}{}{}", &digits[..int_len], separator, &digits[int_len..])
    }
}

fn fixed(abs: f64, decimals: usize, grouped: bool, culture: &Culture) -> String {
    let repr = format!("{:.*}", decimals, abs);
    let (int, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut out = if grouped { group_digits(int, culture) } else { int.to_string() };
    if !frac.is_empty() {
        out.push_str(&culture.decimal_separator);
        out.push_str(frac);
    }
    out
}

fn exponential(abs: f64, precision: usize, upper: bool, culture: &Culture) -> String {
    let repr = format!("{:.*e}", precision, abs);
    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mantissa = mantissa.replacen('.', &culture.decimal_separator, 1);
    let sign = if exponent < 0 { &culture.negative_sign } else { &culture.positive_sign };
    let marker = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:03}", mantissa, marker, sign, exponent.abs())
}

fn group_digits(int: &str, culture: &Culture) -> String {
    let size = culture.group_size.max(1);
    let len = int.len();
    let mut out = String::with_capacity(len + len / size * culture.group_separator.len());
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push_str(&culture.group_separator);
        }
        out.push(c);
    }
    out
}

// ========== Custom Formats ==========

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Zero,
    Hash,
    Point,
    Comma,
    Percent,
    PerMille,
    Exponent {
        upper: bool,
        always_sign: bool,
        min_digits: usize,
    },
    Literal(String),
}

impl Token {
    fn is_placeholder(&self) -> bool {
        matches!(self, Token::Zero | Token::Hash)
    }
}

/// One `;`-separated section of a custom format
#[derive(Debug)]
struct Section {
    tokens: Vec<Token>,
    /// Tokens before this index belong to the integer part
    int_end: usize,
    /// Fraction placeholders live in this token range
    frac_range: std::ops::Range<usize>,
    int_placeholders: usize,
    min_int: usize,
    frac_min: usize,
    frac_max: usize,
    grouping: bool,
    /// Power of ten applied before rendering (`%`, `‰`, scaling commas)
    scale: i32,
    exponent: bool,
}

fn parse_sections(format: &str) -> Result<Vec<Section>, String> {
    let mut sections = Vec::new();
    let mut tokens = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ';' => sections.push(Section::new(std::mem::take(&mut tokens))),
            '0' => tokens.push(Token::Zero),
            '#' => tokens.push(Token::Hash),
            '.' => tokens.push(Token::Point),
            ',' => tokens.push(Token::Comma),
            '%' => tokens.push(Token::Percent),
            '‰' => tokens.push(Token::PerMille),
            '\\' => match chars.next() {
                Some(escaped) => tokens.push(Token::Literal(escaped.to_string())),
                None => return Err("format ends with an escape character".to_string()),
            },
            '\'' | '"' => {
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some(other) => literal.push(other),
                        None => return Err(format!("missing closing {} quote", c)),
                    }
                }
                tokens.push(Token::Literal(literal));
            }
            'E' | 'e' => {
                let mut ahead = chars.clone();
                let mut always_sign = false;
                match ahead.peek() {
                    Some('+') => {
                        always_sign = true;
                        ahead.next();
                    }
                    Some('-') => {
                        ahead.next();
                    }
                    _ => {}
                }
                let mut min_digits = 0;
                while ahead.next_if_eq(&'0').is_some() {
                    min_digits += 1;
                }
                if min_digits > 0 {
                    chars = ahead;
                    tokens.push(Token::Exponent { upper: c == 'E', always_sign, min_digits });
                } else {
                    tokens.push(Token::Literal(c.to_string()));
                }
            }
            other => tokens.push(Token::Literal(other.to_string())),
        }
    }

    sections.push(Section::new(tokens));
    sections.truncate(3);
    Ok(sections)
}

impl Section {
    fn new(tokens: Vec<Token>) -> Self {
        let point = tokens.iter().position(|t| *t == Token::Point);
        let exponent_at = tokens.iter().position(|t| matches!(t, Token::Exponent { .. }));
        let int_end = [point, exponent_at].into_iter().flatten().min().unwrap_or(tokens.len());
        let frac_range = match point {
            Some(p) if p == int_end => (p + 1)..exponent_at.unwrap_or(tokens.len()).max(p + 1),
            _ => 0..0,
        };

        let int_tokens = &tokens[..int_end];
        let int_placeholders = int_tokens.iter().filter(|t| t.is_placeholder()).count();
        let min_int = int_tokens
            .iter()
            .filter(|t| t.is_placeholder())
            .position(|t| *t == Token::Zero)
            .map_or(0, |first_zero| int_placeholders - first_zero);

        let frac_placeholders: Vec<&Token> = tokens[frac_range.clone()]
            .iter()
            .filter(|t| t.is_placeholder())
            .collect();
        let frac_max = frac_placeholders.len();
        let frac_min = frac_placeholders
            .iter()
            .rposition(|t| **t == Token::Zero)
            .map_or(0, |last_zero| last_zero + 1);

        // A comma between two integer placeholders turns on grouping
        let grouping = int_tokens.iter().enumerate().any(|(i, t)| {
            *t == Token::Comma
                && int_tokens[..i].iter().any(Token::is_placeholder)
                && int_tokens[i + 1..].iter().any(Token::is_placeholder)
        });

        // Commas right after the last integer placeholder divide by 1000
        let scaling_commas = int_tokens
            .iter()
            .rposition(Token::is_placeholder)
            .map_or(0, |last| {
                int_tokens[last + 1..].iter().take_while(|t| **t == Token::Comma).count()
            });

        let percents = tokens.iter().filter(|t| **t == Token::Percent).count();
        let per_milles = tokens.iter().filter(|t| **t == Token::PerMille).count();
        let scale = 2 * percents as i32 + 3 * per_milles as i32 - 3 * scaling_commas as i32;

        Section {
            int_end,
            frac_range,
            int_placeholders,
            min_int,
            frac_min,
            frac_max,
            grouping,
            scale,
            exponent: exponent_at.is_some(),
            tokens,
        }
    }

    fn scaled(&self, abs: f64) -> f64 {
        if self.scale == 0 { abs } else { abs * 10f64.powi(self.scale) }
    }

    fn render(&self, abs: f64, with_sign: bool, culture: &Culture) -> String {
        let scaled = self.scaled(abs);

        let (int, frac, exponent) = if self.exponent {
            let width = self.int_placeholders.max(1);
            let (digits, e10) = decimal_digits(scaled, Some(width + self.frac_max));
            let exponent = if scaled == 0.0 { 0 } else { e10 - (width as i32 - 1) };
            let (int, frac) = digits.split_at(width.min(digits.len()));
            (int.to_string(), frac.to_string(), exponent)
        } else {
            let repr = format!("{:.*}", self.frac_max, scaled);
            let (int, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
            (int.to_string(), frac.to_string(), 0)
        };

        let mut int = int.trim_start_matches('0').to_string();
        while int.len() < self.min_int {
            int.insert(0, '0');
        }
        let mut frac = frac;
        while frac.len() > self.frac_min && frac.ends_with('0') {
            frac.pop();
        }
        let is_zero = int.chars().chain(frac.chars()).all(|c| c == '0');

        let mut out = String::new();
        if with_sign && !is_zero {
            out.push_str(&culture.negative_sign);
        }

        let int_digits: Vec<char> = int.chars().collect();
        let frac_digits: Vec<char> = frac.chars().collect();
        let len = int_digits.len() as isize;
        let offset = len - self.int_placeholders as isize;
        let group_size = culture.group_size.max(1) as isize;
        let push_int_digit = |out: &mut String, k: isize| {
            out.push(int_digits[k as usize]);
            let remaining = len - 1 - k;
            if self.grouping && remaining > 0 && remaining % group_size == 0 {
                out.push_str(&culture.group_separator);
            }
        };

        let mut int_seen = 0isize;
        let mut frac_seen = 0;
        let mut point_done = false;
        let mut exponent_done = false;
        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Zero | Token::Hash if index < self.int_end => {
                    // The first placeholder takes every surplus leading digit
                    let to = offset + int_seen;
                    let from = if int_seen == 0 { 0 } else { to };
                    for k in from.max(0)..=to {
                        push_int_digit(&mut out, k);
                    }
                    int_seen += 1;
                }
                Token::Zero | Token::Hash => {
                    if self.frac_range.contains(&index) {
                        if let Some(c) = frac_digits.get(frac_seen) {
                            out.push(*c);
                        }
                        frac_seen += 1;
                    }
                }
                Token::Point => {
                    if !point_done {
                        point_done = true;
                        if self.int_placeholders == 0 {
                            for k in 0..len {
                                push_int_digit(&mut out, k);
                            }
                        }
                        if !frac_digits.is_empty() {
                            out.push_str(&culture.decimal_separator);
                        }
                    }
                }
                Token::Comma => {}
                Token::Percent => out.push_str(&culture.percent_symbol),
                Token::PerMille => out.push('‰'),
                Token::Exponent { upper, always_sign, min_digits } => {
                    if !exponent_done {
                        exponent_done = true;
                        out.push(if *upper { 'E' } else { 'e' });
                        if exponent < 0 {
                            out.push_str(&culture.negative_sign);
                        } else if *always_sign {
                            out.push_str(&culture.positive_sign);
                        }
                        out.push_str(&format!("{:0width$}", exponent.abs(), width = *min_digits));
                    }
                }
                Token::Literal(text) => out.push_str(text),
            }
        }
        out
    }
}

fn format_custom(value: f64, sections: &[Section], culture: &Culture) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let (section, with_sign) = pick_section(value, sections);

    // Percent and per mille scaling can push a finite value past f64::MAX
    if !section.scaled(abs).is_finite() {
        let overflow = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
        return special_value(overflow, culture);
    }
    section.render(abs, with_sign, culture)
}

/// The section that renders `value` and whether it must add the sign itself
fn pick_section(value: f64, sections: &[Section]) -> (&Section, bool) {
    let negative = value < 0.0;
    let non_empty = |index: usize| sections.get(index).filter(|s| !s.tokens.is_empty());

    if sections.len() == 1 {
        return (&sections[0], negative);
    }
    if value == 0.0 {
        return (non_empty(2).unwrap_or(&sections[0]), false);
    }
    if negative {
        return match non_empty(1) {
            Some(section) => (section, false),
            None => (&sections[0], true),
        };
    }
    (&sections[0], false)
}
