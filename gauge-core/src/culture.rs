//! Culture-specific numeric conventions
//!
//! A [`Culture`] decides how numbers are written: decimal and group
//! separators, sign strings, special value symbols and the percent pattern.
//! Unit symbols are never culture sensitive.

use std::collections::HashMap;
use std::sync::LazyLock;
use serde::{Serialize, Deserialize};

const MINUS_SIGN: &str = "\u{2212}";
const NO_BREAK_SPACE: &str = "\u{00A0}";
const NARROW_NO_BREAK_SPACE: &str = "\u{202F}";

/// Built-in cultures keyed by lowercase name
static CULTURES: LazyLock<HashMap<String, Culture>> = LazyLock::new(|| {
    let mut cultures = HashMap::new();
    for culture in builtin_cultures() {
        cultures.insert(culture.name.to_lowercase(), culture);
    }
    cultures
});

static INVARIANT: LazyLock<Culture> = LazyLock::new(|| Culture::new(""));

/// Numeric formatting conventions for a locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Culture {
    /// BCP-47 name, empty for the invariant culture
    pub name: String,
    pub decimal_separator: String,
    pub group_separator: String,
    /// Number of digits per group
    pub group_size: usize,
    pub negative_sign: String,
    pub positive_sign: String,
    pub nan_symbol: String,
    pub positive_infinity_symbol: String,
    pub negative_infinity_symbol: String,
    pub percent_symbol: String,
    /// `true` renders `12.5 %`, `false` renders `12.5%`
    pub percent_spacing: bool,
    /// Default precision for `F`, `N` and `P`
    pub decimal_digits: usize,
}

impl Culture {
    /// Create a culture with invariant conventions and the given name
    pub fn new(name: &str) -> Self {
        Culture {
            name: name.to_string(),
            decimal_separator: ".".to_string(),
            group_separator: ",".to_string(),
            group_size: 3,
            negative_sign: "-".to_string(),
            positive_sign: "+".to_string(),
            nan_symbol: "NaN".to_string(),
            positive_infinity_symbol: "Infinity".to_string(),
            negative_infinity_symbol: "-Infinity".to_string(),
            percent_symbol: "%".to_string(),
            percent_spacing: true,
            decimal_digits: 2,
        }
    }

    /// The invariant culture
    pub fn invariant() -> &'static Culture {
        &INVARIANT
    }

    /// Look up a built-in culture by name (case-insensitive).
    ///
    /// `""` and `"invariant"` both return the invariant culture.
    pub fn get(name: &str) -> Option<&'static Culture> {
        let key = name.trim().to_lowercase();
        if key.is_empty() || key == "invariant" {
            return Some(Culture::invariant());
        }
        CULTURES.get(&key)
    }

    /// Names of all built-in cultures
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&str> = CULTURES.values().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Builder: set decimal separator
    pub fn with_decimal_separator(mut self, separator: &str) -> Self {
        self.decimal_separator = separator.to_string();
        self
    }

    /// Builder: set group separator
    pub fn with_group_separator(mut self, separator: &str) -> Self {
        self.group_separator = separator.to_string();
        self
    }

    /// Builder: set negative sign, also used for negative infinity
    pub fn with_negative_sign(mut self, sign: &str) -> Self {
        self.negative_infinity_symbol = format!("{}{}", sign, self.positive_infinity_symbol);
        self.negative_sign = sign.to_string();
        self
    }

    /// Builder: set infinity symbols
    pub fn with_infinity_symbol(mut self, symbol: &str) -> Self {
        self.positive_infinity_symbol = symbol.to_string();
        self.negative_infinity_symbol = format!("{}{}", self.negative_sign, symbol);
        self
    }

    /// Builder: set the spacing between a percentage and its symbol
    pub fn with_percent_spacing(mut self, spacing: bool) -> Self {
        self.percent_spacing = spacing;
        self
    }

    /// Negative sign strings accepted when reading, longest first
    pub fn negative_signs(&self) -> Vec<&str> {
        if self.negative_sign == MINUS_SIGN {
            vec![self.negative_sign.as_str(), "-"]
        } else {
            vec![self.negative_sign.as_str()]
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Culture::invariant().clone()
    }
}

fn builtin_cultures() -> Vec<Culture> {
    vec![
        Culture::new("en-US")
            .with_percent_spacing(false),
        Culture::new("en-GB")
            .with_percent_spacing(false),
        Culture::new("sv-SE")
            .with_decimal_separator(",")
            .with_group_separator(NO_BREAK_SPACE)
            .with_negative_sign(MINUS_SIGN)
            .with_infinity_symbol("∞"),
        Culture::new("nb-NO")
            .with_decimal_separator(",")
            .with_group_separator(NO_BREAK_SPACE)
            .with_negative_sign(MINUS_SIGN)
            .with_infinity_symbol("∞"),
        Culture::new("de-DE")
            .with_decimal_separator(",")
            .with_group_separator(".")
            .with_infinity_symbol("∞"),
        Culture::new("fr-FR")
            .with_decimal_separator(",")
            .with_group_separator(NARROW_NO_BREAK_SPACE)
            .with_infinity_symbol("∞"),
    ]
}
