//! Settings read from the environment

use std::env;
use gauge_core::{Culture, NumberStyles};
use gauge_units::UnitInput;

/// Host configuration, overridable per request
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub culture: &'static Culture,
    pub unit_input: UnitInput,
    pub allow_thousands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            culture: Culture::invariant(),
            unit_input: UnitInput::default(),
            allow_thousands: false,
        }
    }
}

impl Config {
    /// Read `GAUGE_CULTURE`, `GAUGE_UNIT_INPUT` and `GAUGE_ALLOW_THOUSANDS`
    pub fn from_env() -> Self {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unusable values keep their default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(name) = lookup("GAUGE_CULTURE") {
            match Culture::get(&name) {
                Some(culture) => config.culture = culture,
                None => tracing::warn!(culture = %name, "unknown culture, using invariant"),
            }
        }

        if let Some(input) = lookup("GAUGE_UNIT_INPUT") {
            match input.parse::<UnitInput>() {
                Ok(input) => config.unit_input = input,
                Err(err) => tracing::warn!(%err, "using {}", config.unit_input),
            }
        }

        if let Some(flag) = lookup("GAUGE_ALLOW_THOUSANDS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => config.allow_thousands = true,
                "false" | "0" | "no" => config.allow_thousands = false,
                _ => tracing::warn!(value = %flag, "GAUGE_ALLOW_THOUSANDS is not a boolean, using false"),
            }
        }

        config
    }

    /// Number styles for quantities parsed with an explicit kind
    pub fn styles(&self) -> NumberStyles {
        if self.allow_thousands {
            NumberStyles::FLOAT | NumberStyles::ALLOW_THOUSANDS
        } else {
            NumberStyles::FLOAT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.culture.name, "");
        assert_eq!(config.unit_input, UnitInput::SymbolAllowed);
        assert!(!config.allow_thousands);
        assert_eq!(config.styles(), NumberStyles::FLOAT);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = config(&[
            ("GAUGE_CULTURE", "sv-se"),
            ("GAUGE_UNIT_INPUT", "SymbolRequired"),
            ("GAUGE_ALLOW_THOUSANDS", "true"),
        ]);
        assert_eq!(config.culture.name, "sv-SE");
        assert_eq!(config.unit_input, UnitInput::SymbolRequired);
        assert!(config.styles().contains(NumberStyles::ALLOW_THOUSANDS));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("GAUGE_CULTURE", "xx-XX"),
            ("GAUGE_UNIT_INPUT", "sometimes"),
            ("GAUGE_ALLOW_THOUSANDS", "maybe"),
        ]);
        assert_eq!(config.culture, Culture::invariant());
        assert_eq!(config.unit_input, UnitInput::SymbolAllowed);
        assert!(!config.allow_thousands);
    }
}
