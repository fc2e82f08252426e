//! Unit registry and the built-in unit tables

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use crate::cache::FormatCache;
use crate::unit::normalize_parts;
use crate::{QuantityFormat, QuantityKind, Unit, UnitPart};

/// Global unit registry
pub static UNITS: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::with_builtin_units);

macro_rules! parts {
    ($($symbol:literal ^ $power:literal),+ $(,)?) => {
        &[$(UnitPart { symbol: $symbol, power: $power }),+]
    };
}

/// Registry of units per quantity kind.
///
/// Each registry owns the [`FormatCache`] used when formatting with it.
#[derive(Debug)]
pub struct UnitRegistry {
    units: HashMap<QuantityKind, Vec<Unit>>,
    si_units: HashMap<QuantityKind, Unit>,
    /// Symbols and aliases per kind, longest first
    symbols: HashMap<QuantityKind, Vec<(String, Unit)>>,
    /// Normalized parts of every unit per kind
    composed: HashMap<QuantityKind, Vec<(Vec<UnitPart>, Unit)>>,
    /// Every base symbol used in a unit's parts, longest first
    part_symbols: Vec<&'static str>,
    cache: FormatCache,
}

/// Collects units and aliases for a [`UnitRegistry`]
#[derive(Debug, Default)]
pub struct UnitRegistryBuilder {
    units: Vec<Unit>,
    si_units: Vec<Unit>,
    aliases: Vec<(String, String)>,
}

impl UnitRegistryBuilder {
    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    /// Register `unit` as the SI unit of its kind
    pub fn si_unit(mut self, unit: Unit) -> Self {
        self.si_units.push(unit);
        self.unit(unit)
    }

    /// Accept `alias` wherever `symbol` is accepted, e.g. `um` for `µm`
    pub fn alias(mut self, alias: &str, symbol: &str) -> Self {
        self.aliases.push((alias.to_string(), symbol.to_string()));
        self
    }

    /// Add every built-in unit and alias
    pub fn with_builtin_units(self) -> Self {
        let builder = length_units(self);
        let builder = mass_units(builder);
        let builder = time_units(builder);
        let builder = mass_flow_units(builder);
        let builder = angle_units(builder);
        let builder = pressure_units(builder);
        let builder = torque_units(builder);
        let builder = stiffness_units(builder);
        let builder = luminous_flux_units(builder);
        let builder = amount_units(builder);
        let builder = frequency_units(builder);
        let builder = data_units(builder);
        let builder = specific_energy_units(builder);
        let builder = speed_units(builder);
        let builder = force_units(builder);
        let builder = energy_units(builder);
        let builder = temperature_units(builder);
        volume_units(builder)
    }

    pub fn build(self) -> UnitRegistry {
        let mut registry = UnitRegistry {
            units: HashMap::new(),
            si_units: HashMap::new(),
            symbols: HashMap::new(),
            composed: HashMap::new(),
            part_symbols: Vec::new(),
            cache: FormatCache::new(),
        };

        for unit in self.units {
            let units = registry.units.entry(unit.kind).or_default();
            if !units.contains(&unit) {
                units.push(unit);
            }
        }
        for unit in self.si_units {
            registry.si_units.insert(unit.kind, unit);
        }

        for (kind, units) in &registry.units {
            let fallback = units.iter().find(|u| u.is_si()).or_else(|| units.first());
            if let Some(si) = fallback {
                registry.si_units.entry(*kind).or_insert(*si);
            }

            let mut symbols: Vec<(String, Unit)> = units.iter().map(|u| (u.symbol.to_string(), *u)).collect();
            for (alias, symbol) in &self.aliases {
                if let Some(unit) = units.iter().find(|u| u.symbol == symbol.as_str()) {
                    symbols.push((alias.clone(), *unit));
                }
            }
            symbols.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
            registry.symbols.insert(*kind, symbols);

            let composed = units.iter().map(|u| (normalize_parts(u.parts()), *u)).collect();
            registry.composed.insert(*kind, composed);

            for unit in units {
                for part in unit.parts() {
                    if !registry.part_symbols.contains(&part.symbol) {
                        registry.part_symbols.push(part.symbol);
                    }
                }
            }
        }
        registry.part_symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        tracing::debug!(
            kinds = registry.units.len(),
            units = registry.units.values().map(Vec::len).sum::<usize>(),
            "unit registry built"
        );
        registry
    }
}

impl UnitRegistry {
    pub fn builder() -> UnitRegistryBuilder {
        UnitRegistryBuilder::default()
    }

    /// A registry holding the built-in units
    pub fn with_builtin_units() -> Self {
        UnitRegistry::builder().with_builtin_units().build()
    }

    /// Get a unit of `kind` by symbol or alias
    pub fn get(&self, kind: QuantityKind, symbol: &str) -> Option<Unit> {
        self.symbols
            .get(&kind)?
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, unit)| *unit)
    }

    pub fn si_unit(&self, kind: QuantityKind) -> Option<Unit> {
        self.si_units.get(&kind).copied()
    }

    /// Units of `kind` in registration order
    pub fn units(&self, kind: QuantityKind) -> &[Unit] {
        self.units.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kinds that have at least one unit
    pub fn kinds(&self) -> Vec<QuantityKind> {
        QuantityKind::ALL.into_iter().filter(|k| self.units.contains_key(k)).collect()
    }

    /// Look up a registered kind by name, ignoring ASCII case
    pub fn kind_by_name(&self, name: &str) -> Option<QuantityKind> {
        QuantityKind::from_name(name).filter(|k| self.units.contains_key(k))
    }

    /// The format cache owned by this registry
    pub fn cache(&self) -> &FormatCache {
        &self.cache
    }

    /// Cached format for `kind`, see [`FormatCache::get_or_create`]
    pub fn format(&self, kind: QuantityKind, format: Option<&str>) -> Arc<QuantityFormat> {
        self.cache.get_or_create(self, kind, format)
    }

    pub(crate) fn symbol_table(&self, kind: QuantityKind) -> &[(String, Unit)] {
        self.symbols.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn part_symbols(&self) -> &[&'static str] {
        &self.part_symbols
    }

    /// The unit of `kind` whose normalized parts equal `parts`
    pub(crate) fn unit_with_parts(&self, kind: QuantityKind, parts: &[UnitPart]) -> Option<Unit> {
        self.composed
            .get(&kind)?
            .iter()
            .find(|(p, _)| p.as_slice() == parts)
            .map(|(_, unit)| *unit)
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        UnitRegistry::with_builtin_units()
    }
}

// ========== Built-in Units ==========

use QuantityKind::*;

fn length_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("m", "metres", Length, 1.0))
        .unit(Unit::new("nm", "nanometres", Length, 1e-9))
        .unit(Unit::new("µm", "micrometres", Length, 1e-6))
        .unit(Unit::new("mm", "millimetres", Length, 0.001))
        .unit(Unit::new("cm", "centimetres", Length, 0.01))
        .unit(Unit::new("dm", "decimetres", Length, 0.1))
        .unit(Unit::new("km", "kilometres", Length, 1000.0))
        .unit(Unit::new("in", "inches", Length, 0.0254))
        .unit(Unit::new("mi", "miles", Length, 1609.344))
        .unit(Unit::new("yd", "yards", Length, 0.9144))
        .unit(Unit::new("nmi", "nautical miles", Length, 1852.0))
        .alias("um", "µm")
        .alias("μm", "µm")
}

fn mass_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("kg", "kilograms", Mass, 1.0))
        .unit(Unit::new("g", "grams", Mass, 0.001))
        .unit(Unit::new("mg", "milligrams", Mass, 1e-6))
        .unit(Unit::new("µg", "micrograms", Mass, 1e-9))
        .unit(Unit::new("t", "tonnes", Mass, 1000.0))
        .alias("ug", "µg")
        .alias("μg", "µg")
}

fn time_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("s", "seconds", Time, 1.0))
        .unit(Unit::new("ns", "nanoseconds", Time, 1e-9))
        .unit(Unit::new("µs", "microseconds", Time, 1e-6))
        .unit(Unit::new("ms", "milliseconds", Time, 0.001))
        .unit(Unit::new("min", "minutes", Time, 60.0))
        .unit(Unit::new("h", "hours", Time, 3600.0))
        .unit(Unit::new("d", "days", Time, 86400.0))
        .alias("us", "µs")
        .alias("μs", "µs")
}

fn mass_flow_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("kg/s", "kilograms per second", MassFlow, 1.0, parts!["kg" ^ 1, "s" ^ -1]))
        .unit(Unit::derived("g/s", "grams per second", MassFlow, 0.001, parts!["g" ^ 1, "s" ^ -1]))
        .unit(Unit::derived("kg/min", "kilograms per minute", MassFlow, 1.0 / 60.0, parts!["kg" ^ 1, "min" ^ -1]))
        .unit(Unit::derived("kg/h", "kilograms per hour", MassFlow, 1.0 / 3600.0, parts!["kg" ^ 1, "h" ^ -1]))
}

fn angle_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("rad", "radians", Angle, 1.0))
        .unit(Unit::new("°", "degrees", Angle, 0.017453292519943295))
}

fn pressure_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("Pa", "pascals", Pressure, 1.0))
        .unit(Unit::new("nPa", "nanopascals", Pressure, 1e-9))
        .unit(Unit::new("µPa", "micropascals", Pressure, 1e-6))
        .unit(Unit::new("mPa", "millipascals", Pressure, 0.001))
        .unit(Unit::new("kPa", "kilopascals", Pressure, 1000.0))
        .unit(Unit::new("MPa", "megapascals", Pressure, 1e6))
        .unit(Unit::new("GPa", "gigapascals", Pressure, 1e9))
        .unit(Unit::new("bar", "bars", Pressure, 100000.0))
        .unit(Unit::new("mbar", "millibars", Pressure, 100.0))
        .unit(Unit::derived("N/mm²", "newtons per square millimetre", Pressure, 1e6, parts!["N" ^ 1, "mm" ^ -2]))
        .alias("uPa", "µPa")
        .alias("μPa", "µPa")
}

fn torque_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("N⋅m", "newton metres", Torque, 1.0, parts!["N" ^ 1, "m" ^ 1]))
        .unit(Unit::derived("kN⋅m", "kilonewton metres", Torque, 1000.0, parts!["kN" ^ 1, "m" ^ 1]))
}

fn stiffness_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("N/m", "newtons per metre", Stiffness, 1.0, parts!["N" ^ 1, "m" ^ -1]))
        .unit(Unit::derived("N/mm", "newtons per millimetre", Stiffness, 1000.0, parts!["N" ^ 1, "mm" ^ -1]))
        .unit(Unit::derived("kN/m", "kilonewtons per metre", Stiffness, 1000.0, parts!["kN" ^ 1, "m" ^ -1]))
        .unit(Unit::derived("kN/mm", "kilonewtons per millimetre", Stiffness, 1e6, parts!["kN" ^ 1, "mm" ^ -1]))
}

fn luminous_flux_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("lm", "lumens", LuminousFlux, 1.0))
}

fn amount_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("mol", "moles", AmountOfSubstance, 1.0))
        .unit(Unit::new("mmol", "millimoles", AmountOfSubstance, 0.001))
        .unit(Unit::new("kmol", "kilomoles", AmountOfSubstance, 1000.0))
}

fn frequency_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("Hz", "hertz", Frequency, 1.0))
        .unit(Unit::new("kHz", "kilohertz", Frequency, 1000.0))
        .unit(Unit::new("MHz", "megahertz", Frequency, 1e6))
        .unit(Unit::new("GHz", "gigahertz", Frequency, 1e9))
}

fn data_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("b", "bits", Data, 1.0))
        .unit(Unit::new("B", "bytes", Data, 8.0))
        .unit(Unit::new("kB", "kilobytes", Data, 8e3))
        .unit(Unit::new("MB", "megabytes", Data, 8e6))
        .unit(Unit::new("GB", "gigabytes", Data, 8e9))
        .unit(Unit::new("KiB", "kibibytes", Data, 8.0 * 1024.0))
        .unit(Unit::new("MiB", "mebibytes", Data, 8.0 * 1024.0 * 1024.0))
}

fn specific_energy_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("J/kg", "joules per kilogram", SpecificEnergy, 1.0, parts!["J" ^ 1, "kg" ^ -1]))
        .unit(Unit::derived("kJ/kg", "kilojoules per kilogram", SpecificEnergy, 1000.0, parts!["kJ" ^ 1, "kg" ^ -1]))
        .unit(Unit::derived("MJ/kg", "megajoules per kilogram", SpecificEnergy, 1e6, parts!["MJ" ^ 1, "kg" ^ -1]))
}

fn speed_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("m/s", "metres per second", Speed, 1.0, parts!["m" ^ 1, "s" ^ -1]))
        .unit(Unit::derived("mm/s", "millimetres per second", Speed, 0.001, parts!["mm" ^ 1, "s" ^ -1]))
        .unit(Unit::derived("m/min", "metres per minute", Speed, 1.0 / 60.0, parts!["m" ^ 1, "min" ^ -1]))
        .unit(Unit::derived("km/h", "kilometres per hour", Speed, 1.0 / 3.6, parts!["km" ^ 1, "h" ^ -1]))
        .unit(Unit::derived("mi/h", "miles per hour", Speed, 0.44704, parts!["mi" ^ 1, "h" ^ -1]))
        .alias("mph", "mi/h")
}

fn force_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("N", "newtons", Force, 1.0))
        .unit(Unit::new("mN", "millinewtons", Force, 0.001))
        .unit(Unit::new("kN", "kilonewtons", Force, 1000.0))
        .unit(Unit::new("MN", "meganewtons", Force, 1e6))
}

fn energy_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("J", "joules", Energy, 1.0))
        .unit(Unit::new("mJ", "millijoules", Energy, 0.001))
        .unit(Unit::new("kJ", "kilojoules", Energy, 1000.0))
        .unit(Unit::new("MJ", "megajoules", Energy, 1e6))
        .unit(Unit::new("Wh", "watt hours", Energy, 3600.0))
        .unit(Unit::new("kWh", "kilowatt hours", Energy, 3.6e6))
}

fn temperature_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::new("K", "kelvin", Temperature, 1.0))
        .unit(Unit::new("°C", "degrees Celsius", Temperature, 1.0).with_offset(273.15))
        .unit(Unit::new("°F", "degrees Fahrenheit", Temperature, 5.0 / 9.0).with_offset(459.67 * 5.0 / 9.0))
}

fn volume_units(b: UnitRegistryBuilder) -> UnitRegistryBuilder {
    b.si_unit(Unit::derived("m³", "cubic metres", Volume, 1.0, parts!["m" ^ 3]))
        .unit(Unit::derived("dm³", "cubic decimetres", Volume, 0.001, parts!["dm" ^ 3]))
        .unit(Unit::derived("cm³", "cubic centimetres", Volume, 1e-6, parts!["cm" ^ 3]))
        .unit(Unit::derived("mm³", "cubic millimetres", Volume, 1e-9, parts!["mm" ^ 3]))
        .unit(Unit::new("L", "litres", Volume, 0.001))
        .unit(Unit::new("mL", "millilitres", Volume, 1e-6))
        .alias("l", "L")
        .alias("ml", "mL")
}
