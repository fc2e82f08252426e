//! Quantity kinds

use std::fmt;
use serde::{Serialize, Deserialize};

/// The kind of physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuantityKind {
    Length,
    Mass,
    Time,
    MassFlow,
    Angle,
    Pressure,
    Torque,
    Stiffness,
    LuminousFlux,
    AmountOfSubstance,
    Frequency,
    Data,
    SpecificEnergy,
    Speed,
    Force,
    Energy,
    Temperature,
    Volume,
}

impl QuantityKind {
    pub const ALL: [QuantityKind; 18] = [
        QuantityKind::Length,
        QuantityKind::Mass,
        QuantityKind::Time,
        QuantityKind::MassFlow,
        QuantityKind::Angle,
        QuantityKind::Pressure,
        QuantityKind::Torque,
        QuantityKind::Stiffness,
        QuantityKind::LuminousFlux,
        QuantityKind::AmountOfSubstance,
        QuantityKind::Frequency,
        QuantityKind::Data,
        QuantityKind::SpecificEnergy,
        QuantityKind::Speed,
        QuantityKind::Force,
        QuantityKind::Energy,
        QuantityKind::Temperature,
        QuantityKind::Volume,
    ];

    /// Kind name, e.g. `"Length"`
    pub fn name(self) -> &'static str {
        match self {
            QuantityKind::Length => "Length",
            QuantityKind::Mass => "Mass",
            QuantityKind::Time => "Time",
            QuantityKind::MassFlow => "MassFlow",
            QuantityKind::Angle => "Angle",
            QuantityKind::Pressure => "Pressure",
            QuantityKind::Torque => "Torque",
            QuantityKind::Stiffness => "Stiffness",
            QuantityKind::LuminousFlux => "LuminousFlux",
            QuantityKind::AmountOfSubstance => "AmountOfSubstance",
            QuantityKind::Frequency => "Frequency",
            QuantityKind::Data => "Data",
            QuantityKind::SpecificEnergy => "SpecificEnergy",
            QuantityKind::Speed => "Speed",
            QuantityKind::Force => "Force",
            QuantityKind::Energy => "Energy",
            QuantityKind::Temperature => "Temperature",
            QuantityKind::Volume => "Volume",
        }
    }

    /// Name used for the kind's units in diagnostics, e.g. `"LengthUnit"`
    pub fn unit_type_name(self) -> String {
        format!("{}Unit", self.name())
    }

    /// Look up a kind by name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<QuantityKind> {
        let name = name.trim();
        QuantityKind::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
