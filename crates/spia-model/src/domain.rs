use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code_system::CodeSystemId;

/// One reference set within a SPIA distribution.
///
/// The variant order is the order in which reference sets are processed and
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefsetDomain {
    Requesting,
    ChemicalPathology,
    Haematology,
    Immunopathology,
    MicrobiologySerologyMolecular,
    MicrobiologyOrganisms,
    PreferredUnits,
}

impl RefsetDomain {
    pub const ALL: [RefsetDomain; 7] = [
        Self::Requesting,
        Self::ChemicalPathology,
        Self::Haematology,
        Self::Immunopathology,
        Self::MicrobiologySerologyMolecular,
        Self::MicrobiologyOrganisms,
        Self::PreferredUnits,
    ];

    /// Short identifier used on the command line and in audit output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Requesting => "requesting",
            Self::ChemicalPathology => "chemical",
            Self::Haematology => "haematology",
            Self::Immunopathology => "immunopathology",
            Self::MicrobiologySerologyMolecular => "micro-sero-molecular",
            Self::MicrobiologyOrganisms => "organisms",
            Self::PreferredUnits => "preferred-units",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Requesting => "Requesting Pathology",
            Self::ChemicalPathology => "Chemical Pathology",
            Self::Haematology => "Haematology",
            Self::Immunopathology => "Immunopathology",
            Self::MicrobiologySerologyMolecular => "Microbiology Serology Molecular Pathology",
            Self::MicrobiologyOrganisms => "Microbiology Subset of Organisms",
            Self::PreferredUnits => "Preferred Units",
        }
    }

    /// Code system of the mandatory code column.
    pub fn code_system(self) -> CodeSystemId {
        match self {
            Self::Requesting | Self::MicrobiologyOrganisms => CodeSystemId::Snomed,
            Self::ChemicalPathology
            | Self::Haematology
            | Self::Immunopathology
            | Self::MicrobiologySerologyMolecular => CodeSystemId::Loinc,
            Self::PreferredUnits => CodeSystemId::Ucum,
        }
    }

    /// Whether entries of this reference set carry UCUM unit codes.
    pub fn has_units(self) -> bool {
        matches!(
            self,
            Self::ChemicalPathology
                | Self::Haematology
                | Self::Immunopathology
                | Self::MicrobiologySerologyMolecular
        )
    }
}

impl fmt::Display for RefsetDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RefsetDomain {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|domain| domain.key() == needle)
            .ok_or_else(|| format!("unknown reference set: {value}"))
    }
}
