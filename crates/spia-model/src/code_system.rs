use std::fmt;

use serde::{Deserialize, Serialize};

/// External code systems referenced by SPIA reference sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSystemId {
    Loinc,
    Snomed,
    Ucum,
}

impl CodeSystemId {
    /// Canonical system URI used in FHIR codings.
    pub fn uri(self) -> &'static str {
        match self {
            Self::Loinc => "http://loinc.org",
            Self::Snomed => "http://snomed.info/sct",
            Self::Ucum => "http://unitsofmeasure.org",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Loinc => "LOINC",
            Self::Snomed => "SNOMED CT-AU",
            Self::Ucum => "UCUM",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        [Self::Loinc, Self::Snomed, Self::Ucum]
            .into_iter()
            .find(|system| system.uri() == uri)
    }
}

impl fmt::Display for CodeSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
