//! FHIR release descriptors.
//!
//! The assembled artifacts are release-agnostic. A [`TargetSchema`] supplies
//! what differs between releases: profile URLs, the FHIR version string and
//! the shape of a few elements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spia_model::Equivalence;

use crate::publication::ResourceKind;

pub const SHAREABLE_VALUE_SET_PROFILE: &str =
    "http://hl7.org/fhir/StructureDefinition/shareablevalueset";
pub const SHAREABLE_CODE_SYSTEM_PROFILE: &str =
    "http://hl7.org/fhir/StructureDefinition/shareablecodesystem";

const NCTS_PROFILE_BASE: &str = "https://healthterminologies.gov.au/fhir/StructureDefinition";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSchema {
    Stu3,
    #[default]
    R4,
}

impl TargetSchema {
    pub fn fhir_version(self) -> &'static str {
        match self {
            Self::Stu3 => "3.0.2",
            Self::R4 => "4.0.1",
        }
    }

    /// Suffix of the NCTS profile names for this release.
    fn ncts_suffix(self) -> &'static str {
        match self {
            Self::Stu3 => "2",
            Self::R4 => "4",
        }
    }

    /// `meta.profile` entries for a resource of `kind`.
    pub fn profiles(self, kind: ResourceKind) -> Vec<String> {
        let suffix = self.ncts_suffix();
        match kind {
            ResourceKind::ValueSet => vec![
                SHAREABLE_VALUE_SET_PROFILE.to_string(),
                format!("{NCTS_PROFILE_BASE}/composed-value-set-{suffix}"),
            ],
            ResourceKind::ConceptMap => {
                vec![format!("{NCTS_PROFILE_BASE}/general-concept-map-{suffix}")]
            }
            ResourceKind::CodeSystem => vec![
                SHAREABLE_CODE_SYSTEM_PROFILE.to_string(),
                format!("{NCTS_PROFILE_BASE}/complete-code-system-{suffix}"),
            ],
        }
    }

    /// Whether `identifier` of a resource of `kind` is an array.
    pub fn identifier_is_list(self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::ValueSet => true,
            ResourceKind::ConceptMap => false,
            ResourceKind::CodeSystem => self == Self::R4,
        }
    }

    /// ConceptMap equivalence code.
    pub fn equivalence_code(self, equivalence: Equivalence) -> &'static str {
        match equivalence {
            Equivalence::RelatedTo => "relatedto",
            Equivalence::Equivalent => "equivalent",
            Equivalence::Equal => "equal",
            Equivalence::Wider => "wider",
            Equivalence::Narrower => "narrower",
            Equivalence::Inexact => "inexact",
        }
    }
}

impl fmt::Display for TargetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stu3 => f.write_str("stu3"),
            Self::R4 => f.write_str("r4"),
        }
    }
}

impl FromStr for TargetSchema {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stu3" | "dstu3" => Ok(Self::Stu3),
            "r4" => Ok(Self::R4),
            other => Err(format!("unsupported FHIR release: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_follow_the_release() {
        assert_eq!(
            TargetSchema::R4.profiles(ResourceKind::ConceptMap),
            vec!["https://healthterminologies.gov.au/fhir/StructureDefinition/general-concept-map-4"]
        );
        let stu3 = TargetSchema::Stu3.profiles(ResourceKind::ValueSet);
        assert_eq!(stu3[0], SHAREABLE_VALUE_SET_PROFILE);
        assert!(stu3[1].ends_with("composed-value-set-2"));
    }

    #[test]
    fn code_system_identifier_shape_differs() {
        assert!(!TargetSchema::Stu3.identifier_is_list(ResourceKind::CodeSystem));
        assert!(TargetSchema::R4.identifier_is_list(ResourceKind::CodeSystem));
        assert!(!TargetSchema::R4.identifier_is_list(ResourceKind::ConceptMap));
    }

    #[test]
    fn parses_release_names() {
        assert_eq!("STU3".parse::<TargetSchema>(), Ok(TargetSchema::Stu3));
        assert_eq!("r4".parse::<TargetSchema>(), Ok(TargetSchema::R4));
        assert!("r5".parse::<TargetSchema>().is_err());
    }
}
