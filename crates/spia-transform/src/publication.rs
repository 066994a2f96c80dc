//! Publication metadata of the generated resources.
//!
//! Every resource carries the same publisher, contact, jurisdiction and
//! copyright. Per-resource names, titles and OIDs come from the descriptors
//! below.

use serde::{Deserialize, Serialize};
use spia_model::RefsetDomain;

pub const VERSION: &str = "3.0.1";
pub const BASE_URL: &str = "https://www.rcpa.edu.au/fhir";
pub const PUBLISHER: &str = "Australian Digital Health Agency";
pub const EMAIL: &str = "help@digitalhealth.gov.au";
pub const JURISDICTION_SYSTEM: &str = "urn:iso:std:iso:3166";
pub const JURISDICTION_CODE: &str = "AU";
pub const JURISDICTION_DISPLAY: &str = "Australia";
pub const OID_SYSTEM: &str = "urn:ietf:rfc:3986";

pub const COPYRIGHT: &str = "Copyright © 2017 - 2020 RCPA. All rights reserved.\n\n\
This material contains content from LOINC (http://loinc.org). LOINC is copyright 1995-2020, \
Regenstrief Institute, Inc. and the Logical Observation Identifiers Names and Codes (LOINC) \
Committee and is available at no cost under the license at http://loinc.org/license. LOINC® is a \
registered United States trademark of Regenstrief Institute, Inc.\n\n\
This material contains information which is protected by copyright. You may download, display, \
print and reproduce any material for your personal, non-commercial use or use within your \
organisation subject to the following terms and conditions:\n\n\
1. The material may not be copied, reproduced, communicated or displayed, in whole or in part, for \
profit or commercial gain.\n\
2. Any copy, reproduction or communication must include this RCPA copyright notice in full.\n\
3. No changes may be made to the wording of the Standards and Guidelines, terminology reference \
sets and information models including commentary, tables or diagrams. Excerpts from the Standards \
and Guidelines, terminology reference sets and information models may be used. References and \
acknowledgments must be maintained in any reproduction or copy in full or part of the \
material.\n\n\
Apart from any use as permitted under the Copyright Act 1968 or as set out above, all other rights \
are reserved. Requests and inquiries concerning reproduction and rights should be addressed to \
RCPA, 207 Albion St, Surry Hills, NSW 2010, Australia.";

const COMBINING_RESULTS_FLAG_NAME: &str = "spia-combining-results-flag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    ValueSet,
    ConceptMap,
    CodeSystem,
}

impl ResourceKind {
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::ValueSet => "ValueSet",
            Self::ConceptMap => "ConceptMap",
            Self::CodeSystem => "CodeSystem",
        }
    }
}

/// Descriptive metadata of one published resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub kind: ResourceKind,
    pub name: String,
    pub title: String,
    pub description: String,
    pub purpose: Option<String>,
    pub oid: Option<String>,
}

impl Publication {
    /// `name` suffixed with the major version.
    pub fn id(&self) -> String {
        resource_id(&self.name)
    }

    pub fn url(&self) -> String {
        resource_url(self.kind, &self.name)
    }
}

pub fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

pub fn resource_id(name: &str) -> String {
    format!("{name}-{}", major_version(VERSION))
}

pub fn resource_url(kind: ResourceKind, name: &str) -> String {
    format!("{BASE_URL}/{}/{}", kind.resource_type(), resource_id(name))
}

fn slug(domain: RefsetDomain) -> &'static str {
    match domain {
        RefsetDomain::Requesting => "requesting",
        RefsetDomain::ChemicalPathology => "chemical-pathology",
        RefsetDomain::Haematology => "haematology",
        RefsetDomain::Immunopathology => "immunopathology",
        RefsetDomain::MicrobiologySerologyMolecular => "microbiology-serology-molecular",
        RefsetDomain::MicrobiologyOrganisms => "microbiology-organisms",
        RefsetDomain::PreferredUnits => "preferred-units",
    }
}

fn value_set_name(domain: RefsetDomain) -> String {
    format!("spia-{}-refset", slug(domain))
}

/// Publication of the value set for `domain`.
pub fn value_set(domain: RefsetDomain) -> Publication {
    let label = domain.description();
    let (title, description) = match domain {
        RefsetDomain::Requesting => (
            format!("RCPA - SPIA {label} Terminology Reference Set"),
            "Standard codes for use in requesting pathology tests in Australia, based on the \
             SPIA Requesting Pathology Terminology Reference Set (v3.1)."
                .to_string(),
        ),
        RefsetDomain::MicrobiologyOrganisms => (
            format!("RCPA - SPIA {label} Reference Set"),
            "Standard set of organism codes for use in reporting pathology results in \
             Australia, based on the SPIA Microbiology Subset of Organisms Reference Set (v3.1)."
                .to_string(),
        ),
        RefsetDomain::PreferredUnits => (
            format!("RCPA - SPIA {label} Reference Set"),
            "A set of preferred units of measure for use within pathology reporting in \
             Australia, based on the SPIA Preferred Units Reference Set (v1.1)."
                .to_string(),
        ),
        RefsetDomain::ChemicalPathology
        | RefsetDomain::Haematology
        | RefsetDomain::Immunopathology
        | RefsetDomain::MicrobiologySerologyMolecular => (
            format!("RCPA - SPIA {label} Terminology Reference Set"),
            format!(
                "Standard codes for use in reporting {} results in Australia, based on the \
                 SPIA {label} Terminology Reference Set (v3.1).",
                reporting_subject(domain)
            ),
        ),
    };
    let oid = match domain {
        RefsetDomain::Haematology => Some("1.2.36.1.2001.1004.300.100.1007"),
        RefsetDomain::Immunopathology => Some("1.2.36.1.2001.1004.300.100.1009"),
        _ => None,
    };
    Publication {
        kind: ResourceKind::ValueSet,
        name: value_set_name(domain),
        title,
        description,
        purpose: None,
        oid: oid.map(str::to_string),
    }
}

fn reporting_subject(domain: RefsetDomain) -> &'static str {
    match domain {
        RefsetDomain::ChemicalPathology => "chemical pathology",
        RefsetDomain::Haematology => "haematology pathology",
        RefsetDomain::Immunopathology => "immunopathology",
        _ => "microbiology pathology",
    }
}

/// Publication of the map from `domain` codes to preferred units.
pub fn unit_map(domain: RefsetDomain) -> Publication {
    let label = domain.description();
    let subject = match domain {
        RefsetDomain::MicrobiologySerologyMolecular => "Microbiology Serology Molecular",
        _ => label,
    };
    let oid = match domain {
        RefsetDomain::MicrobiologySerologyMolecular => Some("1.2.36.1.2001.1004.300.100.1005"),
        _ => None,
    };
    Publication {
        kind: ResourceKind::ConceptMap,
        name: format!("spia-{}-unit-map", slug(domain)),
        title: format!("RCPA - SPIA {subject} Unit Map"),
        description: format!(
            "Map between the SPIA {label} Reference Set (v3.1) and the corresponding RCPA \
             preferred units (v1.1) for each code."
        ),
        purpose: Some(format!(
            "Resolving RCPA specified units for members of the SPIA {label} Reference Set."
        )),
        oid: oid.map(str::to_string),
    }
}

pub fn combining_results_map() -> Publication {
    Publication {
        kind: ResourceKind::ConceptMap,
        name: "spia-chemical-combining-results-map".to_string(),
        title: "RCPA - SPIA Chemical Combining Results Map".to_string(),
        description: "Map between the SPIA Chemical Pathology Reference Set (v3.1) and the \
                      corresponding combining results flag for each code."
            .to_string(),
        purpose: Some(
            "Resolving the combining results flags for members of the SPIA Chemical Pathology \
             Reference Set."
                .to_string(),
        ),
        oid: Some("1.2.36.1.2001.1004.300.100.1003".to_string()),
    }
}

pub fn combining_results_code_system() -> Publication {
    Publication {
        kind: ResourceKind::CodeSystem,
        name: COMBINING_RESULTS_FLAG_NAME.to_string(),
        title: "RCPA - SPIA Combining Results Flag".to_string(),
        description: "Codes describing the values for the combining results flag within the \
                      SPIA standard."
            .to_string(),
        purpose: None,
        oid: Some("1.2.36.1.2001.1004.300.100.1013".to_string()),
    }
}

/// ValueSet containing the whole combining results flag code system.
pub fn combining_results_value_set_url() -> String {
    resource_url(ResourceKind::ValueSet, COMBINING_RESULTS_FLAG_NAME)
}

/// Canonical URL of the value set of `domain`.
pub fn value_set_url(domain: RefsetDomain) -> String {
    resource_url(ResourceKind::ValueSet, &value_set_name(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_major_version() {
        let publication = value_set(RefsetDomain::Haematology);
        assert_eq!(publication.id(), "spia-haematology-refset-3");
        assert_eq!(
            publication.url(),
            "https://www.rcpa.edu.au/fhir/ValueSet/spia-haematology-refset-3"
        );
        assert_eq!(
            publication.title,
            "RCPA - SPIA Haematology Terminology Reference Set"
        );
    }

    #[test]
    fn flag_code_system_and_value_set_share_an_id() {
        let code_system = combining_results_code_system();
        assert_eq!(
            code_system.url(),
            "https://www.rcpa.edu.au/fhir/CodeSystem/spia-combining-results-flag-3"
        );
        assert_eq!(
            combining_results_value_set_url(),
            "https://www.rcpa.edu.au/fhir/ValueSet/spia-combining-results-flag-3"
        );
    }

    #[test]
    fn unit_maps_are_concept_maps() {
        let map = unit_map(RefsetDomain::MicrobiologySerologyMolecular);
        assert_eq!(map.kind, ResourceKind::ConceptMap);
        assert_eq!(map.id(), "spia-microbiology-serology-molecular-unit-map-3");
        assert_eq!(map.oid.as_deref(), Some("1.2.36.1.2001.1004.300.100.1005"));
    }

    #[test]
    fn every_value_set_name_is_distinct() {
        let mut names: Vec<String> = RefsetDomain::ALL
            .into_iter()
            .map(|domain| value_set(domain).name)
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RefsetDomain::ALL.len());
    }
}
