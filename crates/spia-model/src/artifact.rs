//! Terminology artifacts produced from reference sets.
//!
//! These types are release-agnostic: they carry the content of a code list,
//! a concept mapping or a code system, and leave the wire shape (profile
//! URLs, equivalence vocabulary) to the renderer.

use serde::{Deserialize, Serialize};

use crate::code_system::CodeSystemId;

/// Designation use code for synonyms (SNOMED CT "Synonym").
pub const SYNONYM_USE_CODE: &str = "900000000000013009";
pub const SYNONYM_USE_DISPLAY: &str = "Synonym";

/// An alternative term attached to a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    pub value: String,
}

impl Designation {
    pub fn synonym(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn use_system(&self) -> &'static str {
        CodeSystemId::Snomed.uri()
    }

    pub fn use_code(&self) -> &'static str {
        SYNONYM_USE_CODE
    }

    pub fn use_display(&self) -> &'static str {
        SYNONYM_USE_DISPLAY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub display: Option<String>,
    pub designations: Vec<Designation>,
}

/// Enumerated code list; every concept belongs to `system`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListArtifact {
    pub system: CodeSystemId,
    pub concepts: Vec<Concept>,
}

impl CodeListArtifact {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// Relationship between a mapping source and one of its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equivalence {
    RelatedTo,
    Equivalent,
    Equal,
    Wider,
    Narrower,
    Inexact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTarget {
    pub code: String,
    pub display: Option<String>,
    pub equivalence: Equivalence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingElement {
    pub code: String,
    pub display: Option<String>,
    pub targets: Vec<MappingTarget>,
}

/// Elements mapping from one source system to one target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingGroup {
    pub source: String,
    pub target: String,
    pub elements: Vec<MappingElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingArtifact {
    pub groups: Vec<MappingGroup>,
}

impl MappingArtifact {
    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|group| group.elements.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSystemConcept {
    pub code: String,
    pub display: String,
    pub definition: String,
}

/// A complete code system defined by the distribution itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSystemArtifact {
    pub url: String,
    pub concepts: Vec<CodeSystemConcept>,
}
