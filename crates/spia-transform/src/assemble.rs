//! Artifact assembly.
//!
//! Builders borrow parsed entries and never mutate them. Entries without a
//! code are excluded everywhere; mapping elements additionally require at
//! least one target.

use serde::{Deserialize, Serialize};
use spia_model::{
    CodeListArtifact, CodeSystemArtifact, CodeSystemConcept, CodeSystemId, CombiningResultsFlag,
    Concept, Designation, Equivalence, MappingArtifact, MappingElement, MappingGroup,
    MappingTarget, RefsetEntry,
};

/// Which target to keep when a single-valued mapping meets several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTargetPolicy {
    #[default]
    First,
}

/// How many targets a mapping element may carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCardinality {
    #[default]
    Many,
    Single(MultiTargetPolicy),
}

/// A target value pulled out of an entry: code and optional display.
pub type TargetValue = (String, Option<String>);

/// Enumerated code list of every entry with a code, in entry order.
///
/// The preferred term is the display; each synonym becomes a designation.
pub fn build_code_list(entries: &[RefsetEntry], system: CodeSystemId) -> CodeListArtifact {
    let concepts = entries
        .iter()
        .filter(|entry| entry.has_code())
        .filter_map(|entry| {
            Some(Concept {
                code: entry.code.clone()?,
                display: entry.preferred_term.clone(),
                designations: entry
                    .synonyms
                    .iter()
                    .map(|synonym| Designation::synonym(synonym.as_str()))
                    .collect(),
            })
        })
        .collect();
    CodeListArtifact { system, concepts }
}

/// Single-group mapping from `source` to `target`.
///
/// `extractor` yields the targets of one entry; entries without code or
/// targets produce no element.
pub fn build_mapping<F>(
    entries: &[RefsetEntry],
    source: &str,
    target: &str,
    extractor: F,
    equivalence: Equivalence,
    cardinality: TargetCardinality,
) -> MappingArtifact
where
    F: Fn(&RefsetEntry) -> Vec<TargetValue>,
{
    let mut elements = Vec::new();
    for entry in entries {
        let Some(code) = entry.code.as_deref().filter(|code| !code.is_empty()) else {
            continue;
        };
        let mut targets = extractor(entry);
        if targets.is_empty() {
            continue;
        }
        if let TargetCardinality::Single(MultiTargetPolicy::First) = cardinality
            && targets.len() > 1
        {
            tracing::warn!(
                code,
                targets = targets.len(),
                kept = %targets[0].0,
                "multiple targets in single-valued mapping, keeping the first"
            );
            targets.truncate(1);
        }
        elements.push(MappingElement {
            code: code.to_string(),
            display: entry.native_display.clone(),
            targets: targets
                .into_iter()
                .map(|(code, display)| MappingTarget {
                    code,
                    display,
                    equivalence,
                })
                .collect(),
        });
    }
    MappingArtifact {
        groups: vec![MappingGroup {
            source: source.to_string(),
            target: target.to_string(),
            elements,
        }],
    }
}

/// Unit codes of an entry with their server displays.
pub fn unit_targets(entry: &RefsetEntry) -> Vec<TargetValue> {
    entry
        .unit_codes
        .iter()
        .enumerate()
        .map(|(index, code)| (code.clone(), entry.unit_display(index).map(str::to_string)))
        .collect()
}

/// The combining results flag of an entry, if set.
pub fn flag_target(entry: &RefsetEntry) -> Vec<TargetValue> {
    entry
        .combining_results_flag
        .map(|flag| (flag.code().to_string(), Some(flag.display().to_string())))
        .into_iter()
        .collect()
}

/// LOINC codes to their UCUM units.
pub fn build_unit_map(entries: &[RefsetEntry], cardinality: TargetCardinality) -> MappingArtifact {
    build_mapping(
        entries,
        CodeSystemId::Loinc.uri(),
        CodeSystemId::Ucum.uri(),
        unit_targets,
        Equivalence::RelatedTo,
        cardinality,
    )
}

/// LOINC codes to their combining results flag in the code system at
/// `code_system_url`.
pub fn build_combining_results_map(
    entries: &[RefsetEntry],
    code_system_url: &str,
) -> MappingArtifact {
    build_mapping(
        entries,
        CodeSystemId::Loinc.uri(),
        code_system_url,
        flag_target,
        Equivalence::RelatedTo,
        TargetCardinality::Single(MultiTargetPolicy::First),
    )
}

/// The combining results flag vocabulary as a complete code system.
pub fn build_combining_results_code_system(url: &str) -> CodeSystemArtifact {
    CodeSystemArtifact {
        url: url.to_string(),
        concepts: CombiningResultsFlag::ALL
            .into_iter()
            .map(|flag| CodeSystemConcept {
                code: flag.code().to_string(),
                display: flag.display().to_string(),
                definition: flag.definition().to_string(),
            })
            .collect(),
    }
}
