//! Artifact registry against hand-built reference sets.

use spia_model::{CodeSystemId, CombiningResultsFlag, RefsetDomain, RefsetEntry};
use spia_transform::{
    ArtifactContent, ArtifactRegistry, AssemblyOptions, MultiTargetPolicy, ResourceKind,
    TargetCardinality,
};

fn chemical_entries() -> Vec<RefsetEntry> {
    let mut glucose = RefsetEntry::new("2345-7")
        .with_preferred_term(Some("Glucose".to_string()))
        .with_unit_codes(["mmol/L".to_string(), "mg/dL".to_string()]);
    glucose.combining_results_flag = Some(CombiningResultsFlag::Green);
    let potassium = RefsetEntry::new("2823-3")
        .with_preferred_term(Some("Potassium".to_string()))
        .with_unit_codes(["mmol/L".to_string()]);
    vec![glucose, potassium]
}

fn units_entries() -> Vec<RefsetEntry> {
    vec![RefsetEntry::new("mmol/L").with_preferred_term(Some("mmol/L".to_string()))]
}

#[test]
fn standard_registry_matches_published_artifacts() {
    let registry = ArtifactRegistry::standard();
    let counts: Vec<usize> = RefsetDomain::ALL
        .into_iter()
        .map(|domain| registry.recipes_for(domain).len())
        .collect();
    assert_eq!(counts, vec![1, 3, 2, 2, 2, 1, 1]);
}

#[test]
fn assembles_in_input_order_with_code_system_last() {
    let chemical = chemical_entries();
    let units = units_entries();
    let registry = ArtifactRegistry::standard();

    let artifacts = registry.assemble(
        [
            (RefsetDomain::ChemicalPathology, chemical.as_slice()),
            (RefsetDomain::PreferredUnits, units.as_slice()),
        ],
        &AssemblyOptions::default(),
    );

    let ids: Vec<String> = artifacts.iter().map(|a| a.publication.id()).collect();
    assert_eq!(
        ids,
        vec![
            "spia-chemical-pathology-refset-3",
            "spia-chemical-pathology-unit-map-3",
            "spia-chemical-combining-results-map-3",
            "spia-preferred-units-refset-3",
            "spia-combining-results-flag-3",
        ]
    );
    assert_eq!(artifacts[4].publication.kind, ResourceKind::CodeSystem);
    assert_eq!(artifacts[4].domain, None);

    match &artifacts[0].content {
        ArtifactContent::CodeList(list) => {
            assert_eq!(list.system, CodeSystemId::Loinc);
            assert_eq!(list.len(), 2);
        }
        other => panic!("expected a code list, got {other:?}"),
    }
    match &artifacts[1].content {
        ArtifactContent::Mapping {
            source,
            target,
            mapping,
        } => {
            assert_eq!(
                source,
                "https://www.rcpa.edu.au/fhir/ValueSet/spia-chemical-pathology-refset-3"
            );
            assert_eq!(
                target,
                "https://www.rcpa.edu.au/fhir/ValueSet/spia-preferred-units-refset-3"
            );
            assert_eq!(mapping.groups[0].elements[0].targets.len(), 2);
        }
        other => panic!("expected a mapping, got {other:?}"),
    }
    match &artifacts[2].content {
        ArtifactContent::Mapping { mapping, .. } => {
            assert_eq!(mapping.element_count(), 1);
            assert_eq!(
                mapping.groups[0].target,
                "https://www.rcpa.edu.au/fhir/CodeSystem/spia-combining-results-flag-3"
            );
        }
        other => panic!("expected a mapping, got {other:?}"),
    }
}

#[test]
fn single_unit_policy_reaches_unit_maps() {
    let chemical = chemical_entries();
    let options = AssemblyOptions {
        unit_cardinality: TargetCardinality::Single(MultiTargetPolicy::First),
    };

    let artifacts = ArtifactRegistry::standard()
        .assemble([(RefsetDomain::ChemicalPathology, chemical.as_slice())], &options);

    match &artifacts[1].content {
        ArtifactContent::Mapping { mapping, .. } => {
            let targets = &mapping.groups[0].elements[0].targets;
            assert_eq!(targets.len(), 1);
            assert_eq!(targets[0].code, "mmol/L");
        }
        other => panic!("expected a mapping, got {other:?}"),
    }
}

#[test]
fn empty_input_still_publishes_the_code_system() {
    let none: Vec<(RefsetDomain, &[RefsetEntry])> = Vec::new();
    let artifacts = ArtifactRegistry::standard().assemble(none, &AssemblyOptions::default());
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].content.item_count(), 3);
}
