//! Which artifacts each reference set produces.
//!
//! The table is explicit: every domain maps to a list of recipes, each a
//! plain function from parsed entries to one artifact with its publication
//! metadata. The combining results code system is appended once per run.

use std::collections::BTreeMap;
use std::time::Instant;

use spia_model::{
    CodeListArtifact, CodeSystemArtifact, MappingArtifact, RefsetDomain, RefsetEntry,
};

use crate::assemble::{
    TargetCardinality, build_code_list, build_combining_results_code_system,
    build_combining_results_map, build_unit_map,
};
use crate::publication::{self, Publication};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContent {
    CodeList(CodeListArtifact),
    /// `source` and `target` are the canonical URLs of the mapped value sets.
    Mapping {
        source: String,
        target: String,
        mapping: MappingArtifact,
    },
    CodeSystem {
        value_set: String,
        code_system: CodeSystemArtifact,
    },
}

impl ArtifactContent {
    /// Concepts, mapping elements or code system concepts.
    pub fn item_count(&self) -> usize {
        match self {
            Self::CodeList(list) => list.len(),
            Self::Mapping { mapping, .. } => mapping.element_count(),
            Self::CodeSystem { code_system, .. } => code_system.concepts.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// Source reference set; `None` for run-level artifacts.
    pub domain: Option<RefsetDomain>,
    pub publication: Publication,
    pub content: ArtifactContent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub unit_cardinality: TargetCardinality,
}

pub type RecipeFn = fn(RefsetDomain, &[RefsetEntry], &AssemblyOptions) -> BuiltArtifact;

#[derive(Debug, Clone, Copy)]
pub struct ArtifactRecipe {
    pub label: &'static str,
    pub build: RecipeFn,
}

pub const VALUE_SET: ArtifactRecipe = ArtifactRecipe {
    label: "value set",
    build: value_set_recipe,
};

pub const UNIT_MAP: ArtifactRecipe = ArtifactRecipe {
    label: "unit map",
    build: unit_map_recipe,
};

pub const COMBINING_RESULTS_MAP: ArtifactRecipe = ArtifactRecipe {
    label: "combining results map",
    build: combining_results_map_recipe,
};

fn value_set_recipe(
    domain: RefsetDomain,
    entries: &[RefsetEntry],
    _options: &AssemblyOptions,
) -> BuiltArtifact {
    BuiltArtifact {
        domain: Some(domain),
        publication: publication::value_set(domain),
        content: ArtifactContent::CodeList(build_code_list(entries, domain.code_system())),
    }
}

fn unit_map_recipe(
    domain: RefsetDomain,
    entries: &[RefsetEntry],
    options: &AssemblyOptions,
) -> BuiltArtifact {
    BuiltArtifact {
        domain: Some(domain),
        publication: publication::unit_map(domain),
        content: ArtifactContent::Mapping {
            source: publication::value_set_url(domain),
            target: publication::value_set_url(RefsetDomain::PreferredUnits),
            mapping: build_unit_map(entries, options.unit_cardinality),
        },
    }
}

fn combining_results_map_recipe(
    domain: RefsetDomain,
    entries: &[RefsetEntry],
    _options: &AssemblyOptions,
) -> BuiltArtifact {
    let code_system_url = publication::combining_results_code_system().url();
    BuiltArtifact {
        domain: Some(domain),
        publication: publication::combining_results_map(),
        content: ArtifactContent::Mapping {
            source: publication::value_set_url(domain),
            target: publication::combining_results_value_set_url(),
            mapping: build_combining_results_map(entries, &code_system_url),
        },
    }
}

/// The combining results flag code system.
pub fn combining_results_code_system() -> BuiltArtifact {
    let descriptor = publication::combining_results_code_system();
    let code_system = build_combining_results_code_system(&descriptor.url());
    BuiltArtifact {
        domain: None,
        publication: descriptor,
        content: ArtifactContent::CodeSystem {
            value_set: publication::combining_results_value_set_url(),
            code_system,
        },
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    recipes: BTreeMap<RefsetDomain, Vec<ArtifactRecipe>>,
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ArtifactRegistry {
    /// Artifacts published for each SPIA reference set.
    pub fn standard() -> Self {
        let recipes = RefsetDomain::ALL
            .into_iter()
            .map(|domain| {
                let recipes = match domain {
                    RefsetDomain::ChemicalPathology => {
                        vec![VALUE_SET, UNIT_MAP, COMBINING_RESULTS_MAP]
                    }
                    RefsetDomain::Haematology
                    | RefsetDomain::Immunopathology
                    | RefsetDomain::MicrobiologySerologyMolecular => vec![VALUE_SET, UNIT_MAP],
                    RefsetDomain::Requesting
                    | RefsetDomain::MicrobiologyOrganisms
                    | RefsetDomain::PreferredUnits => vec![VALUE_SET],
                };
                (domain, recipes)
            })
            .collect();
        Self { recipes }
    }

    pub fn recipes_for(&self, domain: RefsetDomain) -> &[ArtifactRecipe] {
        self.recipes.get(&domain).map(Vec::as_slice).unwrap_or_default()
    }

    /// Builds every artifact for the given reference sets, in input order,
    /// followed by the combining results code system.
    pub fn assemble<'a, I>(&self, refsets: I, options: &AssemblyOptions) -> Vec<BuiltArtifact>
    where
        I: IntoIterator<Item = (RefsetDomain, &'a [RefsetEntry])>,
    {
        let start = Instant::now();
        let mut artifacts = Vec::new();
        for (domain, entries) in refsets {
            for recipe in self.recipes_for(domain) {
                let artifact = (recipe.build)(domain, entries, options);
                tracing::debug!(
                    %domain,
                    recipe = recipe.label,
                    id = %artifact.publication.id(),
                    items = artifact.content.item_count(),
                    "assembled artifact"
                );
                artifacts.push(artifact);
            }
        }
        artifacts.push(combining_results_code_system());
        tracing::info!(
            artifacts = artifacts.len(),
            duration_ms = start.elapsed().as_millis(),
            "artifact assembly complete"
        );
        artifacts
    }
}
