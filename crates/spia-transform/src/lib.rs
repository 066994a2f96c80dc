//! SPIA artifact assembly.
//!
//! - **assemble**: code lists, concept mappings and the flag code system
//! - **schema**: per-release descriptors (STU3, R4)
//! - **publication**: resource names, titles, OIDs and shared metadata
//! - **registry**: which artifacts each reference set produces

pub mod assemble;
pub mod publication;
pub mod registry;
pub mod schema;

pub use assemble::{
    MultiTargetPolicy, TargetCardinality, TargetValue, build_code_list,
    build_combining_results_code_system, build_combining_results_map, build_mapping,
    build_unit_map, flag_target, unit_targets,
};
pub use publication::{Publication, ResourceKind};
pub use registry::{
    ArtifactContent, ArtifactRecipe, ArtifactRegistry, AssemblyOptions, BuiltArtifact,
    combining_results_code_system,
};
pub use schema::TargetSchema;
