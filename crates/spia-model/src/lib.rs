pub mod artifact;
pub mod code_system;
pub mod domain;
pub mod entry;
pub mod error;
pub mod summary;

pub use artifact::{
    CodeListArtifact, CodeSystemArtifact, CodeSystemConcept, Concept, Designation, Equivalence,
    MappingArtifact, MappingElement, MappingGroup, MappingTarget,
};
pub use code_system::CodeSystemId;
pub use domain::RefsetDomain;
pub use entry::{CombiningResultsFlag, LoincAxes, RefsetEntry};
pub use error::{CellKind, InvalidReason, RowError, SheetError};
pub use summary::ParseSummary;
