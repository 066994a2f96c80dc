//! SPIA output generation.
//!
//! - **FHIR**: ValueSet, ConceptMap and CodeSystem resources as JSON, plus a
//!   `collection` Bundle holding all of them
//! - **Audit**: per-run JSON record of inputs, row accounting and outputs

mod audit;
mod fhir;
mod output;

pub use audit::{ArtifactAudit, AuditReport, DistributionAudit, write_audit};
pub use fhir::{RenderOptions, narrative, render_bundle, render_resource};
pub use output::{
    WrittenOutputs, bundle_file_name, resource_file_name, write_fhir_outputs, write_json,
};
