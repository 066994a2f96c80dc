//! Terminology server access for SPIA reference sets.
//!
//! Lookups are batched: a reference set costs one round-trip for code
//! displays and one for unit displays, regardless of its size.

pub mod client;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod retry;

pub use client::{DEFAULT_SERVER, FhirTerminologyClient, TerminologyConfig, TerminologyService};
pub use enrich::{ActiveStatusChecker, TerminologyEnricher};
pub use error::{Result, TerminologyError};
pub use lookup::{batch_lookup, build_lookup_bundle, display_from_parameters, is_inactive};
pub use retry::RetryPolicy;
