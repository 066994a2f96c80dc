//! Code validators for SPIA reference sets.
//!
//! LOINC and SNOMED CT-AU codes are checked structurally, including their
//! check digits. UCUM expressions are delegated to a
//! [`UnitExpressionValidator`]. None of these validators perform I/O; remote
//! active-status checks live in `spia-terminology`.

pub mod loinc;
pub mod snomed;
pub mod ucum;

use std::sync::Arc;

use spia_model::CodeSystemId;

pub use loinc::is_valid_loinc;
pub use snomed::{is_valid_snomed, verhoeff_valid};
pub use ucum::{
    InvalidUnit, NO_UNIT, OctofhirUcumValidator, UnitExpressionValidator, parse_unit_cell,
};

/// Structural validators for every supported code system.
#[derive(Clone)]
pub struct CodeValidators {
    units: Arc<dyn UnitExpressionValidator>,
}

impl Default for CodeValidators {
    fn default() -> Self {
        Self::new(Arc::new(OctofhirUcumValidator))
    }
}

impl CodeValidators {
    pub fn new(units: Arc<dyn UnitExpressionValidator>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &dyn UnitExpressionValidator {
        self.units.as_ref()
    }

    /// Returns true if `code` is structurally valid in `system`.
    pub fn is_valid(&self, system: CodeSystemId, code: &str) -> bool {
        let valid = match system {
            CodeSystemId::Loinc => is_valid_loinc(code),
            CodeSystemId::Snomed => is_valid_snomed(code),
            CodeSystemId::Ucum => self.units.is_valid(code),
        };
        if !valid {
            tracing::debug!(system = %system, code, "code failed structural validation");
        }
        valid
    }

    /// Parses a unit cell with the configured unit validator.
    pub fn parse_units(&self, cell: &str) -> Result<Vec<String>, InvalidUnit> {
        parse_unit_cell(cell, self.units.as_ref())
    }
}

impl std::fmt::Debug for CodeValidators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeValidators").finish_non_exhaustive()
    }
}
