//! UCUM unit expressions.
//!
//! Unit grammar is delegated to an external validator behind
//! [`UnitExpressionValidator`]; this module only handles the sheet cell
//! conventions (semicolon separated lists and the `No unit` marker).

use std::fmt;

/// Cell text meaning the test has no unit.
pub const NO_UNIT: &str = "No unit";
pub const UNIT_SEPARATOR: char = ';';

/// Validates a single UCUM expression.
pub trait UnitExpressionValidator: Send + Sync {
    /// Returns `None` when `expression` is valid, or an error message.
    fn validate(&self, expression: &str) -> Option<String>;

    fn is_valid(&self, expression: &str) -> bool {
        self.validate(expression).is_none()
    }
}

/// Default validator backed by the `octofhir-ucum` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctofhirUcumValidator;

impl UnitExpressionValidator for OctofhirUcumValidator {
    fn validate(&self, expression: &str) -> Option<String> {
        if expression.trim().is_empty() {
            return Some("empty unit expression".to_string());
        }
        octofhir_ucum::validate(expression)
            .err()
            .map(|error| error.to_string())
    }
}

/// A unit cell token that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUnit {
    pub token: String,
    pub message: String,
}

impl fmt::Display for InvalidUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid UCUM unit {:?}: {}", self.token, self.message)
    }
}

impl std::error::Error for InvalidUnit {}

/// Splits a unit cell into validated UCUM codes, in cell order.
///
/// `No unit` yields an empty list. A single invalid token invalidates the
/// whole cell.
pub fn parse_unit_cell(
    cell: &str,
    validator: &dyn UnitExpressionValidator,
) -> Result<Vec<String>, InvalidUnit> {
    if cell.trim() == NO_UNIT {
        return Ok(Vec::new());
    }
    let mut units = Vec::new();
    for token in cell.split(UNIT_SEPARATOR) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(message) = validator.validate(token) {
            return Err(InvalidUnit {
                token: token.to_string(),
                message,
            });
        }
        units.push(token.to_string());
    }
    Ok(units)
}
