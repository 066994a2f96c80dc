use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::code_system::CodeSystemId;

/// Kind of value found in a spreadsheet cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    String,
    Number,
    Bool,
    DateTime,
    Error,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::String => "string",
            Self::Number => "numeric",
            Self::Bool => "boolean",
            Self::DateTime => "date",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Errors that abort processing of a whole sheet.
///
/// Row and column numbers are zero-based, as stored in the workbook.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    #[error("sheet {sheet:?} header does not match: expected {expected:?}, found {actual:?}")]
    SchemaMismatch {
        sheet: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("expected {expected} cell at row {row}, column {column}, found {actual}")]
    WrongCellType {
        row: usize,
        column: usize,
        expected: CellKind,
        actual: CellKind,
    },

    #[error("unknown combining results flag {value:?} at row {row}, column {column}")]
    UnknownFlag {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("Invalid Excel workbook format: {message}")]
    Workbook { message: String },
}

/// Why a code failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidReason {
    /// The code is malformed or fails its checksum.
    Structure,
    /// The terminology server reports the code as inactive.
    Inactive,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => f.write_str("structure"),
            Self::Inactive => f.write_str("inactive"),
        }
    }
}

/// Errors that skip a single row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("blank mandatory code at row {row}, column {column}")]
    BlankMandatoryCode { row: usize, column: usize },

    #[error("invalid {system} code {code:?} at row {row}, column {column}: {reason}")]
    InvalidCode {
        row: usize,
        column: usize,
        code: String,
        system: CodeSystemId,
        reason: InvalidReason,
    },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            Self::BlankMandatoryCode { row, .. } | Self::InvalidCode { row, .. } => *row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_and_structural_failures_differ() {
        let structural = RowError::InvalidCode {
            row: 4,
            column: 9,
            code: "26924-2".to_string(),
            system: CodeSystemId::Loinc,
            reason: InvalidReason::Structure,
        };
        let inactive = RowError::InvalidCode {
            row: 4,
            column: 9,
            code: "26924-2".to_string(),
            system: CodeSystemId::Loinc,
            reason: InvalidReason::Inactive,
        };
        assert_ne!(structural, inactive);
        assert!(inactive.to_string().ends_with("inactive"));
        assert_eq!(structural.row(), 4);
    }

    #[test]
    fn workbook_error_message() {
        let error = SheetError::Workbook {
            message: "zip header".to_string(),
        };
        assert!(error.to_string().starts_with("Invalid Excel workbook format"));
    }
}
