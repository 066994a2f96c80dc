//! Typed cell extraction and header checks.
//!
//! All extractors return `Ok(None)` for absent or blank cells and a fatal
//! [`SheetError::WrongCellType`] when a cell holds a value of another type.

use std::collections::BTreeSet;

use spia_model::{CellKind, SheetError};

use crate::sheet::{Cell, Sheet};

/// Normalizes non-breaking spaces and trims.
pub fn clean_text(value: &str) -> String {
    value.replace('\u{00A0}', " ").trim().to_string()
}

/// Checks the header row against `expected`.
///
/// Blank cells are dropped first, so stray empty trailing columns are
/// tolerated. Remaining cell text is compared verbatim, in order.
pub fn validate_header(sheet: &Sheet, row: usize, expected: &[&str]) -> Result<(), SheetError> {
    let actual: Vec<String> = sheet
        .row(row)
        .iter()
        .filter(|cell| !cell.is_blank())
        .map(header_text)
        .collect();
    if actual.iter().map(String::as_str).eq(expected.iter().copied()) {
        Ok(())
    } else {
        Err(SheetError::SchemaMismatch {
            sheet: sheet.name().to_string(),
            expected: expected.iter().map(|h| h.to_string()).collect(),
            actual,
        })
    }
}

fn header_text(cell: &Cell) -> String {
    match cell {
        Cell::String(text) | Cell::DateTime(text) | Cell::Error(text) => text.clone(),
        Cell::Number(number) => number.to_string(),
        Cell::Bool(flag) => flag.to_string(),
        Cell::Empty => String::new(),
    }
}

/// Reads a string cell, trimming it.
pub fn get_string(sheet: &Sheet, row: usize, column: usize) -> Result<Option<String>, SheetError> {
    match sheet.cell(row, column) {
        Cell::Empty => Ok(None),
        Cell::String(raw) => {
            let cleaned = clean_text(raw);
            if cleaned.is_empty() {
                return Ok(None);
            }
            if cleaned != *raw {
                tracing::warn!(
                    sheet = sheet.name(),
                    row,
                    column,
                    value = %cleaned,
                    "trimmed whitespace from cell"
                );
            }
            Ok(Some(cleaned))
        }
        other => Err(wrong_type(row, column, CellKind::String, other)),
    }
}

/// Reads a numeric cell. Zero is treated as absent.
pub fn get_number(sheet: &Sheet, row: usize, column: usize) -> Result<Option<f64>, SheetError> {
    match sheet.cell(row, column) {
        Cell::Empty => Ok(None),
        Cell::String(raw) if raw.trim().is_empty() => Ok(None),
        Cell::Number(value) if *value == 0.0 => Ok(None),
        Cell::Number(value) => Ok(Some(*value)),
        other => Err(wrong_type(row, column, CellKind::Number, other)),
    }
}

/// Reads a string cell as a set of `delimiter`-separated values.
///
/// Parts are trimmed and empty parts dropped; a blank cell is an empty set.
pub fn get_delimited_set(
    sheet: &Sheet,
    row: usize,
    column: usize,
    delimiter: char,
) -> Result<BTreeSet<String>, SheetError> {
    let Some(value) = get_string(sheet, row, column)? else {
        return Ok(BTreeSet::new());
    };
    let mut parts = BTreeSet::new();
    for part in value.split(delimiter) {
        let cleaned = clean_text(part);
        if cleaned.is_empty() {
            continue;
        }
        if cleaned != part {
            tracing::warn!(sheet = sheet.name(), row, column, value = %cleaned, "trimmed delimited value");
        }
        parts.insert(cleaned);
    }
    Ok(parts)
}

fn wrong_type(row: usize, column: usize, expected: CellKind, actual: &Cell) -> SheetError {
    SheetError::WrongCellType {
        row,
        column,
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet::new("Test", rows)
    }

    #[test]
    fn header_matches_ignoring_trailing_blank() {
        let sheet = sheet(vec![vec![
            Cell::from("A"),
            Cell::from("B"),
            Cell::Empty,
            Cell::from("  "),
        ]]);
        assert!(validate_header(&sheet, 0, &["A", "B"]).is_ok());
    }

    #[test]
    fn header_mismatch_reports_both_lists() {
        let sheet = sheet(vec![vec![Cell::from("A"), Cell::from("C")]]);
        let error = validate_header(&sheet, 0, &["A", "B", "C"]).expect_err("mismatch");
        match error {
            SheetError::SchemaMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, vec!["A", "B", "C"]);
                assert_eq!(actual, vec!["A", "C"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_is_compared_verbatim() {
        let sheet = sheet(vec![vec![Cell::from("Preferred Display ")]]);
        assert!(validate_header(&sheet, 0, &["Preferred Display "]).is_ok());
        assert!(validate_header(&sheet, 0, &["Preferred Display"]).is_err());
    }

    #[test]
    fn strings_are_trimmed_including_nbsp() {
        let sheet = sheet(vec![vec![Cell::from("\u{00A0}Haemoglobin  ")]]);
        assert_eq!(
            get_string(&sheet, 0, 0).expect("string"),
            Some("Haemoglobin".to_string())
        );
        assert_eq!(get_string(&sheet, 0, 1).expect("absent"), None);
    }

    #[test]
    fn number_in_string_column_is_fatal() {
        let sheet = sheet(vec![vec![Cell::Number(3.0)]]);
        let error = get_string(&sheet, 0, 0).expect_err("wrong type");
        assert_eq!(
            error,
            SheetError::WrongCellType {
                row: 0,
                column: 0,
                expected: CellKind::String,
                actual: CellKind::Number,
            }
        );
    }

    #[test]
    fn zero_number_reads_as_absent() {
        let sheet = sheet(vec![vec![Cell::Number(0.0), Cell::Number(3.1), Cell::from("x")]]);
        assert_eq!(get_number(&sheet, 0, 0).expect("zero"), None);
        assert_eq!(get_number(&sheet, 0, 1).expect("number"), Some(3.1));
        assert!(get_number(&sheet, 0, 2).is_err());
    }

    #[test]
    fn delimited_values_are_split_and_trimmed() {
        let sheet = sheet(vec![vec![Cell::from("Hb; Haemoglobin ;;HGB")]]);
        let values = get_delimited_set(&sheet, 0, 0, ';').expect("set");
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        assert_eq!(values, vec!["HGB", "Haemoglobin", "Hb"]);
        assert!(
            get_delimited_set(&sheet, 0, 3, ';')
                .expect("blank")
                .is_empty()
        );
    }
}
