//! Integration tests for code validators.

use std::sync::Arc;

use proptest::prelude::*;
use spia_model::CodeSystemId;
use spia_validate::{CodeValidators, UnitExpressionValidator, is_valid_loinc, is_valid_snomed};

struct RejectEverything;

impl UnitExpressionValidator for RejectEverything {
    fn validate(&self, expression: &str) -> Option<String> {
        Some(format!("rejected {expression}"))
    }
}

#[test]
fn dispatches_by_code_system() {
    let validators = CodeValidators::default();
    assert!(validators.is_valid(CodeSystemId::Loinc, "26924-1"));
    assert!(!validators.is_valid(CodeSystemId::Loinc, "21433011000036107"));
    assert!(validators.is_valid(CodeSystemId::Snomed, "21433011000036107"));
    assert!(!validators.is_valid(CodeSystemId::Snomed, "26924-1"));
}

#[test]
fn injected_unit_validator_is_used() {
    let validators = CodeValidators::new(Arc::new(RejectEverything));
    assert!(!validators.is_valid(CodeSystemId::Ucum, "mg/L"));
    assert_eq!(validators.parse_units("No unit"), Ok(Vec::new()));
    assert!(validators.parse_units("mg/L").is_err());
}

proptest! {
    #[test]
    fn loinc_accepts_exactly_one_check_digit(body in "[0-9]{1,7}") {
        let valid: Vec<u32> = (0..10)
            .filter(|digit| is_valid_loinc(&format!("{body}-{digit}")))
            .collect();
        prop_assert_eq!(valid.len(), 1);
    }

    #[test]
    fn snomed_rejects_single_digit_changes(code in prop::sample::select(vec![
        "21433011000036107",
        "54316011000036102",
        "2594011000036109",
        "780701000168107",
    ]), position in 0usize..15, bump in 1u8..10) {
        let mut bytes = code.as_bytes().to_vec();
        let position = position % bytes.len();
        bytes[position] = b'0' + (bytes[position] - b'0' + bump) % 10;
        let mutated = String::from_utf8(bytes).expect("ascii digits");
        prop_assert!(!is_valid_snomed(&mutated));
    }

    #[test]
    fn validators_never_panic(input in "\\PC{0,24}") {
        let _ = is_valid_loinc(&input);
        let _ = is_valid_snomed(&input);
    }
}
