//! Reference set parsing against in-memory sheets.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};

use spia_ingest::{
    Cell, IngestError, ParseContext, ParserState, RefsetParser, Sheet, SheetLayout,
};
use spia_model::{
    CellKind, CodeSystemId, CombiningResultsFlag, RefsetDomain, SheetError,
};
use spia_terminology::{TerminologyEnricher, TerminologyService};
use spia_validate::{CodeValidators, UnitExpressionValidator};

/// Accepts only the listed unit expressions.
struct KnownUnits(&'static [&'static str]);

impl UnitExpressionValidator for KnownUnits {
    fn validate(&self, expression: &str) -> Option<String> {
        if self.0.contains(&expression) {
            None
        } else {
            Some(format!("unknown unit '{expression}'"))
        }
    }
}

fn validators() -> CodeValidators {
    CodeValidators::new(Arc::new(KnownUnits(&["g/L", "mmol/L", "mg/dL", "10*9/L"])))
}

fn offline_context() -> ParseContext {
    ParseContext {
        validators: validators(),
        ..ParseContext::default()
    }
}

/// Displays by code; inactive codes are reported through `$lookup`.
#[derive(Default)]
struct StubServer {
    displays: BTreeMap<String, String>,
    inactive: Vec<String>,
}

impl StubServer {
    fn code_of(parameters: &Value) -> String {
        parameters["parameter"]
            .as_array()
            .expect("parameters")
            .iter()
            .find(|p| p["name"] == "code")
            .and_then(|p| p["valueCode"].as_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl TerminologyService for StubServer {
    fn batch(&self, bundle: &Value) -> spia_terminology::Result<Value> {
        let entries: Vec<Value> = bundle["entry"]
            .as_array()
            .expect("entries")
            .iter()
            .map(|entry| {
                let code = Self::code_of(&entry["resource"]);
                match self.displays.get(&code) {
                    Some(display) => json!({
                        "resource": {
                            "resourceType": "Parameters",
                            "parameter": [{ "name": "display", "valueString": display }]
                        },
                        "response": { "status": "200 OK" }
                    }),
                    None => json!({
                        "resource": {
                            "resourceType": "OperationOutcome",
                            "issue": [{ "severity": "error", "diagnostics": "Unknown code" }]
                        },
                        "response": { "status": "404 Not Found" }
                    }),
                }
            })
            .collect();
        Ok(json!({ "resourceType": "Bundle", "type": "batch-response", "entry": entries }))
    }

    fn lookup(&self, parameters: &Value) -> spia_terminology::Result<Value> {
        let inactive = self.inactive.contains(&Self::code_of(parameters));
        Ok(json!({
            "resourceType": "Parameters",
            "parameter": [{
                "name": "property",
                "part": [
                    { "name": "code", "valueCode": "inactive" },
                    { "name": "value", "valueBoolean": inactive }
                ]
            }]
        }))
    }
}

fn header(layout: &SheetLayout) -> Vec<Cell> {
    layout.headers.iter().map(|h| Cell::from(*h)).collect()
}

/// A row `width` cells wide with the given cells set.
fn row(width: usize, cells: &[(usize, Cell)]) -> Vec<Cell> {
    let mut row = vec![Cell::Empty; width];
    for (column, cell) in cells {
        row[*column] = cell.clone();
    }
    row
}

fn haematology_row(term: &str, loinc: &str, ucum: &str) -> Vec<Cell> {
    row(
        17,
        &[
            (0, Cell::from(term)),
            (6, Cell::from(ucum)),
            (7, Cell::from(loinc)),
            (15, Cell::Number(3.0)),
        ],
    )
}

fn chemical_row(loinc: &str, ucum: &str, flag: &str) -> Vec<Cell> {
    row(
        20,
        &[
            (0, Cell::from("Glucose")),
            (1, Cell::from("Sugar; Glu")),
            (8, Cell::from(ucum)),
            (9, Cell::from(loinc)),
            (10, Cell::from("Glucose")),
            (16, Cell::from("Glucose [Moles/volume] in Serum or Plasma")),
            (17, Cell::from(flag)),
        ],
    )
}

fn parse(
    context: &ParseContext,
    layout: &SheetLayout,
    rows: Vec<Vec<Cell>>,
) -> Result<spia_ingest::ParsedRefset, IngestError> {
    let sheet = Sheet::new(layout.sheet_name, rows);
    context.parser(layout).parse(&sheet)
}

#[test]
fn valid_rows_are_kept_in_order_and_bad_rows_skipped() {
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
    let rows = vec![
        header(&layout),
        haematology_row("Haemoglobin", "718-7", "g/L"),
        vec![Cell::Empty; 17],
        haematology_row("No code", "", "g/L"),
        haematology_row("Bad check digit", "718-6", "g/L"),
        haematology_row("Cross match", "2951-2", "mmol/L"),
        haematology_row("Haematocrit", "789-8", "10*9/L"),
    ];

    let parsed = parse(&offline_context(), &layout, rows).expect("parse");

    let codes: Vec<&str> = parsed
        .entries
        .iter()
        .filter_map(|entry| entry.code.as_deref())
        .collect();
    assert_eq!(codes, vec!["718-7", "789-8"]);
    assert_eq!(parsed.entries[0].preferred_term.as_deref(), Some("Haemoglobin"));
    assert_eq!(parsed.entries[0].unit_codes, vec!["g/L"]);
    assert_eq!(parsed.entries[0].version, Some(3.0));

    let summary = &parsed.summary;
    assert_eq!(summary.rows_read, 5);
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.skipped_blank, 1);
    assert_eq!(summary.skipped_invalid, 1);
    assert_eq!(summary.skipped_excluded, 1);
}

#[test]
fn header_mismatch_fails_before_any_row() {
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
    let mut bad_header = header(&layout);
    bad_header[0] = Cell::from("Preferred term");
    let sheet = Sheet::new(
        layout.sheet_name,
        vec![bad_header, haematology_row("Haemoglobin", "718-7", "g/L")],
    );
    let context = offline_context();
    let mut parser = context.parser(&layout);

    let error = parser.parse(&sheet).expect_err("schema mismatch");

    assert_eq!(parser.state(), ParserState::Failed);
    match error {
        IngestError::Sheet {
            domain,
            source: SheetError::SchemaMismatch { sheet, actual, .. },
        } => {
            assert_eq!(domain, RefsetDomain::Haematology);
            assert_eq!(sheet, "Terminology for Haematology");
            assert_eq!(actual[0], "Preferred term");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn successful_parse_ends_done() {
    let layout = SheetLayout::for_domain(RefsetDomain::Immunopathology);
    let sheet = Sheet::new(layout.sheet_name, vec![header(&layout)]);
    let context = offline_context();
    let mut parser = context.parser(&layout);
    assert_eq!(parser.state(), ParserState::ExpectHeader);

    let parsed = parser.parse(&sheet).expect("parse");

    assert!(parsed.entries.is_empty());
    assert_eq!(parser.state(), ParserState::Done);
}

#[test]
fn number_in_text_column_is_fatal() {
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
    let mut bad = haematology_row("Haemoglobin", "718-7", "g/L");
    bad[2] = Cell::Number(12.0);
    let sheet = Sheet::new(layout.sheet_name, vec![header(&layout), bad]);
    let context = offline_context();
    let mut parser = context.parser(&layout);

    let error = parser.parse(&sheet).expect_err("wrong cell type");

    assert_eq!(parser.state(), ParserState::ParsingRows);
    match error {
        IngestError::Sheet {
            source:
                SheetError::WrongCellType {
                    row,
                    column,
                    expected,
                    actual,
                },
            ..
        } => {
            assert_eq!((row, column), (1, 2));
            assert_eq!(expected, CellKind::String);
            assert_eq!(actual, CellKind::Number);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_cell_type_is_fatal_even_with_blank_code() {
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
    let mut bad = haematology_row("Haemoglobin", "", "g/L");
    bad[0] = Cell::Number(42.0);

    let error = parse(&offline_context(), &layout, vec![header(&layout), bad])
        .expect_err("wrong cell type");

    assert!(matches!(
        error,
        IngestError::Sheet {
            source: SheetError::WrongCellType {
                row: 1,
                column: 0,
                expected: CellKind::String,
                actual: CellKind::Number,
            },
            ..
        }
    ));
}

#[test]
fn unknown_flag_is_fatal_even_with_invalid_code() {
    let layout = SheetLayout::for_domain(RefsetDomain::ChemicalPathology);
    let rows = vec![
        header(&layout),
        chemical_row("2345-7", "mmol/L", "red"),
        chemical_row("2345-6", "mmol/L", "amber"),
    ];

    let error = parse(&offline_context(), &layout, rows).expect_err("unknown flag");

    match error {
        IngestError::Sheet {
            domain,
            source: SheetError::UnknownFlag { row, column, value },
        } => {
            assert_eq!(domain, RefsetDomain::ChemicalPathology);
            assert_eq!((row, column), (2, 17));
            assert_eq!(value, "amber");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn combining_flags_resolve_and_unknown_values_are_fatal() {
    let layout = SheetLayout::for_domain(RefsetDomain::ChemicalPathology);
    let context = offline_context();

    let parsed = parse(
        &context,
        &layout,
        vec![
            header(&layout),
            chemical_row("2345-7", "mmol/L", "Red"),
            chemical_row("2823-3", "mmol/L", ""),
        ],
    )
    .expect("parse");
    assert_eq!(
        parsed.entries[0].combining_results_flag,
        Some(CombiningResultsFlag::Red)
    );
    assert_eq!(parsed.entries[1].combining_results_flag, None);
    let synonyms: Vec<&str> = parsed.entries[0].synonyms.iter().map(String::as_str).collect();
    assert_eq!(synonyms, vec!["Glu", "Sugar"]);
    let axes = parsed.entries[0].loinc.as_ref().expect("axes");
    assert_eq!(axes.component.as_deref(), Some("Glucose"));

    let error = parse(
        &context,
        &layout,
        vec![header(&layout), chemical_row("2345-7", "mmol/L", "Purple")],
    )
    .expect_err("unknown flag");
    assert!(matches!(
        error,
        IngestError::Sheet {
            source: SheetError::UnknownFlag { row: 1, column: 17, .. },
            ..
        }
    ));
}

#[test]
fn invalid_unit_drops_units_but_keeps_row() {
    let layout = SheetLayout::for_domain(RefsetDomain::ChemicalPathology);
    let parsed = parse(
        &offline_context(),
        &layout,
        vec![
            header(&layout),
            chemical_row("2345-7", "mmol/L; furlongs", "Green"),
            chemical_row("2823-3", "mmol/L;mg/dL;mmol/L", "Green"),
        ],
    )
    .expect("parse");

    assert_eq!(parsed.entries.len(), 2);
    assert!(parsed.entries[0].unit_codes.is_empty());
    assert_eq!(parsed.entries[1].unit_codes, vec!["mmol/L", "mg/dL"]);
    assert_eq!(parsed.summary.warnings, 1);
}

#[test]
fn organism_codes_are_the_first_digit_run() {
    let layout = SheetLayout::for_domain(RefsetDomain::MicrobiologyOrganisms);
    let parsed = parse(
        &offline_context(),
        &layout,
        vec![
            header(&layout),
            row(4, &[(0, Cell::from("Staphylococcus aureus")), (1, Cell::from("3092008 | Staphylococcus aureus (organism)"))]),
            row(4, &[(0, Cell::from("Unmapped")), (1, Cell::from("see notes"))]),
        ],
    )
    .expect("parse");

    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.entries[0].code.as_deref(), Some("3092008"));
    assert_eq!(parsed.summary.skipped_invalid, 1);
}

#[test]
fn preferred_units_validate_their_ucum_code() {
    let layout = SheetLayout::for_domain(RefsetDomain::PreferredUnits);
    let parsed = parse(
        &offline_context(),
        &layout,
        vec![
            header(&layout),
            row(3, &[(0, Cell::from("grams per litre")), (1, Cell::from("g/L")), (2, Cell::from("g/L"))]),
            row(3, &[(0, Cell::from("nonsense")), (1, Cell::from("x")), (2, Cell::from("furlongs"))]),
        ],
    )
    .expect("parse");

    assert_eq!(parsed.entries.len(), 1);
    let entry = &parsed.entries[0];
    assert_eq!(entry.code.as_deref(), Some("g/L"));
    assert_eq!(entry.description.as_deref(), Some("grams per litre"));
    assert_eq!(parsed.summary.skipped_invalid, 1);
}

#[test]
fn displays_are_attached_after_parsing() {
    let server = StubServer {
        displays: [
            ("718-7", "Hemoglobin [Mass/volume] in Blood"),
            ("g/L", "gram per liter"),
        ]
        .into_iter()
        .map(|(code, display)| (code.to_string(), display.to_string()))
        .collect(),
        ..StubServer::default()
    };
    let context = ParseContext {
        validators: validators(),
        enricher: Some(TerminologyEnricher::new(Arc::new(server))),
        ..ParseContext::default()
    };
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);

    let parsed = parse(
        &context,
        &layout,
        vec![
            header(&layout),
            haematology_row("Haemoglobin", "718-7", "g/L"),
            haematology_row("Haematocrit", "789-8", "mmol/L"),
        ],
    )
    .expect("parse");

    assert_eq!(
        parsed.entries[0].native_display.as_deref(),
        Some("Hemoglobin [Mass/volume] in Blood")
    );
    assert_eq!(parsed.entries[0].unit_display(0), Some("gram per liter"));
    assert_eq!(parsed.entries[1].native_display, None);
    assert_eq!(parsed.entries[1].unit_display(0), None);
}

#[test]
fn inactive_codes_are_skipped_when_checked() {
    let server = Arc::new(StubServer {
        inactive: vec!["789-8".to_string()],
        ..StubServer::default()
    });
    let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
    let rows = vec![
        header(&layout),
        haematology_row("Haemoglobin", "718-7", "g/L"),
        haematology_row("Haematocrit", "789-8", "g/L"),
    ];
    let enricher = TerminologyEnricher::new(server);

    let mut checked = ParseContext {
        validators: validators(),
        enricher: Some(enricher.clone()),
        check_active: true,
        ..ParseContext::default()
    };
    let parsed = parse(&checked, &layout, rows.clone()).expect("parse");
    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.summary.skipped_inactive, 1);

    checked.check_active = false;
    let parsed = parse(&checked, &layout, rows).expect("parse");
    assert_eq!(parsed.entries.len(), 2);
}

#[test]
fn explicit_parser_without_enricher_never_calls_out() {
    let layout = SheetLayout::for_domain(RefsetDomain::Requesting);
    let validators = validators();
    let flags = spia_ingest::FlagVocabulary::default();
    let sheet = Sheet::new(
        layout.sheet_name,
        vec![
            header(&layout),
            row(8, &[(0, Cell::from("Full blood count")), (5, Cell::from("26604007 | Full blood count (procedure)"))]),
        ],
    );

    let parsed = RefsetParser::new(&layout, &validators, &flags)
        .parse(&sheet)
        .expect("parse");

    assert_eq!(parsed.entries[0].code.as_deref(), Some("26604007"));
    assert_eq!(parsed.entries[0].native_display, None);
    assert_eq!(layout.code.system, CodeSystemId::Snomed);
}
