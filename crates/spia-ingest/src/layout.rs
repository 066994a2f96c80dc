//! Sheet layouts of the SPIA reference sets.
//!
//! Each reference set differs only in sheet name, header row and which
//! columns hold which fields. That variation is data: one [`SheetLayout`]
//! per [`RefsetDomain`], consumed by a single parser.

use spia_model::{CodeSystemId, RefsetDomain};

/// Zero-based row holding the column headers.
pub const HEADER_ROW: usize = 0;

const REQUESTING_HEADERS: &[&str] = &[
    "RCPA Preferred term",
    "RCPA Synonyms",
    "Usage guidance",
    "Length",
    "Specimen",
    "Terminology binding (SNOMED CT-AU)",
    "Version",
    "History",
];

const CHEMICAL_HEADERS: &[&str] = &[
    "RCPA Preferred term",
    "RCPA Synonyms",
    "Usage guidance",
    "Subgroup_1",
    "Subgroup_2",
    "Length",
    "Specimen",
    "Unit",
    "UCUM",
    "LOINC",
    "Component",
    "Property",
    "Timing",
    "System",
    "Scale",
    "Method",
    "LongName",
    "Combining Results Flag",
    "Version",
    "History",
];

/// Shared by haematology and immunopathology.
const LABORATORY_HEADERS: &[&str] = &[
    "RCPA Preferred term",
    "RCPA Synonyms",
    "Usage guidance",
    "Length",
    "Specimen",
    "Unit",
    "UCUM",
    "LOINC",
    "Component",
    "Property",
    "Timing",
    "System",
    "Scale",
    "Method",
    "LongName",
    "Version",
    "History",
];

const MICRO_SERO_HEADERS: &[&str] = &[
    "RCPA Preferred term",
    "RCPA Synonyms",
    "Usage guidance",
    "Length",
    "Specimen",
    "DURATION",
    "Unit",
    "UCUM",
    "LOINC",
    "Component",
    "Property",
    "Timing",
    "System",
    "Scale",
    "Method",
    "LongName",
    "Version",
    "History",
];

const ORGANISM_HEADERS: &[&str] = &[
    "RCPA Preferred Organism name",
    "Terminology binding (SNOMED CT-AU)",
    "Version",
    "History",
];

// "Preferred Display " carries a trailing space in the published workbook.
const PREFERRED_UNIT_HEADERS: &[&str] = &["Description", "Preferred Display ", "UCUM Unit"];

/// How the mandatory code is embedded in its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCell {
    /// The whole cell is the code.
    Plain,
    /// `<code> | <term>`: the text before the first `|`.
    BeforePipe,
    /// The first run of ASCII digits.
    FirstDigitRun,
}

impl CodeCell {
    /// Extracts the code from cleaned cell text.
    pub fn extract(self, text: &str) -> Option<String> {
        let code = match self {
            Self::Plain => text.trim(),
            Self::BeforePipe => text.split('|').next().unwrap_or_default().trim(),
            Self::FirstDigitRun => {
                let start = text.find(|c: char| c.is_ascii_digit())?;
                let rest = &text[start..];
                let end = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                &rest[..end]
            }
        };
        if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        }
    }
}

/// Column of the mandatory code and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeColumn {
    pub column: usize,
    pub system: CodeSystemId,
    pub cell: CodeCell,
}

/// Optional field columns. `loinc_axes` is the first of seven consecutive
/// columns: component, property, timing, system, scale, method, long name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldColumns {
    pub preferred_term: Option<usize>,
    pub synonyms: Option<usize>,
    pub usage_guidance: Option<usize>,
    pub specimen: Option<usize>,
    pub rcpa_unit: Option<usize>,
    pub ucum_units: Option<usize>,
    pub loinc_axes: Option<usize>,
    pub combining_results_flag: Option<usize>,
    pub description: Option<usize>,
    pub version: Option<usize>,
    pub history: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub domain: RefsetDomain,
    pub sheet_name: &'static str,
    pub headers: &'static [&'static str],
    pub code: CodeColumn,
    pub fields: FieldColumns,
    /// Rows whose preferred term equals one of these are dropped.
    pub excluded_preferred_terms: Vec<String>,
}

impl SheetLayout {
    /// Published layout of the reference set workbook for `domain`.
    pub fn for_domain(domain: RefsetDomain) -> Self {
        match domain {
            RefsetDomain::Requesting => Self {
                domain,
                sheet_name: "Terminology for Requesting Path",
                headers: REQUESTING_HEADERS,
                code: CodeColumn {
                    column: 5,
                    system: CodeSystemId::Snomed,
                    cell: CodeCell::BeforePipe,
                },
                fields: FieldColumns {
                    preferred_term: Some(0),
                    synonyms: Some(1),
                    usage_guidance: Some(2),
                    specimen: Some(4),
                    version: Some(6),
                    history: Some(7),
                    ..FieldColumns::default()
                },
                excluded_preferred_terms: Vec::new(),
            },
            RefsetDomain::ChemicalPathology => Self {
                domain,
                sheet_name: "Chemical Pathology Terms v3.1",
                headers: CHEMICAL_HEADERS,
                code: loinc_code(9),
                fields: FieldColumns {
                    preferred_term: Some(0),
                    synonyms: Some(1),
                    usage_guidance: Some(2),
                    specimen: Some(6),
                    rcpa_unit: Some(7),
                    ucum_units: Some(8),
                    loinc_axes: Some(10),
                    combining_results_flag: Some(17),
                    version: Some(18),
                    history: Some(19),
                    ..FieldColumns::default()
                },
                excluded_preferred_terms: Vec::new(),
            },
            RefsetDomain::Haematology => Self {
                domain,
                sheet_name: "Terminology for Haematology",
                headers: LABORATORY_HEADERS,
                code: loinc_code(7),
                fields: laboratory_fields(),
                excluded_preferred_terms: vec!["Cross match".to_string()],
            },
            RefsetDomain::Immunopathology => Self {
                domain,
                sheet_name: "Terminology for Immunopathology",
                headers: LABORATORY_HEADERS,
                code: loinc_code(7),
                fields: laboratory_fields(),
                excluded_preferred_terms: Vec::new(),
            },
            RefsetDomain::MicrobiologySerologyMolecular => Self {
                domain,
                sheet_name: "Terminology Micro Sero Molecul",
                headers: MICRO_SERO_HEADERS,
                code: loinc_code(8),
                fields: FieldColumns {
                    preferred_term: Some(0),
                    synonyms: Some(1),
                    usage_guidance: Some(2),
                    specimen: Some(4),
                    rcpa_unit: Some(6),
                    ucum_units: Some(7),
                    loinc_axes: Some(9),
                    version: Some(16),
                    history: Some(17),
                    ..FieldColumns::default()
                },
                excluded_preferred_terms: Vec::new(),
            },
            RefsetDomain::MicrobiologyOrganisms => Self {
                domain,
                sheet_name: "Organisms mapped to SNOMED",
                headers: ORGANISM_HEADERS,
                code: CodeColumn {
                    column: 1,
                    system: CodeSystemId::Snomed,
                    cell: CodeCell::FirstDigitRun,
                },
                fields: FieldColumns {
                    preferred_term: Some(0),
                    version: Some(2),
                    history: Some(3),
                    ..FieldColumns::default()
                },
                excluded_preferred_terms: Vec::new(),
            },
            RefsetDomain::PreferredUnits => Self {
                domain,
                sheet_name: "Preferred units display",
                headers: PREFERRED_UNIT_HEADERS,
                code: CodeColumn {
                    column: 2,
                    system: CodeSystemId::Ucum,
                    cell: CodeCell::Plain,
                },
                fields: FieldColumns {
                    description: Some(0),
                    preferred_term: Some(1),
                    ..FieldColumns::default()
                },
                excluded_preferred_terms: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn with_excluded_preferred_terms(mut self, terms: Vec<String>) -> Self {
        self.excluded_preferred_terms = terms;
        self
    }

    pub fn is_excluded(&self, preferred_term: Option<&str>) -> bool {
        preferred_term.is_some_and(|term| {
            self.excluded_preferred_terms
                .iter()
                .any(|excluded| excluded == term)
        })
    }
}

fn loinc_code(column: usize) -> CodeColumn {
    CodeColumn {
        column,
        system: CodeSystemId::Loinc,
        cell: CodeCell::Plain,
    }
}

fn laboratory_fields() -> FieldColumns {
    FieldColumns {
        preferred_term: Some(0),
        synonyms: Some(1),
        usage_guidance: Some(2),
        specimen: Some(4),
        rcpa_unit: Some(5),
        ucum_units: Some(6),
        loinc_axes: Some(8),
        version: Some(15),
        history: Some(16),
        ..FieldColumns::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_cell_styles() {
        assert_eq!(
            CodeCell::BeforePipe.extract("26604007 | Full blood count"),
            Some("26604007".to_string())
        );
        assert_eq!(
            CodeCell::FirstDigitRun.extract("Escherichia coli (112283007)"),
            Some("112283007".to_string())
        );
        assert_eq!(CodeCell::FirstDigitRun.extract("no digits"), None);
        assert_eq!(CodeCell::BeforePipe.extract(" | term"), None);
        assert_eq!(CodeCell::Plain.extract("26924-1"), Some("26924-1".to_string()));
    }

    #[test]
    fn layouts_point_inside_their_headers() {
        for domain in RefsetDomain::ALL {
            let layout = SheetLayout::for_domain(domain);
            let width = layout.headers.len();
            assert!(layout.code.column < width, "{domain} code column");
            assert_eq!(layout.code.system, domain.code_system());
            let fields = layout.fields;
            for column in [
                fields.preferred_term,
                fields.synonyms,
                fields.usage_guidance,
                fields.specimen,
                fields.rcpa_unit,
                fields.ucum_units,
                fields.combining_results_flag,
                fields.description,
                fields.version,
                fields.history,
            ]
            .into_iter()
            .flatten()
            {
                assert!(column < width, "{domain} column {column}");
            }
            if let Some(start) = fields.loinc_axes {
                assert_eq!(layout.headers[start], "Component");
                assert_eq!(layout.headers[start + 6], "LongName");
            }
            assert_eq!(fields.ucum_units.is_some(), domain.has_units());
        }
    }

    #[test]
    fn named_columns_match_headers() {
        let chemical = SheetLayout::for_domain(RefsetDomain::ChemicalPathology);
        assert_eq!(chemical.headers[chemical.code.column], "LOINC");
        assert_eq!(chemical.headers[8], "UCUM");
        assert_eq!(chemical.headers[17], "Combining Results Flag");
        let micro = SheetLayout::for_domain(RefsetDomain::MicrobiologySerologyMolecular);
        assert_eq!(micro.headers[micro.code.column], "LOINC");
        assert_eq!(micro.headers[5], "DURATION");
    }

    #[test]
    fn haematology_excludes_cross_match() {
        let layout = SheetLayout::for_domain(RefsetDomain::Haematology);
        assert!(layout.is_excluded(Some("Cross match")));
        assert!(!layout.is_excluded(Some("Haemoglobin")));
        assert!(!layout.is_excluded(None));
    }
}
