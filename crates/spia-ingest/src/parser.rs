//! Reference set parser.
//!
//! One parser handles every reference set, driven by its [`SheetLayout`].
//! The header row is checked before any data row is read; a mismatch, a
//! cell of the wrong type or an unknown flag aborts the sheet. Rows with a
//! blank or invalid mandatory code are logged, counted and skipped. Once all
//! rows are read, displays are fetched in one batch per code system.

use std::time::Instant;

use spia_model::{
    CodeSystemId, InvalidReason, LoincAxes, ParseSummary, RefsetDomain, RefsetEntry, RowError,
    SheetError,
};
use spia_terminology::{ActiveStatusChecker, TerminologyEnricher};
use spia_validate::CodeValidators;

use crate::cells::{get_delimited_set, get_number, get_string, validate_header};
use crate::distribution::Distribution;
use crate::error::{IngestError, Result};
use crate::flags::FlagVocabulary;
use crate::layout::{HEADER_ROW, SheetLayout};
use crate::sheet::{Sheet, load_sheet};

pub const SYNONYM_DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    ExpectHeader,
    ParsingRows,
    Done,
    Failed,
}

/// Entries of one reference set, in sheet row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRefset {
    pub domain: RefsetDomain,
    pub entries: Vec<RefsetEntry>,
    pub summary: ParseSummary,
}

/// Collaborators shared by every reference set of a run.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub validators: CodeValidators,
    pub flags: FlagVocabulary,
    /// Display enrichment; `None` parses offline.
    pub enricher: Option<TerminologyEnricher>,
    /// Reject codes the terminology server reports as inactive.
    pub check_active: bool,
}

impl ParseContext {
    pub fn parser<'a>(&'a self, layout: &'a SheetLayout) -> RefsetParser<'a> {
        let mut parser = RefsetParser::new(layout, &self.validators, &self.flags);
        if let Some(enricher) = &self.enricher {
            parser = parser.with_enricher(enricher);
            if self.check_active {
                parser = parser.with_active_check(enricher);
            }
        }
        parser
    }
}

/// Reads one reference set from an opened distribution.
pub fn read_refset(
    distribution: &Distribution,
    layout: &SheetLayout,
    context: &ParseContext,
) -> Result<ParsedRefset> {
    let span = tracing::info_span!("refset", domain = %layout.domain);
    let _guard = span.enter();
    let bytes = distribution.stream_for(layout.domain)?;
    let sheet = load_sheet(bytes, layout.sheet_name).map_err(|source| IngestError::Sheet {
        domain: layout.domain,
        source,
    })?;
    context.parser(layout).parse(&sheet)
}

/// Parses every layout in order, stopping at the first fatal error.
pub fn read_all(
    distribution: &Distribution,
    layouts: &[SheetLayout],
    context: &ParseContext,
) -> Result<Vec<ParsedRefset>> {
    layouts
        .iter()
        .map(|layout| read_refset(distribution, layout, context))
        .collect()
}

enum RowOutcome {
    Entry(Box<RefsetEntry>),
    Skipped(RowError),
    Excluded,
}

pub struct RefsetParser<'a> {
    layout: &'a SheetLayout,
    validators: &'a CodeValidators,
    flags: &'a FlagVocabulary,
    enricher: Option<&'a TerminologyEnricher>,
    active: Option<&'a dyn ActiveStatusChecker>,
    state: ParserState,
}

impl<'a> RefsetParser<'a> {
    pub fn new(
        layout: &'a SheetLayout,
        validators: &'a CodeValidators,
        flags: &'a FlagVocabulary,
    ) -> Self {
        Self {
            layout,
            validators,
            flags,
            enricher: None,
            active: None,
            state: ParserState::ExpectHeader,
        }
    }

    #[must_use]
    pub fn with_enricher(mut self, enricher: &'a TerminologyEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    #[must_use]
    pub fn with_active_check(mut self, checker: &'a dyn ActiveStatusChecker) -> Self {
        self.active = Some(checker);
        self
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Parses `sheet` from its header row. Each call starts over.
    ///
    /// Only a rejected header leaves the parser `Failed`; a fatal error in
    /// a data row aborts it in `ParsingRows`.
    pub fn parse(&mut self, sheet: &Sheet) -> Result<ParsedRefset> {
        self.state = ParserState::ExpectHeader;
        let result = self.run(sheet);
        self.state = match (&result, self.state) {
            (Ok(_), _) => ParserState::Done,
            (Err(_), ParserState::ExpectHeader) => ParserState::Failed,
            (Err(_), state) => state,
        };
        result
    }

    fn run(&mut self, sheet: &Sheet) -> Result<ParsedRefset> {
        let domain = self.layout.domain;
        let start = Instant::now();

        validate_header(sheet, HEADER_ROW, self.layout.headers)
            .map_err(|source| IngestError::Sheet { domain, source })?;
        self.state = ParserState::ParsingRows;

        let mut summary = ParseSummary::new(domain);
        let mut entries = Vec::new();
        for row in HEADER_ROW + 1..sheet.row_count() {
            if sheet.is_blank_row(row) {
                continue;
            }
            summary.rows_read += 1;
            match self.parse_row(sheet, row, &mut summary)? {
                RowOutcome::Entry(entry) => entries.push(*entry),
                RowOutcome::Skipped(error) => {
                    tracing::warn!(%domain, "{error}");
                    summary.record_skip(&error);
                }
                RowOutcome::Excluded => {
                    tracing::debug!(%domain, row, "row excluded by preferred term");
                    summary.skipped_excluded += 1;
                }
            }
        }

        let entries = self.enrich(entries)?;
        summary.entries = entries.len();
        tracing::info!(
            %domain,
            rows = summary.rows_read,
            entries = summary.entries,
            skipped = summary.skipped(),
            duration_ms = start.elapsed().as_millis(),
            "reference set parsed"
        );
        Ok(ParsedRefset {
            domain,
            entries,
            summary,
        })
    }

    /// Reads every typed cell of the row before validating the code, so a
    /// wrong cell type or an unknown flag aborts the sheet even on rows
    /// that would be skipped.
    fn parse_row(
        &self,
        sheet: &Sheet,
        row: usize,
        summary: &mut ParseSummary,
    ) -> Result<RowOutcome> {
        let fields = self.layout.fields;
        let cell = |column: Option<usize>| -> Result<Option<String>> {
            match column {
                Some(column) => get_string(sheet, row, column).map_err(|e| self.sheet_error(e)),
                None => Ok(None),
            }
        };

        let code_text = cell(Some(self.layout.code.column))?;
        let preferred_term = cell(fields.preferred_term)?;
        let synonyms = match fields.synonyms {
            Some(column) => get_delimited_set(sheet, row, column, SYNONYM_DELIMITER)
                .map_err(|e| self.sheet_error(e))?,
            None => Default::default(),
        };
        let unit_text = cell(fields.ucum_units)?;
        let combining_results_flag = match fields.combining_results_flag {
            Some(column) => match cell(Some(column))? {
                Some(text) => Some(self.flags.resolve(&text).ok_or_else(|| {
                    self.sheet_error(SheetError::UnknownFlag {
                        row,
                        column,
                        value: text.clone(),
                    })
                })?),
                None => None,
            },
            None => None,
        };
        let loinc = match fields.loinc_axes {
            Some(start) => {
                let axes = LoincAxes {
                    component: cell(Some(start))?,
                    property: cell(Some(start + 1))?,
                    timing: cell(Some(start + 2))?,
                    system: cell(Some(start + 3))?,
                    scale: cell(Some(start + 4))?,
                    method: cell(Some(start + 5))?,
                    long_name: cell(Some(start + 6))?,
                };
                (!axes.is_empty()).then_some(axes)
            }
            None => None,
        };
        let version = match fields.version {
            Some(column) => get_number(sheet, row, column).map_err(|e| self.sheet_error(e))?,
            None => None,
        };
        let history = cell(fields.history)?;
        let usage_guidance = cell(fields.usage_guidance)?;
        let specimen = cell(fields.specimen)?;
        let rcpa_unit = cell(fields.rcpa_unit)?;
        let description = cell(fields.description)?;

        let code = match self.validate_code(code_text, row)? {
            Ok(code) => code,
            Err(error) => return Ok(RowOutcome::Skipped(error)),
        };
        if self.layout.is_excluded(preferred_term.as_deref()) {
            return Ok(RowOutcome::Excluded);
        }
        let units = match fields.ucum_units {
            Some(column) => self.validate_units(unit_text.as_deref(), row, column, summary),
            None => Vec::new(),
        };

        let entry = RefsetEntry {
            code: Some(code),
            preferred_term,
            synonyms,
            combining_results_flag,
            version,
            history,
            usage_guidance,
            specimen,
            rcpa_unit,
            description,
            loinc,
            ..RefsetEntry::default()
        }
        .with_unit_codes(units);
        Ok(RowOutcome::Entry(Box::new(entry)))
    }

    /// Validates the mandatory code. The inner error skips the row.
    fn validate_code(
        &self,
        text: Option<String>,
        row: usize,
    ) -> Result<std::result::Result<String, RowError>> {
        let code_column = self.layout.code;
        let column = code_column.column;
        let system = code_column.system;
        let Some(text) = text else {
            return Ok(Err(RowError::BlankMandatoryCode { row, column }));
        };
        let invalid = |code: String, reason: InvalidReason| RowError::InvalidCode {
            row,
            column,
            code,
            system,
            reason,
        };
        let Some(code) = code_column.cell.extract(&text) else {
            return Ok(Err(invalid(text, InvalidReason::Structure)));
        };
        if !self.validators.is_valid(system, &code) {
            return Ok(Err(invalid(code, InvalidReason::Structure)));
        }
        if let Some(checker) = self.active
            && system != CodeSystemId::Ucum
        {
            let active = checker
                .is_active(system, &code)
                .map_err(|source| IngestError::Terminology {
                    domain: self.layout.domain,
                    source,
                })?;
            if !active {
                return Ok(Err(invalid(code, InvalidReason::Inactive)));
            }
        }
        Ok(Ok(code))
    }

    /// Unit problems never skip the row: the entry is kept without units.
    fn validate_units(
        &self,
        text: Option<&str>,
        row: usize,
        column: usize,
        summary: &mut ParseSummary,
    ) -> Vec<String> {
        let domain = self.layout.domain;
        let Some(text) = text else {
            tracing::warn!(%domain, row, column, "blank unit code");
            summary.warnings += 1;
            return Vec::new();
        };
        match self.validators.parse_units(text) {
            Ok(units) => units,
            Err(error) => {
                tracing::warn!(%domain, row, column, "{error}");
                summary.warnings += 1;
                Vec::new()
            }
        }
    }

    fn enrich(&self, entries: Vec<RefsetEntry>) -> Result<Vec<RefsetEntry>> {
        let Some(enricher) = self.enricher else {
            return Ok(entries);
        };
        let domain = self.layout.domain;
        let terminology = |source| IngestError::Terminology { domain, source };
        let system = self.layout.code.system;
        let entries = if system == CodeSystemId::Ucum {
            entries
        } else {
            enricher.add_displays(entries, system).map_err(terminology)?
        };
        if self.layout.fields.ucum_units.is_some() {
            enricher.add_unit_displays(entries).map_err(terminology)
        } else {
            Ok(entries)
        }
    }

    fn sheet_error(&self, source: SheetError) -> IngestError {
        IngestError::Sheet {
            domain: self.layout.domain,
            source,
        }
    }
}
