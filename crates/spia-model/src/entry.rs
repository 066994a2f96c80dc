//! Reference set entries.
//!
//! A [`RefsetEntry`] is one data row of a reference set sheet after cell
//! extraction and code validation. Entries are built once by the parser and
//! only grow display text through the consuming `with_*` transforms used by
//! terminology enrichment; downstream assembly borrows them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Harmonisation status of a chemical pathology test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombiningResultsFlag {
    Red,
    Green,
    Orange,
}

impl CombiningResultsFlag {
    pub const ALL: [CombiningResultsFlag; 3] = [Self::Red, Self::Orange, Self::Green];

    /// Code within the combining results flag code system.
    pub fn code(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Orange => "orange",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Orange => "Orange",
        }
    }

    pub fn definition(self) -> &'static str {
        match self {
            Self::Red => "This test is known to be unsafe to make comparisons",
            Self::Orange => {
                "This test has either not yet been considered or there is uncertainty around comparisons"
            }
            Self::Green => "This test is considered safe to combine if harmonised",
        }
    }
}

impl fmt::Display for CombiningResultsFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The six LOINC axes plus the long common name, as published in the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoincAxes {
    pub component: Option<String>,
    pub property: Option<String>,
    pub timing: Option<String>,
    pub system: Option<String>,
    pub scale: Option<String>,
    pub method: Option<String>,
    pub long_name: Option<String>,
}

impl LoincAxes {
    pub fn is_empty(&self) -> bool {
        [
            &self.component,
            &self.property,
            &self.timing,
            &self.system,
            &self.scale,
            &self.method,
            &self.long_name,
        ]
        .iter()
        .all(|value| value.is_none())
    }
}

/// A single row of a SPIA reference set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefsetEntry {
    /// Source code (LOINC, SNOMED CT-AU or UCUM depending on the reference set).
    pub code: Option<String>,
    pub preferred_term: Option<String>,
    pub synonyms: BTreeSet<String>,
    /// Display text reported by the terminology server for `code`.
    pub native_display: Option<String>,
    /// UCUM codes in sheet order without duplicates.
    pub unit_codes: Vec<String>,
    /// Server display for each unit code, aligned with `unit_codes`.
    pub unit_displays: Vec<Option<String>>,
    pub combining_results_flag: Option<CombiningResultsFlag>,
    pub version: Option<f64>,
    pub history: Option<String>,
    pub usage_guidance: Option<String>,
    pub specimen: Option<String>,
    /// Free-text RCPA unit label.
    pub rcpa_unit: Option<String>,
    /// Free-text description (preferred units only).
    pub description: Option<String>,
    pub loinc: Option<LoincAxes>,
}

impl RefsetEntry {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_preferred_term(mut self, term: Option<String>) -> Self {
        self.preferred_term = term;
        self
    }

    #[must_use]
    pub fn with_synonyms<I>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.synonyms = synonyms.into_iter().collect();
        self
    }

    /// Replaces the unit codes, dropping repeats while keeping first-seen order.
    #[must_use]
    pub fn with_unit_codes<I>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = BTreeSet::new();
        self.unit_codes = units
            .into_iter()
            .filter(|unit| seen.insert(unit.clone()))
            .collect();
        self.unit_displays.clear();
        self
    }

    #[must_use]
    pub fn with_native_display(mut self, display: Option<String>) -> Self {
        self.native_display = display;
        self
    }

    /// Attaches unit displays. Extra displays are ignored and missing ones are
    /// recorded as `None`, so the result always aligns with `unit_codes`.
    #[must_use]
    pub fn with_unit_displays(mut self, displays: Vec<Option<String>>) -> Self {
        let count = self.unit_codes.len();
        self.unit_displays = displays
            .into_iter()
            .chain(std::iter::repeat(None))
            .take(count)
            .collect();
        self
    }

    pub fn has_code(&self) -> bool {
        self.code.as_deref().is_some_and(|code| !code.is_empty())
    }

    /// Display for the unit at `index`, if the server provided one.
    pub fn unit_display(&self, index: usize) -> Option<&str> {
        self.unit_displays.get(index).and_then(|d| d.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_codes_deduplicate_in_order() {
        let entry = RefsetEntry::new("2345-7").with_unit_codes(
            ["mmol/L", "mg/dL", "mmol/L"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(entry.unit_codes, vec!["mmol/L", "mg/dL"]);
    }

    #[test]
    fn unit_displays_align_with_codes() {
        let entry = RefsetEntry::new("2345-7")
            .with_unit_codes(["mmol/L".to_string(), "mg/dL".to_string()])
            .with_unit_displays(vec![Some("millimole per liter".to_string())]);
        assert_eq!(entry.unit_displays.len(), 2);
        assert_eq!(entry.unit_display(0), Some("millimole per liter"));
        assert_eq!(entry.unit_display(1), None);
    }

    #[test]
    fn blank_code_is_not_a_code() {
        let entry = RefsetEntry {
            code: Some(String::new()),
            ..RefsetEntry::default()
        };
        assert!(!entry.has_code());
        assert!(RefsetEntry::new("26924-1").has_code());
    }

    #[test]
    fn flag_codes_are_lowercase() {
        let codes: Vec<&str> = CombiningResultsFlag::ALL
            .iter()
            .map(|flag| flag.code())
            .collect();
        assert_eq!(codes, vec!["red", "orange", "green"]);
    }
}
