use serde::{Deserialize, Serialize};

use crate::domain::RefsetDomain;
use crate::error::{InvalidReason, RowError};

/// Per-reference-set row accounting for audit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    pub domain: RefsetDomain,
    /// Data rows examined after the header.
    pub rows_read: usize,
    /// Entries produced.
    pub entries: usize,
    pub skipped_blank: usize,
    pub skipped_invalid: usize,
    pub skipped_inactive: usize,
    /// Rows dropped by configuration (for example excluded preferred terms).
    pub skipped_excluded: usize,
    /// Warnings that did not skip a row (trimmed cells, dropped units).
    pub warnings: usize,
}

impl ParseSummary {
    pub fn new(domain: RefsetDomain) -> Self {
        Self {
            domain,
            rows_read: 0,
            entries: 0,
            skipped_blank: 0,
            skipped_invalid: 0,
            skipped_inactive: 0,
            skipped_excluded: 0,
            warnings: 0,
        }
    }

    pub fn record_skip(&mut self, error: &RowError) {
        match error {
            RowError::BlankMandatoryCode { .. } => self.skipped_blank += 1,
            RowError::InvalidCode {
                reason: InvalidReason::Structure,
                ..
            } => self.skipped_invalid += 1,
            RowError::InvalidCode {
                reason: InvalidReason::Inactive,
                ..
            } => self.skipped_inactive += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_blank + self.skipped_invalid + self.skipped_inactive + self.skipped_excluded
    }
}
