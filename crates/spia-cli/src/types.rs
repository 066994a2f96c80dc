use std::path::PathBuf;

use spia_model::ParseSummary;
use spia_report::{ArtifactAudit, WrittenOutputs};
use spia_transform::TargetSchema;

/// Inputs of one `transform` run after config and flags are merged.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub archive: PathBuf,
    pub output_dir: PathBuf,
    /// Restrict the run to these reference sets; empty means all.
    pub domains: Vec<spia_model::RefsetDomain>,
    pub parallel: bool,
    pub offline: bool,
    pub check_active: bool,
    pub audit: bool,
}

/// Outcome of one `transform` run.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub target: TargetSchema,
    pub sha256: String,
    pub refsets: Vec<ParseSummary>,
    pub artifacts: Vec<ArtifactAudit>,
    pub outputs: WrittenOutputs,
    pub audit: Option<PathBuf>,
}

impl TransformResult {
    pub fn total_entries(&self) -> usize {
        self.refsets.iter().map(|summary| summary.entries).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.refsets.iter().map(ParseSummary::skipped).sum()
    }
}
