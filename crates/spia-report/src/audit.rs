//! Run audit report.
//!
//! Records what was read (distribution digest, per-reference-set row
//! accounting) and what was produced, as one JSON document.

use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use spia_model::ParseSummary;
use spia_transform::{BuiltArtifact, TargetSchema};

use crate::output::write_json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionAudit {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactAudit {
    pub resource_type: String,
    pub id: String,
    pub url: String,
    /// Concepts, mapping elements or code system concepts.
    pub items: usize,
}

impl From<&BuiltArtifact> for ArtifactAudit {
    fn from(artifact: &BuiltArtifact) -> Self {
        Self {
            resource_type: artifact.publication.kind.resource_type().to_string(),
            id: artifact.publication.id(),
            url: artifact.publication.url(),
            items: artifact.content.item_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub generated_at: String,
    pub tool_version: String,
    pub target: TargetSchema,
    pub distribution: DistributionAudit,
    pub refsets: Vec<ParseSummary>,
    pub artifacts: Vec<ArtifactAudit>,
}

impl AuditReport {
    pub fn new(
        distribution: DistributionAudit,
        target: TargetSchema,
        refsets: Vec<ParseSummary>,
        artifacts: &[BuiltArtifact],
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            target,
            distribution,
            refsets,
            artifacts: artifacts.iter().map(ArtifactAudit::from).collect(),
        }
    }

    pub fn total_entries(&self) -> usize {
        self.refsets.iter().map(|summary| summary.entries).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.refsets.iter().map(ParseSummary::skipped).sum()
    }
}

pub fn write_audit(path: &Path, report: &AuditReport) -> Result<()> {
    write_json(path, report)?;
    tracing::info!(path = %path.display(), "wrote audit report");
    Ok(())
}
