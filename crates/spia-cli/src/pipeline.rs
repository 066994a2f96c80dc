//! The `transform` pipeline: archive to FHIR resources.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, info_span};

use spia_ingest::{Distribution, ParseContext, ParsedRefset, SheetLayout, read_all, read_refset};
use spia_report::{
    ArtifactAudit, AuditReport, DistributionAudit, RenderOptions, write_audit, write_fhir_outputs,
};
use spia_terminology::{FhirTerminologyClient, TerminologyEnricher};
use spia_transform::{ArtifactRegistry, AssemblyOptions};
use spia_validate::CodeValidators;

use crate::config::PipelineConfig;
use crate::types::{TransformRequest, TransformResult};

pub const AUDIT_FILE: &str = "spia-audit.json";

pub fn run_transform(config: &PipelineConfig, request: &TransformRequest) -> Result<TransformResult> {
    let run_span = info_span!("transform", archive = %request.archive.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    // =========================================================================
    // Stage 1: Open distribution
    // =========================================================================
    let mut layout = config.distribution.clone();
    if !request.domains.is_empty() {
        layout = layout.retain(&request.domains);
    }
    let distribution = Distribution::open(&request.archive, &layout)
        .with_context(|| format!("open distribution {}", request.archive.display()))?;
    let sheet_layouts: Vec<SheetLayout> = config
        .sheet_layouts()
        .into_iter()
        .filter(|sheet| layout.file_name(sheet.domain).is_some())
        .collect();

    // =========================================================================
    // Stage 2: Parse and enrich reference sets
    // =========================================================================
    let context = parse_context(config, request)?;
    let parsed = parse_refsets(&distribution, &sheet_layouts, &context, request.parallel)?;

    // =========================================================================
    // Stage 3: Assemble artifacts
    // =========================================================================
    let options = AssemblyOptions {
        unit_cardinality: config.unit_cardinality,
    };
    let artifacts = ArtifactRegistry::standard().assemble(
        parsed
            .iter()
            .map(|refset| (refset.domain, refset.entries.as_slice())),
        &options,
    );

    // =========================================================================
    // Stage 4: Render and write
    // =========================================================================
    let render = RenderOptions::new(config.target);
    let outputs = write_fhir_outputs(&request.output_dir, &artifacts, &render)
        .context("write FHIR outputs")?;

    let refsets: Vec<_> = parsed.into_iter().map(|refset| refset.summary).collect();
    let audit = if request.audit {
        let report = AuditReport::new(
            DistributionAudit {
                path: request.archive.display().to_string(),
                sha256: distribution.sha256().to_string(),
            },
            config.target,
            refsets.clone(),
            &artifacts,
        );
        let path = request.output_dir.join(AUDIT_FILE);
        write_audit(&path, &report).context("write audit report")?;
        Some(path)
    } else {
        None
    };

    info!(
        refsets = refsets.len(),
        artifacts = artifacts.len(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );
    Ok(TransformResult {
        target: config.target,
        sha256: distribution.sha256().to_string(),
        refsets,
        artifacts: artifacts.iter().map(ArtifactAudit::from).collect(),
        outputs,
        audit,
    })
}

/// Builds the shared parse collaborators, connecting to the terminology
/// server unless running offline.
pub fn parse_context(config: &PipelineConfig, request: &TransformRequest) -> Result<ParseContext> {
    let enricher = if request.offline {
        info!("offline: skipping terminology enrichment");
        None
    } else {
        let client = FhirTerminologyClient::new(&config.terminology)
            .context("create terminology client")?;
        info!(server = %client.base_url(), "using terminology server");
        Some(TerminologyEnricher::new(Arc::new(client)))
    };
    Ok(ParseContext {
        validators: CodeValidators::default(),
        flags: config.flags.clone(),
        enricher,
        check_active: request.check_active,
    })
}

/// Parses every layout, in layout order regardless of `parallel`.
pub fn parse_refsets(
    distribution: &Distribution,
    layouts: &[SheetLayout],
    context: &ParseContext,
    parallel: bool,
) -> Result<Vec<ParsedRefset>> {
    let start = Instant::now();
    let parsed = if parallel {
        layouts
            .par_iter()
            .map(|layout| read_refset(distribution, layout, context))
            .collect::<spia_ingest::Result<Vec<_>>>()
    } else {
        read_all(distribution, layouts, context)
    }
    .context("parse reference sets")?;
    info!(
        refsets = parsed.len(),
        parallel,
        duration_ms = start.elapsed().as_millis(),
        "parsed reference sets"
    );
    Ok(parsed)
}
