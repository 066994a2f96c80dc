//! Writing rendered resources to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use spia_transform::BuiltArtifact;

use crate::fhir::{RenderOptions, render_bundle, render_resource};

/// Paths written by [`write_fhir_outputs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub bundle: PathBuf,
    pub resources: Vec<PathBuf>,
}

/// File name of the collection Bundle.
pub fn bundle_file_name(options: &RenderOptions) -> String {
    format!("spia-bundle-{}.json", options.schema)
}

/// File name of one resource: `<ResourceType>-<id>.json`.
pub fn resource_file_name(artifact: &BuiltArtifact) -> String {
    format!(
        "{}-{}.json",
        artifact.publication.kind.resource_type(),
        artifact.publication.id()
    )
}

/// Writes the collection Bundle and one file per resource into `output_dir`.
pub fn write_fhir_outputs(
    output_dir: &Path,
    artifacts: &[BuiltArtifact],
    options: &RenderOptions,
) -> Result<WrittenOutputs> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    let mut resources = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = output_dir.join(resource_file_name(artifact));
        write_json(&path, &render_resource(artifact, options))?;
        resources.push(path);
    }

    let bundle = output_dir.join(bundle_file_name(options));
    write_json(&bundle, &render_bundle(artifacts, options))?;
    tracing::info!(
        bundle = %bundle.display(),
        resources = resources.len(),
        "wrote FHIR outputs"
    );
    Ok(WrittenOutputs { bundle, resources })
}

/// Pretty-prints `value` as JSON to `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("serialize {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
