use std::path::PathBuf;

use spia_model::{RefsetDomain, SheetError};
use spia_terminology::TerminologyError;

/// Errors opening a SPIA distribution archive.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error("failed to read distribution {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid distribution archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("distribution is missing expected entry: {name}")]
    MissingEntry { name: String },

    #[error("no file name configured for reference set {domain}")]
    UnmappedDomain { domain: RefsetDomain },
}

impl DistributionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }
}

/// Fatal errors while parsing one reference set.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error("{domain}: {source}")]
    Sheet {
        domain: RefsetDomain,
        #[source]
        source: SheetError,
    },

    #[error("{domain}: terminology lookup failed: {source}")]
    Terminology {
        domain: RefsetDomain,
        #[source]
        source: TerminologyError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
