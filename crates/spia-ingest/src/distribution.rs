//! SPIA distribution archive.
//!
//! A distribution is a zip file containing one workbook per reference set.
//! Every workbook named by the [`DistributionLayout`] must be present; the
//! archive is rejected before any sheet is parsed otherwise.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::Digest;
use spia_model::RefsetDomain;
use zip::ZipArchive;

use crate::error::DistributionError;

/// Expected archive entry name for each reference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionLayout {
    entries: BTreeMap<RefsetDomain, String>,
}

impl Default for DistributionLayout {
    /// Entry names of the RCPA SPIA v3.0 distribution.
    fn default() -> Self {
        let entries = [
            (
                RefsetDomain::Requesting,
                "RCPA - SPIA Requesting Pathology Terminology Reference Set v3.0.xlsx",
            ),
            (
                RefsetDomain::ChemicalPathology,
                "RCPA - SPIA Chemical Pathology Terminology Reference Set v3.0.xlsx",
            ),
            (
                RefsetDomain::Haematology,
                "RCPA - SPIA Haematology Terminology Reference Set v3.0.xlsx",
            ),
            (
                RefsetDomain::Immunopathology,
                "RCPA - SPIA Immunopathology Terminology Reference Set v3.0.xlsx",
            ),
            (
                RefsetDomain::MicrobiologySerologyMolecular,
                "RCPA - SPIA Microbiology Serology Molecular Pathology Terminology Reference Set v3.0.xlsx",
            ),
            (
                RefsetDomain::MicrobiologyOrganisms,
                "RCPA - SPIA Microbiology Subset of Organisms mapped to SNOMED CT v3.0.xlsx",
            ),
            (
                RefsetDomain::PreferredUnits,
                "RCPA - SPIA Preferred units v1.0.xlsx",
            ),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(domain, name)| (domain, name.to_string()))
                .collect(),
        }
    }
}

impl DistributionLayout {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, domain: RefsetDomain, name: impl Into<String>) -> Self {
        self.entries.insert(domain, name.into());
        self
    }

    pub fn file_name(&self, domain: RefsetDomain) -> Option<&str> {
        self.entries.get(&domain).map(String::as_str)
    }

    /// Reference sets named by this layout, in processing order.
    pub fn domains(&self) -> impl Iterator<Item = RefsetDomain> + '_ {
        self.entries.keys().copied()
    }

    /// Restricts the layout to `domains`.
    #[must_use]
    pub fn retain(mut self, domains: &[RefsetDomain]) -> Self {
        self.entries.retain(|domain, _| domains.contains(domain));
        self
    }
}

/// An opened distribution with every expected entry loaded.
#[derive(Debug, Clone)]
pub struct Distribution {
    path: PathBuf,
    sha256: String,
    entries: BTreeMap<RefsetDomain, Vec<u8>>,
}

impl Distribution {
    /// Opens the archive at `path` and loads the entries named by `layout`.
    ///
    /// # Errors
    ///
    /// Fails with [`DistributionError::MissingEntry`] naming the first
    /// expected entry that the archive does not contain.
    pub fn open(path: &Path, layout: &DistributionLayout) -> Result<Self, DistributionError> {
        let bytes = fs::read(path).map_err(|e| DistributionError::io(path, e))?;
        let sha256 = sha256_hex(&bytes);
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| DistributionError::zip(path, e))?;

        for domain in layout.domains() {
            let name = layout
                .file_name(domain)
                .ok_or(DistributionError::UnmappedDomain { domain })?;
            if archive.index_for_name(name).is_none() {
                return Err(DistributionError::MissingEntry {
                    name: name.to_string(),
                });
            }
        }

        let mut entries = BTreeMap::new();
        for domain in layout.domains() {
            let name = layout
                .file_name(domain)
                .ok_or(DistributionError::UnmappedDomain { domain })?;
            let mut file = archive
                .by_name(name)
                .map_err(|e| DistributionError::zip(path, e))?;
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .map_err(|e| DistributionError::io(path.join(name), e))?;
            tracing::debug!(%domain, entry = name, bytes = contents.len(), "loaded distribution entry");
            entries.insert(domain, contents);
        }

        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            sha256 = %sha256,
            "opened distribution"
        );
        Ok(Self {
            path: path.to_path_buf(),
            sha256,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the archive file.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn domains(&self) -> impl Iterator<Item = RefsetDomain> + '_ {
        self.entries.keys().copied()
    }

    /// Raw workbook bytes for a reference set.
    pub fn stream_for(&self, domain: RefsetDomain) -> Result<&[u8], DistributionError> {
        self.entries
            .get(&domain)
            .map(Vec::as_slice)
            .ok_or(DistributionError::UnmappedDomain { domain })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}
