//! Pipeline configuration.
//!
//! Every setting has a default matching the published SPIA v3.0
//! distribution, so a config file is only needed to deviate from it.
//! Precedence, lowest first: defaults, config file, `SPIA_TX_SERVER`,
//! command line flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spia_ingest::{DistributionLayout, FlagVocabulary, SheetLayout};
use spia_model::RefsetDomain;
use spia_terminology::TerminologyConfig;
use spia_transform::{TargetCardinality, TargetSchema};

/// Environment variable overriding the terminology server base URL.
pub const TX_SERVER_ENV: &str = "SPIA_TX_SERVER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub terminology: TerminologyConfig,
    /// FHIR release of the generated resources.
    pub target: TargetSchema,
    /// Archive entry name per reference set.
    pub distribution: DistributionLayout,
    /// Accepted combining results flag text.
    pub flags: FlagVocabulary,
    /// How unit maps treat entries with several units.
    pub unit_cardinality: TargetCardinality,
    /// Preferred terms to drop, replacing the built-in list of a reference set.
    pub exclusions: BTreeMap<RefsetDomain, Vec<String>>,
}

impl PipelineConfig {
    /// Reads a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        tracing::debug!(
            server = %config.terminology.base_url,
            target = %config.target,
            "loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Applies the `SPIA_TX_SERVER` value, if set and not blank.
    #[must_use]
    pub fn with_env_server(mut self, value: Option<String>) -> Self {
        if let Some(server) = value.filter(|server| !server.trim().is_empty()) {
            self.terminology.base_url = server.trim().to_string();
        }
        self
    }

    #[must_use]
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.terminology.base_url = server;
        }
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<TargetSchema>) -> Self {
        if let Some(target) = target {
            self.target = target;
        }
        self
    }

    /// Sheet layouts for the reference sets named by the distribution layout.
    pub fn sheet_layouts(&self) -> Vec<SheetLayout> {
        self.distribution
            .domains()
            .map(|domain| {
                let layout = SheetLayout::for_domain(domain);
                match self.exclusions.get(&domain) {
                    Some(terms) => layout.with_excluded_preferred_terms(terms.clone()),
                    None => layout,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use spia_model::CombiningResultsFlag;
    use spia_transform::MultiTargetPolicy;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineConfig::from_toml("").expect("parse");
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.target, TargetSchema::R4);
        assert_eq!(config.sheet_layouts().len(), RefsetDomain::ALL.len());
    }

    #[test]
    fn reads_every_section() {
        let config = PipelineConfig::from_toml(
            r#"
            target = "stu3"
            unit_cardinality = { single = "first" }

            [terminology]
            base_url = "https://tx.example.org/fhir"
            timeout_secs = 10

            [flags]
            red = "red"
            amber = "orange"

            [exclusions]
            haematology = []
            "#,
        )
        .expect("parse");

        assert_eq!(config.target, TargetSchema::Stu3);
        assert_eq!(
            config.unit_cardinality,
            TargetCardinality::Single(MultiTargetPolicy::First)
        );
        assert_eq!(config.terminology.base_url, "https://tx.example.org/fhir");
        assert_eq!(config.terminology.timeout_secs, 10);
        assert_eq!(config.terminology.max_attempts, 3);
        assert_eq!(config.flags.resolve("Amber"), Some(CombiningResultsFlag::Orange));
        assert_eq!(config.flags.resolve("green"), None);

        let haematology = config
            .sheet_layouts()
            .into_iter()
            .find(|layout| layout.domain == RefsetDomain::Haematology)
            .expect("haematology layout");
        assert!(!haematology.is_excluded(Some("Cross match")));
    }

    #[test]
    fn server_precedence() {
        let config = PipelineConfig::default()
            .with_env_server(Some("https://env.example.org/fhir".to_string()));
        assert_eq!(config.terminology.base_url, "https://env.example.org/fhir");

        let config = config.with_server(Some("https://cli.example.org/fhir".to_string()));
        assert_eq!(config.terminology.base_url, "https://cli.example.org/fhir");

        let config = PipelineConfig::default().with_env_server(Some("  ".to_string()));
        assert_eq!(config.terminology.base_url, spia_terminology::DEFAULT_SERVER);
    }

    #[test]
    fn unknown_release_is_rejected() {
        assert!(PipelineConfig::from_toml("target = \"dstu2\"").is_err());
    }
}
