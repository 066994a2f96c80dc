//! CLI argument definitions for the SPIA converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use spia_model::RefsetDomain;
use spia_transform::TargetSchema;

#[derive(Parser)]
#[command(
    name = "spia",
    version,
    about = "SPIA to FHIR - Convert RCPA pathology reference sets to FHIR terminology resources",
    long_about = "Convert the RCPA Standards for Pathology Informatics in Australia (SPIA)\n\
                  reference set distribution into FHIR ValueSet, ConceptMap and CodeSystem\n\
                  resources.\n\n\
                  Codes are validated structurally and enriched with display text from a\n\
                  FHIR terminology server."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a SPIA distribution archive to FHIR resources.
    Transform(TransformArgs),

    /// List the reference sets of a distribution and their archive entries.
    Domains(DomainsArgs),
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Path to the SPIA distribution zip archive.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory for generated files (default: ./output).
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// FHIR terminology server base URL (overrides config and SPIA_TX_SERVER).
    #[arg(long = "tx-server", value_name = "URL")]
    pub tx_server: Option<String>,

    /// FHIR release of the generated resources.
    #[arg(long = "fhir-version", value_enum)]
    pub fhir_version: Option<FhirVersionArg>,

    /// Only convert these reference sets (comma separated).
    #[arg(long = "domains", value_name = "KEY", value_delimiter = ',')]
    pub domains: Vec<RefsetDomain>,

    /// Skip rows whose code the terminology server reports as inactive.
    #[arg(long = "check-active", conflicts_with = "offline")]
    pub check_active: bool,

    /// Do not contact the terminology server; resources carry sheet text only.
    #[arg(long = "offline")]
    pub offline: bool,

    /// Parse reference sets in parallel.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Skip writing the audit report.
    #[arg(long = "no-audit")]
    pub no_audit: bool,
}

#[derive(Parser)]
pub struct DomainsArgs {
    /// Pipeline configuration file (TOML) with custom archive entry names.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FhirVersionArg {
    Stu3,
    R4,
}

impl From<FhirVersionArg> for TargetSchema {
    fn from(value: FhirVersionArg) -> Self {
        match value {
            FhirVersionArg::Stu3 => TargetSchema::Stu3,
            FhirVersionArg::R4 => TargetSchema::R4,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
