use std::env;

use anyhow::Result;

use spia_cli::config::{PipelineConfig, TX_SERVER_ENV};
use spia_cli::pipeline::run_transform;
use spia_cli::summary::domains_table;
use spia_cli::types::{TransformRequest, TransformResult};

use crate::cli::{DomainsArgs, TransformArgs};

pub fn run_domains(args: &DomainsArgs) -> Result<()> {
    let config = PipelineConfig::load(args.config.as_deref())?;
    println!("{}", domains_table(&config.distribution));
    Ok(())
}

pub fn run_transform_command(args: &TransformArgs) -> Result<TransformResult> {
    let config = PipelineConfig::load(args.config.as_deref())?
        .with_env_server(env::var(TX_SERVER_ENV).ok())
        .with_server(args.tx_server.clone())
        .with_target(args.fhir_version.map(Into::into));
    let request = TransformRequest {
        archive: args.archive.clone(),
        output_dir: args.output_dir.clone(),
        domains: args.domains.clone(),
        parallel: args.parallel,
        offline: args.offline,
        check_active: args.check_active,
        audit: !args.no_audit,
    };
    run_transform(&config, &request)
}
