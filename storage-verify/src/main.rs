// SPDX-License-Identifier: GPL-3.0-only

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use storage_sys::CommandInquiry;
use storage_types::ExpectedConfiguration;
use storage_verify::cli::Args;
use storage_verify::{OutputFormat, Verifier, logging, render_text};

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("storage-verify: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let config = args.verifier_config()?;
    logging::init(&config);

    let params = args.role_parameters()?;
    let expected =
        ExpectedConfiguration::try_from(params).context("invalid role variables")?;
    tracing::debug!(?expected, "expected configuration");

    let inquiry = CommandInquiry::new(config.probe_timeout(), &config.mount_table);
    let report = Verifier::new(inquiry).verify(&expected);

    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(report.overall_pass)
}
