//! vaultsort CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use vaultsort::cli::{Cli, Output};
use vaultsort::config::Config;
use vaultsort::error::{ExitCode as RunExitCode, VaultError};
use vaultsort::organize::organize_vault;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let output = Output::new(cli.output_format(), cli.quiet);

    match run(&cli, &output) {
        Ok(code) => ExitCode::from(code.code() as u8),
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli, output: &Output) -> Result<RunExitCode, VaultError> {
    let config = Config::load(cli.config.as_deref())?;
    let report = organize_vault(&config, cli.vault.as_deref(), cli.dry_run)?;

    output.print(&report)?;

    if report.is_partial_failure() {
        log::error!("{} notes could not be processed", report.summary.failed);
        return Ok(RunExitCode::PartialFailure);
    }
    Ok(RunExitCode::Success)
}
