//! CLI argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vaultsort")]
#[command(author, version, about = "Sort an Obsidian-style vault into folders by tag", long_about = None)]
pub struct Cli {
    /// Path to the config file (YAML, or TOML with a .toml extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the vault (overrides vault_root from the config)
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Report what would change without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output the report as JSON (default)
    #[arg(long, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output the report as YAML
    #[arg(long, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output the report as TOML
    #[arg(long, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Only print errors; suppress the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else if self.toml {
            OutputFormat::Toml
        } else {
            OutputFormat::Json
        }
    }

    /// Log level implied by `-q` / `-v`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}
