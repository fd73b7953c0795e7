//! CLI for dockvs.

mod commands;
mod container;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dockvs_core::config;
use std::path::Path;

use commands::{run_build, run_checksum, run_launch, run_resolve};
use container::DockerCli;

/// Top-level CLI for dockvs.
#[derive(Debug, Parser)]
#[command(name = "dockvs")]
#[command(about = "Package and run Vintage Story game servers as Docker containers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and verify a server release, then build its image.
    Build {
        /// `stable`, `unstable` or a literal version (default: stable).
        version: Option<String>,
    },

    /// Start a server container for an instance directory.
    Launch {
        /// Instance name; also the data directory and container name.
        id: String,
        /// Version to run; saved to the instance settings.
        version: Option<String>,
        /// Host port; saved to the instance settings. Requires a version.
        #[arg(requires = "version")]
        port: Option<String>,
    },

    /// Show which catalog entry a version resolves to.
    Resolve {
        /// `stable`, `unstable` or a literal version (default: stable).
        version: Option<String>,
    },

    /// Compute the MD5 of a file (e.g. a downloaded archive).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let docker = DockerCli::default();

        match cli.command {
            CliCommand::Build { version } => run_build(&cfg, version.as_deref(), &docker)?,
            CliCommand::Launch { id, version, port } => {
                let cwd = std::env::current_dir().context("current directory")?;
                run_launch(&cfg, &cwd, &id, version.as_deref(), port.as_deref(), &docker)?
            }
            CliCommand::Resolve { version } => run_resolve(&cfg, version.as_deref())?,
            CliCommand::Checksum { path } => run_checksum(Path::new(&path))?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
