mod list;
mod push;
mod spinner;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{Overrides, ProjectFile, UploadMode};
use crate::discovery::DiscoveryOptions;

/// Push project source files to a running update endpoint
#[derive(Parser, Debug)]
#[command(name = "update-deploy")]
#[command(version, about)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload matching files to https://<host>/update (default)
    Push(PushArgs),

    /// Print the files that would be uploaded, without contacting the server
    List(ScanArgs),
}

impl Default for Command {
    fn default() -> Self {
        Self::Push(PushArgs::default())
    }
}

/// Options shared by every command that scans the project.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Project directory to scan
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Skip paths matched by the root .gitignore
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Extra exclusion pattern in .gitignore syntax (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            respect_gitignore: false,
            exclude: Vec::new(),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct PushArgs {
    /// Update server as host or host:port (overrides UPDATE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Upload strategy
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<UploadMode>,

    #[command(flatten)]
    pub scan: ScanArgs,
}

impl PushArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            mode: self.mode,
            respect_gitignore: self.scan.respect_gitignore,
            exclude: self.scan.exclude.clone(),
        }
    }
}

/// Dispatch a CLI command to its handler.
///
/// # Errors
///
/// Returns an error for configuration problems (missing or malformed host,
/// unreadable `deploy.toml`). Upload failures are reported through the exit
/// code instead.
pub fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Push(args) => push::run(&args),
        Command::List(args) => {
            list::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Scan options for commands that run without a resolved `DeployConfig`.
fn discovery_options(scan: &ScanArgs, project: &ProjectFile) -> DiscoveryOptions {
    let mut exclude = project.exclude.clone();
    exclude.extend(scan.exclude.iter().cloned());
    DiscoveryOptions {
        respect_gitignore: scan.respect_gitignore || project.respect_gitignore,
        exclude,
        ..DiscoveryOptions::default()
    }
}
