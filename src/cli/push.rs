use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;

use crate::config::{DeployConfig, UploadMode, HOST_ENV_VAR};
use crate::deployer::{DeployEvent, DeployReport, Deployer};
use crate::discovery::discover;
use crate::transport::HttpsTransport;

use super::spinner;
use super::PushArgs;

pub fn run(args: &PushArgs) -> Result<ExitCode> {
    let env_host = std::env::var(HOST_ENV_VAR).ok();
    let config = DeployConfig::load(args.scan.root.clone(), args.overrides(), env_host)
        .context("cannot start deployment")?;

    let mode = match config.mode {
        UploadMode::PerFile => "per-file",
        UploadMode::Batch => "batch",
    };
    println!(
        "{} Deploying to {} {}",
        ">".blue().bold(),
        config.host.to_string().bold(),
        format!("({mode} mode)").dimmed(),
    );

    let files = discover(&config.root, &config.discovery_options());
    tracing::info!("found {} matching files under {}", files.len(), config.root.display());

    let deployer = Deployer::new(HttpsTransport::new(&config.host), config.mode);
    let mut printer = Printer::default();
    let report = deployer.deploy(&config.root, &files, |event| printer.show(event));
    spinner::clear(printer.spinner.take());

    print_summary(&report);
    Ok(ExitCode::from(report.exit_code()))
}

/// Renders deploy events as console lines, with a spinner while a request is
/// in flight.
#[derive(Default)]
struct Printer {
    spinner: Option<ProgressBar>,
}

impl Printer {
    fn show(&mut self, event: &DeployEvent) {
        spinner::clear(self.spinner.take());

        match event {
            DeployEvent::Sending { path: Some(path), .. } => {
                self.spinner = Some(spinner::start(format!("Uploading {path}...")));
            }
            DeployEvent::Sending { path: None, files } => {
                self.spinner = Some(spinner::start(format!("Uploading {files} file(s)...")));
            }
            DeployEvent::Uploaded { path, status } => {
                spinner::ok(&format!("{path} {}", format!("(HTTP {status})").dimmed()));
            }
            DeployEvent::ReadFailed { path, error } => {
                spinner::failed(&format!("{path}: could not read: {error}"));
            }
            DeployEvent::EncodeFailed { path, error } => {
                spinner::failed(&format!("{}: {error}", label(path.as_deref())));
            }
            DeployEvent::Rejected { path, status, body } => {
                spinner::failed(&format!(
                    "{} (HTTP {status}): {}",
                    label(path.as_deref()),
                    body.trim()
                ));
            }
            DeployEvent::TransportFailed { path, error } => {
                spinner::failed(&format!("{}: network error: {error}", label(path.as_deref())));
            }
            DeployEvent::BatchAccepted { status, files } => {
                spinner::ok(&format!(
                    "sent {files} file(s) {}",
                    format!("(HTTP {status})").dimmed()
                ));
            }
            DeployEvent::Updated { paths } => {
                for path in paths {
                    spinner::ok(&format!("{path} {}", "updated".dimmed()));
                }
            }
            DeployEvent::ServerFailed { path, error } => {
                spinner::failed(&format!("{path}: {error}"));
            }
            DeployEvent::Rebuilding => {
                spinner::note("server is rebuilding the application");
            }
            DeployEvent::DevMode => {
                spinner::note("server is in dev mode; changes apply without a rebuild");
            }
            DeployEvent::NothingToSend => {
                spinner::failed("no files could be read; nothing was sent");
            }
        }
    }
}

fn label(path: Option<&str>) -> &str {
    path.unwrap_or("batch")
}

fn print_summary(report: &DeployReport) {
    let failures = report.failure_count();
    println!();
    if failures == 0 {
        println!("{} Deployment completed successfully.", "ok".green().bold());
    } else {
        eprintln!(
            "{} Deployment finished with {failures} error(s).",
            "x".red().bold()
        );
    }
}
