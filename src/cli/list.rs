use anyhow::Result;
use colored::Colorize;

use crate::config::ProjectFile;
use crate::discovery::discover;

use super::{discovery_options, ScanArgs};

pub fn run(args: &ScanArgs) -> Result<()> {
    let project = ProjectFile::load(&args.root)?;
    let files = discover(&args.root, &discovery_options(args, &project));

    if files.is_empty() {
        eprintln!("{}", "No matching files found.".dimmed());
        return Ok(());
    }

    for path in files.iter() {
        println!("{path}");
    }
    eprintln!("{}", format!("{} file(s)", files.len()).dimmed());

    Ok(())
}
