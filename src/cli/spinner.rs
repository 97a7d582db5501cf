use std::borrow::Cow;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Tick interval for spinner animation.
const TICK_MS: u64 = 80;

/// Indentation prefix for per-file output lines.
pub const INDENT: &str = "  ";

/// 256-color index for spinner dots (208 = orange).
const SPINNER_COLOR: u8 = 208;

/// Start an indented spinner on stderr while a request is in flight.
///
/// Draws nothing when stderr is not a terminal.
#[must_use]
pub fn start(message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]);
    let style = style
        .clone()
        .template(&format!("{INDENT}{{spinner:.{SPINNER_COLOR}}} {{msg}}"))
        .unwrap_or(style);
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(TICK_MS));
    pb
}

/// Clear the spinner, if any, without printing a status line.
pub fn clear(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Green "ok" line on stdout.
pub fn ok(message: &str) {
    println!("{INDENT}{} {message}", "ok".green());
}

/// Red "failed" line on stderr.
pub fn failed(message: &str) {
    eprintln!("{INDENT}{} {message}", "failed".red());
}

/// Yellow "note" line on stdout.
pub fn note(message: &str) {
    println!("{INDENT}{} {message}", "note".yellow());
}
