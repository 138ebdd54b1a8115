// Rendering of batch results for the terminal.

use mdnorm_core::{BatchReport, FileReport, WriteMode};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

pub fn render(report: &BatchReport, format: OutputFormat, quiet: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(report.to_json()?),
        OutputFormat::Text => Ok(render_text(report, quiet)),
    }
}

/// One line per changed or failed file, then a summary.
/// Quiet mode keeps only failures and the summary.
pub fn render_text(report: &BatchReport, quiet: bool) -> String {
    let mut out = String::new();

    for file in &report.files {
        if let Some(line) = file_line(file, report.mode, quiet) {
            let _ = writeln!(out, "{line}");
        }
    }

    let verb = match report.mode {
        WriteMode::Write => "changed",
        WriteMode::Check => "would change",
    };
    let elapsed = (report.finished_at - report.started_at).num_milliseconds();
    let icon = if report.success() { "✅" } else { "❌" };
    let _ = writeln!(
        out,
        "{icon} {}/{} files {verb} ({elapsed} ms)",
        report.changed, report.scanned
    );
    if report.failed > 0 {
        let _ = writeln!(out, "⚠️  {} files failed", report.failed);
    }
    if report.skipped > 0 {
        let _ = writeln!(out, "⏹️  {} files skipped after cancellation", report.skipped);
    }
    out
}

fn file_line(file: &FileReport, mode: WriteMode, quiet: bool) -> Option<String> {
    let path = file.path.display();
    if let Some(err) = &file.error {
        let mut line = format!("❌ {path}: {} ({})", err.message, err.kind);
        if !err.suspected_rules.is_empty() {
            let _ = write!(line, " [suspects: {}]", err.suspected_rules.join(", "));
        }
        return Some(line);
    }
    if !file.changed || quiet {
        return None;
    }
    let icon = match mode {
        WriteMode::Write => "📝",
        WriteMode::Check => "🔍",
    };
    Some(format!("{icon} {path} [{}]", file.applied_rules.join(", ")))
}
