//! Status line emission for `--format pretty|json` (§6's `[AMBIENT]` CLI
//! flags note). Grounded on the teacher's `astrid-cli::theme::Theme` —
//! same success/error/info glyph-prefixed styling for `pretty` — with a
//! `json` mode that echoes the same events as newline-delimited JSON for
//! machine consumption instead.

use colored::Colorize;
use serde_json::json;
use strix_core::finding::FindingStatus;
use strix_core::scan::ScanMode;

use crate::cli::OutputFormat;

/// Emits scan status lines to stdout in the format the operator asked for.
pub struct StatusReporter {
    format: OutputFormat,
}

impl StatusReporter {
    /// Bind to a chosen output format.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// A scan is starting against `target`.
    pub fn scan_started(&self, target: &str, mode: ScanMode) {
        match self.format {
            OutputFormat::Pretty => {
                println!("{} scanning {} ({mode} mode)", "i".blue(), target.bold());
            },
            OutputFormat::Json => {
                self.emit(&json!({"event": "scan_started", "target": target, "mode": mode.to_string()}));
            },
        }
    }

    /// A finding reached a terminal adjudication.
    pub fn finding_adjudicated(&self, finding_id: &str, vulnerability_type: &str, status: &FindingStatus) {
        match self.format {
            OutputFormat::Pretty => match status {
                FindingStatus::Verified => {
                    println!("{} {vulnerability_type} verified ({finding_id})", "✓".green());
                },
                FindingStatus::Rejected { reason } => {
                    println!("{} {vulnerability_type} rejected: {reason:?} ({finding_id})", "✗".red());
                },
                FindingStatus::Pending => {
                    println!("{} {vulnerability_type} still pending ({finding_id})", "!".yellow());
                },
            },
            OutputFormat::Json => {
                self.emit(&json!({
                    "event": "finding_adjudicated",
                    "finding_id": finding_id,
                    "vulnerability_type": vulnerability_type,
                    "status": format!("{status:?}"),
                }));
            },
        }
    }

    /// The scan reached a terminal outcome.
    pub fn scan_finished(&self, outcome: &str, exit_code: i32) {
        match self.format {
            OutputFormat::Pretty => {
                let line = format!("scan finished: {outcome} (exit {exit_code})");
                if exit_code == 0 {
                    println!("{} {line}", "✓".green());
                } else {
                    println!("{} {line}", "✗".red());
                }
            },
            OutputFormat::Json => {
                self.emit(&json!({"event": "scan_finished", "outcome": outcome, "exit_code": exit_code}));
            },
        }
    }

    fn emit(&self, value: &serde_json::Value) {
        println!("{value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_and_json_formats_both_construct() {
        let _pretty = StatusReporter::new(OutputFormat::Pretty);
        let _json = StatusReporter::new(OutputFormat::Json);
    }
}
