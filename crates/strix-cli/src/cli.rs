//! Command-line surface: `strix --target ... [--scan-mode ...] [-n] [--run-name ...]`
//! plus the ambient conveniences `-v`, `--format`, `--runs-dir` (§6).

use clap::{Parser, ValueEnum};

/// `strix`: run an autonomous scan against a target.
#[derive(Parser, Debug)]
#[command(name = "strix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scan target: a filesystem path, URL, git repository, or IP.
    #[arg(long)]
    pub target: String,

    /// Depth configuration.
    #[arg(long, value_enum, default_value_t = ScanModeArg::Standard)]
    pub scan_mode: ScanModeArg,

    /// Run without interactive prompts (approve every tool call
    /// automatically).
    #[arg(short = 'n', long)]
    pub non_interactive: bool,

    /// Name for this run's directory under `strix_runs/`. Defaults to the
    /// scan ID.
    #[arg(long)]
    pub run_name: Option<String>,

    /// Increase log verbosity. May be repeated; caps at `trace`.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format for status lines.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Parent directory for `strix_runs/`. Defaults to the current
    /// directory.
    #[arg(long)]
    pub runs_dir: Option<std::path::PathBuf>,
}

/// `--scan-mode` values, mirroring [`strix_core::scan::ScanMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanModeArg {
    /// Fast, shallow pass.
    Quick,
    /// Default depth.
    Standard,
    /// Exhaustive pass.
    Deep,
}

impl From<ScanModeArg> for strix_core::ScanMode {
    fn from(value: ScanModeArg) -> Self {
        match value {
            ScanModeArg::Quick => Self::Quick,
            ScanModeArg::Standard => Self::Standard,
            ScanModeArg::Deep => Self::Deep,
        }
    }
}

/// `--format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable status lines.
    Pretty,
    /// Newline-delimited JSON event echoing, for machine consumption.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_mode_arg_maps_onto_core_scan_mode() {
        assert_eq!(strix_core::ScanMode::from(ScanModeArg::Quick), strix_core::ScanMode::Quick);
        assert_eq!(strix_core::ScanMode::from(ScanModeArg::Deep), strix_core::ScanMode::Deep);
    }

    #[test]
    fn minimal_args_parse() {
        let cli = Cli::parse_from(["strix", "--target", "https://example.com"]);
        assert_eq!(cli.target, "https://example.com");
        assert_eq!(cli.scan_mode, ScanModeArg::Standard);
        assert!(!cli.non_interactive);
    }

    #[test]
    fn verbose_flag_counts_occurrences() {
        let cli = Cli::parse_from(["strix", "--target", "t", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
