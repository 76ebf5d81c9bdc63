//! `strix`: the scan CLI. A thin client over the scan engine — it parses
//! arguments, installs logging, and maps the scan's terminal outcome onto
//! the exit codes §6 defines. All orchestration lives in [`scan`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;
mod findings;
mod logging;
mod provider;
mod scan;
mod status;

use clap::Parser;

/// Misuse exit code (bad CLI arguments), per §6.
const EXIT_MISUSE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print().ok();
            std::process::exit(EXIT_MISUSE);
        },
    };

    logging::init(cli.verbose);

    let exit_code = match scan::run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "scan failed");
            scan::exit_code::SCAN_FAILED
        },
    };

    std::process::exit(exit_code);
}
