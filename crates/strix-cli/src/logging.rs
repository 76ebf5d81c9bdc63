//! `tracing-subscriber` installation: `EnvFilter::from_default_env()`
//! defaulting to `info`, raised one level per `-v` occurrence (§10.1,
//! §6's `[AMBIENT]` CLI-flags note).

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `verbosity` is the `-v` occurrence count;
/// `0` leaves `RUST_LOG`/the `info` default untouched, higher counts raise
/// the default floor (an explicit `RUST_LOG` still wins over the floor).
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
