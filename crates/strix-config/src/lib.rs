//! Environment-driven configuration for a Strix scan.
//!
//! The teacher (`astrid-config`) layers defaults, a TOML file, and the
//! environment into a merged `Config` across nine steps. Strix has no
//! config file in its external-interface surface (§6) — every knob is
//! an environment variable read once at startup — so [`Config::from_env`]
//! collapses that layering into a single pass, still going through the
//! same testable `from_map` / `collect_env_vars` split the teacher uses
//! to keep tests away from `std::env::set_var` races.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod secret;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use secret::Secret;
pub use types::{
    collect_env_vars, Config, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_SANDBOX_EXECUTION_TIMEOUT_SECS,
    DEFAULT_SANDBOX_IMAGE,
};
