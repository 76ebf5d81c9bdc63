//! The Run Store & Tracer (C8): append-only writes of agent events, finding
//! reports, and periodic statistics snapshots into a per-run directory
//! (§6, §4.8).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod events;
mod stats;
mod store;

pub use error::{StoreError, StoreResult};
pub use events::{AgentEvent, AgentEventKind, preview};
pub use stats::StatsSnapshot;
pub use store::{FindingCallback, RunStore};
