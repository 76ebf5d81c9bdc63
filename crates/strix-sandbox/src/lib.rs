//! The Sandbox Runtime (C2): create, health-check, and tear down per-scan
//! containers, and route tool calls to their in-container worker.
//!
//! Strix's target runs inside a container rather than the teacher's
//! host-process worktree, so the grounding here is structural, not literal:
//! `astrid_workspace::sandbox::SandboxCommand` shows how the teacher isolates
//! a native process at the OS level (`bwrap`/Seatbelt); this crate isolates
//! at the container level instead, via `bollard`, and talks to the
//! in-container worker over HTTP the way a dedicated worker-runtime process
//! would.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod health;
mod runtime;
mod sandbox;

pub use error::SandboxError;
pub use runtime::{SandboxRuntime, SandboxRuntimeConfig};
pub use sandbox::{Sandbox, ToolCallResponse};
