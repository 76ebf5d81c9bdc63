//! The Memory Compressor (C4): bounds the conversation view sent to the
//! model without mutating the canonical [`AgentState`](strix_core::agent::AgentState).
//!
//! Grounded in `astralis_runtime::context::ContextManager`, but reshaped
//! around one difference the specification requires: the teacher's
//! `summarize()` drains and mutates a live session in place, while this
//! compressor is a pure function from state to a compressed view — the
//! canonical message history is never rewritten, only the copy handed to
//! the LLM Gateway.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod cache;
mod compress;
mod image;

pub use compress::{CompressionStats, MemoryCompressor};
