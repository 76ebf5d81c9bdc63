//! The LLM Gateway (C3): a single choke point between agent engines and
//! whatever concrete model backend is configured.
//!
//! The concrete HTTP client (Claude, `OpenAI`-compatible, etc.) is out of
//! scope — it lives behind [`LlmProvider`], the same seam
//! `astrid_llm::provider::LlmProvider` puts between `AgentRuntime<P>` and its
//! backend. This crate adds the gateway discipline the specification
//! requires on top of that seam: bounded concurrency, inter-request pacing,
//! retry with backoff, and per-model cost accounting.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod cost;
mod error;
mod gateway;
pub mod provider;
pub mod types;

pub use error::GatewayError;
pub use gateway::{GatewayConfig, LlmGateway, cache_breakpoints};
pub use provider::{LlmProvider, StreamBox};
pub use types::{LlmResponse, LlmToolDefinition, StopReason, StreamEvent, Usage};
