//! The Tool Registry (C1): the canonical map from tool name to descriptor.
//!
//! The registry pins down *how* tools are discovered, scheduled, and
//! executed — not what any specific tool does internally. Handler bodies
//! (browser automation, shell, HTTP proxy, file editing) are out of scope
//! and live behind the [`ToolHandler`] trait, injected by whatever embeds
//! this crate. The shape mirrors `astrid_tools::{BuiltinTool, ToolRegistry}`,
//! generalized from a fixed set of nine concrete tools to an open registry
//! of externally-supplied descriptors.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod descriptor;
mod error;
mod registry;

pub use descriptor::{ToolDescriptor, ToolHandler, ToolResult};
pub use error::ToolError;
pub use registry::{ToolRegistry, ToolRegistryError};

/// Maximum output size in characters before truncation, matching the
/// teacher's context-budget discipline for tool results.
pub const MAX_OUTPUT_CHARS: usize = 30_000;

/// Truncate a tool's output to stay within the gateway's context budget.
#[must_use]
pub fn truncate_output(output: String) -> String {
    if output.chars().count() <= MAX_OUTPUT_CHARS {
        return output;
    }
    let truncated: String = output.chars().take(MAX_OUTPUT_CHARS).collect();
    format!("{truncated}\n\n... (output truncated — exceeded {MAX_OUTPUT_CHARS} character limit)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_output_small_is_unchanged() {
        let small = "hello".to_string();
        assert_eq!(truncate_output(small.clone()), small);
    }

    #[test]
    fn truncate_output_large_is_marked() {
        let large = "x".repeat(40_000);
        let result = truncate_output(large);
        assert!(result.contains("output truncated"));
    }
}
