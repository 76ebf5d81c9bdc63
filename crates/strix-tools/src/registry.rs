//! The registry itself: `register(descriptor)` during startup, then sealed.

use std::collections::HashMap;

use strix_core::message::ToolCall;

use crate::descriptor::ToolDescriptor;

/// Errors raised by registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ToolRegistryError {
    /// `register` was called after [`ToolRegistry::seal`].
    #[error("tool registry is sealed: cannot register {0:?}")]
    Sealed(String),

    /// Two descriptors were registered under the same name.
    #[error("tool {0:?} is already registered")]
    DuplicateName(String),
}

/// Canonical map from tool name to descriptor.
///
/// Registration happens during an explicit startup phase; once
/// [`ToolRegistry::seal`] is called, further `register` calls are rejected
/// rather than silently accepted, replacing the teacher's dynamic
/// decorator-based registration with an explicit call made once at startup
/// (§9 redesign).
pub struct ToolRegistry {
    tools: HashMap<String, ToolDescriptor>,
    sealed: bool,
}

impl ToolRegistry {
    /// An empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            sealed: false,
        }
    }

    /// Register a tool descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryError::Sealed`] if the registry has already
    /// been sealed, or [`ToolRegistryError::DuplicateName`] if a tool with
    /// the same name is already registered.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), ToolRegistryError> {
        if self.sealed {
            return Err(ToolRegistryError::Sealed(descriptor.name));
        }
        if self.tools.contains_key(&descriptor.name) {
            return Err(ToolRegistryError::DuplicateName(descriptor.name));
        }
        self.tools.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Close the registry to further registration. Idempotent.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the registry accepts no further registrations.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Look up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// All registered descriptors' JSON schemas, for the LLM Gateway's tool
    /// spec (§6, "Schema format is stable and versioned with the
    /// registry").
    #[must_use]
    pub fn all_schemas(&self) -> Vec<(&str, &serde_json::Value)> {
        self.tools
            .values()
            .map(|d| (d.name.as_str(), &d.input_schema))
            .collect()
    }

    /// Export every registered tool as an [`strix_llm::LlmToolDefinition`]
    /// for the LLM Gateway's function/tool spec.
    #[must_use]
    pub fn all_tool_definitions(&self) -> Vec<strix_llm::LlmToolDefinition> {
        self.tools
            .values()
            .map(|d| {
                strix_llm::LlmToolDefinition::new(d.name.clone())
                    .with_description(d.description.clone())
                    .with_schema(d.input_schema.clone())
            })
            .collect()
    }

    /// Partition a model-emitted sequence of tool calls into a parallel
    /// batch and a serial tail, per §4.5: a batch containing any
    /// non-parallelizable tool degrades entirely to serial, model-emitted
    /// order.
    #[must_use]
    pub fn partition<'a>(&self, calls: &'a [ToolCall]) -> Partition<'a> {
        let all_parallelizable = calls.iter().all(|call| {
            self.tools
                .get(&call.name)
                .is_none_or(|d| d.parallelizable)
        });

        if all_parallelizable {
            Partition {
                parallel: calls.iter().collect(),
                serial: Vec::new(),
            }
        } else {
            Partition {
                parallel: Vec::new(),
                serial: calls.iter().collect(),
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A batch partitioned by [`ToolRegistry::partition`].
#[derive(Debug)]
pub struct Partition<'a> {
    /// Calls that may run concurrently.
    pub parallel: Vec<&'a ToolCall>,
    /// Calls that must run serially, in model-emitted order.
    pub serial: Vec<&'a ToolCall>,
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::descriptor::ToolHandler;
    use crate::error::ToolError;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, args: serde_json::Value) -> Result<String, ToolError> {
            Ok(args.to_string())
        }
    }

    fn descriptor(name: &str, parallelizable: bool) -> ToolDescriptor {
        ToolDescriptor::new(
            name,
            "test tool",
            json!({"type": "object"}),
            false,
            parallelizable,
            Box::new(Echo),
        )
    }

    #[test]
    fn register_then_seal_rejects_further_registration() {
        let mut registry = ToolRegistry::new();
        registry.register(descriptor("a", true)).unwrap();
        registry.seal();
        let err = registry.register(descriptor("b", true)).unwrap_err();
        assert_eq!(err, ToolRegistryError::Sealed("b".into()));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(descriptor("a", true)).unwrap();
        let err = registry.register(descriptor("a", true)).unwrap_err();
        assert_eq!(err, ToolRegistryError::DuplicateName("a".into()));
    }

    #[test]
    fn all_parallelizable_batch_stays_parallel() {
        let mut registry = ToolRegistry::new();
        registry.register(descriptor("a", true)).unwrap();
        registry.register(descriptor("b", true)).unwrap();

        let calls = vec![ToolCall::new("a", json!({})), ToolCall::new("b", json!({}))];
        let partition = registry.partition(&calls);
        assert_eq!(partition.parallel.len(), 2);
        assert!(partition.serial.is_empty());
    }

    #[test]
    fn mixed_batch_degrades_fully_serial() {
        let mut registry = ToolRegistry::new();
        registry.register(descriptor("a", true)).unwrap();
        registry.register(descriptor("c", false)).unwrap();

        let calls = vec![
            ToolCall::new("a", json!({})),
            ToolCall::new("c", json!({})),
            ToolCall::new("a", json!({})),
        ];
        let partition = registry.partition(&calls);
        assert!(partition.parallel.is_empty());
        assert_eq!(partition.serial.len(), 3);
    }
}
