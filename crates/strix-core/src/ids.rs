//! Newtype identifiers for the data model.
//!
//! Each ID wraps a random UUID the way `astrid-runtime::subagent::SubAgentId`
//! wraps one, rather than exposing a bare `String` or `Uuid` at call sites.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing identifier value (e.g. read back from disk).
            #[must_use]
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(ScanId, "Unique identifier for a scan (one per CLI invocation).");
id_type!(AgentId, "Unique identifier for an agent instance.");
id_type!(SandboxId, "Unique identifier for a sandbox container.");
id_type!(WorkerId, "Unique identifier for an in-container worker process.");
id_type!(ToolCallId, "Unique identifier for a single tool call.");
id_type!(FindingId, "Unique identifier for a finding report.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
    }

    #[test]
    fn from_string_roundtrips() {
        let id = ScanId::from_string("fixed-id");
        assert_eq!(id.as_str(), "fixed-id");
        assert_eq!(id.to_string(), "fixed-id");
    }
}
