//! Verification Pipeline errors.

use strix_core::ids::FindingId;

/// Failures raised while adjudicating a finding.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The verifier's engine hit a fatal error (e.g. gateway exhaustion)
    /// before reaching a verdict.
    #[error("verifier for finding {finding}: {source}")]
    EngineFailed {
        /// The finding being adjudicated.
        finding: FindingId,
        /// The underlying engine error.
        #[source]
        source: strix_agent::EngineError,
    },

    /// The sandbox family shared with the originating scan could not
    /// register a dedicated worker for the verifier.
    #[error("sandbox registration failed for finding {finding}: {source}")]
    SandboxUnavailable {
        /// The finding being adjudicated.
        finding: FindingId,
        /// The underlying sandbox error.
        #[source]
        source: strix_sandbox::SandboxError,
    },

    /// The verifier exhausted its retry budget (repeated crashes) without
    /// reaching either phase's verdict.
    #[error("finding {0} exhausted its verifier retry budget without a verdict")]
    RetriesExhausted(FindingId),

    /// A run-store write failed.
    #[error("run store error: {0}")]
    Store(#[from] strix_store::StoreError),

    /// A tool registry operation failed while building the verifier's
    /// reproduction toolset.
    #[error("tool registry error: {0}")]
    ToolRegistry(#[from] strix_tools::ToolRegistryError),
}

/// Result alias for fallible verification operations.
pub type VerificationResult<T> = Result<T, VerificationError>;
