//! Agent Engine errors.

/// Failures that can escape the engine's per-iteration loop.
///
/// Tool errors never appear here — per §4.5 they are serialized back to the
/// model as tool-result messages and never terminate the loop. Only
/// failures that make further model progress impossible surface as
/// [`EngineError`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The LLM Gateway exhausted its retry budget or hit a fatal error.
    #[error("LLM request failed: {0}")]
    LlmFatal(String),

    /// Any other unexpected failure.
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl From<strix_llm::GatewayError> for EngineError {
    fn from(err: strix_llm::GatewayError) -> Self {
        Self::LlmFatal(err.to_string())
    }
}
