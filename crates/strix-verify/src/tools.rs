//! Host-local tools through which a verifier agent reports phase progress
//! back into its [`VerificationSession`], turning the model's subjective
//! judgment of "did this reproduce" into a structured signal the pipeline
//! can adjudicate on without parsing free-form text.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use strix_tools::{ToolError, ToolHandler, ToolResult};

use crate::session::VerificationSession;

/// Tool name for reporting one reproduction attempt.
pub const REPORT_REPRODUCTION_TOOL: &str = "report_reproduction";
/// Tool name for reporting the control test.
pub const REPORT_CONTROL_TEST_TOOL: &str = "report_control_test";

/// `report_reproduction({ reproduced: bool, notes: string })`: records one
/// phase-1 attempt.
///
/// Holds a plain [`std::sync::Mutex`] rather than `tokio::sync::Mutex`: the
/// lock is only ever held for the duration of a synchronous state update,
/// never across an `.await`, and the pipeline needs to check the session's
/// verdict from a non-async closure (`is_terminal_ready`).
pub struct ReportReproductionTool {
    session: Arc<Mutex<VerificationSession>>,
}

impl ReportReproductionTool {
    /// Bind to the session a single verifier's tool calls update.
    #[must_use]
    pub fn new(session: Arc<Mutex<VerificationSession>>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ReportReproductionTool {
    async fn call(&self, args: Value) -> ToolResult {
        let reproduced = args
            .get("reproduced")
            .and_then(Value::as_bool)
            .ok_or_else(|| ToolError::InvalidArguments("expected boolean field `reproduced`".into()))?;

        let mut session = self.session.lock().expect("verification session poisoned");
        session.record_reproduction(reproduced);
        Ok(format!(
            "recorded reproduction attempt: {}",
            if reproduced { "succeeded" } else { "failed" }
        ))
    }
}

/// `report_control_test({ supports_claim: bool, notes: string })`: records
/// the phase-2 control test result.
pub struct ReportControlTestTool {
    session: Arc<Mutex<VerificationSession>>,
}

impl ReportControlTestTool {
    /// Bind to the session a single verifier's tool calls update.
    #[must_use]
    pub fn new(session: Arc<Mutex<VerificationSession>>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ReportControlTestTool {
    async fn call(&self, args: Value) -> ToolResult {
        let supports_claim = args
            .get("supports_claim")
            .and_then(Value::as_bool)
            .ok_or_else(|| ToolError::InvalidArguments("expected boolean field `supports_claim`".into()))?;

        let mut session = self.session.lock().expect("verification session poisoned");
        session.record_control_test(supports_claim);
        Ok("recorded control test result".to_string())
    }
}

/// JSON schema shared by both report tools (identical shape, different
/// boolean field name).
#[must_use]
pub fn reproduction_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "reproduced": {
                "type": "boolean",
                "description": "Whether this attempt reproduced the claimed behavior."
            },
            "notes": {
                "type": "string",
                "description": "What was observed."
            }
        },
        "required": ["reproduced"]
    })
}

/// Schema for [`REPORT_CONTROL_TEST_TOOL`].
#[must_use]
pub fn control_test_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "supports_claim": {
                "type": "boolean",
                "description": "Whether the control test behaved as the vulnerability claim predicts for a non-vulnerable system."
            },
            "notes": {
                "type": "string",
                "description": "What the control test was and what it showed."
            }
        },
        "required": ["supports_claim"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_reproduction_updates_session() {
        let session = Arc::new(Mutex::new(VerificationSession::new()));
        let tool = ReportReproductionTool::new(session.clone());
        tool.call(serde_json::json!({"reproduced": true})).await.unwrap();
        assert_eq!(session.lock().unwrap().phase1(), None);
    }

    #[tokio::test]
    async fn missing_field_is_invalid_arguments() {
        let session = Arc::new(Mutex::new(VerificationSession::new()));
        let tool = ReportReproductionTool::new(session);
        let err = tool.call(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn report_control_test_updates_session() {
        let session = Arc::new(Mutex::new(VerificationSession::new()));
        let tool = ReportControlTestTool::new(session.clone());
        tool.call(serde_json::json!({"supports_claim": false})).await.unwrap();
        assert_eq!(
            session.lock().unwrap().phase2(),
            Some(crate::session::Phase2Outcome::InvalidInference)
        );
    }
}
