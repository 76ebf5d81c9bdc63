//! The `submit_finding` host-local tool: the one seam in this binary where
//! a root/child agent's evidence bundle becomes a [`FindingReport`] handed
//! to the Verification Pipeline (§4.7). Concrete reconnaissance tools
//! (browser, shell, HTTP replay) are out of this specification's scope
//! (§4.1); this is the one tool the scan engine itself requires.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use strix_core::finding::FindingReport;
use strix_llm::LlmProvider;
use strix_tools::{ToolError, ToolHandler, ToolResult};
use strix_verify::VerificationPipeline;

use crate::status::StatusReporter;

/// Name under which this tool is registered.
pub const SUBMIT_FINDING_TOOL: &str = "submit_finding";

/// JSON schema for [`SUBMIT_FINDING_TOOL`]'s arguments.
#[must_use]
pub fn submit_finding_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "vulnerability_type": {"type": "string"},
            "claim_assertion": {"type": "string"},
            "target_url": {"type": "string"},
            "poc_payload": {"type": "string"},
            "affected_parameter": {"type": "string"},
            "baseline_state": {"type": "string"},
            "exploited_state": {"type": "string"},
            "primary_evidence": {"type": "array", "items": {"type": "string"}},
            "reproduction_steps": {"type": "array", "items": {"type": "string"}},
            "reporter_control_tests": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["vulnerability_type", "claim_assertion", "target_url", "poc_payload"]
    })
}

fn string_array(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn field<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required field {key:?}")))
}

/// Parses a `submit_finding` call's arguments into a [`FindingReport`] and
/// routes it through a scan-shared [`VerificationPipeline`], blocking the
/// calling agent's iteration until a verdict lands — resolving §4.7's
/// "submitted finding reports" into the one way a root/child agent's
/// evidence actually reaches adjudication.
pub struct SubmitFindingHandler<P: LlmProvider> {
    pipeline: Arc<VerificationPipeline<P>>,
    reporter: Arc<StatusReporter>,
}

impl<P: LlmProvider> SubmitFindingHandler<P> {
    /// Wrap a scan's shared verification pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<VerificationPipeline<P>>, reporter: Arc<StatusReporter>) -> Self {
        Self { pipeline, reporter }
    }
}

#[async_trait]
impl<P: LlmProvider> ToolHandler for SubmitFindingHandler<P> {
    async fn call(&self, args: Value) -> ToolResult {
        let vulnerability_type = field(&args, "vulnerability_type")?;
        let claim_assertion = field(&args, "claim_assertion")?;
        let target_url = field(&args, "target_url")?;
        let poc_payload = field(&args, "poc_payload")?;

        let mut finding = FindingReport::new(vulnerability_type, claim_assertion, target_url, poc_payload);
        finding.affected_parameter = args.get("affected_parameter").and_then(Value::as_str).map(str::to_string);
        finding.baseline_state = args.get("baseline_state").and_then(Value::as_str).map(str::to_string);
        finding.exploited_state = args.get("exploited_state").and_then(Value::as_str).map(str::to_string);
        finding.primary_evidence = string_array(&args, "primary_evidence");
        finding.reproduction_steps = string_array(&args, "reproduction_steps");
        finding.reporter_control_tests = string_array(&args, "reporter_control_tests");

        let finding_id = finding.id.clone();
        let vulnerability_type = finding.vulnerability_type.clone();
        let adjudicated = self
            .pipeline
            .adjudicate(finding)
            .await
            .map_err(|err| ToolError::Other(err.to_string()))?;

        self.reporter
            .finding_adjudicated(finding_id.as_str(), &vulnerability_type, &adjudicated.status);

        Ok(format!(
            "finding {finding_id} adjudicated as {status:?}",
            status = adjudicated.status
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_the_four_core_fields() {
        let schema = submit_finding_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
    }

    #[test]
    fn field_reports_a_missing_key() {
        let err = field(&serde_json::json!({}), "claim_assertion").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn string_array_defaults_to_empty() {
        assert!(string_array(&serde_json::json!({}), "reproduction_steps").is_empty());
        let populated = string_array(&serde_json::json!({"x": ["a", "b"]}), "x");
        assert_eq!(populated, vec!["a".to_string(), "b".to_string()]);
    }
}
