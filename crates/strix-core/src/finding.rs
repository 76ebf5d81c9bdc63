//! Finding reports: the evidence bundle adjudicated by the Verification
//! Pipeline (`strix-verify`).

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, FindingId};

/// Why a finding was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Phase 1 failed: fewer than three independent reproductions.
    NonReproducible,
    /// Phase 2 failed: the control test didn't support the claim.
    InvalidInference,
    /// The verifier exhausted its retry budget (repeated crashes) without
    /// reaching either phase's verdict.
    VerifierExhausted,
}

/// Adjudication status of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FindingStatus {
    /// Awaiting verification.
    Pending,
    /// Confirmed by the Verification Pipeline.
    Verified,
    /// Rejected, with a reason.
    Rejected {
        /// Why the finding was rejected.
        reason: RejectionReason,
    },
}

/// Evidence bundle reported by an agent for a suspected vulnerability.
///
/// Evidence fields are immutable after creation; only `status`,
/// `verifier_agent_id`, and `adjudication_notes` mutate, and only through
/// the Verification Pipeline (`strix-verify`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingReport {
    /// Unique finding ID.
    pub id: FindingId,
    /// Vulnerability type (e.g. `"sql_injection"`, `"idor"`).
    pub vulnerability_type: String,
    /// The claim being asserted.
    pub claim_assertion: String,
    /// Primary evidence items (request/response captures, screenshots, etc).
    pub primary_evidence: Vec<String>,
    /// Ordered reproduction steps.
    pub reproduction_steps: Vec<String>,
    /// The proof-of-concept payload.
    pub poc_payload: String,
    /// Target URL the finding concerns.
    pub target_url: String,
    /// Affected parameter name, if applicable.
    pub affected_parameter: Option<String>,
    /// Observed baseline (non-exploited) state, if captured.
    pub baseline_state: Option<String>,
    /// Observed exploited state, if captured.
    pub exploited_state: Option<String>,
    /// Control tests the reporter already ran, if any.
    pub reporter_control_tests: Vec<String>,
    /// Current adjudication status.
    pub status: FindingStatus,
    /// The verifier agent assigned, once spawned.
    pub verifier_agent_id: Option<AgentId>,
    /// Notes recorded by the verifier during adjudication.
    pub adjudication_notes: Option<String>,
}

impl FindingReport {
    /// Create a new, unadjudicated finding report.
    #[must_use]
    pub fn new(
        vulnerability_type: impl Into<String>,
        claim_assertion: impl Into<String>,
        target_url: impl Into<String>,
        poc_payload: impl Into<String>,
    ) -> Self {
        Self {
            id: FindingId::new(),
            vulnerability_type: vulnerability_type.into(),
            claim_assertion: claim_assertion.into(),
            primary_evidence: Vec::new(),
            reproduction_steps: Vec::new(),
            poc_payload: poc_payload.into(),
            target_url: target_url.into(),
            affected_parameter: None,
            baseline_state: None,
            exploited_state: None,
            reporter_control_tests: Vec::new(),
            status: FindingStatus::Pending,
            verifier_agent_id: None,
            adjudication_notes: None,
        }
    }

    /// Whether this finding has already been adjudicated (not `pending`).
    ///
    /// Used by the Verification Pipeline to make resubmission idempotent.
    #[must_use]
    pub fn is_adjudicated(&self) -> bool {
        !matches!(self.status, FindingStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_findings_are_pending() {
        let finding = FindingReport::new("sql_injection", "claim", "https://t", "' OR 1=1");
        assert_eq!(finding.status, FindingStatus::Pending);
        assert!(!finding.is_adjudicated());
    }

    #[test]
    fn adjudicated_after_verification() {
        let mut finding = FindingReport::new("idor", "claim", "https://t", "id=2");
        finding.status = FindingStatus::Verified;
        assert!(finding.is_adjudicated());
    }
}
