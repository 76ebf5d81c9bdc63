//! The two-phase verification state machine (§4.7).
//!
//! Modeled as a property of the finding under adjudication rather than of
//! the verifier agent's own lifecycle, so the pipeline can re-spawn a
//! crashed verifier and resume against the same accumulated phase state
//! instead of starting the reproduction count over.

use strix_core::finding::RejectionReason;

/// Independent reproduction attempts required before phase 1 can pass
/// (§4.7: "at least three independent, consecutive attempts").
pub const REQUIRED_REPRODUCTIONS: usize = 3;

/// Outcome of phase 1 (reproducibility).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase1Outcome {
    /// Three consecutive attempts all reproduced the claimed behavior.
    Reproduced,
    /// An attempt failed before three consecutive successes accumulated.
    NonReproducible,
}

/// Outcome of phase 2 (validity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase2Outcome {
    /// The control test behaved as the vulnerability claim predicts for a
    /// non-vulnerable system.
    Valid,
    /// The control test contradicted the claim.
    InvalidInference,
}

/// Accumulated phase state for one finding's verification, driven by the
/// verifier's `report_reproduction` / `report_control_test` tool calls.
///
/// A single failed reproduction attempt is final — per §4.7 the three
/// successes must be consecutive, so one failure settles phase 1 as
/// `non_reproducible` rather than merely resetting the counter.
#[derive(Debug, Clone, Default)]
pub struct VerificationSession {
    consecutive_successes: usize,
    phase1: Option<Phase1Outcome>,
    control_test: Option<bool>,
}

impl VerificationSession {
    /// A session with no attempts recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reproduction attempt's outcome. A no-op once phase 1
    /// has already settled.
    pub fn record_reproduction(&mut self, reproduced: bool) {
        if self.phase1.is_some() {
            return;
        }
        if reproduced {
            self.consecutive_successes = self.consecutive_successes.saturating_add(1);
            if self.consecutive_successes >= REQUIRED_REPRODUCTIONS {
                self.phase1 = Some(Phase1Outcome::Reproduced);
            }
        } else {
            self.phase1 = Some(Phase1Outcome::NonReproducible);
        }
    }

    /// Phase 1's outcome, once settled.
    #[must_use]
    pub fn phase1(&self) -> Option<Phase1Outcome> {
        self.phase1
    }

    /// Record the control test's outcome: `true` if it behaved as the
    /// claim predicts for a non-vulnerable system. A no-op once phase 1
    /// has failed (there is nothing left to validate).
    pub fn record_control_test(&mut self, supports_claim: bool) {
        if self.phase1 == Some(Phase1Outcome::NonReproducible) {
            return;
        }
        self.control_test = Some(supports_claim);
    }

    /// Phase 2's outcome, once a control test has been reported.
    #[must_use]
    pub fn phase2(&self) -> Option<Phase2Outcome> {
        self.control_test.map(|supports| {
            if supports {
                Phase2Outcome::Valid
            } else {
                Phase2Outcome::InvalidInference
            }
        })
    }

    /// The overall verdict, once decided. `Ok(())` means verified;
    /// `Err(reason)` means rejected. `None` means still in progress.
    #[must_use]
    pub fn verdict(&self) -> Option<Result<(), RejectionReason>> {
        match self.phase1? {
            Phase1Outcome::NonReproducible => Some(Err(RejectionReason::NonReproducible)),
            Phase1Outcome::Reproduced => match self.phase2()? {
                Phase2Outcome::Valid => Some(Ok(())),
                Phase2Outcome::InvalidInference => Some(Err(RejectionReason::InvalidInference)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_consecutive_successes_pass_phase_one() {
        let mut session = VerificationSession::new();
        session.record_reproduction(true);
        session.record_reproduction(true);
        assert_eq!(session.phase1(), None);
        session.record_reproduction(true);
        assert_eq!(session.phase1(), Some(Phase1Outcome::Reproduced));
    }

    #[test]
    fn a_single_failure_rejects_even_after_two_successes() {
        let mut session = VerificationSession::new();
        session.record_reproduction(true);
        session.record_reproduction(true);
        session.record_reproduction(false);
        assert_eq!(session.phase1(), Some(Phase1Outcome::NonReproducible));
        assert_eq!(session.verdict(), Some(Err(RejectionReason::NonReproducible)));
    }

    #[test]
    fn verdict_waits_for_both_phases() {
        let mut session = VerificationSession::new();
        for _ in 0..REQUIRED_REPRODUCTIONS {
            session.record_reproduction(true);
        }
        assert_eq!(session.verdict(), None);
        session.record_control_test(true);
        assert_eq!(session.verdict(), Some(Ok(())));
    }

    #[test]
    fn invalid_control_test_rejects_after_reproduction() {
        let mut session = VerificationSession::new();
        for _ in 0..REQUIRED_REPRODUCTIONS {
            session.record_reproduction(true);
        }
        session.record_control_test(false);
        assert_eq!(session.verdict(), Some(Err(RejectionReason::InvalidInference)));
    }

    #[test]
    fn attempts_after_settling_are_ignored() {
        let mut session = VerificationSession::new();
        session.record_reproduction(false);
        session.record_reproduction(true);
        session.record_reproduction(true);
        session.record_reproduction(true);
        assert_eq!(session.phase1(), Some(Phase1Outcome::NonReproducible));
    }
}
