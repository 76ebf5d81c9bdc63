//! The Verification Pipeline (C7): adjudicates submitted finding reports
//! through a two-phase reproduce-then-validate protocol, one verifier
//! agent per finding, sharing the originating scan's sandbox family
//! (§4.7).
//!
//! Grounded in `astrid_approval::manager`'s outcome-enum-plus-handler shape
//! for modeling a multi-step decision as explicit state rather than
//! free-form agent output, reshaped around §4.7's own two phases and the
//! design note that verification is a property of the finding, not of the
//! verifier agent's lifecycle — so a crashed verifier can be re-spawned
//! without losing already-settled phase state.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod pipeline;
mod session;
mod tools;

pub use error::{VerificationError, VerificationResult};
pub use pipeline::{PromptModuleLoader, VerificationPipeline, VerifierToolSpec};
pub use session::{Phase1Outcome, Phase2Outcome, VerificationSession, REQUIRED_REPRODUCTIONS};
pub use tools::{
    REPORT_CONTROL_TEST_TOOL, REPORT_REPRODUCTION_TOOL, ReportControlTestTool, ReportReproductionTool,
};
