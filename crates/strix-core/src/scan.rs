//! Scan metadata: the top-level unit of work created once per CLI invocation.

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, SandboxId, ScanId};
use crate::timestamp::Timestamp;

/// Maximum number of prompt modules a scan may attach, per §3.
pub const MAX_PROMPT_MODULES: usize = 5;

/// Depth configuration selecting prompt modules and iteration discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Fast, shallow pass.
    Quick,
    /// Default depth.
    Standard,
    /// Exhaustive pass.
    Deep,
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            other => Err(format!("invalid scan mode: {other}")),
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Deep => "deep",
        };
        write!(f, "{s}")
    }
}

/// A single scan: one target, one sandbox family, one root agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    /// Unique scan ID.
    pub id: ScanId,
    /// Target specification (path, URL, repo, or IP).
    pub target: String,
    /// Depth configuration.
    pub scan_mode: ScanMode,
    /// Attached prompt modules (at most [`MAX_PROMPT_MODULES`]).
    pub prompt_modules: Vec<String>,
    /// The sandbox family backing this scan.
    pub sandbox_id: SandboxId,
    /// The scan's single root agent.
    pub root_agent_id: AgentId,
    /// When the scan started.
    pub started_at: Timestamp,
    /// When the scan ended, if it has.
    pub ended_at: Option<Timestamp>,
}

impl Scan {
    /// Create a new scan. Truncates `prompt_modules` to the first
    /// [`MAX_PROMPT_MODULES`] entries rather than erroring, since module
    /// selection is data-driven per §9 and callers should not need to
    /// pre-validate the count.
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        scan_mode: ScanMode,
        mut prompt_modules: Vec<String>,
        sandbox_id: SandboxId,
        root_agent_id: AgentId,
    ) -> Self {
        prompt_modules.truncate(MAX_PROMPT_MODULES);
        Self {
            id: ScanId::new(),
            target: target.into(),
            scan_mode,
            prompt_modules,
            sandbox_id,
            root_agent_id,
            started_at: Timestamp::now(),
            ended_at: None,
        }
    }

    /// Mark the scan as ended.
    pub fn finish(&mut self) {
        self.ended_at = Some(Timestamp::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_mode_parses() {
        assert_eq!("quick".parse::<ScanMode>().unwrap(), ScanMode::Quick);
        assert!("bogus".parse::<ScanMode>().is_err());
    }

    #[test]
    fn prompt_modules_truncated() {
        let modules: Vec<String> = (0..10).map(|i| format!("module-{i}")).collect();
        let scan = Scan::new(
            "https://example.com",
            ScanMode::Standard,
            modules,
            SandboxId::new(),
            AgentId::new(),
        );
        assert_eq!(scan.prompt_modules.len(), MAX_PROMPT_MODULES);
    }
}
