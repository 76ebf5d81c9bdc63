//! The rolling scan-wide statistics snapshot (`stats.json`, §6, §4.8).

use serde::{Deserialize, Serialize};
use strix_core::ids::ScanId;
use strix_core::timestamp::Timestamp;

/// A point-in-time rollup of a scan's progress, rewritten periodically by
/// the caller driving the scan loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// The scan this snapshot describes.
    pub scan_id: ScanId,
    /// Agents currently `running` or `waiting`.
    pub agents_active: u64,
    /// Agents that reached `finished`.
    pub agents_finished: u64,
    /// Agents that reached `failed`.
    pub agents_failed: u64,
    /// Findings awaiting verification.
    pub findings_pending: u64,
    /// Findings confirmed.
    pub findings_verified: u64,
    /// Findings rejected.
    pub findings_rejected: u64,
    /// Cumulative LLM cost across every agent in the scan, in USD.
    pub total_cost_usd: f64,
    /// Cumulative input+output+cached tokens across every agent.
    pub total_tokens: u64,
    /// When this snapshot was generated.
    pub generated_at: Timestamp,
}

impl StatsSnapshot {
    /// A zeroed snapshot for a freshly started scan.
    #[must_use]
    pub fn empty(scan_id: ScanId) -> Self {
        Self {
            scan_id,
            agents_active: 0,
            agents_finished: 0,
            agents_failed: 0,
            findings_pending: 0,
            findings_verified: 0,
            findings_rejected: 0,
            total_cost_usd: 0.0,
            total_tokens: 0,
            generated_at: Timestamp::now(),
        }
    }
}
