//! The Run Store itself (C8): owns the per-run directory tree and every
//! write into it.
//!
//! Grounded in `astrid_audit::storage`'s append-only persistence shape,
//! simplified to what §6's flat run directory needs: plain JSON/JSONL
//! artifacts and an atomic pending→verified/rejected rename, rather than
//! the teacher's cryptographically chained log (chain-of-custody signing
//! is out of this specification's scope).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use strix_core::finding::{FindingReport, FindingStatus};
use strix_core::ids::{AgentId, FindingId};
use strix_core::scan::Scan;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::events::AgentEvent;
use crate::stats::StatsSnapshot;

/// Callback fired on each finding that finalizes as `verified` (§4.8:
/// "Callback hook fires on each verified finding for interactive
/// observers").
pub type FindingCallback = Arc<dyn Fn(&FindingReport) + Send + Sync>;

/// Owns one scan's `strix_runs/<run>/` directory and serializes every
/// write into it.
///
/// Per-agent event-stream writes are serialized by a lock keyed on
/// [`AgentId`] rather than one store-wide lock, so that concurrently
/// running agents (§5) don't contend on each other's event streams; the
/// finding and stats directories, which are touched far less often, share
/// a single lock.
pub struct RunStore {
    root: PathBuf,
    agents_dir: PathBuf,
    pending_dir: PathBuf,
    verified_dir: PathBuf,
    rejected_dir: PathBuf,
    agent_locks: Mutex<HashMap<AgentId, Arc<Mutex<()>>>>,
    findings_lock: Mutex<()>,
    on_verified: Option<FindingCallback>,
}

impl RunStore {
    /// Create the run directory tree under `runs_dir/run_name/` (§6's
    /// `strix_runs/<run>/` layout) and return a store rooted there.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if any directory cannot be created.
    pub async fn create(runs_dir: &Path, run_name: &str) -> StoreResult<Self> {
        let root = runs_dir.join(run_name);
        let agents_dir = root.join("agents");
        let pending_dir = root.join("pending_verification");
        let verified_dir = root.join("vulnerability_reports");
        let rejected_dir = root.join("rejected_false_positives");

        for dir in [&root, &agents_dir, &pending_dir, &verified_dir, &rejected_dir] {
            fs::create_dir_all(dir).await?;
        }

        Ok(Self {
            root,
            agents_dir,
            pending_dir,
            verified_dir,
            rejected_dir,
            agent_locks: Mutex::new(HashMap::new()),
            findings_lock: Mutex::new(()),
            on_verified: None,
        })
    }

    /// Attach a callback invoked synchronously every time a finding
    /// finalizes as `verified`.
    #[must_use]
    pub fn with_verified_callback(mut self, callback: FindingCallback) -> Self {
        self.on_verified = Some(callback);
        self
    }

    /// The run's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write (or overwrite) `scan.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scan cannot be serialized or written.
    pub async fn write_scan(&self, scan: &Scan) -> StoreResult<()> {
        write_json_atomic(&self.root.join("scan.json"), scan).await
    }

    /// Append one event to `agents/<id>/events.jsonl`, creating the
    /// agent's directory on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the event cannot be serialized or
    /// appended.
    pub async fn append_event(&self, agent_id: &AgentId, event: AgentEvent) -> StoreResult<()> {
        let lock = self.agent_lock(agent_id).await;
        let _guard = lock.lock().await;

        let dir = self.agents_dir.join(agent_id.as_str());
        fs::create_dir_all(&dir).await?;

        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        use tokio::io::AsyncWriteExt;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("events.jsonl"))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn agent_lock(&self, agent_id: &AgentId) -> Arc<Mutex<()>> {
        let mut locks = self.agent_locks.lock().await;
        locks
            .entry(agent_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Write a newly submitted, still-`pending` finding into
    /// `pending_verification/<id>.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the finding cannot be serialized or
    /// written.
    pub async fn submit_finding(&self, finding: &FindingReport) -> StoreResult<()> {
        debug_assert!(
            matches!(finding.status, FindingStatus::Pending),
            "submit_finding called on an already-adjudicated report"
        );
        let _guard = self.findings_lock.lock().await;
        write_json_atomic(&self.pending_path(&finding.id), finding).await
    }

    /// Move an adjudicated finding from `pending_verification/` into
    /// `vulnerability_reports/` or `rejected_false_positives/`, per its
    /// current `status`.
    ///
    /// Implemented as §4.8 describes: the finding's final content is
    /// written in place at the pending path, then that file is renamed
    /// into its destination directory — a single filesystem rename, so
    /// the finding is visible in exactly one of the two destination
    /// directories at any instant (§8: "never both, never neither").
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAdjudicated`] if `finding.status` is still
    /// `pending`, or [`StoreError::Io`]/[`StoreError::Serialize`] on
    /// filesystem failure.
    pub async fn finalize_finding(&self, finding: &FindingReport) -> StoreResult<()> {
        let target_dir = match finding.status {
            FindingStatus::Verified => &self.verified_dir,
            FindingStatus::Rejected { .. } => &self.rejected_dir,
            FindingStatus::Pending => return Err(StoreError::NotAdjudicated(finding.id.clone())),
        };

        let _guard = self.findings_lock.lock().await;
        let pending_path = self.pending_path(&finding.id);
        let target_path = target_dir.join(format!("{}.json", finding.id.as_str()));

        write_json_atomic(&pending_path, finding).await?;
        fs::rename(&pending_path, &target_path).await?;

        if matches!(finding.status, FindingStatus::Verified) {
            if let Some(callback) = &self.on_verified {
                callback(finding);
            }
        }

        Ok(())
    }

    fn pending_path(&self, id: &FindingId) -> PathBuf {
        self.pending_dir.join(format!("{}.json", id.as_str()))
    }

    /// Write (or overwrite) `stats.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be serialized or
    /// written.
    pub async fn write_stats(&self, snapshot: &StatsSnapshot) -> StoreResult<()> {
        write_json_atomic(&self.root.join("stats.json"), snapshot).await
    }
}

/// Write `value` to `path` via a sibling temp file plus rename, so a
/// concurrent reader never observes a partially written file.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let body = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &body).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use strix_core::finding::{FindingReport, RejectionReason};
    use strix_core::ids::{AgentId, SandboxId, ScanId};
    use strix_core::scan::{Scan, ScanMode};

    use super::*;
    use crate::events::AgentEventKind;

    #[tokio::test]
    async fn scan_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path(), "run-1").await.unwrap();
        let scan = Scan::new(
            "https://example.com",
            ScanMode::Standard,
            vec![],
            SandboxId::new(),
            AgentId::new(),
        );
        store.write_scan(&scan).await.unwrap();

        let raw = tokio::fs::read_to_string(dir.path().join("run-1/scan.json"))
            .await
            .unwrap();
        let read_back: Scan = serde_json::from_str(&raw).unwrap();
        assert_eq!(read_back.id, scan.id);
    }

    #[tokio::test]
    async fn events_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path(), "run-1").await.unwrap();
        let agent_id = AgentId::new();

        store
            .append_event(
                &agent_id,
                AgentEvent::now(AgentEventKind::Spawned {
                    parent_id: None,
                    agent_kind: "root".into(),
                }),
            )
            .await
            .unwrap();
        store
            .append_event(
                &agent_id,
                AgentEvent::now(AgentEventKind::StateTransition {
                    from: "running".into(),
                    to: "finished".into(),
                }),
            )
            .await
            .unwrap();

        let path = dir.path().join(format!("run-1/agents/{}/events.jsonl", agent_id.as_str()));
        let contents = tokio::fs::read_to_string(path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"spawned\""));
        assert!(lines[1].contains("\"state_transition\""));
    }

    #[tokio::test]
    async fn verified_finding_moves_and_fires_callback() {
        let dir = tempfile::tempdir().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let store = RunStore::create(dir.path(), "run-1")
            .await
            .unwrap()
            .with_verified_callback(Arc::new(move |_finding| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let mut finding = FindingReport::new("idor", "claim", "https://t", "payload");
        store.submit_finding(&finding).await.unwrap();

        finding.status = FindingStatus::Verified;
        store.finalize_finding(&finding).await.unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        let pending_path = dir
            .path()
            .join(format!("run-1/pending_verification/{}.json", finding.id.as_str()));
        let verified_path = dir
            .path()
            .join(format!("run-1/vulnerability_reports/{}.json", finding.id.as_str()));
        assert!(!pending_path.exists());
        assert!(verified_path.exists());
    }

    #[tokio::test]
    async fn rejected_finding_moves_without_firing_callback() {
        let dir = tempfile::tempdir().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let store = RunStore::create(dir.path(), "run-1")
            .await
            .unwrap()
            .with_verified_callback(Arc::new(move |_finding| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let mut finding = FindingReport::new("xss", "claim", "https://t", "payload");
        store.submit_finding(&finding).await.unwrap();

        finding.status = FindingStatus::Rejected {
            reason: RejectionReason::NonReproducible,
        };
        store.finalize_finding(&finding).await.unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        let rejected_path = dir
            .path()
            .join(format!("run-1/rejected_false_positives/{}.json", finding.id.as_str()));
        assert!(rejected_path.exists());
    }

    #[tokio::test]
    async fn finalizing_a_pending_finding_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path(), "run-1").await.unwrap();
        let finding = FindingReport::new("ssrf", "claim", "https://t", "payload");
        let err = store.finalize_finding(&finding).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAdjudicated(_)));
    }

    #[tokio::test]
    async fn stats_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path(), "run-1").await.unwrap();
        let snapshot = StatsSnapshot::empty(ScanId::new());
        store.write_stats(&snapshot).await.unwrap();
        let raw = tokio::fs::read_to_string(dir.path().join("run-1/stats.json"))
            .await
            .unwrap();
        let read_back: StatsSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(read_back.scan_id, snapshot.scan_id);
    }
}
