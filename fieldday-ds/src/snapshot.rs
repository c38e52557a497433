//! Raw submission snapshots
//!
//! Alongside the relational store, every accepted submission is appended as a
//! timestamped JSON file under the team's directory, with a `latest.json`
//! pointer overwritten each time. Audit and export only; the read side never
//! consults these files.

use crate::mediafs::sanitize_component;
use crate::models::wire::SubmissionDoc;
use fieldday_common::Result;
use std::path::PathBuf;

/// Filesystem store of raw submission snapshots, keyed by team.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> SnapshotStore {
        SnapshotStore { root: root.into() }
    }

    /// Append a snapshot for a team and refresh its `latest.json` pointer.
    /// Returns the path of the timestamped file.
    pub fn save(&self, team_id: &str, doc: &SubmissionDoc) -> Result<PathBuf> {
        let team_dir = self.root.join(sanitize_component(team_id)?);
        std::fs::create_dir_all(&team_dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let snapshot_path = team_dir.join(format!("data_{}.json", stamp));

        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| fieldday_common::Error::Internal(format!("snapshot encoding: {}", e)))?;
        std::fs::write(&snapshot_path, json)?;
        std::fs::copy(&snapshot_path, team_dir.join("latest.json"))?;

        Ok(snapshot_path)
    }

    /// Path of a team's latest-snapshot pointer.
    pub fn latest_path(&self, team_id: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(sanitize_component(team_id)?)
            .join("latest.json"))
    }
}
