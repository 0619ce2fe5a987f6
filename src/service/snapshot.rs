//! Persisted service state
//!
//! JSON snapshot of the account table, ranked list, threshold table and
//! badge assignments. Written atomically via a temp file + rename.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::ledger::{AccountId, AccountRecord};
use crate::ranking::RankEntry;
use crate::tiers::{BadgeId, ThresholdTable, TierAssignment};

pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeSnapshot {
    pub version: u8,
    pub taken_at: DateTime<Utc>,

    /// Sorted by account id
    pub accounts: Vec<AccountRecord>,

    /// Ranked order, highest first
    pub leaderboard: Vec<RankEntry>,

    pub thresholds: ThresholdTable,
    pub assignments: HashMap<AccountId, TierAssignment>,
    pub next_badge_id: BadgeId,
    pub counter: u64,
    pub fee: u64,
}

/// Load a snapshot; a missing file is `Ok(None)`.
pub async fn load_snapshot(path: &Path) -> Result<Option<BadgeSnapshot>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot on disk");
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read snapshot {}", path.display()))
        }
    };

    let snapshot: BadgeSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(anyhow::anyhow!(
            "Unsupported snapshot version {} in {}",
            snapshot.version,
            path.display()
        ));
    }

    info!(
        path = %path.display(),
        accounts = snapshot.accounts.len(),
        ranked = snapshot.leaderboard.len(),
        "Loaded snapshot"
    );
    Ok(Some(snapshot))
}

pub async fn save_snapshot(path: &Path, snapshot: &BadgeSnapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot).context("Failed to encode snapshot")?;

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Snapshot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "{}_{}.json",
            name,
            Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ))
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let path = temp_path("badges_missing");
        assert!(load_snapshot(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let path = temp_path("badges_snapshot");
        let snapshot = BadgeSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            accounts: vec![AccountRecord::new("alice".to_string())],
            leaderboard: vec![],
            thresholds: ThresholdTable::default(),
            assignments: HashMap::new(),
            next_badge_id: 1,
            counter: 3,
            fee: 0,
        };

        save_snapshot(&path, &snapshot).await.unwrap();
        let loaded = load_snapshot(&path).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let path = temp_path("badges_version");
        let mut value = serde_json::json!({
            "version": 99,
            "taken_at": Utc::now(),
            "accounts": [],
            "leaderboard": [],
            "thresholds": [10, 25, 50, 100, 250, 500, 1000],
            "assignments": {},
            "next_badge_id": 1,
            "counter": 0,
            "fee": 0
        });
        tokio::fs::write(&path, serde_json::to_vec(&value).unwrap())
            .await
            .unwrap();
        assert!(load_snapshot(&path).await.is_err());

        value["version"] = serde_json::json!(SNAPSHOT_VERSION);
        tokio::fs::write(&path, serde_json::to_vec(&value).unwrap())
            .await
            .unwrap();
        assert!(load_snapshot(&path).await.unwrap().is_some());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
