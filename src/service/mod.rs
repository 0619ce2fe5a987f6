//! Activity Service - main orchestrator
//!
//! Owns the ledger, leaderboard, tier engine and issuer behind a single
//! lock. An action runs ledger → leaderboard → tier check as one unit.

mod manager;
mod snapshot;

pub use manager::{ActionOutcome, ActivityService, UserStats};
pub use snapshot::{load_snapshot, save_snapshot, BadgeSnapshot, SNAPSHOT_VERSION};
