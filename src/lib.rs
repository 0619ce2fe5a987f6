//! Activity Badges
//!
//! Tracks lifetime activity per account, keeps a bounded leaderboard of the
//! most active accounts, and awards monotonic tier badges as cumulative
//! activity crosses configurable thresholds.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── error.rs       - Domain error types
//! ├── ledger/        - Per-account lifetime counts + global counter
//! ├── ranking/       - Bounded top-N leaderboard
//! ├── tiers/         - Thresholds, tier engine, badge id issuance
//! ├── render.rs      - Badge descriptors
//! ├── service/       - Orchestrator (single lock) + snapshots
//! └── api/           - HTTP API endpoints
//! ```
//!
//! ## Action Flow
//!
//! ```text
//! action → ActivityLedger → TopNIndex → TierEngine → (first promotion) IssuanceRegistry
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod ranking;
pub mod render;
pub mod service;
pub mod tiers;

// Re-export main types for convenience
pub use config::BadgeConfig;
pub use error::{BadgeError, Result};
pub use ledger::{AccountId, AccountRecord, ActivityLedger, Direction, GlobalCounter};
pub use ranking::{RankEntry, RankUpdate, TopNIndex};
pub use render::{render, render_level, BadgeDescriptor};
pub use service::{ActionOutcome, ActivityService, BadgeSnapshot, UserStats};
pub use tiers::{
    BadgeId, IssuanceRegistry, SequentialIssuer, ThresholdTable, Tier, TierAssignment, TierChange,
    TierEngine,
};
