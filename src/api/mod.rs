//! HTTP API endpoints for the badge service
//!
//! Provides REST APIs for:
//! - Recording account actions
//! - Leaderboard, account stats and badge rendering
//! - Governance (thresholds, global counter, fee)

pub mod badges;

pub use badges::{create_badge_router, BadgeApiState};
