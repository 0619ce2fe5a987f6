//! Domain errors
//!
//! Every variant is raised before any state is touched, so a failed call
//! leaves the ledger, leaderboard and tier tables exactly as they were.

use thiserror::Error;

use crate::ledger::AccountId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadgeError {
    /// Leaderboard capacity must be at least one slot
    #[error("leaderboard capacity must be greater than zero")]
    CapacityMisconfigured,

    /// A second badge id was requested for an account that already holds one
    #[error("account {account} already holds a badge id")]
    DuplicateIssuance { account: AccountId },

    /// Renderer was handed a tier outside 0..=7
    #[error("invalid tier {0}: expected 0..=7")]
    InvalidTier(u8),

    /// Threshold table is not non-decreasing
    #[error("threshold {position} ({value}) is lower than the threshold before it ({previous})")]
    NonMonotonicThresholds {
        position: usize,
        previous: u64,
        value: u64,
    },

    #[error("expected 7 thresholds, got {0}")]
    InvalidThresholdCount(usize),

    /// Global counter cannot go below zero
    #[error("global counter is already zero")]
    CounterUnderflow,

    #[error("admin authorization failed")]
    Unauthorized,

    #[error("snapshot rejected: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, BadgeError>;
