//! Tier Badges
//!
//! Lifetime scores are graded against seven configurable thresholds. An
//! account's tier only ever moves up, and its first promotion issues a
//! permanent badge id.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ ThresholdTable │────►│  TierEngine  │────►│ IssuanceRegistry │
//! │ (7 cutoffs)    │     │ (monotonic)  │     │ (one id/account) │
//! └────────────────┘     └──────────────┘     └──────────────────┘
//!                               │
//!                               ▼
//!                        ┌──────────────┐
//!                        │  TierChange  │
//!                        │ (notification)│
//!                        └──────────────┘
//! ```

mod engine;
mod issuance;
mod thresholds;
mod tier;

pub use engine::{TierAssignment, TierChange, TierEngine};
pub use issuance::{BadgeId, IssuanceRegistry, SequentialIssuer};
pub use thresholds::{ThresholdTable, DEFAULT_THRESHOLDS, THRESHOLD_COUNT};
pub use tier::Tier;
