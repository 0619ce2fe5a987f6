//! Activity Ledger
//!
//! Lifetime action counts per account plus the global counter that actions
//! move up or down.
//!
//! ## Score Model
//!
//! - Every action adds 1 to the account's lifetime score, whatever its direction
//! - Increments and decrements are also tallied separately
//! - Records are created zero-valued on first action and never deleted

mod account;
mod counter;

pub use account::{AccountId, AccountRecord, ActivityLedger, Direction};
pub use counter::GlobalCounter;
