//! Bounded leaderboard of the highest lifetime scores
//!
//! Entries are kept in one ordered sequence of (account, score) records,
//! sorted non-increasing by score. Equal scores keep their arrival order.

mod top_n;

pub use top_n::{RankEntry, RankUpdate, TopNIndex};
