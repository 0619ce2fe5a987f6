//! Top-N index
//!
//! Capacity is small and fixed, so every update is a linear presence scan
//! followed by a linear swap pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BadgeError, Result};
use crate::ledger::AccountId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub account: AccountId,
    pub score: u64,
}

/// What an update did to the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankUpdate {
    /// Account was already listed; its score was overwritten
    Updated { from: usize, to: usize },
    /// Account was appended to a list with free slots
    Inserted { position: usize },
    /// Account took the last slot of a full list
    Replaced { evicted: RankEntry, position: usize },
    /// List is full and the score does not beat the current minimum
    Rejected,
}

impl RankUpdate {
    /// Position of the account after the update, if it is listed
    pub fn position(&self) -> Option<usize> {
        match self {
            RankUpdate::Updated { to, .. } => Some(*to),
            RankUpdate::Inserted { position } | RankUpdate::Replaced { position, .. } => {
                Some(*position)
            }
            RankUpdate::Rejected => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopNIndex {
    capacity: usize,
    entries: Vec<RankEntry>,
}

impl TopNIndex {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BadgeError::CapacityMisconfigured);
        }
        Ok(Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        })
    }

    /// Rebuild from persisted entries, checking the length bound, ordering
    /// and account uniqueness.
    pub fn from_entries(capacity: usize, entries: Vec<RankEntry>) -> Result<Self> {
        let mut index = Self::new(capacity)?;
        if entries.len() > capacity {
            return Err(BadgeError::Snapshot(format!(
                "{} ranked entries exceed capacity {}",
                entries.len(),
                capacity
            )));
        }
        if entries.windows(2).any(|w| w[0].score < w[1].score) {
            return Err(BadgeError::Snapshot("ranked entries are not sorted".to_string()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.account == entry.account) {
                return Err(BadgeError::Snapshot(format!(
                    "account {} ranked twice",
                    entry.account
                )));
            }
        }
        index.entries = entries;
        Ok(index)
    }

    pub fn update(&mut self, account: &str, score: u64) -> RankUpdate {
        if let Some(from) = self.position(account) {
            let previous = self.entries[from].score;
            self.entries[from].score = score;
            let to = if score >= previous {
                self.bubble_up(from)
            } else {
                self.sink_down(from)
            };
            return RankUpdate::Updated { from, to };
        }

        if self.entries.len() < self.capacity {
            self.entries.push(RankEntry {
                account: account.to_string(),
                score,
            });
            let position = self.bubble_up(self.entries.len() - 1);
            return RankUpdate::Inserted { position };
        }

        let last = self.entries.len() - 1;
        if score <= self.entries[last].score {
            debug!(
                account = %account,
                score = score,
                minimum = self.entries[last].score,
                "Leaderboard candidate rejected"
            );
            return RankUpdate::Rejected;
        }

        let evicted = std::mem::replace(
            &mut self.entries[last],
            RankEntry {
                account: account.to_string(),
                score,
            },
        );
        let position = self.bubble_up(last);
        RankUpdate::Replaced { evicted, position }
    }

    /// Swap towards the head while the predecessor scores strictly lower.
    fn bubble_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 && self.entries[pos - 1].score < self.entries[pos].score {
            self.entries.swap(pos - 1, pos);
            pos -= 1;
        }
        pos
    }

    /// Swap towards the tail while the successor scores strictly higher.
    fn sink_down(&mut self, mut pos: usize) -> usize {
        while pos + 1 < self.entries.len() && self.entries[pos + 1].score > self.entries[pos].score
        {
            self.entries.swap(pos, pos + 1);
            pos += 1;
        }
        pos
    }

    pub fn position(&self, account: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.account == account)
    }

    pub fn snapshot(&self) -> Vec<RankEntry> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(index: &TopNIndex) -> Vec<(&str, u64)> {
        index
            .entries()
            .iter()
            .map(|e| (e.account.as_str(), e.score))
            .collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(TopNIndex::new(0).unwrap_err(), BadgeError::CapacityMisconfigured);
    }

    #[test]
    fn test_full_list_rejects_score_at_minimum() {
        let mut index = TopNIndex::new(3).unwrap();
        index.update("a", 5);
        index.update("b", 3);
        index.update("c", 8);

        assert_eq!(index.update("d", 1), RankUpdate::Rejected);
        assert_eq!(index.update("d", 3), RankUpdate::Rejected);
        assert_eq!(listed(&index), vec![("c", 8), ("a", 5), ("b", 3)]);
    }

    #[test]
    fn test_existing_entry_moves_up() {
        let mut index = TopNIndex::new(3).unwrap();
        index.update("a", 5);
        index.update("b", 3);
        index.update("c", 8);

        assert_eq!(index.update("a", 10), RankUpdate::Updated { from: 1, to: 0 });
        assert_eq!(listed(&index), vec![("a", 10), ("c", 8), ("b", 3)]);
    }

    #[test]
    fn test_full_list_evicts_minimum() {
        let mut index = TopNIndex::new(2).unwrap();
        index.update("a", 5);
        index.update("b", 3);

        let update = index.update("c", 4);
        assert_eq!(
            update,
            RankUpdate::Replaced {
                evicted: RankEntry {
                    account: "b".to_string(),
                    score: 3
                },
                position: 1
            }
        );
        assert_eq!(listed(&index), vec![("a", 5), ("c", 4)]);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut index = TopNIndex::new(4).unwrap();
        index.update("a", 2);
        index.update("b", 2);
        index.update("c", 2);
        assert_eq!(listed(&index), vec![("a", 2), ("b", 2), ("c", 2)]);

        // Catching up to a tie does not overtake
        index.update("d", 1);
        index.update("d", 2);
        assert_eq!(listed(&index), vec![("a", 2), ("b", 2), ("c", 2), ("d", 2)]);
    }

    #[test]
    fn test_decrease_moves_entry_down() {
        let mut index = TopNIndex::new(3).unwrap();
        index.update("a", 9);
        index.update("b", 6);
        index.update("c", 4);

        assert_eq!(index.update("a", 5), RankUpdate::Updated { from: 0, to: 1 });
        assert_eq!(listed(&index), vec![("b", 6), ("a", 5), ("c", 4)]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut index = TopNIndex::new(4).unwrap();
        for i in 0..50u64 {
            let account = format!("acct_{}", i % 13);
            let score = (i * 7) % 23;
            index.update(&account, score);
            assert!(index.len() <= 4);
            assert!(index.entries().windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_from_entries_rejects_unsorted() {
        let entries = vec![
            RankEntry {
                account: "a".to_string(),
                score: 1,
            },
            RankEntry {
                account: "b".to_string(),
                score: 2,
            },
        ];
        assert!(matches!(
            TopNIndex::from_entries(3, entries),
            Err(BadgeError::Snapshot(_))
        ));
    }
}
