//! Per-account activity records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type AccountId = String;

/// Which way an action moved the global counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increment,
    Decrement,
}

/// Lifetime activity for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: AccountId,

    /// Actions that incremented the global counter
    pub increments: u64,

    /// Actions that decremented the global counter
    pub decrements: u64,

    pub first_seen: DateTime<Utc>,
    pub last_action: DateTime<Utc>,
}

impl AccountRecord {
    pub fn new(account: AccountId) -> Self {
        let now = Utc::now();
        Self {
            account,
            increments: 0,
            decrements: 0,
            first_seen: now,
            last_action: now,
        }
    }

    /// Lifetime score: every action counts once regardless of direction
    pub fn lifetime(&self) -> u64 {
        self.increments.saturating_add(self.decrements)
    }
}

/// Owned table of account records, created on first action
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    records: HashMap<AccountId, AccountRecord>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one action and return the account's new lifetime score.
    pub fn record_action(&mut self, account: &str, direction: Direction) -> u64 {
        let record = self
            .records
            .entry(account.to_string())
            .or_insert_with(|| AccountRecord::new(account.to_string()));

        match direction {
            Direction::Increment => record.increments = record.increments.saturating_add(1),
            Direction::Decrement => record.decrements = record.decrements.saturating_add(1),
        }
        record.last_action = Utc::now();

        record.lifetime()
    }

    pub fn get(&self, account: &str) -> Option<&AccountRecord> {
        self.records.get(account)
    }

    /// Lifetime score, zero for accounts never seen
    pub fn lifetime_score(&self, account: &str) -> u64 {
        self.records.get(account).map(AccountRecord::lifetime).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AccountRecord> {
        self.records.values()
    }

    pub(crate) fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.account.clone(), r))
                .collect(),
        }
    }
}
