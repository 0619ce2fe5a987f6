//! Badge id issuance

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BadgeError, Result};
use crate::ledger::AccountId;

pub type BadgeId = u64;

/// Hands out unique, permanent badge ids.
pub trait IssuanceRegistry: Send + Sync {
    /// Issue the id for `account`. Fails with `DuplicateIssuance` if the
    /// account was already given one.
    fn issue(&mut self, account: &str) -> Result<BadgeId>;

    /// Id previously issued to `account`
    fn issued(&self, account: &str) -> Option<BadgeId>;
}

/// Ascending ids starting at 1, never reused
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialIssuer {
    next_id: BadgeId,
    issued: HashMap<AccountId, BadgeId>,
}

impl SequentialIssuer {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            issued: HashMap::new(),
        }
    }

    pub fn next_id(&self) -> BadgeId {
        self.next_id
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// Rebuild from persisted assignments. The cursor must sit above every
    /// issued id and no id may appear twice.
    pub fn restore(next_id: BadgeId, issued: HashMap<AccountId, BadgeId>) -> Result<Self> {
        let mut seen: Vec<BadgeId> = issued.values().copied().collect();
        seen.sort_unstable();
        if seen.windows(2).any(|w| w[0] == w[1]) {
            return Err(BadgeError::Snapshot("badge id issued twice".to_string()));
        }
        if seen.last().is_some_and(|max| *max >= next_id) || next_id == 0 {
            return Err(BadgeError::Snapshot(format!(
                "issuer cursor {} is not above issued ids",
                next_id
            )));
        }
        Ok(Self { next_id, issued })
    }
}

impl Default for SequentialIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl IssuanceRegistry for SequentialIssuer {
    fn issue(&mut self, account: &str) -> Result<BadgeId> {
        if self.issued.contains_key(account) {
            return Err(BadgeError::DuplicateIssuance {
                account: account.to_string(),
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.issued.insert(account.to_string(), id);
        Ok(id)
    }

    fn issued(&self, account: &str) -> Option<BadgeId> {
        self.issued.get(account).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_ascend() {
        let mut issuer = SequentialIssuer::new();
        assert_eq!(issuer.issue("alice").unwrap(), 1);
        assert_eq!(issuer.issue("bob").unwrap(), 2);
        assert_eq!(issuer.issued("alice"), Some(1));
        assert_eq!(issuer.next_id(), 3);
    }

    #[test]
    fn test_second_issue_refused() {
        let mut issuer = SequentialIssuer::new();
        issuer.issue("alice").unwrap();
        assert_eq!(
            issuer.issue("alice"),
            Err(BadgeError::DuplicateIssuance {
                account: "alice".to_string()
            })
        );
        assert_eq!(issuer.next_id(), 2);
    }

    #[test]
    fn test_restore_rejects_stale_cursor() {
        let issued = HashMap::from([("alice".to_string(), 4)]);
        assert!(SequentialIssuer::restore(4, issued.clone()).is_err());
        assert!(SequentialIssuer::restore(5, issued).is_ok());
    }
}
