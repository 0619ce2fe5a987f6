//! Tier Engine - monotonic tier assignment
//!
//! A promotion is the only write path: a tier is replaced only when the
//! candidate tier is strictly greater than the stored one. Lowering the
//! thresholds never demotes anyone and never re-grades stored tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::ledger::AccountId;
use crate::tiers::{BadgeId, IssuanceRegistry, ThresholdTable, Tier};

/// Stored tier state for one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub tier: Tier,

    /// Set once, on the first promotion out of `Tier::None`
    pub badge_id: Option<BadgeId>,

    pub promoted_at: Option<DateTime<Utc>>,
}

/// Notification emitted on every promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChange {
    pub account: AccountId,
    pub badge_id: BadgeId,
    pub previous: Tier,
    pub tier: Tier,
    /// Whether this promotion issued the badge id
    pub newly_issued: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct TierEngine {
    thresholds: ThresholdTable,
    assignments: HashMap<AccountId, TierAssignment>,
}

impl TierEngine {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            assignments: HashMap::new(),
        }
    }

    pub(crate) fn from_assignments(
        thresholds: ThresholdTable,
        assignments: HashMap<AccountId, TierAssignment>,
    ) -> Self {
        Self {
            thresholds,
            assignments,
        }
    }

    /// Grade `score` and promote the account if it earned a higher tier.
    ///
    /// Issuance happens before anything is written, so an issuer failure
    /// leaves the engine untouched. Calling this again with the same score
    /// is a no-op.
    pub fn evaluate(
        &mut self,
        account: &str,
        score: u64,
        issuer: &mut dyn IssuanceRegistry,
    ) -> Result<Option<TierChange>> {
        let candidate = self.thresholds.tier_for(score);
        let current = self.assignments.get(account).cloned().unwrap_or_default();

        if candidate <= current.tier {
            return Ok(None);
        }

        // An id the registry already holds for this account is adopted
        // rather than requested twice.
        let (badge_id, newly_issued) = match current.badge_id.or_else(|| issuer.issued(account)) {
            Some(id) => (id, false),
            None => (issuer.issue(account)?, true),
        };

        let now = Utc::now();
        self.assignments.insert(
            account.to_string(),
            TierAssignment {
                tier: candidate,
                badge_id: Some(badge_id),
                promoted_at: Some(now),
            },
        );

        info!(
            account = %account,
            badge_id = badge_id,
            previous = %current.tier,
            tier = %candidate,
            score = score,
            "Account promoted"
        );

        Ok(Some(TierChange {
            account: account.to_string(),
            badge_id,
            previous: current.tier,
            tier: candidate,
            newly_issued,
            at: now,
        }))
    }

    /// Swap in a new threshold table. Stored tiers are left alone; each
    /// account is graded against the new table on its next evaluation.
    pub fn reconfigure_thresholds(&mut self, thresholds: ThresholdTable) {
        debug!(thresholds = ?thresholds.values(), "Thresholds reconfigured");
        self.thresholds = thresholds;
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn current_tier(&self, account: &str) -> Tier {
        self.assignments
            .get(account)
            .map(|a| a.tier)
            .unwrap_or_default()
    }

    pub fn badge_id(&self, account: &str) -> Option<BadgeId> {
        self.assignments.get(account).and_then(|a| a.badge_id)
    }

    pub fn assignment(&self, account: &str) -> Option<&TierAssignment> {
        self.assignments.get(account)
    }

    pub fn assignments(&self) -> &HashMap<AccountId, TierAssignment> {
        &self.assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BadgeError;
    use crate::tiers::SequentialIssuer;

    /// Issuer that always fails, for checking nothing is written
    struct BrokenIssuer;

    impl IssuanceRegistry for BrokenIssuer {
        fn issue(&mut self, account: &str) -> Result<BadgeId> {
            Err(BadgeError::DuplicateIssuance {
                account: account.to_string(),
            })
        }

        fn issued(&self, _account: &str) -> Option<BadgeId> {
            None
        }
    }

    #[test]
    fn test_below_bronze_no_change() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();

        assert_eq!(engine.evaluate("alice", 9, &mut issuer).unwrap(), None);
        assert_eq!(engine.current_tier("alice"), Tier::None);
        assert_eq!(issuer.issued_count(), 0);
    }

    #[test]
    fn test_first_promotion_issues_id() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();

        let change = engine.evaluate("alice", 10, &mut issuer).unwrap().unwrap();
        assert_eq!(change.tier, Tier::Bronze);
        assert_eq!(change.previous, Tier::None);
        assert_eq!(change.badge_id, 1);
        assert!(change.newly_issued);
        assert_eq!(engine.badge_id("alice"), Some(1));
    }

    #[test]
    fn test_repeat_evaluation_is_noop() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();

        engine.evaluate("alice", 30, &mut issuer).unwrap();
        assert_eq!(engine.evaluate("alice", 30, &mut issuer).unwrap(), None);
        assert_eq!(engine.current_tier("alice"), Tier::Silver);
        assert_eq!(issuer.issued_count(), 1);
    }

    #[test]
    fn test_later_promotion_keeps_id() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();

        engine.evaluate("alice", 10, &mut issuer).unwrap();
        let change = engine.evaluate("alice", 25, &mut issuer).unwrap().unwrap();

        assert_eq!(change.previous, Tier::Bronze);
        assert_eq!(change.tier, Tier::Silver);
        assert_eq!(change.badge_id, 1);
        assert!(!change.newly_issued);
        assert_eq!(issuer.issued_count(), 1);
    }

    #[test]
    fn test_raising_thresholds_never_demotes() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();
        engine.evaluate("alice", 60, &mut issuer).unwrap();
        assert_eq!(engine.current_tier("alice"), Tier::Gold);

        engine.reconfigure_thresholds(
            ThresholdTable::new([100, 200, 300, 400, 500, 600, 700]).unwrap(),
        );
        assert_eq!(engine.current_tier("alice"), Tier::Gold);
        assert_eq!(engine.evaluate("alice", 61, &mut issuer).unwrap(), None);
        assert_eq!(engine.current_tier("alice"), Tier::Gold);
    }

    #[test]
    fn test_skips_tiers_on_large_jump() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();

        let change = engine.evaluate("alice", 500, &mut issuer).unwrap().unwrap();
        assert_eq!(change.tier, Tier::Master);
    }

    #[test]
    fn test_adopts_id_already_in_registry() {
        let mut engine = TierEngine::default();
        let mut issuer = SequentialIssuer::new();
        issuer.issue("bob").unwrap();
        issuer.issue("alice").unwrap();

        let change = engine.evaluate("alice", 10, &mut issuer).unwrap().unwrap();
        assert_eq!(change.badge_id, 2);
        assert!(!change.newly_issued);
        assert_eq!(engine.badge_id("alice"), Some(2));
        assert_eq!(issuer.next_id(), 3);
    }

    #[test]
    fn test_issuer_failure_leaves_state() {
        let mut engine = TierEngine::default();

        assert!(engine.evaluate("alice", 10, &mut BrokenIssuer).is_err());
        assert_eq!(engine.current_tier("alice"), Tier::None);
        assert!(engine.assignment("alice").is_none());
    }
}
