//! Activity Service - single exclusion domain over all badge state
//!
//! Every write takes the one write lock for its whole duration, so the
//! ledger, leaderboard and tier tables never show a half-applied action.
//! With a state file configured, each write is staged on a copy of the state
//! and only swapped in once its snapshot has been saved.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{BadgeError, Result};
use crate::ledger::{AccountId, ActivityLedger, Direction, GlobalCounter};
use crate::ranking::{RankEntry, TopNIndex};
use crate::render::{self, BadgeDescriptor};
use crate::service::snapshot::{save_snapshot, BadgeSnapshot, SNAPSHOT_VERSION};
use crate::tiers::{BadgeId, SequentialIssuer, ThresholdTable, Tier, TierChange, TierEngine};

/// Result of one recorded action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub account: AccountId,
    pub direction: Direction,
    pub lifetime_score: u64,
    /// Global counter after the action
    pub counter: u64,
    /// Leaderboard position, if listed
    pub rank: Option<usize>,
    pub tier_change: Option<TierChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub account: AccountId,
    pub increments: u64,
    pub decrements: u64,
    pub lifetime: u64,
    pub tier: Tier,
    pub badge_id: Option<BadgeId>,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone)]
struct BadgeState {
    ledger: ActivityLedger,
    ranking: TopNIndex,
    tiers: TierEngine,
    issuer: SequentialIssuer,
    counter: GlobalCounter,
    fee: u64,
}

impl BadgeState {
    /// Fallible checks first, then the infallible writes.
    fn apply_action(&mut self, account: &str, direction: Direction) -> Result<ActionOutcome> {
        let counter = self.counter.peek(direction).map_err(|e| {
            warn!(account = %account, "Decrement rejected: counter at zero");
            e
        })?;

        let score = self.ledger.lifetime_score(account).saturating_add(1);
        let tier_change = self.tiers.evaluate(account, score, &mut self.issuer)?;

        let lifetime_score = self.ledger.record_action(account, direction);
        self.counter.commit(counter);
        let rank = self.ranking.update(account, lifetime_score).position();

        debug!(
            account = %account,
            direction = ?direction,
            lifetime = lifetime_score,
            counter = counter,
            rank = ?rank,
            "Recorded action"
        );

        Ok(ActionOutcome {
            account: account.to_string(),
            direction,
            lifetime_score,
            counter,
            rank,
            tier_change,
        })
    }

    fn snapshot(&self) -> BadgeSnapshot {
        let mut accounts: Vec<_> = self.ledger.records().cloned().collect();
        accounts.sort_by(|a, b| a.account.cmp(&b.account));

        BadgeSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            accounts,
            leaderboard: self.ranking.snapshot(),
            thresholds: *self.tiers.thresholds(),
            assignments: self.tiers.assignments().clone(),
            next_badge_id: self.issuer.next_id(),
            counter: self.counter.value(),
            fee: self.fee,
        }
    }
}

pub struct ActivityService {
    state: Arc<RwLock<BadgeState>>,
    events: broadcast::Sender<TierChange>,
    state_path: Option<PathBuf>,
}

impl ActivityService {
    pub fn new(capacity: usize, thresholds: ThresholdTable) -> Result<Self> {
        let state = BadgeState {
            ledger: ActivityLedger::new(),
            ranking: TopNIndex::new(capacity)?,
            tiers: TierEngine::new(thresholds),
            issuer: SequentialIssuer::new(),
            counter: GlobalCounter::default(),
            fee: 0,
        };
        Ok(Self::from_state(state))
    }

    /// Rebuild from a snapshot, checking it against the relations the live
    /// service maintains.
    pub fn restore(snapshot: BadgeSnapshot, capacity: usize) -> Result<Self> {
        let ledger = ActivityLedger::from_records(snapshot.accounts);

        for entry in &snapshot.leaderboard {
            let lifetime = ledger.lifetime_score(&entry.account);
            if lifetime != entry.score {
                return Err(BadgeError::Snapshot(format!(
                    "ranked score {} for {} does not match lifetime {}",
                    entry.score, entry.account, lifetime
                )));
            }
        }
        let ranking = TopNIndex::from_entries(capacity, snapshot.leaderboard)?;

        let mut issued = HashMap::new();
        for (account, assignment) in &snapshot.assignments {
            match (assignment.tier.is_ranked(), assignment.badge_id) {
                (true, Some(id)) => {
                    issued.insert(account.clone(), id);
                }
                (false, None) => {}
                _ => {
                    return Err(BadgeError::Snapshot(format!(
                        "tier and badge id disagree for {}",
                        account
                    )))
                }
            }
        }
        let issuer = SequentialIssuer::restore(snapshot.next_badge_id, issued)?;

        let state = BadgeState {
            ledger,
            ranking,
            tiers: TierEngine::from_assignments(snapshot.thresholds, snapshot.assignments),
            issuer,
            counter: GlobalCounter::new(snapshot.counter),
            fee: snapshot.fee,
        };
        Ok(Self::from_state(state))
    }

    fn from_state(state: BadgeState) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(state)),
            events,
            state_path: None,
        }
    }

    pub fn with_state_file(mut self, path: PathBuf) -> Self {
        self.state_path = Some(path);
        self
    }

    /// Receive a `TierChange` for every promotion
    pub fn subscribe(&self) -> broadcast::Receiver<TierChange> {
        self.events.subscribe()
    }

    /// Record one action: ledger, leaderboard and tier check as one unit.
    ///
    /// The fallible steps (counter underflow, badge issuance, saving the
    /// state file) all run before the new state is visible, so a rejected
    /// action changes nothing.
    pub async fn record_action(&self, account: &str, direction: Direction) -> Result<ActionOutcome> {
        let mut guard = self.state.write().await;
        let outcome = self
            .commit(&mut guard, |state| state.apply_action(account, direction))
            .await?;

        // Sent under the lock so subscribers see promotions in commit order.
        // No subscribers is fine.
        if let Some(ref change) = outcome.tier_change {
            let _ = self.events.send(change.clone());
        }
        drop(guard);

        Ok(outcome)
    }

    pub async fn get_leaderboard(&self) -> Vec<RankEntry> {
        self.state.read().await.ranking.snapshot()
    }

    /// Stats for an account; unknown accounts read as zero without creating
    /// a record.
    pub async fn get_user_stats(&self, account: &str) -> UserStats {
        let state = self.state.read().await;
        let (increments, decrements) = state
            .ledger
            .get(account)
            .map(|r| (r.increments, r.decrements))
            .unwrap_or((0, 0));

        UserStats {
            account: account.to_string(),
            increments,
            decrements,
            lifetime: increments.saturating_add(decrements),
            tier: state.tiers.current_tier(account),
            badge_id: state.tiers.badge_id(account),
            rank: state.ranking.position(account),
        }
    }

    pub async fn render_account_badge(&self, account: &str) -> BadgeDescriptor {
        let stats = self.get_user_stats(account).await;
        render::render(stats.tier, stats.increments)
    }

    pub async fn thresholds(&self) -> ThresholdTable {
        *self.state.read().await.tiers.thresholds()
    }

    /// Replace the threshold table. Stored tiers are untouched.
    pub async fn set_thresholds(&self, thresholds: ThresholdTable) -> Result<()> {
        let mut guard = self.state.write().await;
        self.commit(&mut guard, |state| {
            state.tiers.reconfigure_thresholds(thresholds);
            Ok(())
        })
        .await?;
        info!(thresholds = ?thresholds.values(), "Tier thresholds updated");
        Ok(())
    }

    pub async fn counter(&self) -> u64 {
        self.state.read().await.counter.value()
    }

    pub async fn reset_counter(&self, value: u64) -> Result<()> {
        let mut guard = self.state.write().await;
        self.commit(&mut guard, |state| {
            state.counter.reset(value);
            Ok(())
        })
        .await?;
        info!(value = value, "Global counter reset");
        Ok(())
    }

    pub async fn fee(&self) -> u64 {
        self.state.read().await.fee
    }

    pub async fn set_fee(&self, fee: u64) -> Result<()> {
        let mut guard = self.state.write().await;
        self.commit(&mut guard, |state| {
            state.fee = fee;
            Ok(())
        })
        .await?;
        info!(fee = fee, "Action fee updated");
        Ok(())
    }

    pub async fn capacity(&self) -> usize {
        self.state.read().await.ranking.capacity()
    }

    pub async fn account_count(&self) -> usize {
        self.state.read().await.ledger.len()
    }

    pub async fn snapshot(&self) -> BadgeSnapshot {
        self.state.read().await.snapshot()
    }

    /// Apply `mutate` to the locked state. With a state file configured the
    /// change is made on a copy, saved, and only then swapped in; a failed
    /// save leaves memory and disk at the previous state.
    async fn commit<T, F>(&self, state: &mut BadgeState, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut BadgeState) -> Result<T>,
    {
        let Some(ref path) = self.state_path else {
            return mutate(state);
        };

        let mut staged = state.clone();
        let value = mutate(&mut staged)?;
        self.persist(path, &staged).await?;
        *state = staged;
        Ok(value)
    }

    async fn persist(&self, path: &Path, state: &BadgeState) -> Result<()> {
        save_snapshot(path, &state.snapshot()).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to persist state");
            BadgeError::Snapshot(format!("{:#}", e))
        })
    }
}
