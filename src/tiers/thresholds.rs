//! Governance-configurable tier thresholds

use serde::{Deserialize, Serialize};

use crate::error::{BadgeError, Result};
use crate::tiers::Tier;

pub const THRESHOLD_COUNT: usize = 7;

/// Bronze through Legendary
pub const DEFAULT_THRESHOLDS: [u64; THRESHOLD_COUNT] = [10, 25, 50, 100, 250, 500, 1000];

/// Lifetime score cutoffs, one per earnable tier, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct ThresholdTable {
    values: [u64; THRESHOLD_COUNT],
}

impl ThresholdTable {
    /// Build a table, rejecting any cutoff lower than the one before it.
    pub fn new(values: [u64; THRESHOLD_COUNT]) -> Result<Self> {
        for position in 1..THRESHOLD_COUNT {
            if values[position] < values[position - 1] {
                return Err(BadgeError::NonMonotonicThresholds {
                    position,
                    previous: values[position - 1],
                    value: values[position],
                });
            }
        }
        Ok(Self { values })
    }

    pub fn from_slice(values: &[u64]) -> Result<Self> {
        let values: [u64; THRESHOLD_COUNT] = values
            .try_into()
            .map_err(|_| BadgeError::InvalidThresholdCount(values.len()))?;
        Self::new(values)
    }

    /// Tier earned by `score`: cutoffs are checked from Legendary down and
    /// the first one met wins.
    pub fn tier_for(&self, score: u64) -> Tier {
        self.values
            .iter()
            .zip(Tier::RANKED.iter())
            .rev()
            .find(|(threshold, _)| score >= **threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::None)
    }

    /// Cutoff for a ranked tier, `None` for `Tier::None`
    pub fn threshold(&self, tier: Tier) -> Option<u64> {
        match tier.level() {
            0 => None,
            level => Some(self.values[level as usize - 1]),
        }
    }

    pub fn values(&self) -> [u64; THRESHOLD_COUNT] {
        self.values
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            values: DEFAULT_THRESHOLDS,
        }
    }
}

impl TryFrom<Vec<u64>> for ThresholdTable {
    type Error = BadgeError;

    fn try_from(values: Vec<u64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl From<ThresholdTable> for Vec<u64> {
    fn from(table: ThresholdTable) -> Self {
        table.values.to_vec()
    }
}
