use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BadgeError;

/// Badge level, ordered lowest to highest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Legendary,
}

impl Tier {
    /// Earnable tiers in threshold order
    pub const RANKED: [Tier; 7] = [
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Diamond,
        Tier::Master,
        Tier::Legendary,
    ];

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::None => "None",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Diamond => "Diamond",
            Tier::Master => "Master",
            Tier::Legendary => "Legendary",
        }
    }

    pub fn is_ranked(&self) -> bool {
        *self != Tier::None
    }
}

impl TryFrom<u8> for Tier {
    type Error = BadgeError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Tier::None),
            1..=7 => Ok(Tier::RANKED[level as usize - 1]),
            _ => Err(BadgeError::InvalidTier(level)),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
