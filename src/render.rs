//! Badge rendering
//!
//! Pure formatting from (tier, increments) to a display descriptor. No state.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tiers::Tier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDescriptor {
    pub display_name: String,
    pub color_token: String,
    pub label: String,
}

pub fn color_token(tier: Tier) -> &'static str {
    match tier {
        Tier::None => "#9e9e9e",
        Tier::Bronze => "#cd7f32",
        Tier::Silver => "#c0c0c0",
        Tier::Gold => "#ffd700",
        Tier::Platinum => "#e5e4e2",
        Tier::Diamond => "#b9f2ff",
        Tier::Master => "#9b30ff",
        Tier::Legendary => "#ff4500",
    }
}

pub fn render(tier: Tier, increments: u64) -> BadgeDescriptor {
    let display_name = match tier {
        Tier::None => "Unranked".to_string(),
        ranked => format!("{} Badge", ranked.name()),
    };

    BadgeDescriptor {
        display_name,
        color_token: color_token(tier).to_string(),
        label: format!("Tier {} | {} increments", tier.level(), increments),
    }
}

/// Render from a raw tier level; levels above 7 are `InvalidTier`.
pub fn render_level(level: u8, increments: u64) -> Result<BadgeDescriptor> {
    Ok(render(Tier::try_from(level)?, increments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BadgeError;

    #[test]
    fn test_render_gold() {
        let badge = render_level(3, 60).unwrap();
        assert_eq!(badge.display_name, "Gold Badge");
        assert_eq!(badge.color_token, "#ffd700");
        assert_eq!(badge.label, "Tier 3 | 60 increments");
        assert_eq!(badge, render(Tier::Gold, 60));
    }

    #[test]
    fn test_render_unranked() {
        let badge = render(Tier::None, 0);
        assert_eq!(badge.display_name, "Unranked");
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(render_level(8, 1), Err(BadgeError::InvalidTier(8)));
    }
}
