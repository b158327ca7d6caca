//! Roster and entry models.
//!
//! A roster is the set of player picks backing an entry. Exactly one pick is
//! the captain (2x points) and exactly one the vice-captain (1.5x points).
//! Substitutes score nothing unless the feed's playing lineup promotes them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContestId, EntryId, PitchsideError, PlayerId, Result, RosterId, UserId};

/// Role of a single pick inside a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSlot {
    Captain,
    ViceCaptain,
    Substitute,
    Regular,
}

impl PickSlot {
    /// Score multiplier applied to this slot's player points.
    ///
    /// Substitutes return the regular multiplier here — whether a substitute
    /// scores at all is decided by lineup promotion, not by the multiplier.
    #[must_use]
    pub fn multiplier(self) -> Decimal {
        match self {
            Self::Captain => Decimal::new(2, 0),
            Self::ViceCaptain => Decimal::new(15, 1),
            Self::Substitute | Self::Regular => Decimal::ONE,
        }
    }
}

/// One player pick inside a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPick {
    pub player_id: PlayerId,
    pub slot: PickSlot,
}

/// A fantasy team: an ordered set of player picks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub id: RosterId,
    /// Display name shown on leaderboards.
    pub name: String,
    pub picks: Vec<RosterPick>,
}

impl Roster {
    /// Create a roster and validate its composition.
    pub fn new(name: impl Into<String>, picks: Vec<RosterPick>) -> Result<Self> {
        let roster = Self {
            id: RosterId::new(),
            name: name.into(),
            picks,
        };
        roster.validate()?;
        Ok(roster)
    }

    /// Composition rules: exactly one captain, exactly one vice-captain,
    /// captain ≠ vice-captain, no duplicate players.
    pub fn validate(&self) -> Result<()> {
        let captains: Vec<&RosterPick> = self
            .picks
            .iter()
            .filter(|p| p.slot == PickSlot::Captain)
            .collect();
        if captains.len() != 1 {
            return Err(PitchsideError::InvalidRoster {
                reason: format!("expected exactly one captain, found {}", captains.len()),
            });
        }

        let vices: Vec<&RosterPick> = self
            .picks
            .iter()
            .filter(|p| p.slot == PickSlot::ViceCaptain)
            .collect();
        if vices.len() != 1 {
            return Err(PitchsideError::InvalidRoster {
                reason: format!("expected exactly one vice-captain, found {}", vices.len()),
            });
        }

        if captains[0].player_id == vices[0].player_id {
            return Err(PitchsideError::InvalidRoster {
                reason: "captain and vice-captain must be different players".into(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for pick in &self.picks {
            if !seen.insert(pick.player_id) {
                return Err(PitchsideError::InvalidRoster {
                    reason: format!("duplicate player in roster: {}", pick.player_id),
                });
            }
        }

        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Roster {
    /// A valid roster: one captain, one vice-captain, `regulars` regulars,
    /// and `substitutes` substitutes, all with fresh player ids.
    pub fn dummy(name: &str, regulars: usize, substitutes: usize) -> Self {
        let mut picks = vec![
            RosterPick {
                player_id: PlayerId::new(),
                slot: PickSlot::Captain,
            },
            RosterPick {
                player_id: PlayerId::new(),
                slot: PickSlot::ViceCaptain,
            },
        ];
        picks.extend((0..regulars).map(|_| RosterPick {
            player_id: PlayerId::new(),
            slot: PickSlot::Regular,
        }));
        picks.extend((0..substitutes).map(|_| RosterPick {
            player_id: PlayerId::new(),
            slot: PickSlot::Substitute,
        }));
        Self {
            id: RosterId::new(),
            name: name.to_string(),
            picks,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One user's participation in a contest via one roster.
///
/// Unique per (contest, user, roster) — enforced at join time. `joined_at`
/// is the deterministic tie-break used when ordering equal-score entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub contest_id: ContestId,
    pub user_id: UserId,
    pub roster_id: RosterId,
    pub joined_at: DateTime<Utc>,
}

impl Entry {
    #[must_use]
    pub fn new(contest_id: ContestId, user_id: UserId, roster_id: RosterId) -> Self {
        Self {
            id: EntryId::new(),
            contest_id,
            user_id,
            roster_id,
            joined_at: Utc::now(),
        }
    }
}
