//! Contest model: the priced competition tied to one match.
//!
//! A contest's lifecycle is a strict forward-only state machine:
//! **UPCOMING → LIVE → COMPLETING → COMPLETED**
//!
//! `COMPLETING` is the transient settlement claim — it exists so that two
//! overlapping scheduler ticks can race on a conditional update and exactly
//! one proceeds. `COMPLETED` is terminal and entered at most once.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContestId, MatchId, PitchsideError, Result};

/// Lifecycle status of a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    /// Accepting entries; the match has not started.
    Upcoming,
    /// The match is in progress; scores and ranks update continuously.
    Live,
    /// A settlement attempt holds the claim on this contest.
    Completing,
    /// Settled and paid out. Terminal.
    Completed,
}

impl ContestStatus {
    /// Whether moving from `self` to `next` is a legal forward transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::Live)
                | (Self::Live, Self::Completing)
                | (Self::Completing, Self::Completed)
                // A failed settlement releases its claim back to LIVE.
                | (Self::Completing, Self::Live)
        )
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upcoming => write!(f, "UPCOMING"),
            Self::Live => write!(f, "LIVE"),
            Self::Completing => write!(f, "COMPLETING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Winnings tiers
// ---------------------------------------------------------------------------

/// A contiguous rank range mapped to a fixed payout amount.
///
/// The range is inclusive on both ends: `{from: 1, to: 3, price: 100}` pays
/// 100 to every entry ranked 1, 2, or 3. Under standard competition ranking,
/// ties can place more than one entry inside the range — each of them is
/// paid the full tier price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningsTier {
    /// First rank covered by this tier (1-based, inclusive).
    pub from: u32,
    /// Last rank covered by this tier (inclusive).
    pub to: u32,
    /// Amount paid to each entry whose rank falls inside the range.
    pub price: Decimal,
}

impl WinningsTier {
    /// Whether the given rank falls inside this tier's range.
    #[must_use]
    pub fn covers(&self, rank: u32) -> bool {
        rank >= self.from && rank <= self.to
    }
}

/// Ordered list of non-overlapping winnings tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winnings(pub Vec<WinningsTier>);

impl Winnings {
    /// Validate the tier structure against the contest's spot capacity.
    ///
    /// Tiers must be non-empty ranges (`from <= to`), start at rank 1 or
    /// later, stay within `1..=total_spots`, carry a positive price, be
    /// sorted ascending, and never overlap.
    pub fn validate(&self, total_spots: u32) -> Result<()> {
        let mut prev_to: u32 = 0;
        for tier in &self.0 {
            if tier.from == 0 {
                return Err(PitchsideError::InvalidWinnings {
                    reason: "tier ranks are 1-based".into(),
                });
            }
            if tier.from > tier.to {
                return Err(PitchsideError::InvalidWinnings {
                    reason: format!("tier range inverted: {}..={}", tier.from, tier.to),
                });
            }
            if tier.to > total_spots {
                return Err(PitchsideError::InvalidWinnings {
                    reason: format!("tier exceeds total spots: {} > {total_spots}", tier.to),
                });
            }
            if tier.from <= prev_to {
                return Err(PitchsideError::InvalidWinnings {
                    reason: format!("tiers overlap or are unsorted at rank {}", tier.from),
                });
            }
            if tier.price <= Decimal::ZERO {
                return Err(PitchsideError::InvalidWinnings {
                    reason: format!("non-positive tier price: {}", tier.price),
                });
            }
            prev_to = tier.to;
        }
        Ok(())
    }

    /// The tier covering a given rank, if any.
    #[must_use]
    pub fn tier_for_rank(&self, rank: u32) -> Option<&WinningsTier> {
        if rank == 0 {
            return None;
        }
        self.0.iter().find(|t| t.covers(rank))
    }

    /// Declared prize pool: sum over tiers of `price × range width`.
    ///
    /// This is the ceiling used by the payout-bound property when every
    /// rank in every range is populated by exactly one entry.
    #[must_use]
    pub fn prize_pool(&self) -> Decimal {
        self.0
            .iter()
            .map(|t| t.price * Decimal::from(t.to - t.from + 1))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Contest
// ---------------------------------------------------------------------------

/// A priced competition tied to one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    /// Unique contest identifier.
    pub id: ContestId,
    /// The match whose player performances drive this contest.
    pub match_id: MatchId,
    /// Fee debited from a user's wallet on join.
    pub entry_fee: Decimal,
    /// Maximum number of entries.
    pub total_spots: u32,
    /// Entries taken so far.
    pub filled_spots: u32,
    /// Lifecycle status (forward-only).
    pub status: ContestStatus,
    /// Ordered, non-overlapping payout tiers.
    pub winnings: Winnings,
    /// When this contest was created.
    pub created_at: DateTime<Utc>,
}

impl Contest {
    /// Create a new upcoming contest. Validates the winnings structure.
    pub fn new(
        match_id: MatchId,
        entry_fee: Decimal,
        total_spots: u32,
        winnings: Winnings,
    ) -> Result<Self> {
        winnings.validate(total_spots)?;
        Ok(Self {
            id: ContestId::new(),
            match_id,
            entry_fee,
            total_spots,
            filled_spots: 0,
            status: ContestStatus::Upcoming,
            winnings,
            created_at: Utc::now(),
        })
    }

    /// Whether the contest still has open spots.
    #[must_use]
    pub fn has_open_spots(&self) -> bool {
        self.filled_spots < self.total_spots
    }
}
