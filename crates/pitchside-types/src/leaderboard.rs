//! Leaderboard records: the durable per-entry score/rank rows.
//!
//! One [`LeaderboardRow`] exists per entry. Score is mutated only by the
//! aggregation path, rank only by the rank path, and `is_finalized` only by
//! settlement. A [`LeaderboardSnapshot`] is a point-in-time consistent view
//! of one contest's rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContestId, EntryId, UserId};

/// Rank value meaning "not yet ranked".
pub const UNRANKED: u32 = 0;

/// Durable score/rank row for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub contest_id: ContestId,
    pub entry_id: EntryId,
    pub user_id: UserId,
    /// Roster display name, denormalized for snapshot fan-out.
    pub roster_name: String,
    pub total_score: Decimal,
    /// 1-based rank; [`UNRANKED`] until the first rank pass.
    pub rank: u32,
    pub is_finalized: bool,
    /// Entry creation time — the deterministic tie-break for equal scores.
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardRow {
    /// A fresh zero-score row, created alongside its entry at join time.
    #[must_use]
    pub fn seed(
        contest_id: ContestId,
        entry_id: EntryId,
        user_id: UserId,
        roster_name: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            contest_id,
            entry_id,
            user_id,
            roster_name: roster_name.into(),
            total_score: Decimal::ZERO,
            rank: UNRANKED,
            is_finalized: false,
            joined_at,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.rank != UNRANKED
    }
}

/// Point-in-time consistent view of one contest's leaderboard.
///
/// Rows are ordered rank-ascending with unranked rows last; no entry appears
/// twice and ranks within a single snapshot have no gaps beyond those implied
/// by ties (standard competition ranking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub contest_id: ContestId,
    pub rows: Vec<LeaderboardRow>,
    pub is_finalized: bool,
    pub taken_at: DateTime<Utc>,
}

impl LeaderboardSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entries whose rank falls inside `[from, to]` (inclusive).
    pub fn rows_in_rank_range(&self, from: u32, to: u32) -> impl Iterator<Item = &LeaderboardRow> {
        self.rows
            .iter()
            .filter(move |r| r.is_ranked() && r.rank >= from && r.rank <= to)
    }
}
