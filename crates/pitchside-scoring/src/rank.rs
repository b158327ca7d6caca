//! Rank assignment under standard competition ranking.
//!
//! Sort by score descending; equal scores share a rank; the next distinct
//! score's rank is `1 + (count of entries strictly above it)` — the familiar
//! "1, 1, 3" shape. Ties are broken for *ordering only* (never for the rank
//! number) by ascending entry-creation time, then entry id, so two runs over
//! the same snapshot are byte-identical. Settlement depends on that.

use pitchside_types::{EntryId, LeaderboardRow};
use rust_decimal::Decimal;

/// One entry's assigned rank, in deterministic leaderboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    pub entry_id: EntryId,
    pub rank: u32,
}

/// Assign ranks to a contest's rows.
///
/// Pure function of the input snapshot: scores are read, never written, and
/// the output order is fully determined by (score desc, joined_at asc,
/// entry_id asc).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn assign_ranks(rows: &[LeaderboardRow]) -> Vec<RankedEntry> {
    let mut ordered: Vec<&LeaderboardRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    let mut out = Vec::with_capacity(ordered.len());
    let mut prev_score: Option<Decimal> = None;
    let mut rank: u32 = 0;
    for (position, row) in ordered.iter().enumerate() {
        if prev_score != Some(row.total_score) {
            rank = position as u32 + 1;
            prev_score = Some(row.total_score);
        }
        out.push(RankedEntry {
            entry_id: row.entry_id,
            rank,
        });
    }
    out
}
