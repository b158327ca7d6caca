//! Leaderboard store: the durable score/rank rows behind every read.
//!
//! One `RwLock` guards each contest's row map, so a snapshot is a single
//! read-lock pass: no entry appears twice, and rank state is whatever the
//! last completed rank batch wrote — never a half-applied batch, because
//! rank batches take the write lock once for the whole batch.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use pitchside_types::{
    ContestId, EntryId, LeaderboardRow, LeaderboardSnapshot, PitchsideError, Result, UNRANKED,
};
use rust_decimal::Decimal;

#[derive(Default)]
struct ContestRows {
    rows: HashMap<EntryId, LeaderboardRow>,
    finalized: bool,
}

/// Durable mapping from (contest, entry) to the current score/rank row.
pub struct LeaderboardStore {
    inner: RwLock<HashMap<ContestId, ContestRows>>,
}

impl LeaderboardStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a fresh row at join time.
    ///
    /// # Errors
    /// [`PitchsideError::DuplicateEntry`] if the (contest, entry) pair
    /// already has a row.
    pub fn insert_row(&self, row: LeaderboardRow) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner.entry(row.contest_id).or_default();
        if contest.rows.contains_key(&row.entry_id) {
            return Err(PitchsideError::DuplicateEntry {
                contest_id: row.contest_id,
            });
        }
        contest.rows.insert(row.entry_id, row);
        Ok(())
    }

    /// Write an entry's recomputed total score. Rank is untouched.
    ///
    /// # Errors
    /// - [`PitchsideError::RowNotFound`] for an unknown (contest, entry)
    /// - [`PitchsideError::LeaderboardFinalized`] after settlement froze the
    ///   contest
    pub fn upsert_score(
        &self,
        contest_id: ContestId,
        entry_id: EntryId,
        score: Decimal,
    ) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::RowNotFound {
                contest_id,
                entry_id,
            })?;
        if contest.finalized {
            return Err(PitchsideError::LeaderboardFinalized(contest_id));
        }
        let row = contest
            .rows
            .get_mut(&entry_id)
            .ok_or(PitchsideError::RowNotFound {
                contest_id,
                entry_id,
            })?;
        row.total_score = score;
        row.updated_at = Utc::now();
        Ok(())
    }

    /// Apply one rank batch under a single write lock. Scores are untouched.
    ///
    /// The batch is validated against the row set before any rank is
    /// written, so a bad batch leaves the contest's ranks exactly as they
    /// were.
    pub fn upsert_ranks(&self, contest_id: ContestId, batch: &[(EntryId, u32)]) -> Result<()> {
        // An empty batch ranks an empty contest: nothing to write.
        let Some((first_entry, _)) = batch.first() else {
            return Ok(());
        };
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::RowNotFound {
                contest_id,
                entry_id: *first_entry,
            })?;
        if contest.finalized {
            return Err(PitchsideError::LeaderboardFinalized(contest_id));
        }
        for (entry_id, _) in batch {
            if !contest.rows.contains_key(entry_id) {
                return Err(PitchsideError::RowNotFound {
                    contest_id,
                    entry_id: *entry_id,
                });
            }
        }
        let now = Utc::now();
        for (entry_id, rank) in batch {
            let row = contest.rows.get_mut(entry_id).expect("validated above");
            row.rank = *rank;
            row.updated_at = now;
        }
        Ok(())
    }

    /// Point-in-time consistent snapshot of one contest's leaderboard.
    ///
    /// Rows are ordered rank ascending with unranked rows last; ties and
    /// unranked rows fall back to join time, then entry id. An unknown
    /// contest yields an empty, unfinalized snapshot — a contest with no
    /// entries is not an error.
    pub fn read_snapshot(&self, contest_id: ContestId) -> Result<LeaderboardSnapshot> {
        let inner = self.read()?;
        let (mut rows, finalized) = match inner.get(&contest_id) {
            Some(contest) => (
                contest.rows.values().cloned().collect::<Vec<_>>(),
                contest.finalized,
            ),
            None => (Vec::new(), false),
        };
        drop(inner);

        rows.sort_by(|a, b| {
            let a_key = if a.rank == UNRANKED { u32::MAX } else { a.rank };
            let b_key = if b.rank == UNRANKED { u32::MAX } else { b.rank };
            a_key
                .cmp(&b_key)
                .then_with(|| a.joined_at.cmp(&b.joined_at))
                .then_with(|| a.entry_id.cmp(&b.entry_id))
        });

        Ok(LeaderboardSnapshot {
            contest_id,
            rows,
            is_finalized: finalized,
            taken_at: Utc::now(),
        })
    }

    /// Freeze a contest's rows after settlement. Idempotent: finalizing an
    /// already-finalized contest is a no-op, not an error.
    pub fn finalize(&self, contest_id: ContestId) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner.entry(contest_id).or_default();
        if contest.finalized {
            return Ok(());
        }
        contest.finalized = true;
        let now = Utc::now();
        for row in contest.rows.values_mut() {
            row.is_finalized = true;
            row.updated_at = now;
        }
        Ok(())
    }

    /// One row, for tests and diagnostics.
    pub fn row(&self, contest_id: ContestId, entry_id: EntryId) -> Result<LeaderboardRow> {
        self.read()?
            .get(&contest_id)
            .and_then(|c| c.rows.get(&entry_id))
            .cloned()
            .ok_or(PitchsideError::RowNotFound {
                contest_id,
                entry_id,
            })
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ContestId, ContestRows>>> {
        self.inner
            .read()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ContestId, ContestRows>>> {
        self.inner
            .write()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }
}

impl Default for LeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}
