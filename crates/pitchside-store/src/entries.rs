//! Entry book: entries, rosters, and the join flow.
//!
//! Joining a contest is the one cross-book flow in the stateful plane:
//! validate the roster, enforce (contest, user, roster) uniqueness, take a
//! spot, debit the entry fee, then record the entry and seed its zero-score
//! leaderboard row. The spot is handed back if the debit fails, and the
//! debit itself is idempotency-keyed so a crashed join cannot charge twice.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use pitchside_types::{
    ContestId, Entry, EntryId, IdempotencyKey, LeaderboardRow, LedgerKind, PitchsideError,
    Result, Roster, RosterId, UserId,
};
use rust_decimal::Decimal;

use crate::{ContestBook, LeaderboardStore, WalletLedger};

#[derive(Default)]
struct EntryState {
    entries: HashMap<EntryId, Entry>,
    rosters: HashMap<RosterId, Roster>,
    by_contest: HashMap<ContestId, Vec<EntryId>>,
    /// Uniqueness guard on (contest, user, roster).
    taken: HashSet<(ContestId, UserId, RosterId)>,
}

/// Source of truth for entries and their rosters.
pub struct EntryBook {
    inner: Mutex<EntryState>,
}

impl EntryBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(EntryState::default()),
        }
    }

    /// Join a contest with a roster.
    ///
    /// On success the entry exists, its leaderboard row is seeded at score
    /// zero, the contest's `filled_spots` went up by one, and the entry fee
    /// (if any) was debited exactly once.
    pub fn join_contest(
        &self,
        contests: &ContestBook,
        wallet: &WalletLedger,
        leaderboard: &LeaderboardStore,
        contest_id: ContestId,
        user_id: UserId,
        roster: Roster,
    ) -> Result<Entry> {
        roster.validate()?;

        {
            let inner = self.lock()?;
            if inner.taken.contains(&(contest_id, user_id, roster.id)) {
                return Err(PitchsideError::DuplicateEntry { contest_id });
            }
        }

        let contest = contests.get(contest_id)?;
        contests.try_fill_spot(contest_id)?;

        if contest.entry_fee > Decimal::ZERO {
            let key = IdempotencyKey::for_entry_fee(contest_id, user_id, roster.id);
            if let Err(err) =
                wallet.debit(user_id, contest.entry_fee, key, LedgerKind::EntryFee, Some(contest_id))
            {
                contests.release_spot(contest_id)?;
                return Err(err);
            }
        }

        let entry = Entry::new(contest_id, user_id, roster.id);
        leaderboard.insert_row(LeaderboardRow::seed(
            contest_id,
            entry.id,
            user_id,
            roster.name.clone(),
            entry.joined_at,
        ))?;

        let mut inner = self.lock()?;
        inner.taken.insert((contest_id, user_id, roster.id));
        inner.rosters.insert(roster.id, roster);
        inner
            .by_contest
            .entry(contest_id)
            .or_default()
            .push(entry.id);
        inner.entries.insert(entry.id, entry.clone());

        tracing::debug!(contest = %contest_id, entry = %entry.id, "entry joined");
        Ok(entry)
    }

    /// Fetch an entry by id.
    pub fn entry(&self, entry_id: EntryId) -> Result<Entry> {
        self.lock()?
            .entries
            .get(&entry_id)
            .cloned()
            .ok_or(PitchsideError::EntryNotFound(entry_id))
    }

    /// All entries in a contest, in join order.
    pub fn entries_for_contest(&self, contest_id: ContestId) -> Result<Vec<Entry>> {
        let inner = self.lock()?;
        Ok(inner
            .by_contest
            .get(&contest_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.entries.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// The roster backing an entry.
    pub fn roster_for_entry(&self, entry_id: EntryId) -> Result<Roster> {
        let inner = self.lock()?;
        let entry = inner
            .entries
            .get(&entry_id)
            .ok_or(PitchsideError::EntryNotFound(entry_id))?;
        inner
            .rosters
            .get(&entry.roster_id)
            .cloned()
            .ok_or_else(|| {
                PitchsideError::Internal(format!("roster missing for entry {entry_id}"))
            })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, EntryState>> {
        self.inner
            .lock()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }
}

impl Default for EntryBook {
    fn default() -> Self {
        Self::new()
    }
}
