//! Contest book: contest rows and the settlement-claim state machine.
//!
//! The claim is a compare-and-swap on the status column: exactly one of any
//! number of concurrent settlement attempts observes `LIVE -> COMPLETING`
//! succeed; the rest get [`PitchsideError::SettlementClaimLost`] and exit
//! cleanly. No external lock manager is involved.

use std::collections::HashMap;
use std::sync::RwLock;

use pitchside_types::{Contest, ContestId, ContestStatus, MatchId, PitchsideError, Result};

/// Source of truth for contest rows.
pub struct ContestBook {
    inner: RwLock<HashMap<ContestId, Contest>>,
}

impl ContestBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new contest. The contest's winnings were validated at
    /// construction; insertion re-checks them so a row deserialized from
    /// elsewhere cannot smuggle in a bad tier table.
    pub fn insert(&self, contest: Contest) -> Result<()> {
        contest.winnings.validate(contest.total_spots)?;
        let mut inner = self.write()?;
        inner.insert(contest.id, contest);
        Ok(())
    }

    /// Fetch a contest by id.
    pub fn get(&self, contest_id: ContestId) -> Result<Contest> {
        self.read()?
            .get(&contest_id)
            .cloned()
            .ok_or(PitchsideError::ContestNotFound(contest_id))
    }

    /// All contests tied to a match.
    pub fn contests_for_match(&self, match_id: MatchId) -> Result<Vec<Contest>> {
        Ok(self
            .read()?
            .values()
            .filter(|c| c.match_id == match_id)
            .cloned()
            .collect())
    }

    /// Contests whose match finished but which are not yet completed.
    pub fn pending_settlement(&self, match_id: MatchId) -> Result<Vec<Contest>> {
        Ok(self
            .read()?
            .values()
            .filter(|c| c.match_id == match_id && c.status != ContestStatus::Completed)
            .cloned()
            .collect())
    }

    /// Flip an upcoming contest live. Idempotent: a contest that is already
    /// past `UPCOMING` is left untouched. Returns whether a transition
    /// happened.
    pub fn mark_live(&self, contest_id: ContestId) -> Result<bool> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::ContestNotFound(contest_id))?;
        if contest.status == ContestStatus::Upcoming {
            contest.status = ContestStatus::Live;
            return Ok(true);
        }
        Ok(false)
    }

    /// Acquire the exclusive settlement claim: CAS `LIVE -> COMPLETING`.
    ///
    /// # Errors
    /// - [`PitchsideError::AlreadyCompleted`] — terminal, nothing to do
    /// - [`PitchsideError::SettlementClaimLost`] — another attempt holds the
    ///   claim (or the contest never went live); the caller exits cleanly
    pub fn claim_settlement(&self, contest_id: ContestId) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::ContestNotFound(contest_id))?;
        match contest.status {
            ContestStatus::Live => {
                contest.status = ContestStatus::Completing;
                Ok(())
            }
            ContestStatus::Completed => Err(PitchsideError::AlreadyCompleted(contest_id)),
            ContestStatus::Completing | ContestStatus::Upcoming => {
                Err(PitchsideError::SettlementClaimLost(contest_id))
            }
        }
    }

    /// Release a held claim after a failed settlement: `COMPLETING -> LIVE`.
    /// The next scheduler tick retries from scratch.
    pub fn release_claim(&self, contest_id: ContestId) -> Result<()> {
        self.transition(contest_id, ContestStatus::Completing, ContestStatus::Live)
    }

    /// Commit the terminal transition: `COMPLETING -> COMPLETED`.
    pub fn complete(&self, contest_id: ContestId) -> Result<()> {
        self.transition(
            contest_id,
            ContestStatus::Completing,
            ContestStatus::Completed,
        )
    }

    /// Take one spot for a joining entry. Only upcoming contests with open
    /// spots accept entries.
    pub fn try_fill_spot(&self, contest_id: ContestId) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::ContestNotFound(contest_id))?;
        if contest.status != ContestStatus::Upcoming {
            return Err(PitchsideError::ContestClosed(contest_id));
        }
        if !contest.has_open_spots() {
            return Err(PitchsideError::ContestFull(contest_id));
        }
        contest.filled_spots += 1;
        Ok(())
    }

    /// Give back a spot taken by a join that failed further down the flow.
    pub fn release_spot(&self, contest_id: ContestId) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::ContestNotFound(contest_id))?;
        contest.filled_spots = contest.filled_spots.saturating_sub(1);
        Ok(())
    }

    fn transition(
        &self,
        contest_id: ContestId,
        from: ContestStatus,
        to: ContestStatus,
    ) -> Result<()> {
        let mut inner = self.write()?;
        let contest = inner
            .get_mut(&contest_id)
            .ok_or(PitchsideError::ContestNotFound(contest_id))?;
        if contest.status != from {
            return Err(PitchsideError::InvalidStatusTransition {
                from: contest.status,
                to,
            });
        }
        contest.status = to;
        Ok(())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ContestId, Contest>>> {
        self.inner
            .read()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ContestId, Contest>>> {
        self.inner
            .write()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }
}

impl Default for ContestBook {
    fn default() -> Self {
        Self::new()
    }
}
