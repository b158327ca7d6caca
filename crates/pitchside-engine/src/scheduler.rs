//! Periodic driver for aggregation and settlement.
//!
//! Each tick does two sweeps:
//!
//! - **live sweep**: for every match the feed reports live, recompute entry
//!   scores and reassign ranks for each of its contests
//! - **finished sweep**: for every match the feed reports finished, run
//!   settlement on each of its not-yet-completed contests
//!
//! Failures are caught at the per-contest boundary and routed by
//! [`ErrorClass`] — one bad contest never aborts the rest of a tick.
//! Overlapping ticks cannot double-settle: exactly-once lives in the
//! settlement claim CAS, not in tick serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pitchside_scoring::{assign_ranks, score_roster};
use pitchside_types::{
    Contest, ContestId, EngineConfig, ErrorClass, Lineup, MatchDataFeed, PitchsideError,
    PlayerPoints, Result,
};
use tokio::sync::watch;

use crate::{SettlementEngine, Stores};

/// Per-contest async locks serializing aggregation within one contest.
///
/// Aggregation for different contests runs concurrently; two rank passes
/// over the *same* contest must not interleave with its score writes, or a
/// half-written score set could be ranked.
#[derive(Default)]
struct ContestLocks {
    locks: Mutex<HashMap<ContestId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ContestLocks {
    fn lock_for(&self, contest_id: ContestId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("contest lock table poisoned");
        Arc::clone(locks.entry(contest_id).or_default())
    }
}

/// Outcome counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TickReport {
    /// Contests whose scores and ranks were refreshed.
    pub refreshed: usize,
    /// Contests settled in this tick.
    pub settled: usize,
    /// Contests skipped as clean no-ops (claim races, already completed).
    pub skipped: usize,
    /// Contests that failed with a transient, validation, or fatal error.
    pub failed: usize,
}

/// Periodic driver over the match feed, the books, and settlement.
pub struct Scheduler {
    stores: Stores,
    feed: Arc<dyn MatchDataFeed>,
    settlement: SettlementEngine,
    locks: ContestLocks,
    config: EngineConfig,
}

impl Scheduler {
    #[must_use]
    pub fn new(stores: Stores, feed: Arc<dyn MatchDataFeed>, config: EngineConfig) -> Self {
        Self {
            settlement: SettlementEngine::new(stores.clone()),
            stores,
            feed,
            locks: ContestLocks::default(),
            config,
        }
    }

    /// Run one tick: the live sweep, then the finished sweep.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();
        self.live_sweep(&mut report).await;
        self.finished_sweep(&mut report);
        report
    }

    async fn live_sweep(&self, report: &mut TickReport) {
        let live = match self.feed.live_matches() {
            Ok(live) => live,
            Err(err) => {
                tracing::warn!(error = %err, "feed unavailable, skipping live sweep");
                return;
            }
        };

        for match_id in live {
            // One feed read per match, shared by all its contests.
            let (points, lineup) = match (
                self.feed.player_points(match_id),
                self.feed.playing_lineup(match_id),
            ) {
                (Ok(points), Ok(lineup)) => (points, lineup),
                (Err(err), _) | (_, Err(err)) => {
                    tracing::warn!(match_id = %match_id, error = %err, "stats unavailable, scores stay stale");
                    continue;
                }
            };

            let contests = match self.stores.contests.contests_for_match(match_id) {
                Ok(contests) => contests,
                Err(err) => {
                    route_contest_error(None, &err, report);
                    continue;
                }
            };

            for contest in contests {
                if let Err(err) = self.refresh_contest(&contest, &points, &lineup).await {
                    route_contest_error(Some(contest.id), &err, report);
                } else {
                    report.refreshed += 1;
                }
            }
        }
    }

    fn finished_sweep(&self, report: &mut TickReport) {
        let finished = match self.feed.finished_matches() {
            Ok(finished) => finished,
            Err(err) => {
                tracing::warn!(error = %err, "feed unavailable, skipping finished sweep");
                return;
            }
        };

        for match_id in finished {
            let pending = match self.stores.contests.pending_settlement(match_id) {
                Ok(pending) => pending,
                Err(err) => {
                    route_contest_error(None, &err, report);
                    continue;
                }
            };

            for contest in pending {
                // A contest can reach settlement without ever being observed
                // live (abandoned match, feed gap). Flip it forward first so
                // the claim CAS has its expected starting state.
                if let Err(err) = self.stores.contests.mark_live(contest.id) {
                    route_contest_error(Some(contest.id), &err, report);
                    continue;
                }
                match self.settlement.settle_contest(contest.id) {
                    Ok(_) => report.settled += 1,
                    Err(err) => route_contest_error(Some(contest.id), &err, report),
                }
            }
        }
    }

    /// Recompute every entry's score, then reassign ranks, serialized per
    /// contest so a concurrent refresh cannot rank half-written scores.
    async fn refresh_contest(
        &self,
        contest: &Contest,
        points: &PlayerPoints,
        lineup: &Lineup,
    ) -> Result<()> {
        let lock = self.locks.lock_for(contest.id);
        let _guard = lock.lock().await;

        self.stores.contests.mark_live(contest.id)?;

        for entry in self.stores.entries.entries_for_contest(contest.id)? {
            let roster = self.stores.entries.roster_for_entry(entry.id)?;
            let score = score_roster(&roster, points, lineup);
            self.stores
                .leaderboard
                .upsert_score(contest.id, entry.id, score)?;
        }

        let snapshot = self.stores.leaderboard.read_snapshot(contest.id)?;
        let ranked = assign_ranks(&snapshot.rows);
        let batch: Vec<_> = ranked.iter().map(|r| (r.entry_id, r.rank)).collect();
        self.stores.leaderboard.upsert_ranks(contest.id, &batch)?;
        Ok(())
    }

    /// Drive ticks until `shutdown` flips true, then let the in-flight tick
    /// drain within the configured grace period. Work cut off by the grace
    /// period resumes safely on next startup — every operation is
    /// idempotency-guarded.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let me = Arc::clone(&self);
                    let mut in_flight = tokio::spawn(async move { me.tick().await });
                    tokio::select! {
                        joined = &mut in_flight => {
                            match joined {
                                Ok(report) => tracing::debug!(?report, "tick complete"),
                                Err(err) => tracing::error!(error = %err, "tick task panicked"),
                            }
                        }
                        () = shutdown_signal(&mut shutdown) => {
                            tracing::info!("shutdown requested, draining in-flight tick");
                            if tokio::time::timeout(self.config.shutdown_grace, &mut in_flight)
                                .await
                                .is_err()
                            {
                                tracing::warn!("grace period elapsed, remaining work resumes on next startup");
                            }
                            return;
                        }
                    }
                }
                () = shutdown_signal(&mut shutdown) => return,
            }
        }
    }
}

/// Resolves when the shutdown flag flips true (or the sender is gone).
async fn shutdown_signal(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Per-contest boundary: classify, log, count — never propagate.
fn route_contest_error(contest_id: Option<ContestId>, err: &PitchsideError, report: &mut TickReport) {
    let contest = contest_id.map(|id| id.to_string()).unwrap_or_default();
    match err.class() {
        ErrorClass::Transient => {
            report.failed += 1;
            tracing::warn!(contest = %contest, error = %err, "transient, retrying next tick");
        }
        ErrorClass::Validation => {
            report.failed += 1;
            tracing::error!(target: "operator", contest = %contest, error = %err, "contest needs correction");
        }
        ErrorClass::Consistency => {
            report.skipped += 1;
            tracing::debug!(contest = %contest, error = %err, "no-op");
        }
        ErrorClass::Fatal => {
            report.failed += 1;
            tracing::error!(contest = %contest, error = %err, "aborting contest for this tick");
        }
    }
}
