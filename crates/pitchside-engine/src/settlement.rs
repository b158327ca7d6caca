//! Exactly-once contest settlement.
//!
//! The claim-then-commit sequence:
//!
//! 1. CAS the contest `LIVE -> COMPLETING` — the exclusive claim. A
//!    concurrent attempt loses the CAS and exits cleanly.
//! 2. Run a final rank pass over the leaderboard.
//! 3. Credit every entry whose rank falls inside a winnings tier, one
//!    idempotency-keyed ledger write per (contest, user, tier).
//! 4. Finalize the leaderboard rows.
//! 5. CAS `COMPLETING -> COMPLETED`.
//!
//! Any failure in 2-5 releases the claim back to `LIVE`; the next scheduler
//! tick retries from scratch. Credits that already landed replay as
//! `AlreadyApplied` no-ops, so a retry can never pay twice.

use pitchside_scoring::assign_ranks;
use pitchside_types::{
    Contest, ContestId, CreditOutcome, IdempotencyKey, LedgerKind, Result,
};
use rust_decimal::Decimal;

use crate::Stores;

/// What one settlement run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SettlementReport {
    /// Credits applied for the first time.
    pub payouts_applied: usize,
    /// Credits that replayed as no-ops (retry after a partial failure).
    pub payouts_replayed: usize,
    /// Total amount newly credited in this run.
    pub total_paid: Decimal,
}

/// Settles contests whose match has finished.
pub struct SettlementEngine {
    stores: Stores,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Settle one contest exactly once.
    ///
    /// # Errors
    /// - [`PitchsideError::SettlementClaimLost`](pitchside_types::PitchsideError::SettlementClaimLost)
    ///   / [`PitchsideError::AlreadyCompleted`](pitchside_types::PitchsideError::AlreadyCompleted)
    ///   — a concurrent or earlier attempt got there first; clean no-ops
    /// - anything else — the claim has been released and the next tick
    ///   retries from scratch
    pub fn settle_contest(&self, contest_id: ContestId) -> Result<SettlementReport> {
        let contest = self.stores.contests.get(contest_id)?;

        self.stores.contests.claim_settlement(contest_id)?;
        tracing::debug!(contest = %contest_id, "settlement claim acquired");

        match self.execute(&contest) {
            Ok(report) => {
                tracing::info!(
                    contest = %contest_id,
                    payouts = report.payouts_applied,
                    replayed = report.payouts_replayed,
                    total = %report.total_paid,
                    "contest settled"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(contest = %contest_id, error = %err, "settlement failed, releasing claim");
                if let Err(release_err) = self.stores.contests.release_claim(contest_id) {
                    // The claim is stuck; operators must intervene.
                    tracing::error!(
                        target: "operator",
                        contest = %contest_id,
                        error = %release_err,
                        "failed to release settlement claim"
                    );
                }
                Err(err)
            }
        }
    }

    /// Steps 2-5, run while holding the claim.
    fn execute(&self, contest: &Contest) -> Result<SettlementReport> {
        // Final rank pass so payouts see the definitive ordering.
        let snapshot = self.stores.leaderboard.read_snapshot(contest.id)?;
        let ranked = assign_ranks(&snapshot.rows);
        let batch: Vec<_> = ranked.iter().map(|r| (r.entry_id, r.rank)).collect();
        self.stores.leaderboard.upsert_ranks(contest.id, &batch)?;

        let snapshot = self.stores.leaderboard.read_snapshot(contest.id)?;

        let mut report = SettlementReport::default();
        for tier in &contest.winnings.0 {
            for row in snapshot.rows_in_rank_range(tier.from, tier.to) {
                let key =
                    IdempotencyKey::for_payout(contest.id, row.user_id, tier.from, tier.to);
                let outcome = self.stores.wallet.credit(
                    row.user_id,
                    tier.price,
                    key,
                    LedgerKind::SettlementPayout,
                    Some(contest.id),
                )?;
                match outcome {
                    CreditOutcome::Applied => {
                        report.payouts_applied += 1;
                        report.total_paid += tier.price;
                    }
                    CreditOutcome::AlreadyApplied => report.payouts_replayed += 1,
                }
            }
        }

        self.stores.leaderboard.finalize(contest.id)?;
        self.stores.contests.complete(contest.id)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pitchside_types::{
        Contest, MatchId, PitchsideError, Roster, UserId, Winnings, WinningsTier,
    };

    use super::*;

    fn winnings(table: &[(u32, u32, i64)]) -> Winnings {
        Winnings(
            table.iter()
                .map(|&(from, to, price)| WinningsTier {
                    from,
                    to,
                    price: Decimal::new(price, 0),
                })
                .collect(),
        )
    }

    struct Fixture {
        stores: Stores,
        engine: SettlementEngine,
        contest_id: ContestId,
    }

    /// A live contest with the given winnings and one entry per score,
    /// joined in slice order.
    fn fixture(scores: &[i64], tiers: &[(u32, u32, i64)]) -> (Fixture, Vec<UserId>) {
        let stores = Stores::new();
        let contest = Contest::new(
            MatchId::new(),
            Decimal::ZERO,
            32,
            winnings(tiers),
        )
        .unwrap();
        let contest_id = contest.id;
        stores.contests.insert(contest).unwrap();

        let mut users = Vec::new();
        for (i, score) in scores.iter().enumerate() {
            let user = UserId::new();
            let entry = stores
                .entries
                .join_contest(
                    &stores.contests,
                    &stores.wallet,
                    &stores.leaderboard,
                    contest_id,
                    user,
                    Roster::dummy(&format!("XI {i}"), 3, 0),
                )
                .unwrap();
            stores
                .leaderboard
                .upsert_score(contest_id, entry.id, Decimal::new(*score, 0))
                .unwrap();
            users.push(user);
        }
        stores.contests.mark_live(contest_id).unwrap();

        let engine = SettlementEngine::new(stores.clone());
        (
            Fixture {
                stores,
                engine,
                contest_id,
            },
            users,
        )
    }

    #[test]
    fn tie_scenario_pays_every_rank_one_holder() {
        // Scores [50, 50, 30], tiers [{1,1,100}, {2,2,50}]: both 50s share
        // rank 1 and each receives 100; the 30 ranks 3 and gets nothing.
        let (f, users) = fixture(&[50, 50, 30], &[(1, 1, 100), (2, 2, 50)]);

        let report = f.engine.settle_contest(f.contest_id).unwrap();
        assert_eq!(report.payouts_applied, 2);
        assert_eq!(report.total_paid, Decimal::new(200, 0));

        assert_eq!(f.stores.wallet.balance(users[0]).unwrap(), Decimal::new(100, 0));
        assert_eq!(f.stores.wallet.balance(users[1]).unwrap(), Decimal::new(100, 0));
        assert_eq!(f.stores.wallet.balance(users[2]).unwrap(), Decimal::ZERO);

        let snapshot = f.stores.leaderboard.read_snapshot(f.contest_id).unwrap();
        assert!(snapshot.is_finalized);
        assert_eq!(snapshot.rows[0].rank, 1);
        assert_eq!(snapshot.rows[1].rank, 1);
        assert_eq!(snapshot.rows[2].rank, 3);
    }

    #[test]
    fn second_settlement_is_clean_noop() {
        let (f, users) = fixture(&[40, 20], &[(1, 1, 100)]);

        f.engine.settle_contest(f.contest_id).unwrap();
        let err = f.engine.settle_contest(f.contest_id).unwrap_err();
        assert!(matches!(err, PitchsideError::AlreadyCompleted(_)));

        // Balances identical to the first run.
        assert_eq!(f.stores.wallet.balance(users[0]).unwrap(), Decimal::new(100, 0));
        assert_eq!(f.stores.wallet.balance(users[1]).unwrap(), Decimal::ZERO);
        assert_eq!(
            f.stores.wallet.total_paid_for_contest(f.contest_id).unwrap(),
            Decimal::new(100, 0)
        );
    }

    #[test]
    fn concurrent_claim_loses_cleanly() {
        let (f, _) = fixture(&[10], &[(1, 1, 100)]);

        // Simulate a racing tick that grabbed the claim first.
        f.stores.contests.claim_settlement(f.contest_id).unwrap();

        let err = f.engine.settle_contest(f.contest_id).unwrap_err();
        assert!(matches!(err, PitchsideError::SettlementClaimLost(_)));
        assert!(f.stores.wallet.is_empty().unwrap());
    }

    #[test]
    fn payout_bound_holds_with_sparse_ranks() {
        // Two entries tie at the top: tier {2,2} has no holder, so only the
        // {1,1} tier pays and the total stays below the declared pool.
        let (f, _) = fixture(&[50, 50], &[(1, 1, 100), (2, 2, 50)]);

        let report = f.engine.settle_contest(f.contest_id).unwrap();
        assert_eq!(report.total_paid, Decimal::new(200, 0));
        assert_eq!(report.payouts_applied, 2);
        assert_eq!(
            f.stores.wallet.total_paid_for_contest(f.contest_id).unwrap(),
            Decimal::new(200, 0)
        );
    }

    #[test]
    fn multi_rank_tier_pays_each_rank_holder() {
        let (f, users) = fixture(&[90, 80, 70, 60], &[(1, 1, 1000), (2, 4, 100)]);

        let report = f.engine.settle_contest(f.contest_id).unwrap();
        assert_eq!(report.payouts_applied, 4);
        assert_eq!(report.total_paid, Decimal::new(1300, 0));
        assert_eq!(f.stores.wallet.balance(users[3]).unwrap(), Decimal::new(100, 0));
    }

    #[test]
    fn same_user_two_winning_entries_in_one_tier_credits_once() {
        // The payout key is (contest, user, tier): a user holding two
        // entries inside the same tier range is credited once for it.
        let stores = Stores::new();
        let contest =
            Contest::new(MatchId::new(), Decimal::ZERO, 8, winnings(&[(1, 2, 100)])).unwrap();
        let contest_id = contest.id;
        stores.contests.insert(contest).unwrap();

        let user = UserId::new();
        for (name, score) in [("A XI", 50), ("B XI", 40)] {
            let entry = stores
                .entries
                .join_contest(
                    &stores.contests,
                    &stores.wallet,
                    &stores.leaderboard,
                    contest_id,
                    user,
                    Roster::dummy(name, 3, 0),
                )
                .unwrap();
            stores
                .leaderboard
                .upsert_score(contest_id, entry.id, Decimal::new(score, 0))
                .unwrap();
        }
        stores.contests.mark_live(contest_id).unwrap();

        let engine = SettlementEngine::new(stores.clone());
        let report = engine.settle_contest(contest_id).unwrap();
        assert_eq!(report.payouts_applied, 1);
        assert_eq!(report.payouts_replayed, 1);
        assert_eq!(stores.wallet.balance(user).unwrap(), Decimal::new(100, 0));
    }

    #[test]
    fn empty_contest_still_completes() {
        let (f, _) = fixture(&[], &[(1, 1, 100)]);

        let report = f.engine.settle_contest(f.contest_id).unwrap();
        assert_eq!(report.payouts_applied, 0);
        assert_eq!(report.total_paid, Decimal::ZERO);
        assert!(f.stores.leaderboard.read_snapshot(f.contest_id).unwrap().is_finalized);
    }

    #[test]
    fn no_winnings_means_no_payouts() {
        let (f, users) = fixture(&[10, 5], &[]);

        let report = f.engine.settle_contest(f.contest_id).unwrap();
        assert_eq!(report.payouts_applied, 0);
        assert_eq!(f.stores.wallet.balance(users[0]).unwrap(), Decimal::ZERO);
    }
}
