//! Append-only wallet ledger with idempotency-keyed writes.
//!
//! Every monetary movement is one immutable [`LedgerRow`]. The idempotency
//! key is globally unique: writing a key twice with the same logical
//! coordinates is a no-op ([`CreditOutcome::AlreadyApplied`]); writing it
//! with *different* coordinates is a hard
//! [`PitchsideError::IdempotencyConflict`] — money must never silently land
//! on the wrong row.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use pitchside_types::{
    ContestId, CreditOutcome, IdempotencyKey, LedgerKind, LedgerRow, PitchsideError, Result,
    UserId,
};
use rust_decimal::Decimal;

#[derive(Default)]
struct LedgerState {
    rows: Vec<LedgerRow>,
    /// idempotency key -> index into `rows`.
    applied: HashMap<IdempotencyKey, usize>,
    balances: HashMap<UserId, Decimal>,
}

/// Append-only transaction log per user, keyed for exactly-once application.
pub struct WalletLedger {
    inner: Mutex<LedgerState>,
}

impl WalletLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerState::default()),
        }
    }

    /// Credit a user. `Applied` on first write, `AlreadyApplied` on replay.
    ///
    /// # Errors
    /// - [`PitchsideError::InvalidAmount`] for zero/negative amounts
    /// - [`PitchsideError::IdempotencyConflict`] if the key was used for a
    ///   different (user, amount, kind) triple
    pub fn credit(
        &self,
        user_id: UserId,
        amount: Decimal,
        key: IdempotencyKey,
        kind: LedgerKind,
        contest_id: Option<ContestId>,
    ) -> Result<CreditOutcome> {
        if !kind.is_credit() {
            return Err(PitchsideError::Internal(format!(
                "credit called with debit kind {kind:?}"
            )));
        }
        self.apply(user_id, amount, key, kind, contest_id)
    }

    /// Debit a user. Same idempotency semantics as [`Self::credit`].
    ///
    /// # Errors
    /// Additionally fails with [`PitchsideError::InsufficientFunds`] if the
    /// user's balance cannot cover the amount.
    pub fn debit(
        &self,
        user_id: UserId,
        amount: Decimal,
        key: IdempotencyKey,
        kind: LedgerKind,
        contest_id: Option<ContestId>,
    ) -> Result<CreditOutcome> {
        if kind.is_credit() {
            return Err(PitchsideError::Internal(format!(
                "debit called with credit kind {kind:?}"
            )));
        }
        self.apply(user_id, amount, key, kind, contest_id)
    }

    fn apply(
        &self,
        user_id: UserId,
        amount: Decimal,
        key: IdempotencyKey,
        kind: LedgerKind,
        contest_id: Option<ContestId>,
    ) -> Result<CreditOutcome> {
        if amount <= Decimal::ZERO {
            return Err(PitchsideError::InvalidAmount { amount });
        }

        let mut inner = self.lock()?;

        if let Some(&idx) = inner.applied.get(&key) {
            let existing = &inner.rows[idx];
            if existing.user_id != user_id || existing.amount != amount || existing.kind != kind {
                return Err(PitchsideError::IdempotencyConflict(key));
            }
            tracing::debug!(key = %key, "ledger replay ignored");
            return Ok(CreditOutcome::AlreadyApplied);
        }

        let balance = inner.balances.get(&user_id).copied().unwrap_or_default();
        if !kind.is_credit() && balance < amount {
            return Err(PitchsideError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }

        let row = LedgerRow {
            user_id,
            amount,
            kind,
            idempotency_key: key,
            contest_id,
            created_at: Utc::now(),
        };
        let delta = row.signed_amount();
        let idx = inner.rows.len();
        inner.rows.push(row);
        inner.applied.insert(key, idx);
        *inner.balances.entry(user_id).or_default() += delta;

        Ok(CreditOutcome::Applied)
    }

    /// Current balance for a user (zero if never seen).
    pub fn balance(&self, user_id: UserId) -> Result<Decimal> {
        Ok(self
            .lock()?
            .balances
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    /// All rows referencing a contest, in write order.
    pub fn rows_for_contest(&self, contest_id: ContestId) -> Result<Vec<LedgerRow>> {
        Ok(self
            .lock()?
            .rows
            .iter()
            .filter(|r| r.contest_id == Some(contest_id))
            .cloned()
            .collect())
    }

    /// Sum of settlement payouts issued for a contest.
    pub fn total_paid_for_contest(&self, contest_id: ContestId) -> Result<Decimal> {
        Ok(self
            .lock()?
            .rows
            .iter()
            .filter(|r| {
                r.contest_id == Some(contest_id) && r.kind == LedgerKind::SettlementPayout
            })
            .map(|r| r.amount)
            .sum())
    }

    /// Number of rows in the ledger.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.rows.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>> {
        self.inner
            .lock()
            .map_err(|e| PitchsideError::StoreUnavailable(e.to_string()))
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}
