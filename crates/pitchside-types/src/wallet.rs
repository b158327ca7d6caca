//! Wallet ledger types.
//!
//! The ledger is append-only: rows are immutable once written and every row
//! carries an [`IdempotencyKey`](crate::IdempotencyKey). Replaying an
//! operation with a key that was already applied is a visible no-op
//! ([`CreditOutcome::AlreadyApplied`]), never a duplicate credit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContestId, IdempotencyKey, UserId};

/// What kind of movement a ledger row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// External deposit via the payment gateway.
    Deposit,
    /// External withdrawal via the payment gateway.
    Withdraw,
    /// Contest entry fee debit.
    EntryFee,
    /// Prize credit issued by settlement.
    SettlementPayout,
}

impl LedgerKind {
    /// Whether rows of this kind add to the user's balance.
    #[must_use]
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::SettlementPayout)
    }
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub user_id: UserId,
    /// Always positive; direction comes from `kind`.
    pub amount: Decimal,
    pub kind: LedgerKind,
    pub idempotency_key: IdempotencyKey,
    /// Set on entry fees and settlement payouts.
    pub contest_id: Option<ContestId>,
    pub created_at: DateTime<Utc>,
}

impl LedgerRow {
    /// Signed effect of this row on the user's balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Result of an idempotency-keyed credit or debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditOutcome {
    /// The row was written and the balance moved.
    Applied,
    /// The key was seen before; nothing changed.
    AlreadyApplied,
}
