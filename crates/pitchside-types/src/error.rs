//! Error types for the Pitchside engine.
//!
//! All errors use the `PS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Contest errors
//! - 2xx: Roster / entry errors
//! - 3xx: Wallet / ledger errors
//! - 4xx: Leaderboard errors
//! - 5xx: Settlement errors
//! - 6xx: Match feed errors
//! - 7xx: Realtime errors
//! - 9xx: General / internal errors
//!
//! Every error maps onto an [`ErrorClass`], which is what the Scheduler's
//! per-contest boundary switches on: transient errors retry next tick,
//! validation errors park the contest for operator attention, consistency
//! errors are logged no-ops, and fatal errors abort that contest's work for
//! the tick.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ContestId, ContestStatus, EntryId, IdempotencyKey, MatchId};

/// Central error enum for all Pitchside operations.
#[derive(Debug, Error)]
pub enum PitchsideError {
    // =================================================================
    // Contest Errors (1xx)
    // =================================================================
    /// The requested contest does not exist.
    #[error("PS_ERR_100: Contest not found: {0}")]
    ContestNotFound(ContestId),

    /// The contest's winnings tiers failed validation.
    #[error("PS_ERR_101: Invalid winnings: {reason}")]
    InvalidWinnings { reason: String },

    /// The contest has no match reference, so it can never be driven.
    #[error("PS_ERR_102: Contest {0} has no match reference")]
    MissingMatchRef(ContestId),

    /// A status transition that would move the contest backwards.
    #[error("PS_ERR_103: Invalid contest status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: ContestStatus,
        to: ContestStatus,
    },

    /// All spots in the contest are taken.
    #[error("PS_ERR_104: Contest is full: {0}")]
    ContestFull(ContestId),

    /// Joins are only accepted while the contest is upcoming.
    #[error("PS_ERR_105: Contest no longer accepts entries: {0}")]
    ContestClosed(ContestId),

    // =================================================================
    // Roster / Entry Errors (2xx)
    // =================================================================
    /// The roster failed validation (captain/vice-captain rules, duplicates).
    #[error("PS_ERR_200: Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    /// The same (contest, user, roster) combination was already entered.
    #[error("PS_ERR_201: Duplicate entry for contest {contest_id}")]
    DuplicateEntry { contest_id: ContestId },

    /// The requested entry does not exist.
    #[error("PS_ERR_202: Entry not found: {0}")]
    EntryNotFound(EntryId),

    // =================================================================
    // Wallet / Ledger Errors (3xx)
    // =================================================================
    /// Not enough balance to perform the debit.
    #[error("PS_ERR_300: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// An idempotency key was reused for a *different* logical operation.
    #[error("PS_ERR_301: Idempotency key conflict: {0}")]
    IdempotencyConflict(IdempotencyKey),

    /// A ledger amount that is zero or negative.
    #[error("PS_ERR_302: Invalid ledger amount: {amount}")]
    InvalidAmount { amount: Decimal },

    // =================================================================
    // Leaderboard Errors (4xx)
    // =================================================================
    /// No leaderboard row exists for the given (contest, entry) pair.
    #[error("PS_ERR_400: Leaderboard row not found: contest {contest_id}, entry {entry_id}")]
    RowNotFound {
        contest_id: ContestId,
        entry_id: EntryId,
    },

    /// A score/rank write was attempted after finalization.
    #[error("PS_ERR_401: Leaderboard already finalized for contest {0}")]
    LeaderboardFinalized(ContestId),

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Another settlement attempt holds the claim on this contest.
    #[error("PS_ERR_500: Settlement claim lost for contest {0}")]
    SettlementClaimLost(ContestId),

    /// The contest was already completed (idempotency guard).
    #[error("PS_ERR_501: Contest already completed: {0}")]
    AlreadyCompleted(ContestId),

    /// Settlement aborted mid-flight; the claim has been released.
    #[error("PS_ERR_502: Settlement failed for contest {contest_id}: {reason}")]
    SettlementFailed {
        contest_id: ContestId,
        reason: String,
    },

    // =================================================================
    // Match Feed Errors (6xx)
    // =================================================================
    /// The feed is temporarily unavailable or incomplete.
    #[error("PS_ERR_600: Match feed unavailable: {reason}")]
    FeedUnavailable { reason: String },

    /// The feed does not cover the requested match.
    #[error("PS_ERR_601: Match not covered by feed: {0}")]
    MatchNotCovered(MatchId),

    // =================================================================
    // Realtime Errors (7xx)
    // =================================================================
    /// The broadcast loop for this contest has ended.
    #[error("PS_ERR_700: Broadcast closed for contest {0}")]
    BroadcastClosed(ContestId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("PS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// A store lock was poisoned or the backing store is unreachable.
    #[error("PS_ERR_903: Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PitchsideError>;

/// How the Scheduler's per-contest boundary reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retried automatically on the next tick; scores stay stale meanwhile.
    Transient,
    /// Skipped until an operator corrects the data; never auto-retried.
    Validation,
    /// Expected race outcome or replay; logged as a no-op.
    Consistency,
    /// Aborts the contest's work for this tick; other contests continue.
    Fatal,
}

impl PitchsideError {
    /// Classify this error for the Scheduler's per-contest boundary.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::FeedUnavailable { .. } | Self::MatchNotCovered(_) => ErrorClass::Transient,

            Self::InvalidWinnings { .. }
            | Self::MissingMatchRef(_)
            | Self::InvalidRoster { .. }
            | Self::ContestFull(_)
            | Self::ContestClosed(_)
            | Self::DuplicateEntry { .. }
            | Self::InsufficientFunds { .. }
            | Self::InvalidAmount { .. }
            | Self::Configuration(_) => ErrorClass::Validation,

            Self::SettlementClaimLost(_)
            | Self::AlreadyCompleted(_)
            | Self::IdempotencyConflict(_)
            | Self::InvalidStatusTransition { .. }
            | Self::LeaderboardFinalized(_)
            | Self::BroadcastClosed(_)
            | Self::ContestNotFound(_)
            | Self::EntryNotFound(_)
            | Self::RowNotFound { .. } => ErrorClass::Consistency,

            Self::SettlementFailed { .. }
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::StoreUnavailable(_) => ErrorClass::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = PitchsideError::ContestNotFound(ContestId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("PS_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = PitchsideError::InsufficientFunds {
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PS_ERR_300"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn status_transition_display() {
        let err = PitchsideError::InvalidStatusTransition {
            from: ContestStatus::Completed,
            to: ContestStatus::Live,
        };
        let msg = format!("{err}");
        assert!(msg.contains("PS_ERR_103"));
        assert!(msg.contains("COMPLETED"));
        assert!(msg.contains("LIVE"));
    }

    #[test]
    fn all_errors_have_ps_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PitchsideError::MissingMatchRef(ContestId::new())),
            Box::new(PitchsideError::SettlementClaimLost(ContestId::new())),
            Box::new(PitchsideError::FeedUnavailable {
                reason: "test".into(),
            }),
            Box::new(PitchsideError::Internal("test".into())),
            Box::new(PitchsideError::InvalidRoster {
                reason: "two captains".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PS_ERR_"),
                "Error missing PS_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn classification() {
        assert_eq!(
            PitchsideError::FeedUnavailable { reason: "".into() }.class(),
            ErrorClass::Transient
        );
        assert_eq!(
            PitchsideError::InvalidWinnings { reason: "".into() }.class(),
            ErrorClass::Validation
        );
        assert_eq!(
            PitchsideError::SettlementClaimLost(ContestId::new()).class(),
            ErrorClass::Consistency
        );
        assert_eq!(
            PitchsideError::StoreUnavailable("down".into()).class(),
            ErrorClass::Fatal
        );
    }
}
