//! Globally unique identifiers used throughout Pitchside.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting.
//! [`IdempotencyKey`] is the exception: it is *derived*, not generated, so
//! that a retried monetary operation always reproduces the same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        uuid_id!(@define $(#[$doc])* $name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        uuid_id!(@define $(#[$doc])* $name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
    (@define $(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a contest.
    ContestId,
    "contest"
);
uuid_id!(
    /// Unique identifier for a user's entry in a contest.
    EntryId,
    "entry"
);
uuid_id!(
    /// Unique identifier for a user account.
    UserId
);
uuid_id!(
    /// Unique identifier for a fantasy roster (team).
    RosterId,
    "roster"
);
uuid_id!(
    /// Unique identifier for a cricket match covered by the data feed.
    MatchId,
    "match"
);
uuid_id!(
    /// Unique identifier for a real-world player.
    PlayerId,
    "player"
);

// ---------------------------------------------------------------------------
// IdempotencyKey
// ---------------------------------------------------------------------------

/// Deterministic key guarding monetary operations against double application.
///
/// The key is a truncated SHA-256 over the operation's logical coordinates,
/// so every retry of the same logical operation reproduces the exact same
/// key. The wallet ledger enforces global uniqueness: a replayed key is a
/// no-op, never a duplicate credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IdempotencyKey(pub [u8; 16]);

impl IdempotencyKey {
    /// Key for a settlement payout: one per (contest, user, winnings tier).
    ///
    /// Every node that computes the payout for the same tier and winner
    /// derives the **exact same** key — this is what makes settlement
    /// retries safe.
    #[must_use]
    pub fn for_payout(contest_id: ContestId, user_id: UserId, from: u32, to: u32) -> Self {
        Self::derive(b"pitchside:payout:v1:", &[
            contest_id.0.as_bytes(),
            user_id.0.as_bytes(),
            &from.to_le_bytes(),
            &to.to_le_bytes(),
        ])
    }

    /// Key for an entry-fee debit: one per (contest, user, roster).
    #[must_use]
    pub fn for_entry_fee(contest_id: ContestId, user_id: UserId, roster_id: RosterId) -> Self {
        Self::derive(b"pitchside:entry_fee:v1:", &[
            contest_id.0.as_bytes(),
            user_id.0.as_bytes(),
            roster_id.0.as_bytes(),
        ])
    }

    fn derive(domain: &[u8], parts: &[&[u8]]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(domain);
        for part in parts {
            hasher.update(part);
        }
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(bytes)
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ik:{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_uniqueness() {
        let a = EntryId::new();
        let b = EntryId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn entry_id_ordering() {
        let a = EntryId::new();
        let b = EntryId::new();
        assert!(a < b);
    }

    #[test]
    fn payout_key_deterministic() {
        let contest = ContestId::new();
        let user = UserId::new();
        let a = IdempotencyKey::for_payout(contest, user, 1, 1);
        let b = IdempotencyKey::for_payout(contest, user, 1, 1);
        assert_eq!(a, b);
        let c = IdempotencyKey::for_payout(contest, user, 2, 2);
        assert_ne!(a, c);
    }

    #[test]
    fn payout_key_distinct_per_user() {
        let contest = ContestId::new();
        let a = IdempotencyKey::for_payout(contest, UserId::new(), 1, 1);
        let b = IdempotencyKey::for_payout(contest, UserId::new(), 1, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn entry_fee_key_differs_from_payout_key() {
        let contest = ContestId::new();
        let user = UserId::new();
        let fee = IdempotencyKey::for_entry_fee(contest, user, RosterId::new());
        let payout = IdempotencyKey::for_payout(contest, user, 1, 1);
        assert_ne!(fee, payout);
    }

    #[test]
    fn display_formats() {
        let id = ContestId::new();
        assert!(id.to_string().starts_with("contest:"));
        let key = IdempotencyKey::for_payout(ContestId::new(), UserId::new(), 1, 3);
        assert!(key.to_string().starts_with("ik:"));
    }

    #[test]
    fn serde_roundtrips() {
        let cid = ContestId::new();
        let json = serde_json::to_string(&cid).unwrap();
        let back: ContestId = serde_json::from_str(&json).unwrap();
        assert_eq!(cid, back);

        let key = IdempotencyKey::for_payout(cid, UserId::new(), 1, 1);
        let json = serde_json::to_string(&key).unwrap();
        let back: IdempotencyKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }
}
