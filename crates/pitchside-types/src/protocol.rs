//! Realtime wire protocol.
//!
//! Only the message contract is fixed here — the push transport itself is a
//! collaborator. Messages are tagged JSON so any transport that moves UTF-8
//! frames can carry them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ContestId, EntryId, LeaderboardSnapshot, UserId};

/// Messages a subscriber sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register interest in one contest's leaderboard.
    SubscribeLeaderboard { contest_id: ContestId },
    /// Drop the subscription for one contest.
    UnsubscribeLeaderboard { contest_id: ContestId },
}

/// One leaderboard line as pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub user_id: UserId,
    pub entry_id: EntryId,
    pub roster_name: String,
    pub total_score: Decimal,
    pub rank: u32,
}

/// Messages the server pushes to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Periodic leaderboard snapshot for one contest.
    LeaderboardSnapshot {
        contest_id: ContestId,
        entries: Vec<SnapshotEntry>,
        is_finalized: bool,
    },
    /// Snapshot retrieval failed; the subscriber is told instead of dropped.
    LeaderboardError {
        contest_id: ContestId,
        message: String,
    },
}

impl ServerMessage {
    /// Build a snapshot message from a store snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &LeaderboardSnapshot) -> Self {
        Self::LeaderboardSnapshot {
            contest_id: snapshot.contest_id,
            entries: snapshot
                .rows
                .iter()
                .map(|row| SnapshotEntry {
                    user_id: row.user_id,
                    entry_id: row.entry_id,
                    roster_name: row.roster_name.clone(),
                    total_score: row.total_score,
                    rank: row.rank,
                })
                .collect(),
            is_finalized: snapshot.is_finalized,
        }
    }
}
