//! Shared handles to the stateful plane.

use std::sync::Arc;

use pitchside_store::{ContestBook, EntryBook, LeaderboardStore, WalletLedger};

/// One handle bundle for everything the driver plane reads and writes.
///
/// Cloning is cheap (four `Arc`s); the scheduler, the settlement engine,
/// and the broadcaster all share the same underlying books.
#[derive(Clone)]
pub struct Stores {
    pub contests: Arc<ContestBook>,
    pub entries: Arc<EntryBook>,
    pub leaderboard: Arc<LeaderboardStore>,
    pub wallet: Arc<WalletLedger>,
}

impl Stores {
    /// Fresh, empty books.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contests: Arc::new(ContestBook::new()),
            entries: Arc::new(EntryBook::new()),
            leaderboard: Arc::new(LeaderboardStore::new()),
            wallet: Arc::new(WalletLedger::new()),
        }
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::new()
    }
}
