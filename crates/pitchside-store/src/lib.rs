//! # pitchside-store
//!
//! **Stateful plane**: the durable books every other component reads and
//! writes through.
//!
//! ## Architecture
//!
//! 1. **ContestBook**: contest rows and the settlement-claim state machine
//! 2. **EntryBook**: entries + rosters, join validation, uniqueness
//! 3. **LeaderboardStore**: per-entry score/rank rows, consistent snapshots
//! 4. **WalletLedger**: append-only money movements with idempotency keys
//!
//! All books use interior locking and expose `&self` methods, so the
//! scheduler's tick tasks and the broadcaster's push loops can share them
//! behind plain `Arc`s. Every method takes and releases one lock — no method
//! calls another book while holding its own lock, which is what keeps the
//! planes deadlock-free.
//!
//! ## Write ownership
//!
//! Score columns are written only by the aggregation path, rank columns only
//! by the rank path, `is_finalized` only by settlement. The books don't
//! enforce callers' identity; they enforce the state machine (finalized rows
//! reject further score/rank writes, contest status only moves forward).

pub mod contests;
pub mod entries;
pub mod leaderboard;
pub mod wallet;

pub use contests::ContestBook;
pub use entries::EntryBook;
pub use leaderboard::LeaderboardStore;
pub use wallet::WalletLedger;
