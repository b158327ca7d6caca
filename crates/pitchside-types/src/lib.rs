//! # pitchside-types
//!
//! Shared types, errors, and configuration for the **Pitchside** contest
//! leaderboard and settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ContestId`], [`EntryId`], [`UserId`], [`RosterId`], [`MatchId`], [`PlayerId`], [`IdempotencyKey`]
//! - **Contest model**: [`Contest`], [`ContestStatus`], [`Winnings`], [`WinningsTier`]
//! - **Roster model**: [`Roster`], [`RosterPick`], [`PickSlot`], [`Entry`]
//! - **Leaderboard model**: [`LeaderboardRow`], [`LeaderboardSnapshot`]
//! - **Wallet model**: [`LedgerRow`], [`LedgerKind`], [`CreditOutcome`]
//! - **Match feed**: [`MatchStatus`], [`PlayerPoints`], [`Lineup`], [`MatchDataFeed`]
//! - **Wire protocol**: [`ClientMessage`], [`ServerMessage`], [`SnapshotEntry`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`PitchsideError`] with `PS_ERR_` prefix codes and [`ErrorClass`]
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod contest;
pub mod error;
pub mod ids;
pub mod leaderboard;
pub mod matchfeed;
pub mod protocol;
pub mod roster;
pub mod wallet;

// Re-export all primary types at crate root for ergonomic imports:
//   use pitchside_types::{Contest, Roster, LeaderboardRow, ...};

pub use config::*;
pub use contest::*;
pub use error::*;
pub use ids::*;
pub use leaderboard::*;
pub use matchfeed::*;
pub use protocol::*;
pub use roster::*;
pub use wallet::*;

// Constants are accessed via `pitchside_types::constants::FOO`
// (not re-exported to avoid name collisions).
