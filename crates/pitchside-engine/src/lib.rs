//! # pitchside-engine
//!
//! **Driver plane**: the async components that move the system forward.
//!
//! ## Architecture
//!
//! 1. **SettlementEngine**: exactly-once contest completion and payout via
//!    the claim-then-commit pattern
//! 2. **Scheduler**: periodic tick driving score aggregation for live
//!    matches and settlement checks for finished ones
//! 3. **RealtimeBroadcaster**: one shared push loop per contest fanning
//!    leaderboard snapshots out to every subscriber
//! 4. **PaymentGateway plumbing**: the gateway trait and the scoped
//!    auth-token cache
//!
//! ## Data Flow
//!
//! ```text
//! MatchDataFeed → Scheduler → scoring → LeaderboardStore
//! LeaderboardStore → SettlementEngine → WalletLedger
//! LeaderboardStore → RealtimeBroadcaster → subscribers
//! ```
//!
//! The Scheduler drives aggregation and settlement; the broadcaster runs on
//! its own subscriber-registration lifecycle and is never driven by ticks.

pub mod broadcast;
pub mod gateway;
pub mod scheduler;
pub mod settlement;
pub mod stores;

pub use broadcast::{RealtimeBroadcaster, Subscription};
pub use gateway::{AuthTokenCache, PaymentGateway};
pub use scheduler::{Scheduler, TickReport};
pub use settlement::{SettlementEngine, SettlementReport};
pub use stores::Stores;
