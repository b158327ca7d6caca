//! System-wide constants for the Pitchside engine.

/// Default scheduler tick interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 5_000;

/// Default leaderboard broadcast interval in milliseconds.
pub const DEFAULT_BROADCAST_INTERVAL_MS: u64 = 10_000;

/// Default grace period for draining in-flight settlement on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 10_000;

/// Default per-subscriber channel capacity for leaderboard pushes.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 16;

/// Maximum picks allowed in a roster (playing XI plus bench).
pub const MAX_ROSTER_PICKS: usize = 15;

/// Decimal precision for fantasy point values.
pub const POINTS_PRECISION: u32 = 2;

/// Decimal precision for money amounts.
pub const MONEY_PRECISION: u32 = 2;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Pitchside";
