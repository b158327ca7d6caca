//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Timing and capacity configuration for the engine's driver plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between scheduler ticks.
    pub tick_interval: Duration,
    /// Interval between leaderboard pushes per contest.
    pub broadcast_interval: Duration,
    /// How long in-flight settlement may drain on shutdown.
    pub shutdown_grace: Duration,
    /// Bounded capacity of each subscriber's push channel.
    pub subscriber_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(constants::DEFAULT_TICK_MS),
            broadcast_interval: Duration::from_millis(constants::DEFAULT_BROADCAST_INTERVAL_MS),
            shutdown_grace: Duration::from_millis(constants::DEFAULT_SHUTDOWN_GRACE_MS),
            subscriber_capacity: constants::DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// A configuration with tight intervals for integration tests.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            tick_interval: Duration::from_millis(20),
            broadcast_interval: Duration::from_millis(30),
            shutdown_grace: Duration::from_millis(200),
            subscriber_capacity: constants::DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}
