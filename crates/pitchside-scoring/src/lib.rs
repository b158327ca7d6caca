//! # pitchside-scoring
//!
//! **Pure deterministic scoring and ranking for Pitchside.**
//!
//! This is the compute plane — it turns per-player match stats plus roster
//! composition into per-entry scores, and a snapshot of scores into ranks.
//! It has:
//!
//! - **Zero side effects**: no store writes, no wallet access, no feed calls
//! - **Deterministic output**: same input -> same scores and ranks, always
//! - **Idempotent recomputation**: re-running on an unchanged stat snapshot
//!   reproduces the exact same values, so the scheduler can recompute freely
//!
//! The driver plane (`pitchside-engine`) is what writes the results back to
//! the leaderboard store.

pub mod rank;
pub mod score;

pub use rank::{RankedEntry, assign_ranks};
pub use score::score_roster;
