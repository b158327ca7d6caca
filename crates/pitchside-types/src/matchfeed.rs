//! Match data feed collaborator.
//!
//! The external cricket-data provider is consumed pull-only through the
//! [`MatchDataFeed`] trait: per-match status, per-player point values, and
//! the current playing lineup. The wire format and polling cadence live
//! behind the implementation; this crate only fixes the contract.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MatchId, PlayerId, Result};

/// External feed status for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    NotStarted,
    Live,
    Finished,
}

/// Latest per-player fantasy point values for one match.
///
/// The feed may be incomplete mid-innings: a player absent from the map
/// scores 0, which is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerPoints(pub HashMap<PlayerId, Decimal>);

impl PlayerPoints {
    /// Points for a player; missing data is zero.
    #[must_use]
    pub fn get(&self, player_id: PlayerId) -> Decimal {
        self.0.get(&player_id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, player_id: PlayerId, points: Decimal) {
        self.0.insert(player_id, points);
    }
}

/// The set of players currently in the playing lineup.
///
/// A roster pick flagged substitute scores only if its player appears here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lineup(pub HashSet<PlayerId>);

impl Lineup {
    #[must_use]
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.0.contains(&player_id)
    }

    pub fn insert(&mut self, player_id: PlayerId) {
        self.0.insert(player_id);
    }
}

/// Pull interface over the external cricket data provider.
pub trait MatchDataFeed: Send + Sync {
    /// Current status of a match.
    fn match_status(&self, match_id: MatchId) -> Result<MatchStatus>;

    /// Latest per-player point values for a match.
    fn player_points(&self, match_id: MatchId) -> Result<PlayerPoints>;

    /// Current playing lineup for a match.
    fn playing_lineup(&self, match_id: MatchId) -> Result<Lineup>;

    /// All matches the feed currently reports as live.
    fn live_matches(&self) -> Result<Vec<MatchId>>;

    /// All matches the feed currently reports as finished.
    fn finished_matches(&self) -> Result<Vec<MatchId>>;
}

// ---------------------------------------------------------------------------
// StaticFeed — in-memory test double
// ---------------------------------------------------------------------------

/// In-memory [`MatchDataFeed`] for tests: statuses, points, and lineups are
/// set directly and served from a mutex-guarded map.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Default)]
pub struct StaticFeed {
    inner: std::sync::Mutex<StaticFeedState>,
}

#[cfg(any(test, feature = "test-helpers"))]
#[derive(Default)]
struct StaticFeedState {
    statuses: HashMap<MatchId, MatchStatus>,
    points: HashMap<MatchId, PlayerPoints>,
    lineups: HashMap<MatchId, Lineup>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl StaticFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, match_id: MatchId, status: MatchStatus) {
        self.inner.lock().unwrap().statuses.insert(match_id, status);
    }

    pub fn set_points(&self, match_id: MatchId, player_id: PlayerId, points: Decimal) {
        self.inner
            .lock()
            .unwrap()
            .points
            .entry(match_id)
            .or_default()
            .set(player_id, points);
    }

    pub fn promote_to_lineup(&self, match_id: MatchId, player_id: PlayerId) {
        self.inner
            .lock()
            .unwrap()
            .lineups
            .entry(match_id)
            .or_default()
            .insert(player_id);
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl MatchDataFeed for StaticFeed {
    fn match_status(&self, match_id: MatchId) -> Result<MatchStatus> {
        self.inner
            .lock()
            .unwrap()
            .statuses
            .get(&match_id)
            .copied()
            .ok_or(crate::PitchsideError::MatchNotCovered(match_id))
    }

    fn player_points(&self, match_id: MatchId) -> Result<PlayerPoints> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .points
            .get(&match_id)
            .cloned()
            .unwrap_or_default())
    }

    fn playing_lineup(&self, match_id: MatchId) -> Result<Lineup> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .lineups
            .get(&match_id)
            .cloned()
            .unwrap_or_default())
    }

    fn live_matches(&self) -> Result<Vec<MatchId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .statuses
            .iter()
            .filter(|(_, s)| **s == MatchStatus::Live)
            .map(|(id, _)| *id)
            .collect())
    }

    fn finished_matches(&self) -> Result<Vec<MatchId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .statuses
            .iter()
            .filter(|(_, s)| **s == MatchStatus::Finished)
            .map(|(id, _)| *id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PitchsideError;

    #[test]
    fn missing_player_points_are_zero() {
        let points = PlayerPoints::default();
        assert_eq!(points.get(PlayerId::new()), Decimal::ZERO);
    }

    #[test]
    fn static_feed_status() {
        let feed = StaticFeed::new();
        let m = MatchId::new();
        feed.set_status(m, MatchStatus::Live);
        assert_eq!(feed.match_status(m).unwrap(), MatchStatus::Live);
        assert_eq!(feed.live_matches().unwrap(), vec![m]);
        assert!(feed.finished_matches().unwrap().is_empty());
    }

    #[test]
    fn unknown_match_is_not_covered() {
        let feed = StaticFeed::new();
        let err = feed.match_status(MatchId::new()).unwrap_err();
        assert!(matches!(err, PitchsideError::MatchNotCovered(_)));
    }

    #[test]
    fn static_feed_points_and_lineup() {
        let feed = StaticFeed::new();
        let m = MatchId::new();
        let p = PlayerId::new();
        feed.set_points(m, p, Decimal::new(42, 0));
        feed.promote_to_lineup(m, p);

        assert_eq!(feed.player_points(m).unwrap().get(p), Decimal::new(42, 0));
        assert!(feed.playing_lineup(m).unwrap().contains(p));
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&MatchStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }
}
