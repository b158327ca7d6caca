//! Per-entry score aggregation.
//!
//! The fantasy-points formula itself lives upstream — the feed already
//! supplies a point value per player. This module only applies roster
//! composition: slot multipliers, substitute exclusion, and lineup
//! promotion.

use pitchside_types::{Lineup, PickSlot, PlayerPoints, Roster};
use rust_decimal::Decimal;

/// Compute an entry's total score from its roster and the latest match data.
///
/// `totalScore = Σ over effective non-substitute picks (points × multiplier)`
/// where multiplier(captain) = 2.0, multiplier(vice-captain) = 1.5 and
/// multiplier(regular) = 1.0.
///
/// A pick flagged substitute contributes 0 unless its player appears in the
/// playing `lineup`, which flips its effective slot to regular. Players
/// missing from `points` score 0 — the feed may be incomplete mid-innings
/// and that is not an error.
///
/// Pure and idempotent: the same `(roster, points, lineup)` always yields
/// the same score.
#[must_use]
pub fn score_roster(roster: &Roster, points: &PlayerPoints, lineup: &Lineup) -> Decimal {
    let mut total = Decimal::ZERO;
    for pick in &roster.picks {
        let effective_slot = match pick.slot {
            PickSlot::Substitute if lineup.contains(pick.player_id) => PickSlot::Regular,
            PickSlot::Substitute => continue,
            slot => slot,
        };
        total += points.get(pick.player_id) * effective_slot.multiplier();
    }
    total
}

#[cfg(test)]
mod tests {
    use pitchside_types::{PickSlot, PlayerId, Roster, RosterPick};

    use super::*;

    struct Fixture {
        roster: Roster,
        captain: PlayerId,
        vice: PlayerId,
        regular: PlayerId,
        substitute: PlayerId,
    }

    fn fixture() -> Fixture {
        let captain = PlayerId::new();
        let vice = PlayerId::new();
        let regular = PlayerId::new();
        let substitute = PlayerId::new();
        let roster = Roster::new(
            "Score XI",
            vec![
                RosterPick {
                    player_id: captain,
                    slot: PickSlot::Captain,
                },
                RosterPick {
                    player_id: vice,
                    slot: PickSlot::ViceCaptain,
                },
                RosterPick {
                    player_id: regular,
                    slot: PickSlot::Regular,
                },
                RosterPick {
                    player_id: substitute,
                    slot: PickSlot::Substitute,
                },
            ],
        )
        .unwrap();
        Fixture {
            roster,
            captain,
            vice,
            regular,
            substitute,
        }
    }

    #[test]
    fn multipliers_applied_per_slot() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.captain, Decimal::new(10, 0));
        points.set(f.vice, Decimal::new(10, 0));
        points.set(f.regular, Decimal::new(10, 0));

        // 10*2 + 10*1.5 + 10*1 = 45
        let score = score_roster(&f.roster, &points, &Lineup::default());
        assert_eq!(score, Decimal::new(45, 0));
    }

    #[test]
    fn substitute_scores_zero_when_benched() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.substitute, Decimal::new(50, 0));

        let score = score_roster(&f.roster, &points, &Lineup::default());
        assert_eq!(score, Decimal::ZERO);
    }

    #[test]
    fn promoted_substitute_scores_as_regular() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.substitute, Decimal::new(50, 0));
        let mut lineup = Lineup::default();
        lineup.insert(f.substitute);

        let score = score_roster(&f.roster, &points, &lineup);
        assert_eq!(score, Decimal::new(50, 0), "promoted sub gets 1.0x");
    }

    #[test]
    fn missing_points_are_zero_not_error() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.captain, Decimal::new(12, 0));
        // Vice, regular, substitute all absent from the feed.

        let score = score_roster(&f.roster, &points, &Lineup::default());
        assert_eq!(score, Decimal::new(24, 0));
    }

    #[test]
    fn empty_feed_scores_zero() {
        let f = fixture();
        let score = score_roster(&f.roster, &PlayerPoints::default(), &Lineup::default());
        assert_eq!(score, Decimal::ZERO);
    }

    #[test]
    fn fractional_points_are_exact() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.vice, Decimal::new(75, 1)); // 7.5 * 1.5 = 11.25

        let score = score_roster(&f.roster, &points, &Lineup::default());
        assert_eq!(score, Decimal::new(1125, 2));
    }

    #[test]
    fn negative_points_subtract() {
        // Ducks and dropped catches can take a player negative.
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.captain, Decimal::new(-5, 0));
        points.set(f.regular, Decimal::new(20, 0));

        let score = score_roster(&f.roster, &points, &Lineup::default());
        assert_eq!(score, Decimal::new(10, 0));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let f = fixture();
        let mut points = PlayerPoints::default();
        points.set(f.captain, Decimal::new(33, 0));
        points.set(f.vice, Decimal::new(14, 0));
        points.set(f.regular, Decimal::new(7, 0));
        let mut lineup = Lineup::default();
        lineup.insert(f.substitute);

        let first = score_roster(&f.roster, &points, &lineup);
        let second = score_roster(&f.roster, &points, &lineup);
        let third = score_roster(&f.roster, &points, &lineup);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }
}
