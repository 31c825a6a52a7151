//! Return-vent selection for a resting pursuer.

use lurk_events::{Position, ZoneGraph, ZoneId};

/// Picks the vent nearest to `from`.
///
/// The vent in the player's zone is skipped whenever any other vent exists,
/// so the pursuer never despawns in front of the player if it can avoid it.
/// Ties go to the lowest zone id.
pub fn select_return_vent(
    graph: &ZoneGraph,
    from: &Position,
    player_zone: Option<ZoneId>,
) -> Option<(ZoneId, Position)> {
    let nearest = |skip: Option<ZoneId>| {
        let mut best: Option<(ZoneId, Position, f32)> = None;
        for (zone, vent) in graph.vents() {
            if Some(zone) == skip {
                continue;
            }
            let dist = vent.distance_squared(from);
            if best.map(|(_, _, d)| dist < d).unwrap_or(true) {
                best = Some((zone, vent, dist));
            }
        }
        best.map(|(zone, vent, _)| (zone, vent))
    };

    nearest(player_zone).or_else(|| nearest(None))
}
