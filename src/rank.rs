//! Rank comparison used for all display ordering.

use std::cmp::Ordering;

use crate::model::Player;

/// Total order over possibly-missing player records.
///
/// Tournament points, then sum-of-opponent-scores, then sum-of-defeated
/// scores, then site ranking, all descending, with username as the final
/// deterministic tie-break. Records absent from the player map sort after
/// present ones; two absent records compare equal.
pub fn compare_players(a: Option<&Player>, b: Option<&Player>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(pa), Some(pb)) => pb
            .points
            .total_cmp(&pa.points)
            .then_with(|| pb.sos.total_cmp(&pa.sos))
            .then_with(|| pb.sodos.total_cmp(&pa.sodos))
            .then_with(|| pb.ranking.total_cmp(&pa.ranking))
            .then_with(|| pb.username.cmp(&pa.username)),
    }
}
