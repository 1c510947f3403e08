//! Match record normalizer: symmetric per-pair lookup maps for one round.
//!
//! Every match populates both the `(black, white)` and `(white, black)`
//! orientations so either participant can look the game up from their own
//! perspective. Players missing from the player map never error here; the
//! maps are keyed by id alone.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::{GameId, PlayerId, Round};

/// Result of a match as seen from one side of an ordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultClass {
    Win,
    Loss,
    NoResult,
    Unknown,
}

/// Lookup keyed by an ordered `(viewer, opponent)` pair, serialized with
/// the `"AxB"` string keys the rendering layer indexes by.
#[derive(Debug, Clone)]
pub struct PairMap<V> {
    entries: HashMap<(PlayerId, PlayerId), V>,
}

impl<V> Default for PairMap<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> PairMap<V> {
    pub fn insert(&mut self, a: PlayerId, b: PlayerId, value: V) {
        self.entries.insert((a, b), value);
    }

    pub fn get(&self, a: PlayerId, b: PlayerId) -> Option<&V> {
        self.entries.get(&(a, b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for PairMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for ((a, b), v) in &self.entries {
            map.serialize_entry(&format!("{a}x{b}"), v)?;
        }
        map.end()
    }
}

/// The normalized view of one round's matches.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RoundMaps {
    pub results: PairMap<ResultClass>,
    pub colors: PairMap<ResultClass>,
    pub game_ids: PairMap<GameId>,
}

impl RoundMaps {
    pub fn build(round: &Round) -> Self {
        let mut maps = Self::default();

        for m in &round.matches {
            maps.game_ids.insert(m.black, m.white, m.game_id);
            maps.game_ids.insert(m.white, m.black, m.game_id);

            // `results` folds anything that is not a B/W result into
            // Unknown; `colors` keeps a distinct NoResult class for games
            // decided without a winner color.
            let (black_result, white_result, black_color, white_color) = match m.result_prefix() {
                Some('B') => (
                    ResultClass::Win,
                    ResultClass::Loss,
                    ResultClass::Win,
                    ResultClass::Loss,
                ),
                Some('W') => (
                    ResultClass::Loss,
                    ResultClass::Win,
                    ResultClass::Loss,
                    ResultClass::Win,
                ),
                Some(_) => (
                    ResultClass::Unknown,
                    ResultClass::Unknown,
                    ResultClass::NoResult,
                    ResultClass::NoResult,
                ),
                None => (
                    ResultClass::Unknown,
                    ResultClass::Unknown,
                    ResultClass::Unknown,
                    ResultClass::Unknown,
                ),
            };

            maps.results.insert(m.black, m.white, black_result);
            maps.results.insert(m.white, m.black, white_result);
            maps.colors.insert(m.black, m.white, black_color);
            maps.colors.insert(m.white, m.black, white_color);
        }

        maps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_round;

    #[test]
    fn test_symmetric_population() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2, "result": "B+R", "game_id": 10},
                            {"black": 3, "white": 4, "game_id": 11}],
                "byes": []}"#,
        )
        .unwrap();
        let maps = RoundMaps::build(&round);

        for (a, b) in [(1, 2), (3, 4)] {
            assert!(maps.results.get(a, b).is_some());
            assert!(maps.results.get(b, a).is_some());
            assert_eq!(maps.game_ids.get(a, b), maps.game_ids.get(b, a));
        }
        assert_eq!(maps.game_ids.get(1, 2), Some(&10));

        // one entry per match per orientation
        assert_eq!(maps.results.len(), 4);
        assert_eq!(maps.colors.len(), 4);
        assert!(!maps.game_ids.is_empty());
        assert!(RoundMaps::default().results.is_empty());
    }

    #[test]
    fn test_win_loss_mutual_consistency() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2, "result": "W+2.5"}], "byes": []}"#,
        )
        .unwrap();
        let maps = RoundMaps::build(&round);
        assert_eq!(maps.results.get(1, 2), Some(&ResultClass::Loss));
        assert_eq!(maps.results.get(2, 1), Some(&ResultClass::Win));
        assert_eq!(maps.colors.get(2, 1), Some(&ResultClass::Win));
    }

    #[test]
    fn test_unplayed_and_voided_results() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2},
                            {"black": 3, "white": 4, "result": "Annulled"}],
                "byes": []}"#,
        )
        .unwrap();
        let maps = RoundMaps::build(&round);

        // unplayed: unknown everywhere
        assert_eq!(maps.results.get(1, 2), Some(&ResultClass::Unknown));
        assert_eq!(maps.colors.get(1, 2), Some(&ResultClass::Unknown));

        // voided: result exists but carries no winner color
        assert_eq!(maps.results.get(3, 4), Some(&ResultClass::Unknown));
        assert_eq!(maps.colors.get(3, 4), Some(&ResultClass::NoResult));
    }

    #[test]
    fn test_pair_key_serialization() {
        let mut map = PairMap::default();
        map.insert(1, 2, ResultClass::Win);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1x2":"win"}"#);
    }
}
