//! Group partitioner for non-elimination rounds.
//!
//! Partitions one round's matches into maximal connected components of
//! players under the "played each other this round" relation. Inconsistent
//! round data (a player implied to be in two groups at once) demotes every
//! affected player to the broken list instead of failing the round; the
//! partition is always total.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::{GameId, Match, Player, PlayerId, Round};
use crate::normalize::{PairMap, ResultClass, RoundMaps};
use crate::rank::compare_players;

/// Per-player view of one round, the unit both groups and the broken list
/// are made of.
#[derive(Debug, Clone, Serialize)]
pub struct MatchMapEntry {
    pub id: PlayerId,
    pub player: Option<Player>,
    /// Opponent id -> the match played against them this round.
    pub matches: BTreeMap<PlayerId, Match>,
    /// Only populated for broken-list entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opponents: Vec<Opponent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Opponent {
    pub game_id: GameId,
    pub player: Option<Player>,
}

/// A maximal connected component of players, ordered by rank comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub players: Vec<MatchMapEntry>,
}

/// One match seen from one participant's side.
#[derive(Debug, Clone, Serialize)]
pub struct PairedMatch {
    pub player: Option<Player>,
    pub opponent: Option<Player>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupedRound {
    pub groups: Vec<Group>,
    pub broken_list: Vec<MatchMapEntry>,
    pub matches: Vec<PairedMatch>,
    pub byes: Vec<Option<Player>>,
    /// True when some group has more than two members and the round needs
    /// a round-robin style display instead of a flat pairing table.
    pub groupify: bool,
    pub results: PairMap<ResultClass>,
    pub game_ids: PairMap<GameId>,
    pub colors: PairMap<ResultClass>,
}

/// Group membership state during the partition sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assignment {
    Unassigned,
    Member(u32),
    Broken,
}

fn demote_group(assign: &mut BTreeMap<PlayerId, Assignment>, group: u32) {
    for a in assign.values_mut() {
        if *a == Assignment::Member(group) {
            *a = Assignment::Broken;
        }
    }
}

pub fn groupify(round: &Round, players: &HashMap<PlayerId, Player>) -> GroupedRound {
    let maps = RoundMaps::build(round);

    let mut match_map: BTreeMap<PlayerId, MatchMapEntry> = BTreeMap::new();
    let mut matches: Vec<PairedMatch> = Vec::new();

    for m in &round.matches {
        matches.push(PairedMatch {
            player: players.get(&m.black).cloned(),
            opponent: players.get(&m.white).cloned(),
        });
        matches.push(PairedMatch {
            player: players.get(&m.white).cloned(),
            opponent: players.get(&m.black).cloned(),
        });

        for (id, opponent) in [(m.black, m.white), (m.white, m.black)] {
            match_map
                .entry(id)
                .or_insert_with(|| MatchMapEntry {
                    id,
                    player: players.get(&id).cloned(),
                    matches: BTreeMap::new(),
                    opponents: Vec::new(),
                })
                .matches
                .insert(opponent, m.clone());
        }
    }

    let mut byes: Vec<Option<Player>> = round.byes.iter().map(|id| players.get(id).cloned()).collect();

    let missing: Vec<PlayerId> = match_map
        .values()
        .filter(|e| e.player.is_none())
        .map(|e| e.id)
        .chain(round.byes.iter().copied().filter(|id| !players.contains_key(id)))
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "round references {} player(s) missing from the player map: {:?}",
            missing.len(),
            missing
        );
    }

    // Partition sweep: players in ascending id order, one fresh group id per
    // unassigned player, membership propagated one hop per adjacency. Two
    // different concrete assignments meeting is a group collision; both
    // groups are invalidated rather than merged, and brokenness spreads to
    // anyone adjacent to a broken player.
    let ids: Vec<PlayerId> = match_map.keys().copied().collect();
    let mut assign: BTreeMap<PlayerId, Assignment> =
        ids.iter().map(|&id| (id, Assignment::Unassigned)).collect();
    let mut next_group: u32 = 0;
    let mut collisions: usize = 0;

    for &pid in &ids {
        if assign[&pid] == Assignment::Unassigned {
            assign.insert(pid, Assignment::Member(next_group));
            next_group += 1;
        }

        let opponent_ids: Vec<PlayerId> = match_map[&pid].matches.keys().copied().collect();
        for oid in opponent_ids {
            // Re-read each iteration: a collision may have demoted pid.
            let cur = assign[&pid];
            let opp = assign[&oid];
            match (cur, opp) {
                (Assignment::Member(g), Assignment::Unassigned) => {
                    assign.insert(oid, Assignment::Member(g));
                }
                (Assignment::Member(g), Assignment::Member(og)) if g != og => {
                    collisions += 1;
                    log::warn!(
                        "group collision between players {pid} and {oid}; \
                         invalidating groups {g} and {og}"
                    );
                    demote_group(&mut assign, g);
                    demote_group(&mut assign, og);
                }
                (Assignment::Member(_), Assignment::Member(_)) => {}
                (Assignment::Member(g), Assignment::Broken) => {
                    collisions += 1;
                    demote_group(&mut assign, g);
                }
                (Assignment::Broken, Assignment::Unassigned) => {
                    assign.insert(oid, Assignment::Broken);
                }
                (Assignment::Broken, Assignment::Member(og)) => {
                    collisions += 1;
                    demote_group(&mut assign, og);
                }
                (Assignment::Broken, Assignment::Broken) => {}
                (Assignment::Unassigned, _) => {}
            }
        }
    }

    if collisions > 0 {
        log::warn!("{collisions} group collision(s) in round; affected players moved to broken list");
    }

    let mut buckets: BTreeMap<u32, Vec<MatchMapEntry>> = BTreeMap::new();
    let mut broken_list: Vec<MatchMapEntry> = Vec::new();
    for (pid, entry) in match_map {
        match assign[&pid] {
            Assignment::Member(g) => buckets.entry(g).or_default().push(entry),
            _ => broken_list.push(entry),
        }
    }

    let mut max_len = 0;
    let mut groups: Vec<Group> = buckets
        .into_values()
        .map(|mut members| {
            members.sort_by(|a, b| compare_players(a.player.as_ref(), b.player.as_ref()));
            max_len = max_len.max(members.len());
            Group { players: members }
        })
        .collect();
    groups.sort_by(|a, b| {
        compare_players(
            a.players.first().and_then(|e| e.player.as_ref()),
            b.players.first().and_then(|e| e.player.as_ref()),
        )
    });

    matches.sort_by(|a, b| compare_players(a.player.as_ref(), b.player.as_ref()));
    byes.sort_by(|a, b| compare_players(a.as_ref(), b.as_ref()));
    broken_list.sort_by(|a, b| compare_players(a.player.as_ref(), b.player.as_ref()));

    // Broken entries list their opponents directly since they render
    // outside any group table. Opponent records resolve against the broken
    // set only; anyone else shows as blank.
    let broken_players: HashMap<PlayerId, Player> = broken_list
        .iter()
        .filter_map(|e| e.player.clone().map(|p| (e.id, p)))
        .collect();
    for entry in &mut broken_list {
        entry.opponents = entry
            .matches
            .iter()
            .map(|(oid, m)| Opponent {
                game_id: m.game_id,
                player: broken_players.get(oid).cloned(),
            })
            .collect();
    }

    GroupedRound {
        groups,
        broken_list,
        matches,
        byes,
        groupify: max_len > 2,
        results: maps.results,
        game_ids: maps.game_ids,
        colors: maps.colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_round;

    fn player(id: PlayerId, points: f64, name: &str) -> (PlayerId, Player) {
        (
            id,
            Player {
                id,
                username: name.to_string(),
                rank: 0.0,
                ranking: 0.0,
                points,
                sos: 0.0,
                sodos: 0.0,
            },
        )
    }

    fn players(list: &[(PlayerId, f64, &str)]) -> HashMap<PlayerId, Player> {
        list.iter().map(|&(id, pts, name)| player(id, pts, name)).collect()
    }

    fn touched_ids(round: &Round) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = round
            .matches
            .iter()
            .flat_map(|m| [m.black, m.white])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    #[test]
    fn test_pairing_round_two_groups() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2, "result": "B+R", "game_id": 5},
                            {"black": 3, "white": 4, "result": "W+1.5", "game_id": 6}],
                "byes": [9]}"#,
        )
        .unwrap();
        let ps = players(&[(1, 2.0, "a"), (2, 1.0, "b"), (3, 3.0, "c"), (4, 0.0, "d"), (9, 0.5, "e")]);
        let grouped = groupify(&round, &ps);

        assert_eq!(grouped.groups.len(), 2);
        assert!(grouped.broken_list.is_empty());
        assert!(!grouped.groupify);
        assert_eq!(grouped.matches.len(), 4);
        assert_eq!(grouped.byes.len(), 1);

        // group of the higher-scoring top player sorts first
        assert_eq!(grouped.groups[0].players[0].id, 3);
        assert_eq!(grouped.groups[1].players[0].id, 1);
    }

    #[test]
    fn test_round_robin_pool_sets_groupify() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2}, {"black": 1, "white": 3},
                            {"black": 2, "white": 3}],
                "byes": []}"#,
        )
        .unwrap();
        let ps = players(&[(1, 0.0, "a"), (2, 0.0, "b"), (3, 0.0, "c")]);
        let grouped = groupify(&round, &ps);

        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].players.len(), 3);
        assert!(grouped.groupify);
    }

    #[test]
    fn test_cycle_collision_demotes_to_broken_list() {
        // 4-cycle discovered from two seeds: player 1 claims 3 and 4,
        // player 2 then collides on 3 when closing the loop.
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 3, "game_id": 1},
                            {"black": 3, "white": 2, "game_id": 2},
                            {"black": 2, "white": 4, "game_id": 3},
                            {"black": 4, "white": 1, "game_id": 4}],
                "byes": []}"#,
        )
        .unwrap();
        let ps = players(&[(1, 0.0, "a"), (2, 0.0, "b"), (3, 0.0, "c"), (4, 0.0, "d")]);
        let grouped = groupify(&round, &ps);

        assert!(grouped.groups.is_empty());
        assert_eq!(grouped.broken_list.len(), 4);

        // broken entries carry their opponents with game ids
        let p1 = grouped.broken_list.iter().find(|e| e.id == 1).unwrap();
        let mut game_ids: Vec<GameId> = p1.opponents.iter().map(|o| o.game_id).collect();
        game_ids.sort_unstable();
        assert_eq!(game_ids, vec![1, 4]);
    }

    #[test]
    fn test_partition_totality() {
        let rounds = [
            r#"{"matches": [{"black": 1, "white": 2}, {"black": 3, "white": 4}], "byes": []}"#,
            r#"{"matches": [{"black": 1, "white": 3}, {"black": 3, "white": 2},
                            {"black": 2, "white": 4}, {"black": 4, "white": 1}], "byes": []}"#,
            r#"{"matches": [{"black": 1, "white": 2}, {"black": 2, "white": 3},
                            {"black": 5, "white": 6}], "byes": [7]}"#,
        ];
        let ps = players(&[(1, 0.0, "a"), (2, 0.0, "b"), (3, 0.0, "c"), (4, 0.0, "d")]);

        for json in rounds {
            let round = parse_round(json).unwrap();
            let grouped = groupify(&round, &ps);
            for id in touched_ids(&round) {
                let in_groups = grouped
                    .groups
                    .iter()
                    .flat_map(|g| &g.players)
                    .filter(|e| e.id == id)
                    .count();
                let in_broken = grouped.broken_list.iter().filter(|e| e.id == id).count();
                assert_eq!(in_groups + in_broken, 1, "player {id} must appear exactly once");
            }
        }
    }

    #[test]
    fn test_missing_players_tolerated() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2}], "byes": [3]}"#,
        )
        .unwrap();
        let grouped = groupify(&round, &HashMap::new());

        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].players.len(), 2);
        assert!(grouped.groups[0].players.iter().all(|e| e.player.is_none()));
        assert_eq!(grouped.byes.len(), 1);
        assert!(grouped.byes[0].is_none());
    }

    #[test]
    fn test_members_sorted_within_group() {
        let round = parse_round(
            r#"{"matches": [{"black": 1, "white": 2}, {"black": 2, "white": 3}], "byes": []}"#,
        )
        .unwrap();
        let ps = players(&[(1, 1.0, "a"), (2, 3.0, "b"), (3, 2.0, "c")]);
        let grouped = groupify(&round, &ps);

        let order: Vec<PlayerId> = grouped.groups[0].players.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }
}
