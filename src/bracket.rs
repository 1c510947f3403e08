//! Bracket graph builder: the match dependency DAG for elimination and
//! double-elimination tournaments.
//!
//! Nodes live in an arena indexed by `NodeId`; back-references are stored
//! as indices, never owning edges, so acyclicity (`src.round < node.round`)
//! is directly checkable. The graph is rebuilt from scratch on every data
//! reload.

use std::collections::BTreeMap;

use crate::model::{Match, PlayerId, Round};

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub enum NodeKind {
    Match(Match),
    Bye(PlayerId),
}

#[derive(Debug, Clone)]
pub struct BracketNode {
    pub round: usize,
    pub kind: NodeKind,
    /// Node that produced the black participant in an earlier round.
    pub black_src: Option<NodeId>,
    /// Node that produced the white participant in an earlier round.
    pub white_src: Option<NodeId>,
    /// Source node for a bye advancement. On match nodes this aliases
    /// whichever of `black_src`/`white_src` is itself a bye node.
    pub bye_src: Option<NodeId>,
    /// Reciprocal forward reference, set when a later node wires us as src.
    pub parent: Option<NodeId>,
    pub second_bracket: bool,
}

impl BracketNode {
    /// True if black took this match. Byes count as a black win so a bye's
    /// connector exits at mid-height.
    pub fn black_won(&self) -> bool {
        match &self.kind {
            NodeKind::Bye(_) => true,
            NodeKind::Match(m) => m.result_prefix() == Some('B'),
        }
    }

    /// Did `player_id` advance out of this node? Byes trivially advance;
    /// unresolved matches advance nobody.
    pub fn player_won(&self, player_id: PlayerId) -> bool {
        match &self.kind {
            NodeKind::Bye(_) => true,
            NodeKind::Match(m) => match m.result_prefix() {
                Some('B') => m.black == player_id,
                Some('W') => m.white == player_id,
                _ => false,
            },
        }
    }

    /// The participant this node feeds forward through `bye_src`.
    fn bye_player(&self) -> Option<PlayerId> {
        match &self.kind {
            NodeKind::Bye(player) => Some(*player),
            NodeKind::Match(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BracketGraph {
    pub nodes: Vec<BracketNode>,
    /// Player id -> the node each player last appeared in (final round's
    /// bucket). The layout engine seeds its sweep from these.
    pub final_bucket: BTreeMap<PlayerId, NodeId>,
    pub rounds: usize,
}

impl BracketGraph {
    pub fn build(rounds: &[Round]) -> Self {
        let mut nodes: Vec<BracketNode> = Vec::new();
        let mut last_bucket: BTreeMap<PlayerId, NodeId> = BTreeMap::new();
        let mut final_bucket: BTreeMap<PlayerId, NodeId> = BTreeMap::new();

        for (round_num, round) in rounds.iter().enumerate() {
            let mut cur_bucket: BTreeMap<PlayerId, NodeId> = BTreeMap::new();

            for m in &round.matches {
                let id = nodes.len();
                let black_src = if round_num > 0 {
                    last_bucket.get(&m.black).copied()
                } else {
                    None
                };
                let white_src = if round_num > 0 {
                    last_bucket.get(&m.white).copied()
                } else {
                    None
                };
                // A participant advancing out of a bye node is tracked
                // through bye_src as well, so bye lineage stays visible on
                // the match it feeds.
                let bye_src = [black_src, white_src]
                    .into_iter()
                    .flatten()
                    .find(|&src| matches!(nodes[src].kind, NodeKind::Bye(_)));

                nodes.push(BracketNode {
                    round: round_num,
                    kind: NodeKind::Match(m.clone()),
                    black_src,
                    white_src,
                    bye_src,
                    parent: None,
                    second_bracket: false,
                });
                if let Some(src) = black_src {
                    nodes[src].parent = Some(id);
                }
                if let Some(src) = white_src {
                    nodes[src].parent = Some(id);
                }

                cur_bucket.insert(m.black, id);
                cur_bucket.insert(m.white, id);
            }

            for &bye in &round.byes {
                let id = nodes.len();
                let bye_src = if round_num > 0 {
                    last_bucket.get(&bye).copied()
                } else {
                    None
                };
                nodes.push(BracketNode {
                    round: round_num,
                    kind: NodeKind::Bye(bye),
                    black_src: None,
                    white_src: None,
                    bye_src,
                    parent: None,
                    second_bracket: false,
                });
                if let Some(src) = bye_src {
                    nodes[src].parent = Some(id);
                }
                cur_bucket.insert(bye, id);
            }

            // Players skipping a round keep their old node in the bucket.
            last_bucket.extend(cur_bucket.iter().map(|(&k, &v)| (k, v)));
            final_bucket = cur_bucket;
        }

        let mut graph = Self {
            nodes,
            final_bucket,
            rounds: rounds.len(),
        };
        graph.classify_second_bracket();
        graph
    }

    /// Propagate the loser-bracket flag forward through the graph.
    ///
    /// A node continues the second bracket when its bye lineage says so, or
    /// when the winner it received was already in the second bracket, or
    /// when neither feeding match has resolved. The terminal match (last
    /// round, two or fewer contestants left) is always main bracket since
    /// it unifies the two.
    fn classify_second_bracket(&mut self) {
        let final_contestants = self.final_bucket.len();

        for i in 0..self.nodes.len() {
            if self.nodes[i].round == 0 {
                continue;
            }

            let mut second = self.nodes[i].second_bracket;

            if let Some(src) = self.nodes[i].bye_src {
                let advanced = match self.nodes[i].bye_player() {
                    Some(player) => self.nodes[src].player_won(player),
                    // Match node aliasing a bye source: byes always advance.
                    None => true,
                };
                second = self.nodes[src].second_bracket || !advanced;
            }

            if let (Some(bs), Some(ws)) = (self.nodes[i].black_src, self.nodes[i].white_src) {
                if let NodeKind::Match(m) = &self.nodes[i].kind {
                    if self.nodes[bs].player_won(m.black) {
                        second = self.nodes[bs].second_bracket;
                    } else if self.nodes[ws].player_won(m.white) {
                        second = self.nodes[ws].second_bracket;
                    } else {
                        second = true;
                    }
                }
            }

            if self.nodes[i].round == self.rounds - 1 && final_contestants <= 2 {
                second = false;
            }

            self.nodes[i].second_bracket = second;
        }
    }

    /// Back-reference sources of a node in `(bye, black, white)` order.
    pub fn sources(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let n = &self.nodes[id];
        [n.bye_src, n.black_src, n.white_src].into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_rounds;

    #[test]
    fn test_single_match_round_zero() {
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"}], "byes": []}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        assert_eq!(graph.nodes.len(), 1);
        let n = &graph.nodes[0];
        assert_eq!(n.round, 0);
        assert!(!n.second_bracket);
        assert!(n.black_src.is_none());
        assert!(n.white_src.is_none());
        assert!(n.black_won());
        assert_eq!(graph.final_bucket.len(), 2);
    }

    #[test]
    fn test_advancement_chain_wiring() {
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"}], "byes": []},
                {"matches": [{"black": 1, "white": 3, "result": "W+2.5"}], "byes": []}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        assert_eq!(graph.nodes.len(), 2);
        let round1 = &graph.nodes[1];
        assert_eq!(round1.black_src, Some(0));
        assert!(round1.white_src.is_none());
        assert_eq!(graph.nodes[0].parent, Some(1));
    }

    #[test]
    fn test_bye_propagation() {
        let rounds = parse_rounds(
            r#"[{"matches": [], "byes": [5]},
                {"matches": [{"black": 5, "white": 6}], "byes": []}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        assert!(matches!(graph.nodes[0].kind, NodeKind::Bye(5)));
        let round1 = &graph.nodes[1];
        assert_eq!(round1.bye_src, Some(0));
        assert_eq!(round1.black_src, Some(0));
        assert_eq!(graph.nodes[0].parent, Some(1));
    }

    #[test]
    fn test_back_references_acyclic() {
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"},
                             {"black": 3, "white": 4, "result": "W+R"}], "byes": []},
                {"matches": [{"black": 1, "white": 4, "result": "B+R"}], "byes": [2, 3]},
                {"matches": [{"black": 2, "white": 3, "result": "B+R"}], "byes": [1]}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        for (id, node) in graph.nodes.iter().enumerate() {
            for src in graph.sources(id) {
                assert!(graph.nodes[src].round < node.round);
            }
            // following sources terminates at round 0 within `round` steps
            let mut frontier = vec![id];
            for _ in 0..node.round {
                frontier = frontier
                    .into_iter()
                    .flat_map(|n| graph.sources(n))
                    .collect();
            }
            assert!(frontier.iter().all(|&n| graph.nodes[n].round == 0));
        }
    }

    #[test]
    fn test_player_won() {
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"},
                             {"black": 3, "white": 4}], "byes": [5]}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        assert!(graph.nodes[0].player_won(1));
        assert!(!graph.nodes[0].player_won(2));
        assert!(!graph.nodes[1].player_won(3)); // unresolved
        assert!(graph.nodes[2].player_won(5)); // bye
    }

    #[test]
    fn test_double_elimination_loser_bracket_flag() {
        // 1 beats 2, 3 beats 4; winners meet while losers meet in the
        // second bracket; then the surviving pair plays the final.
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"},
                             {"black": 3, "white": 4, "result": "B+R"}], "byes": []},
                {"matches": [{"black": 1, "white": 3, "result": "B+R"},
                             {"black": 2, "white": 4, "result": "B+R"}], "byes": []},
                {"matches": [{"black": 3, "white": 2, "result": "W+R"}], "byes": [1]},
                {"matches": [{"black": 1, "white": 2, "result": "B+R"}], "byes": []}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);

        // round 1: winners match stays main, losers match is second bracket
        assert!(!graph.nodes[2].second_bracket);
        assert!(graph.nodes[3].second_bracket);
        // round 2: loser of winners final vs winner of losers -> second
        assert!(graph.nodes[4].second_bracket);
        // player 1's waiting bye stays main bracket
        assert!(!graph.nodes[5].second_bracket);
        // the final is always main bracket
        assert!(!graph.nodes[6].second_bracket);
    }

    #[test]
    fn test_single_elimination_all_main_bracket() {
        let rounds = parse_rounds(
            r#"[{"matches": [{"black": 1, "white": 2, "result": "B+R"},
                             {"black": 3, "white": 4, "result": "W+R"}], "byes": []},
                {"matches": [{"black": 1, "white": 4, "result": "B+R"}], "byes": []}]"#,
        )
        .unwrap();
        let graph = BracketGraph::build(&rounds);
        assert!(graph.nodes.iter().all(|n| !n.second_bracket));
    }
}
