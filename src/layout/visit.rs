//! Visit ordering: assigns the bottom-up draw sequence over bracket
//! back-references.

use std::collections::HashMap;

use crate::bracket::{BracketGraph, NodeId, NodeKind};
use crate::model::{Player, PlayerId};

struct Visitor<'a> {
    graph: &'a BracketGraph,
    order: Vec<Option<u32>>,
    next: u32,
}

impl Visitor<'_> {
    /// Post-order numbering with an explicit stack: every source is
    /// numbered before the node it feeds. When a main-bracket node is fed
    /// by one bracket of each kind, the main-bracket side is descended
    /// first so the winners' line draws as one run.
    fn visit(&mut self, start: NodeId) {
        if self.order[start].is_some() {
            return;
        }
        let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
        while let Some(frame) = stack.last_mut() {
            let (id, step) = *frame;
            let children = self.children(id);
            if step < children.len() {
                frame.1 += 1;
                let child = children[step];
                if self.order[child].is_none() {
                    stack.push((child, 0));
                }
            } else {
                self.next += 1;
                self.order[id] = Some(self.next);
                stack.pop();
            }
        }
    }

    /// Source traversal order for one node. Duplicates are harmless; the
    /// visited check skips them.
    fn children(&self, id: NodeId) -> Vec<NodeId> {
        let n = &self.graph.nodes[id];
        let mut out = Vec::with_capacity(5);
        if !n.second_bracket {
            if let (Some(black), Some(white)) = (n.black_src, n.white_src) {
                if self.graph.nodes[black].second_bracket {
                    out.push(white);
                }
                if self.graph.nodes[white].second_bracket {
                    out.push(black);
                }
            }
        }
        if let Some(src) = n.bye_src {
            out.push(src);
        }
        if let Some(src) = n.black_src {
            out.push(src);
        }
        if let Some(src) = n.white_src {
            out.push(src);
        }
        out
    }
}

/// True when both feeders of this node are second-bracket, i.e. the node
/// is the unifying final (or a bracket-reset match).
fn feeds_all_second_bracket(graph: &BracketGraph, id: NodeId) -> bool {
    let n = &graph.nodes[id];
    match (n.black_src, n.white_src) {
        (Some(black), Some(white)) => {
            graph.nodes[black].second_bracket && graph.nodes[white].second_bracket
        }
        _ => false,
    }
}

/// Priming rank for final-bucket ordering: byes count their player's
/// ranking twice, matches sum both participants, anything unresolvable
/// sinks to the end.
fn ranking_sum(graph: &BracketGraph, id: NodeId, players: &HashMap<PlayerId, Player>) -> f64 {
    match &graph.nodes[id].kind {
        NodeKind::Bye(player) => players
            .get(player)
            .map(|p| p.ranking * 2.0)
            .unwrap_or(-1000.0),
        NodeKind::Match(m) => match (players.get(&m.black), players.get(&m.white)) {
            (Some(black), Some(white)) => black.ranking + white.ranking,
            _ => -1000.0,
        },
    }
}

/// Assign every node a visit order.
///
/// Visits, in order: the latest main-bracket round that does not feed an
/// all-second-bracket match (so a main bracket finishing early still draws
/// before the second bracket catches up), then everything reachable from
/// the final round's bucket (highest combined ranking first), then any
/// stragglers in arena order.
pub fn assign_visit_order(
    graph: &BracketGraph,
    players: &HashMap<PlayerId, Player>,
) -> Vec<u32> {
    let mut visitor = Visitor {
        graph,
        order: vec![None; graph.nodes.len()],
        next: 0,
    };

    let mut max_main_round = 0;
    for (id, node) in graph.nodes.iter().enumerate() {
        if !node.second_bracket && !feeds_all_second_bracket(graph, id) {
            max_main_round = max_main_round.max(node.round);
        }
    }
    for id in 0..graph.nodes.len() {
        let node = &graph.nodes[id];
        if !node.second_bracket
            && node.round == max_main_round
            && !feeds_all_second_bracket(graph, id)
        {
            visitor.visit(id);
        }
    }

    let mut finals: Vec<NodeId> = graph.final_bucket.values().copied().collect();
    finals.sort_by(|&a, &b| {
        let second = graph.nodes[a]
            .second_bracket
            .cmp(&graph.nodes[b].second_bracket);
        second.then_with(|| {
            ranking_sum(graph, b, players).total_cmp(&ranking_sum(graph, a, players))
        })
    });
    for id in finals {
        visitor.visit(id);
    }

    for id in 0..graph.nodes.len() {
        visitor.visit(id);
    }

    // The straggler sweep above visited every node.
    visitor
        .order
        .into_iter()
        .map(|o| o.unwrap_or(u32::MAX))
        .collect()
}

/// Draw sequence: main bracket before second bracket, earlier rounds
/// first, then visit order.
pub fn sorted_draw_order(graph: &BracketGraph, order: &[u32]) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = (0..graph.nodes.len()).collect();
    ids.sort_by(|&a, &b| {
        let na = &graph.nodes[a];
        let nb = &graph.nodes[b];
        na.second_bracket
            .cmp(&nb.second_bracket)
            .then(na.round.cmp(&nb.round))
            .then(order[a].cmp(&order[b]))
    });
    ids
}
