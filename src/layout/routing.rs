//! Connector routing: polyline paths from each feeding node into the slot
//! it feeds, walked back from the final round so the whole tree connects.

use crate::bracket::{BracketGraph, NodeId, NodeKind};
use crate::measure::BracketMetrics;

use super::types::{Connector, Slot};

pub fn route_connectors(
    graph: &BracketGraph,
    slots: &[Option<Slot>],
    metrics: &BracketMetrics,
) -> Vec<Connector> {
    let mut connectors = Vec::new();
    let mut visited = vec![false; graph.nodes.len()];

    // Both finalists key the same node in the bucket; the visited set
    // dedupes the shared subtree.
    for &root in graph.final_bucket.values() {
        for id in post_order(graph, root, &mut visited) {
            emit_node_connectors(graph, slots, metrics, id, &mut connectors);
        }
    }

    connectors
}

/// Nodes reachable from `root` through back-references, sources before the
/// nodes they feed, skipping anything already visited.
fn post_order(graph: &BracketGraph, root: NodeId, visited: &mut [bool]) -> Vec<NodeId> {
    let mut out = Vec::new();
    if visited[root] {
        return out;
    }
    let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            out.push(id);
            continue;
        }
        if visited[id] {
            continue;
        }
        visited[id] = true;
        stack.push((id, true));
        for src in graph.sources(id) {
            if !visited[src] {
                stack.push((src, false));
            }
        }
    }
    out
}

fn emit_node_connectors(
    graph: &BracketGraph,
    slots: &[Option<Slot>],
    metrics: &BracketMetrics,
    id: NodeId,
    connectors: &mut Vec<Connector>,
) {
    let node = &graph.nodes[id];
    let Some(dst) = slots.get(id).copied().flatten() else {
        return;
    };

    // A second-bracket node only connects to second-bracket feeders; its
    // main-bracket lineage is drawn on the main side.
    let connects = |src: NodeId| !node.second_bracket || graph.nodes[src].second_bracket;

    match &node.kind {
        NodeKind::Match(_) => {
            if let Some(src) = node.black_src.filter(|&s| connects(s)) {
                if let Some(points) = match_feed_points(graph, slots, metrics, src, &dst, node.black_won(), true) {
                    connectors.push(Connector { from: src, to: id, points });
                }
            }
            if let Some(src) = node.white_src.filter(|&s| connects(s)) {
                if let Some(points) = match_feed_points(graph, slots, metrics, src, &dst, node.black_won(), false) {
                    connectors.push(Connector { from: src, to: id, points });
                }
            }
        }
        NodeKind::Bye(_) => {
            if let Some(src) = node.bye_src.filter(|&s| connects(s)) {
                if let Some(src_slot) = slots.get(src).copied().flatten() {
                    let exit_y = winner_exit_y(&src_slot, graph.nodes[src].black_won(), metrics);
                    connectors.push(Connector {
                        from: src,
                        to: id,
                        points: vec![
                            (src_slot.left, exit_y),
                            (src_slot.right, exit_y),
                            (dst.left, dst.mid_y()),
                        ],
                    });
                }
            }
        }
    }
}

/// Four-point path from a feeder into a match slot. Winners land at the
/// slot's mid-height, losers land offset toward the slot they fill.
fn match_feed_points(
    graph: &BracketGraph,
    slots: &[Option<Slot>],
    metrics: &BracketMetrics,
    src: NodeId,
    dst: &Slot,
    black_won: bool,
    feeds_black: bool,
) -> Option<Vec<(f64, f64)>> {
    let src_slot = slots.get(src).copied().flatten()?;
    let exit_y = winner_exit_y(&src_slot, graph.nodes[src].black_won(), metrics);

    let land_y = if feeds_black {
        if black_won {
            dst.mid_y()
        } else {
            (dst.top + metrics.em_6()).round()
        }
    } else if black_won {
        (dst.bottom - metrics.em_4()).round()
    } else {
        (dst.bottom + metrics.bottom_padding).round()
    };

    Some(vec![
        (src_slot.left, exit_y),
        (src_slot.right, exit_y),
        (dst.left - metrics.left_padding, land_y),
        (dst.left, land_y),
    ])
}

/// Where a connector exits its source slot: the winner's vertical
/// mid-point, or just under the slot when black lost (white's row).
fn winner_exit_y(slot: &Slot, black_won: bool, metrics: &BracketMetrics) -> f64 {
    if black_won {
        slot.mid_y()
    } else {
        (slot.bottom + metrics.bottom_padding).round()
    }
}
