//! Coordinate assignment: sweep the draw order, handing out rows from
//! per-round vertical cursors.

use crate::bracket::{BracketGraph, NodeId, NodeKind};
use crate::measure::BracketMetrics;

use super::types::{Extents, Slot};

/// Result of the placement sweep.
pub struct Placement {
    pub slots: Vec<Option<Slot>>,
    pub extents: Extents,
    pub not_laid_out: usize,
}

pub fn place_nodes(
    graph: &BracketGraph,
    draw_order: &[NodeId],
    metrics: &BracketMetrics,
) -> Placement {
    let h = metrics.slot_height();
    let row_height = metrics.row_height();
    let col = metrics.column_width();

    let mut y: Vec<f64> = vec![0.0; graph.rounds.max(1)];
    let mut base_y: f64 = 0.0;
    let mut slots: Vec<Option<Slot>> = vec![None; graph.nodes.len()];
    let mut extents = Extents::default();

    for (idx, &id) in draw_order.iter().enumerate() {
        let node = &graph.nodes[id];

        // Once the sweep leaves round 0, every later round's cursor starts
        // below the full first-round column plus the bracket gap.
        if node.round == 0
            && draw_order
                .get(idx + 1)
                .is_some_and(|&next| graph.nodes[next].round == 1)
        {
            for cursor in y.iter_mut().skip(1) {
                *cursor = base_y + metrics.bracket_spacing;
            }
        }

        let top = match inherited_top(graph, id, &slots) {
            Some(top) => top,
            None => {
                let top = y[node.round];
                y[node.round] += h;
                top
            }
        };

        let left = col * node.round as f64;
        let slot = Slot {
            top,
            left,
            right: left + metrics.name_width,
            bottom: top + row_height,
        };
        extents.width = extents.width.max(slot.right);
        extents.height = extents.height.max(slot.bottom + 10.0);
        if node.round == 0 {
            base_y = base_y.max(slot.bottom + h + 10.0);
        }
        slots[id] = Some(slot);
    }

    let not_laid_out = slots.iter().filter(|s| s.is_none()).count();

    Placement {
        slots,
        extents,
        not_laid_out,
    }
}

/// Vertical position inherited from same-bracket sources: byes and simple
/// advancements flow straight through, a match fed by both its feeder
/// matches centers between them. Mismatched bracket feeds get a fresh row.
fn inherited_top(graph: &BracketGraph, id: NodeId, slots: &[Option<Slot>]) -> Option<f64> {
    let node = &graph.nodes[id];
    let same_bracket_top = |src: Option<NodeId>| -> Option<f64> {
        let src = src?;
        if graph.nodes[src].second_bracket != node.second_bracket {
            return None;
        }
        slots[src].map(|s| s.top)
    };

    match &node.kind {
        NodeKind::Bye(_) => same_bracket_top(node.bye_src),
        NodeKind::Match(_) => {
            match (
                same_bracket_top(node.black_src),
                same_bracket_top(node.white_src),
            ) {
                (Some(a), Some(b)) => Some((a + b) / 2.0),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            }
        }
    }
}
