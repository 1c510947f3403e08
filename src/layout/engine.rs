//! Layout engine core: orchestrates the two passes over the bracket graph.

use std::collections::HashMap;

use crate::bracket::BracketGraph;
use crate::measure::BracketMetrics;
use crate::model::{Player, PlayerId};

use super::placement::place_nodes;
use super::routing::route_connectors;
use super::types::BracketLayout;
use super::visit::{assign_visit_order, sorted_draw_order};

/// Computes slot geometry and connector paths for a bracket graph.
///
/// Pure batch computation: any change to rounds or players rebuilds the
/// graph and re-runs both passes from scratch.
pub struct LayoutEngine {
    pub metrics: BracketMetrics,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            metrics: BracketMetrics::default(),
        }
    }
}

impl LayoutEngine {
    pub fn new(metrics: BracketMetrics) -> Self {
        Self { metrics }
    }

    pub fn layout(
        &self,
        graph: &BracketGraph,
        players: &HashMap<PlayerId, Player>,
    ) -> BracketLayout {
        // Pass 1: visit ordering
        let order = assign_visit_order(graph, players);
        let draw_order = sorted_draw_order(graph, &order);

        // Pass 2: coordinates, then connector paths over the placed slots
        let placement = place_nodes(graph, &draw_order, &self.metrics);
        let connectors = route_connectors(graph, &placement.slots, &self.metrics);

        if placement.not_laid_out > 0 {
            log::warn!("{} matches not laid out", placement.not_laid_out);
        }

        BracketLayout {
            slots: placement.slots,
            draw_order,
            connectors,
            extents: placement.extents,
            not_laid_out: placement.not_laid_out,
        }
    }
}
