//! Data structures for bracket layout computation.

use serde::Serialize;

use crate::bracket::NodeId;

/// A positioned bracket slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Slot {
    pub fn mid_y(&self) -> f64 {
        ((self.top + self.bottom) / 2.0).round()
    }
}

/// A connector polyline from a feeding node to the slot it feeds.
#[derive(Debug, Clone, Serialize)]
pub struct Connector {
    pub from: NodeId,
    pub to: NodeId,
    pub points: Vec<(f64, f64)>,
}

/// Canvas size needed to draw every slot and connector.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Extents {
    pub width: f64,
    pub height: f64,
}

/// The complete layout result, indexed by `NodeId`.
#[derive(Debug, Clone, Serialize)]
pub struct BracketLayout {
    /// Geometry per node. `None` for nodes that never received
    /// coordinates; rendering proceeds with whatever did lay out.
    pub slots: Vec<Option<Slot>>,
    /// Node draw sequence: main bracket before second bracket, earlier
    /// rounds first, then visit order.
    pub draw_order: Vec<NodeId>,
    pub connectors: Vec<Connector>,
    pub extents: Extents,
    pub not_laid_out: usize,
}

impl BracketLayout {
    pub fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }
}
