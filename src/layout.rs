//! Bracket layout: visit ordering, coordinate assignment and connector
//! routing for elimination trees.

pub mod engine;
pub mod placement;
pub mod routing;
pub mod types;
pub mod visit;

pub use engine::LayoutEngine;
pub use types::{BracketLayout, Connector, Extents, Slot};
