//! Graph model, topology normalization and diff encoding.

pub mod diff;
pub mod model;
pub mod topology;
pub mod wire;

pub use diff::{DiffColor, Diffed};
pub use model::{DiffType, Graph, Link, LinkId, LinkLabel, Node, NodeId, ResolvedGraph, Tag};
pub use wire::{ClientMessage, GraphWire, HistoryItem, HistoryLabel, ServerMessage};

/// Resolve indices and normalize topology in one step.
pub fn load(wire: GraphWire) -> crate::Result<Graph> {
	Ok(topology::normalize(ResolvedGraph::from_wire(wire)?))
}
