//! Resolved graph entities.
//!
//! The wire format ships node positions instead of references. [`ResolvedGraph::from_wire`]
//! checks every position once and turns it into a [`NodeId`]; from then on indexing
//! `nodes[id]` cannot fail. Labels point back at their owning link through a [`LinkId`]
//! rather than a reference, so the link stays the sole owner.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::wire::{GraphWire, LabelWire};
use crate::{Result, ViewerError};

/// What an entity stands for in the visualized program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
	/// A variable binding.
	Name,
	/// A runtime object, or a reference between two objects.
	Value,
}

/// Classification of an entity against a baseline snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffType {
	/// Present in both snapshots.
	#[default]
	#[serde(rename = "")]
	Unchanged,
	/// Only in the baseline.
	#[serde(rename = "old")]
	Removed,
	/// Only in the compared snapshot.
	#[serde(rename = "new")]
	Added,
}

/// Position of a node in [`Graph::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Position of a link in [`Graph::links`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "n{}", self.0)
	}
}

impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "l{}", self.0)
	}
}

/// A name or value box.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Server-side identity.
	pub id: String,
	/// Label lines.
	pub label: Vec<String>,
	/// Name or value.
	pub tag: Tag,
	/// Diff classification.
	pub diff_type: DiffType,
}

impl Node {
	/// Number of lines the label occupies. An empty label still takes one line.
	pub fn line_count(&self) -> usize {
		self.label.len().max(1)
	}
}

/// A field name on a link, with a key back to the link that owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkLabel {
	/// Field text.
	pub label: String,
	/// Diff classification of the label alone.
	pub diff_type: DiffType,
	/// Owning link.
	pub link: LinkId,
}

/// A link with node references resolved and label back-references attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Own position in [`Graph::links`].
	pub id: LinkId,
	/// Source node.
	pub source: NodeId,
	/// Target node.
	pub target: NodeId,
	/// Name binding or value reference.
	pub tag: Tag,
	/// Diff classification of the link itself.
	pub diff_type: DiffType,
	/// Labels read source→target.
	pub forward_labels: Vec<LinkLabel>,
	/// Labels read target→source.
	pub backward_labels: Vec<LinkLabel>,
}

impl Link {
	/// Source and target are the same node.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}

	/// Information flows both ways along this link.
	pub fn is_bidirectional(&self) -> bool {
		!self.backward_labels.is_empty()
	}
}

/// A link after index resolution, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLink {
	/// Source node.
	pub source: NodeId,
	/// Target node.
	pub target: NodeId,
	/// Name binding or value reference.
	pub tag: Tag,
	/// Diff classification.
	pub diff_type: DiffType,
	/// Raw forward labels.
	pub forward_labels: Vec<LabelWire>,
	/// Raw backward labels.
	pub backward_labels: Vec<LabelWire>,
}

/// Output of index resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedGraph {
	/// Nodes in wire order.
	pub nodes: Vec<Node>,
	/// Links in wire order.
	pub links: Vec<ResolvedLink>,
}

impl ResolvedGraph {
	/// Resolve every link endpoint, rejecting the whole graph on the first bad index.
	pub fn from_wire(wire: GraphWire) -> Result<Self> {
		let len = wire.nodes.len();
		let check = |link: usize, index: usize| {
			if index < len {
				Ok(NodeId(index))
			} else {
				Err(ViewerError::NodeIndexOutOfBounds { link, index, len })
			}
		};

		let links = wire
			.links
			.into_iter()
			.enumerate()
			.map(|(i, link)| {
				Ok(ResolvedLink {
					source: check(i, link.source)?,
					target: check(i, link.target)?,
					tag: link.tag,
					diff_type: link.diff_type,
					forward_labels: link.forward_labels,
					backward_labels: link.backward_labels,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		let nodes = wire
			.nodes
			.into_iter()
			.map(|node| Node {
				id: node.id,
				label: node.label,
				tag: node.tag,
				diff_type: node.diff_type,
			})
			.collect();

		Ok(Self { nodes, links })
	}
}

/// A normalized graph, ready for sizing and layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
	/// All nodes.
	pub nodes: Vec<Node>,
	/// All links, each at the position named by its [`LinkId`].
	pub links: Vec<Link>,
	/// Links handed to the layout engine, all with distinct endpoints.
	pub layout_links: Vec<LinkId>,
	/// Links whose source equals their target; drawn, never laid out.
	pub self_links: Vec<LinkId>,
}

impl Graph {
	/// The link a label belongs to.
	pub fn owner(&self, label: &LinkLabel) -> &Link {
		&self.links[label.link.0]
	}

	/// Iterate the layout edge set.
	pub fn layout_edges(&self) -> impl Iterator<Item = &Link> + '_ {
		self.layout_links.iter().map(|id| &self.links[id.0])
	}

	/// Iterate the self-loops.
	pub fn self_loops(&self) -> impl Iterator<Item = &Link> + '_ {
		self.self_links.iter().map(|id| &self.links[id.0])
	}
}

impl Index<NodeId> for Graph {
	type Output = Node;

	fn index(&self, id: NodeId) -> &Node {
		&self.nodes[id.0]
	}
}

impl Index<LinkId> for Graph {
	type Output = Link;

	fn index(&self, id: LinkId) -> &Link {
		&self.links[id.0]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::wire::{LinkWire, NodeWire};

	fn node(id: &str) -> NodeWire {
		NodeWire {
			id: id.into(),
			label: vec![id.into()],
			tag: Tag::Value,
			diff_type: DiffType::Unchanged,
		}
	}

	fn link(source: usize, target: usize) -> LinkWire {
		LinkWire {
			source,
			target,
			tag: Tag::Value,
			diff_type: DiffType::Unchanged,
			forward_labels: vec![],
			backward_labels: vec![],
		}
	}

	#[test]
	fn resolves_indices_to_node_ids() {
		let wire = GraphWire {
			nodes: vec![node("a"), node("b")],
			links: vec![link(0, 1), link(1, 0)],
		};
		let graph = ResolvedGraph::from_wire(wire).unwrap();
		assert_eq!(graph.links[0].source, NodeId(0));
		assert_eq!(graph.links[0].target, NodeId(1));
		assert_eq!(graph.nodes[graph.links[1].source.0].id, "b");
	}

	#[test]
	fn rejects_out_of_bounds_target() {
		let wire = GraphWire {
			nodes: vec![node("a")],
			links: vec![link(0, 0), link(0, 3)],
		};
		match ResolvedGraph::from_wire(wire) {
			Err(ViewerError::NodeIndexOutOfBounds { link, index, len }) => {
				assert_eq!((link, index, len), (1, 3, 1));
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn diff_type_uses_wire_spelling() {
		let parsed: Vec<DiffType> = serde_json::from_str(r#"["", "old", "new"]"#).unwrap();
		assert_eq!(parsed, vec![DiffType::Unchanged, DiffType::Removed, DiffType::Added]);
		assert!(serde_json::from_str::<DiffType>(r#""changed""#).is_err());
	}

	#[test]
	fn empty_label_counts_as_one_line() {
		let node = Node {
			id: "x".into(),
			label: vec![],
			tag: Tag::Value,
			diff_type: DiffType::Unchanged,
		};
		assert_eq!(node.line_count(), 1);
	}
}
