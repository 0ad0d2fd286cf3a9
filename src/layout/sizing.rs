//! Node sizes and link lengths derived from rendered label text.
//!
//! Both quantities must be final before the engine starts: it uses node sizes for
//! overlap avoidance and link lengths as spring targets. Nothing here estimates a
//! size when measurement fails; the error propagates and the load is abandoned.

use log::debug;

use super::geometry::Point;
use crate::Result;
use crate::config::GeometryConfig;
use crate::graph::{Graph, Link, LinkId, LinkLabel, Node, NodeId, Tag};

/// Tight bounding box of a rendered block of text lines.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBox {
	/// Width of the widest line.
	pub width: f64,
	/// Height of the stacked block.
	pub height: f64,
}

/// Rendering-surface text metrics.
pub trait TextMeasure {
	/// Render `lines` stacked and return their bounding box.
	fn measure(&self, lines: &[&str]) -> Result<TextBox>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
	fn measure(&self, lines: &[&str]) -> Result<TextBox> {
		(**self).measure(lines)
	}
}

/// Vertical shift that puts the first label line, not the block centroid, near the anchor.
pub fn center_correction(lines: usize, block_height: f64) -> f64 {
	let n = lines.max(1) as f64;
	(3.0 - 2.0 * n) * block_height / (4.0 * n)
}

/// Radius of the circle circumscribing a `width`×`height` box.
pub fn circumradius(width: f64, height: f64) -> f64 {
	(width / 2.0).hypot(height / 2.0)
}

/// A node with its final size.
#[derive(Clone, Debug, PartialEq)]
pub struct SizedNode {
	/// Position in the graph.
	pub id: NodeId,
	/// The node itself.
	pub node: Node,
	/// Constraint-box width.
	pub width: f64,
	/// Constraint-box height.
	pub height: f64,
	/// Measured label block.
	pub text: TextBox,
	/// Offset from the box centre to the first line's left baseline point.
	pub label_offset: Point,
}

impl SizedNode {
	/// Circumscribing radius of the constraint box.
	pub fn radius(&self) -> f64 {
		circumradius(self.width, self.height)
	}
}

/// A layout link with its minimum length.
#[derive(Clone, Debug, PartialEq)]
pub struct SizedLink {
	/// Position in the graph's link list.
	pub id: LinkId,
	/// Source node.
	pub source: NodeId,
	/// Target node.
	pub target: NodeId,
	/// Distance the engine should keep between the endpoints' centres.
	pub length: f64,
	/// Measured forward label block, if any.
	pub forward_text: Option<TextBox>,
	/// Measured backward label block, if any.
	pub backward_text: Option<TextBox>,
}

/// A graph whose geometry inputs are fixed.
#[derive(Clone, Debug, PartialEq)]
pub struct SizedGraph {
	/// Sized nodes, at their [`NodeId`] positions.
	pub nodes: Vec<SizedNode>,
	/// Every link, at its [`LinkId`] position.
	pub links: Vec<Link>,
	/// The layout edge set with lengths.
	pub layout_links: Vec<SizedLink>,
	/// Self-loops, excluded from layout.
	pub self_links: Vec<LinkId>,
}

impl SizedGraph {
	/// Link by id.
	pub fn link(&self, id: LinkId) -> &Link {
		&self.links[id.0]
	}
}

/// Measure a node's label and derive its box size and text anchor.
pub fn size_node(
	id: NodeId,
	node: Node,
	measure: &impl TextMeasure,
	config: &GeometryConfig,
) -> Result<SizedNode> {
	let lines: Vec<&str> = if node.label.is_empty() {
		vec![""]
	} else {
		node.label.iter().map(String::as_str).collect()
	};
	let text = measure.measure(&lines)?;
	let extra = 2.0 * config.node_margin + 2.0 * config.node_pad;
	let label_offset = Point::new(
		-text.width / 2.0,
		center_correction(node.line_count(), text.height),
	);
	Ok(SizedNode {
		id,
		width: text.width + extra,
		height: text.height + extra,
		text,
		label_offset,
		node,
	})
}

fn measure_labels(labels: &[LinkLabel], measure: &impl TextMeasure) -> Result<Option<TextBox>> {
	if labels.is_empty() {
		return Ok(None);
	}
	let lines: Vec<&str> = labels.iter().map(|l| l.label.as_str()).collect();
	measure.measure(&lines).map(Some)
}

/// Minimum length of a layout link given its sized endpoints.
pub fn size_link(
	link: &Link,
	nodes: &[SizedNode],
	measure: &impl TextMeasure,
	config: &GeometryConfig,
) -> Result<SizedLink> {
	let reach =
		nodes[link.source.0].radius() + nodes[link.target.0].radius() + config.link_pad;
	let (length, forward_text, backward_text) = match link.tag {
		Tag::Name => (reach, None, None),
		Tag::Value => {
			let forward = measure_labels(&link.forward_labels, measure)?;
			let backward = measure_labels(&link.backward_labels, measure)?;
			let mut length = forward.map_or(0.0, |t| t.width) + reach;
			if let Some(back) = backward {
				length = length.max(back.width + reach);
			}
			(length, forward, backward)
		}
	};
	Ok(SizedLink {
		id: link.id,
		source: link.source,
		target: link.target,
		length,
		forward_text,
		backward_text,
	})
}

/// Size every node, then every layout link.
pub fn resolve(graph: Graph, measure: &impl TextMeasure, config: &GeometryConfig) -> Result<SizedGraph> {
	let nodes = graph
		.nodes
		.into_iter()
		.enumerate()
		.map(|(i, node)| size_node(NodeId(i), node, measure, config))
		.collect::<Result<Vec<_>>>()?;

	let layout_links = graph
		.layout_links
		.iter()
		.map(|id| size_link(&graph.links[id.0], &nodes, measure, config))
		.collect::<Result<Vec<_>>>()?;

	debug!(
		"sized {} nodes and {} layout links",
		nodes.len(),
		layout_links.len()
	);

	Ok(SizedGraph {
		nodes,
		links: graph.links,
		layout_links,
		self_links: graph.self_links,
	})
}
