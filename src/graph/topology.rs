//! Self-loop extraction and label ownership.

use log::{debug, warn};

use super::model::{Graph, Link, LinkId, LinkLabel, ResolvedGraph, Tag};
use super::wire::LabelWire;

fn own_labels(labels: Vec<LabelWire>, link: LinkId) -> Vec<LinkLabel> {
	labels
		.into_iter()
		.map(|l| LinkLabel {
			label: l.label,
			diff_type: l.diff_type,
			link,
		})
		.collect()
}

/// Split links into the layout edge set and self-loops, and attach every label to its link.
///
/// Every link lands in exactly one of `layout_links` and `self_links`, in wire order.
pub fn normalize(graph: ResolvedGraph) -> Graph {
	let mut links = Vec::with_capacity(graph.links.len());
	let mut layout_links = Vec::new();
	let mut self_links = Vec::new();

	for (i, raw) in graph.links.into_iter().enumerate() {
		let id = LinkId(i);
		let link = Link {
			id,
			source: raw.source,
			target: raw.target,
			tag: raw.tag,
			diff_type: raw.diff_type,
			forward_labels: own_labels(raw.forward_labels, id),
			backward_labels: own_labels(raw.backward_labels, id),
		};
		if link.is_self_loop() {
			if link.tag == Tag::Name {
				warn!("name link {id} binds node {} to itself", link.source);
			}
			self_links.push(id);
		} else {
			layout_links.push(id);
		}
		links.push(link);
	}

	debug!(
		"normalized {} links: {} for layout, {} self-loops",
		links.len(),
		layout_links.len(),
		self_links.len()
	);

	Graph {
		nodes: graph.nodes,
		links,
		layout_links,
		self_links,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::{DiffType, NodeId};
	use crate::graph::wire::{GraphWire, LinkWire, NodeWire};

	fn label(text: &str) -> LabelWire {
		LabelWire {
			label: text.into(),
			diff_type: DiffType::Unchanged,
		}
	}

	fn raw(source: usize, target: usize, tag: Tag) -> LinkWire {
		LinkWire {
			source,
			target,
			tag,
			diff_type: DiffType::Unchanged,
			forward_labels: vec![label("next")],
			backward_labels: vec![label("prev")],
		}
	}

	fn graph(links: Vec<LinkWire>) -> Graph {
		let nodes = (0..3)
			.map(|i| NodeWire {
				id: format!("ADDR{i}"),
				label: vec![format!("v: {i}")],
				tag: Tag::Value,
				diff_type: DiffType::Unchanged,
			})
			.collect();
		normalize(ResolvedGraph::from_wire(GraphWire { nodes, links }).unwrap())
	}

	#[test]
	fn partitions_without_loss_or_duplication() {
		let g = graph(vec![
			raw(0, 1, Tag::Value),
			raw(1, 1, Tag::Value),
			raw(1, 2, Tag::Value),
			raw(2, 2, Tag::Name),
			raw(2, 0, Tag::Name),
		]);
		assert!(g.layout_edges().all(|l| l.source != l.target));
		assert!(g.self_loops().all(|l| l.source == l.target));

		let mut union: Vec<LinkId> = g.layout_links.iter().chain(&g.self_links).copied().collect();
		union.sort();
		assert_eq!(union, (0..5).map(LinkId).collect::<Vec<_>>());
		assert_eq!(g.self_links, vec![LinkId(1), LinkId(3)]);
	}

	#[test]
	fn labels_point_back_to_owner() {
		let g = graph(vec![raw(0, 1, Tag::Value), raw(2, 0, Tag::Value)]);
		for link in &g.links {
			for l in link.forward_labels.iter().chain(&link.backward_labels) {
				assert_eq!(g.owner(l).id, link.id);
			}
		}
		assert_eq!(g[LinkId(1)].source, NodeId(2));
	}

	#[test]
	fn keeps_link_positions_stable() {
		let resolved = ResolvedGraph {
			nodes: vec![],
			links: vec![],
		};
		let g = normalize(resolved);
		assert!(g.links.is_empty() && g.layout_links.is_empty() && g.self_links.is_empty());

		let g = graph(vec![raw(2, 2, Tag::Value), raw(0, 2, Tag::Value)]);
		for (i, link) in g.links.iter().enumerate() {
			assert_eq!(link.id, LinkId(i));
		}
	}
}
