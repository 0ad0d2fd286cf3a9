#![allow(dead_code)]

use std::cell::Cell;

use memgraph_viewer::Result;
use memgraph_viewer::graph::wire::{GraphWire, LabelWire, LinkWire, NodeWire};
use memgraph_viewer::graph::{DiffType, Tag};
use memgraph_viewer::layout::engine::{EngineLink, EngineNode, EngineOptions, EngineStep};
use memgraph_viewer::layout::{LayoutEngine, Point, Rect, Route, TextBox, TextMeasure, route_between};

pub const GLYPH_WIDTH: f64 = 7.0;
pub const LINE_HEIGHT: f64 = 14.0;

/// Every glyph is [`GLYPH_WIDTH`] wide, every line [`LINE_HEIGHT`] tall.
pub struct Monospace;

impl TextMeasure for Monospace {
	fn measure(&self, lines: &[&str]) -> Result<TextBox> {
		let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
		Ok(TextBox {
			width: widest as f64 * GLYPH_WIDTH,
			height: lines.len() as f64 * LINE_HEIGHT,
		})
	}
}

/// Lays nodes out on a row 200px apart and counts route-helper calls.
#[derive(Default)]
pub struct RowEngine {
	sizes: Vec<EngineNode>,
	running: bool,
	pub routes: Cell<u32>,
}

impl LayoutEngine for RowEngine {
	fn load(&mut self, nodes: &[EngineNode], _: &[EngineLink], _: &EngineOptions) {
		self.sizes = nodes.to_vec();
	}
	fn start(&mut self) {
		self.running = true;
	}
	fn resume(&mut self) {
		self.running = true;
	}
	fn stop(&mut self) {
		self.running = false;
	}
	fn is_running(&self) -> bool {
		self.running
	}
	fn step(&mut self) -> EngineStep {
		self.running = false;
		EngineStep::Converged
	}
	fn bounds(&self, node: usize) -> Option<Rect> {
		let s = self.sizes.get(node)?;
		Some(Rect::centered(node as f64 * 200.0, 0.0, s.width, s.height))
	}
	fn pin(&mut self, _: usize, _: Point) {}
	fn unpin(&mut self, _: usize) {}
	fn route(&self, source: &Rect, target: &Rect, clearance: f64) -> Option<Route> {
		self.routes.set(self.routes.get() + 1);
		route_between(source, target, clearance)
	}
}

pub fn value_node(label: &[&str]) -> NodeWire {
	NodeWire {
		id: label.join("|"),
		label: label.iter().map(|s| s.to_string()).collect(),
		tag: Tag::Value,
		diff_type: DiffType::Unchanged,
	}
}

pub fn labels(texts: &[&str], diff_type: DiffType) -> Vec<LabelWire> {
	texts
		.iter()
		.map(|t| LabelWire {
			label: t.to_string(),
			diff_type,
		})
		.collect()
}

pub fn value_link(source: usize, target: usize, forward: &[&str]) -> LinkWire {
	LinkWire {
		source,
		target,
		tag: Tag::Value,
		diff_type: DiffType::Unchanged,
		forward_labels: labels(forward, DiffType::Unchanged),
		backward_labels: vec![],
	}
}

/// A → B with a single forward label `next`.
pub fn two_node_list() -> GraphWire {
	GraphWire {
		nodes: vec![value_node(&["A"]), value_node(&["B"])],
		links: vec![value_link(0, 1, &["next"])],
	}
}
