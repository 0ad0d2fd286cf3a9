//! Feeds a sized graph to the engine and derives drawable geometry every tick.
//!
//! Each load bumps a [`Generation`]. Ticks, drags and frames carry the generation they
//! were issued for, and anything from a superseded load is dropped, so the animation
//! loop of an old graph can never write into the new one.

use log::{debug, error, info};

use super::engine::{EngineLink, EngineNode, EngineOptions, EngineStep, LayoutEngine};
use super::geometry::{Point, Rect, Route};
use super::labels::{LabelSide, orient};
use super::sizing::{self, SizedGraph, SizedLink, SizedNode, TextMeasure};
use crate::Result;
use crate::config::{GeometryConfig, ViewerConfig};
use crate::graph::{Graph, Link, LinkLabel, NodeId, Tag};

/// Where the driver is in its convergence cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
	/// Nothing loaded, or a load in progress.
	Idle,
	/// The engine is iterating and every tick moves nodes.
	Converging,
	/// The engine has stopped; frames are still produced for repaint.
	Settled,
}

/// Identifies one graph load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

/// A sized node with the box the engine currently gives it.
#[derive(Clone, Copy, Debug)]
pub struct PlacedNode<'a> {
	/// The sized node.
	pub node: &'a SizedNode,
	/// Engine-owned constraint box.
	pub bounds: Rect,
}

/// A placed node with its drawing box.
#[derive(Clone, Copy, Debug)]
pub struct RenderNode<'a> {
	/// The placed node.
	pub placed: PlacedNode<'a>,
	/// `bounds` shrunk by the node margin; never fed back to the engine.
	pub render_bounds: Rect,
}

impl<'a> RenderNode<'a> {
	/// The sized node.
	pub fn sized(&self) -> &'a SizedNode {
		self.placed.node
	}

	/// Left baseline point of the first label line.
	pub fn label_origin(&self) -> Point {
		let offset = self.placed.node.label_offset;
		Point::new(
			self.render_bounds.cx() + offset.x,
			self.render_bounds.cy() + offset.y,
		)
	}
}

/// One label line with its arrow glyph applied.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLine<'a> {
	/// The label being drawn.
	pub label: &'a LinkLabel,
	/// Text including the arrow glyph.
	pub text: String,
}

/// A stack of labels drawn along an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelPlacement<'a> {
	/// Forward (above) or backward (below).
	pub side: LabelSide,
	/// Midpoint of the route segment.
	pub center: Point,
	/// Rotation in degrees about `center`.
	pub angle: f64,
	/// Perpendicular offset from the line, applied after rotation.
	pub offset: f64,
	/// Lines, first nearest to the edge.
	pub lines: Vec<LabelLine<'a>>,
}

/// A laid-out edge for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge<'a> {
	/// The link drawn.
	pub link: &'a Link,
	/// Where the line starts.
	pub start: Point,
	/// Where the line ends and the arrowhead begins.
	pub end: Point,
	/// Source→target route.
	pub forward_route: Route,
	/// Target→source route, value edges only.
	pub backward_route: Option<Route>,
	/// The label text was flipped upright and its glyphs swapped ends.
	pub reverse_label_arrow: bool,
	/// Zero, one or two label stacks.
	pub labels: Vec<LabelPlacement<'a>>,
}

impl RenderEdge<'_> {
	/// Tip of the end arrowhead.
	pub fn end_tip(&self) -> Point {
		self.forward_route.target_intersection
	}

	/// Tip of the start arrowhead, for edges whose information flows both ways.
	pub fn start_tip(&self) -> Option<Point> {
		if self.link.is_bidirectional() {
			self.backward_route.map(|r| r.target_intersection)
		} else {
			None
		}
	}
}

/// A self-loop, drawn with a fixed shape on its node.
#[derive(Clone, Debug, PartialEq)]
pub struct SelfLoop<'a> {
	/// The link drawn.
	pub link: &'a Link,
	/// Drawing box of its node.
	pub anchor: Rect,
}

/// Everything the surface needs to paint one tick.
#[derive(Clone, Debug)]
pub struct RenderFrame<'a> {
	/// Load this frame belongs to.
	pub generation: Generation,
	/// Drawable nodes.
	pub nodes: Vec<RenderNode<'a>>,
	/// Drawable edges.
	pub edges: Vec<RenderEdge<'a>>,
	/// Drawable self-loops.
	pub self_loops: Vec<SelfLoop<'a>>,
	/// Elements left out of this frame because their geometry was degenerate.
	pub skipped: usize,
}

/// Drives one [`LayoutEngine`] through successive graph loads.
pub struct LayoutDriver<E> {
	engine: E,
	geometry: GeometryConfig,
	options: EngineOptions,
	state: DriverState,
	generation: Generation,
	graph: Option<SizedGraph>,
	frozen: bool,
	ready_reported: bool,
}

impl<E: LayoutEngine> LayoutDriver<E> {
	/// A driver with nothing loaded.
	pub fn new(engine: E, config: &ViewerConfig) -> Self {
		Self {
			engine,
			geometry: config.geometry,
			options: EngineOptions {
				avoid_overlaps: config.avoid_overlaps,
				continuous: config.continuous,
				schedule: config.schedule,
				..EngineOptions::default()
			},
			state: DriverState::Idle,
			generation: Generation::default(),
			graph: None,
			frozen: false,
			ready_reported: false,
		}
	}

	/// Canvas size used to place the next load.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.options.width = width;
		self.options.height = height;
	}

	/// Current state.
	pub fn state(&self) -> DriverState {
		self.state
	}

	/// Generation of the current load.
	pub fn generation(&self) -> Generation {
		self.generation
	}

	/// The loaded graph, if any.
	pub fn graph(&self) -> Option<&SizedGraph> {
		self.graph.as_ref()
	}

	/// The engine.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// Geometry constants in use.
	pub fn geometry(&self) -> &GeometryConfig {
		&self.geometry
	}

	/// Replace the working graph and start converging.
	///
	/// Sizing runs first; if it fails nothing changes and the previous graph stays loaded.
	pub fn load(&mut self, graph: Graph, measure: &impl TextMeasure) -> Result<Generation> {
		let sized = sizing::resolve(graph, measure, &self.geometry).inspect_err(|e| {
			error!("abandoning graph load: {e}");
		})?;

		self.engine.stop();
		self.generation = Generation(self.generation.0 + 1);
		self.state = DriverState::Idle;
		self.frozen = false;
		self.ready_reported = false;

		let nodes: Vec<EngineNode> = sized
			.nodes
			.iter()
			.map(|n| EngineNode {
				width: n.width,
				height: n.height,
			})
			.collect();
		let links: Vec<EngineLink> = sized
			.layout_links
			.iter()
			.map(|l| EngineLink {
				source: l.source.0,
				target: l.target.0,
				length: l.length,
			})
			.collect();
		self.engine.load(&nodes, &links, &self.options);
		info!(
			"loaded graph generation {}: {} nodes, {} layout links, {} self-loops",
			self.generation.0,
			nodes.len(),
			links.len(),
			sized.self_links.len()
		);
		self.graph = Some(sized);

		self.engine.start();
		self.state = DriverState::Converging;
		Ok(self.generation)
	}

	/// Advance the engine once, if converging, and derive the frame.
	pub fn tick(&mut self, generation: Generation) -> Option<RenderFrame<'_>> {
		if generation != self.generation {
			debug!(
				"dropping tick for generation {} (current {})",
				generation.0, self.generation.0
			);
			return None;
		}
		if self.state == DriverState::Converging && self.engine.step() == EngineStep::Converged {
			self.state = DriverState::Settled;
			info!("layout generation {} settled", self.generation.0);
		}
		self.frame()
	}

	/// Returns `true` once per load, as soon as the layout is worth showing.
	///
	/// That is when it stops converging, whether by settling or by a freeze. A
	/// continuous layout never settles and is ready right after loading.
	pub fn take_ready(&mut self) -> bool {
		if self.ready_reported || self.graph.is_none() {
			return false;
		}
		let ready = match self.state {
			DriverState::Idle => false,
			DriverState::Converging => self.options.continuous,
			DriverState::Settled => true,
		};
		self.ready_reported = ready;
		ready
	}

	/// Stop converging; frames keep the current positions.
	pub fn stop(&mut self) {
		self.engine.stop();
		if self.state == DriverState::Converging {
			self.state = DriverState::Settled;
		}
	}

	/// Freeze or unfreeze the layout.
	pub fn set_frozen(&mut self, frozen: bool) {
		if self.frozen == frozen {
			return;
		}
		self.frozen = frozen;
		if frozen {
			self.stop();
		} else if self.graph.is_some() {
			self.engine.resume();
			self.state = DriverState::Converging;
		}
	}

	/// Grab a node and hold it at `at`.
	pub fn begin_drag(&mut self, generation: Generation, node: NodeId, at: Point) -> bool {
		if generation != self.generation || self.graph.is_none() {
			return false;
		}
		self.engine.pin(node.0, at);
		if !self.frozen {
			self.engine.resume();
			self.state = DriverState::Converging;
		}
		true
	}

	/// Move a grabbed node.
	pub fn drag_to(&mut self, generation: Generation, node: NodeId, at: Point) {
		if generation == self.generation {
			self.engine.pin(node.0, at);
		}
	}

	/// Release a grabbed node.
	pub fn end_drag(&mut self, generation: Generation, node: NodeId) {
		if generation == self.generation {
			self.engine.unpin(node.0);
		}
	}

	/// Topmost node whose drawing box contains `p`.
	pub fn node_at(&self, p: Point) -> Option<NodeId> {
		let graph = self.graph.as_ref()?;
		(0..graph.nodes.len()).rev().map(NodeId).find(|id| {
			self.engine
				.bounds(id.0)
				.is_some_and(|b| b.inflate(-self.geometry.node_margin).contains(p))
		})
	}

	/// Derive drawable geometry from the engine's current boxes.
	pub fn frame(&self) -> Option<RenderFrame<'_>> {
		let graph = self.graph.as_ref()?;
		if self.state == DriverState::Idle {
			return None;
		}
		let mut skipped = 0;

		let mut render_bounds = Vec::with_capacity(graph.nodes.len());
		let mut nodes = Vec::with_capacity(graph.nodes.len());
		for (i, sized) in graph.nodes.iter().enumerate() {
			match self.engine.bounds(i).filter(Rect::is_finite) {
				Some(bounds) => {
					let rb = bounds.inflate(-self.geometry.node_margin);
					render_bounds.push(Some(rb));
					nodes.push(RenderNode {
						placed: PlacedNode {
							node: sized,
							bounds,
						},
						render_bounds: rb,
					});
				}
				None => {
					render_bounds.push(None);
					skipped += 1;
				}
			}
		}

		let mut edges = Vec::with_capacity(graph.layout_links.len());
		for sized in &graph.layout_links {
			let link = graph.link(sized.id);
			let edge = match (render_bounds[link.source.0], render_bounds[link.target.0]) {
				(Some(s), Some(t)) => self.route_edge(link, sized, &s, &t),
				_ => None,
			};
			match edge {
				Some(edge) => edges.push(edge),
				None => {
					debug!("skipping degenerate edge {} this tick", link.id);
					skipped += 1;
				}
			}
		}

		let self_loops = graph
			.self_links
			.iter()
			.filter_map(|id| {
				let link = graph.link(*id);
				render_bounds[link.source.0].map(|anchor| SelfLoop { link, anchor })
			})
			.collect();

		Some(RenderFrame {
			generation: self.generation,
			nodes,
			edges,
			self_loops,
			skipped,
		})
	}

	fn route_edge<'a>(
		&self,
		link: &'a Link,
		sized: &SizedLink,
		source: &Rect,
		target: &Rect,
	) -> Option<RenderEdge<'a>> {
		let clearance = self.geometry.arrow_clearance;
		let forward = self.engine.route(source, target, clearance)?;

		if link.tag == Tag::Name {
			return Some(RenderEdge {
				link,
				start: forward.source_intersection,
				end: forward.arrow_start,
				forward_route: forward,
				backward_route: None,
				reverse_label_arrow: false,
				labels: Vec::new(),
			});
		}

		let backward = self.engine.route(target, source, clearance)?;
		let start = if link.is_bidirectional() {
			backward.arrow_start
		} else {
			forward.source_intersection
		};

		let (from, to) = forward.label_segment();
		let orientation = orient(from, to);
		if !orientation.angle.is_finite() {
			return None;
		}
		let center = from.midpoint(to);
		let reversed = orientation.reversed;
		let place = |side: LabelSide, labels: &'a [LinkLabel], offset: f64| LabelPlacement {
			side,
			center,
			angle: orientation.angle,
			offset,
			lines: labels
				.iter()
				.map(|label| LabelLine {
					label,
					text: side.format(&label.label, reversed),
				})
				.collect(),
		};

		let mut labels = Vec::with_capacity(2);
		if !link.forward_labels.is_empty() {
			labels.push(place(
				LabelSide::Forward,
				&link.forward_labels,
				-self.geometry.forward_label_lift,
			));
		}
		if let Some(text) = sized.backward_text {
			labels.push(place(
				LabelSide::Backward,
				&link.backward_labels,
				self.geometry.backward_label_drop + 3.0 * text.height / 4.0,
			));
		}

		Some(RenderEdge {
			link,
			start,
			end: forward.arrow_start,
			forward_route: forward,
			backward_route: Some(backward),
			reverse_label_arrow: reversed,
			labels,
		})
	}
}
