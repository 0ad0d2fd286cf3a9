//! Layout engine boundary and the `force_graph` backed implementation.
//!
//! The engine owns node positions once a load starts. The driver only reads boxes
//! back through [`LayoutEngine::bounds`] and never writes sizes after [`LayoutEngine::load`].

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::geometry::{Point, Rect, Route, route_between};
use crate::config::ConvergenceSchedule;

/// Size of one node as seen by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineNode {
	/// Constraint-box width.
	pub width: f64,
	/// Constraint-box height.
	pub height: f64,
}

/// A link between two engine node positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineLink {
	/// Source position in the node slice.
	pub source: usize,
	/// Target position in the node slice.
	pub target: usize,
	/// Target centre-to-centre distance.
	pub length: f64,
}

/// Load-time engine settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineOptions {
	/// Canvas width used for initial placement.
	pub width: f64,
	/// Canvas height used for initial placement.
	pub height: f64,
	/// Keep node boxes from overlapping.
	pub avoid_overlaps: bool,
	/// Never report convergence.
	pub continuous: bool,
	/// Iteration phases.
	pub schedule: ConvergenceSchedule,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
			avoid_overlaps: true,
			continuous: false,
			schedule: ConvergenceSchedule::default(),
		}
	}
}

/// Outcome of one engine iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStep {
	/// More iterations will follow.
	Running,
	/// The engine has stopped moving nodes.
	Converged,
}

/// A constraint-based iterative layout.
pub trait LayoutEngine {
	/// Replace the whole working set. Positions from a previous load are discarded.
	fn load(&mut self, nodes: &[EngineNode], links: &[EngineLink], options: &EngineOptions);

	/// Begin iterating from the first phase.
	fn start(&mut self);

	/// Continue iterating after a stop or convergence.
	fn resume(&mut self);

	/// Stop iterating; positions stay where they are.
	fn stop(&mut self);

	/// Whether [`Self::step`] would move anything.
	fn is_running(&self) -> bool;

	/// Run one iteration.
	fn step(&mut self) -> EngineStep;

	/// Current constraint box of a node.
	fn bounds(&self, node: usize) -> Option<Rect>;

	/// Hold a node at `at` until [`Self::unpin`].
	fn pin(&mut self, node: usize, at: Point);

	/// Release a pinned node back to the forces.
	fn unpin(&mut self, node: usize);

	/// Shortest straight route between two boxes leaving `clearance` before the target.
	fn route(&self, source: &Rect, target: &Rect, clearance: f64) -> Option<Route> {
		route_between(source, target, clearance)
	}
}

const DT: f32 = 0.016;
const INITIAL_RADIUS: f64 = 100.0;
const LENGTH_STIFFNESS: f64 = 0.5;
const SETTLE_DISPLACEMENT: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
	Unconstrained,
	LinkConstrained,
	OverlapConstrained,
}

#[derive(Clone, Copy, Debug)]
struct Body {
	width: f64,
	height: f64,
	pinned: bool,
}

fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: 600.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

/// `force_graph` forces followed by link-length and overlap projection.
pub struct ForceGraphEngine {
	graph: ForceGraph<usize, ()>,
	indices: Vec<DefaultNodeIdx>,
	bodies: Vec<Body>,
	positions: Vec<Point>,
	links: Vec<EngineLink>,
	options: EngineOptions,
	iteration: u32,
	running: bool,
}

impl Default for ForceGraphEngine {
	fn default() -> Self {
		Self::new()
	}
}

impl ForceGraphEngine {
	/// An engine with nothing loaded.
	pub fn new() -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters()),
			indices: Vec::new(),
			bodies: Vec::new(),
			positions: Vec::new(),
			links: Vec::new(),
			options: EngineOptions::default(),
			iteration: 0,
			running: false,
		}
	}

	fn phase(&self) -> Phase {
		let s = &self.options.schedule;
		if self.iteration < s.unconstrained {
			Phase::Unconstrained
		} else if self.iteration < s.unconstrained + s.link_constrained {
			Phase::LinkConstrained
		} else {
			Phase::OverlapConstrained
		}
	}

	fn read_positions(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			let i = node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			if x.is_finite() && y.is_finite() {
				positions[i] = Point::new(x, y);
			}
		});
	}

	fn write_positions(&mut self) {
		let (positions, bodies) = (&self.positions, &self.bodies);
		self.graph.visit_nodes_mut(|node| {
			let i = node.data.user_data;
			if !bodies[i].pinned {
				node.data.x = positions[i].x as f32;
				node.data.y = positions[i].y as f32;
			}
		});
	}

	fn project_lengths(&mut self) {
		for link in &self.links {
			let (a, b) = (self.positions[link.source], self.positions[link.target]);
			let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
			let mut d = dx.hypot(dy);
			if d < 1e-6 {
				// separate coincident endpoints along a fixed axis
				(dx, dy, d) = (1e-3, 0.0, 1e-3);
			}
			let delta = (d - link.length) / d * LENGTH_STIFFNESS;
			let (mx, my) = (dx * delta, dy * delta);
			let (ps, pt) = (self.bodies[link.source].pinned, self.bodies[link.target].pinned);
			let (ws, wt) = match (ps, pt) {
				(true, true) => continue,
				(true, false) => (0.0, 1.0),
				(false, true) => (1.0, 0.0),
				(false, false) => (0.5, 0.5),
			};
			let s = &mut self.positions[link.source];
			s.x += mx * ws;
			s.y += my * ws;
			let t = &mut self.positions[link.target];
			t.x -= mx * wt;
			t.y -= my * wt;
		}
	}

	fn remove_overlaps(&mut self) {
		let n = self.positions.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (self.positions[i], self.positions[j]);
				let (bi, bj) = (self.bodies[i], self.bodies[j]);
				let ox = (bi.width + bj.width) / 2.0 - (b.x - a.x).abs();
				let oy = (bi.height + bj.height) / 2.0 - (b.y - a.y).abs();
				if ox <= 0.0 || oy <= 0.0 {
					continue;
				}
				let (wi, wj) = match (bi.pinned, bj.pinned) {
					(true, true) => continue,
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					(false, false) => (0.5, 0.5),
				};
				if ox < oy {
					let dir = if b.x >= a.x { 1.0 } else { -1.0 };
					self.positions[i].x -= dir * ox * wi;
					self.positions[j].x += dir * ox * wj;
				} else {
					let dir = if b.y >= a.y { 1.0 } else { -1.0 };
					self.positions[i].y -= dir * oy * wi;
					self.positions[j].y += dir * oy * wj;
				}
			}
		}
	}
}

impl LayoutEngine for ForceGraphEngine {
	fn load(&mut self, nodes: &[EngineNode], links: &[EngineLink], options: &EngineOptions) {
		let mut graph = ForceGraph::new(simulation_parameters());
		let count = nodes.len().max(1) as f64;
		let (cx, cy) = (options.width / 2.0, options.height / 2.0);

		self.indices.clear();
		self.positions.clear();
		for (i, _) in nodes.iter().enumerate() {
			let angle = (i as f64) * std::f64::consts::TAU / count;
			let (x, y) = (cx + INITIAL_RADIUS * angle.cos(), cy + INITIAL_RADIUS * angle.sin());
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: i,
			});
			self.indices.push(idx);
			self.positions.push(Point::new(x, y));
		}
		for link in links {
			graph.add_edge(
				self.indices[link.source],
				self.indices[link.target],
				EdgeData::default(),
			);
		}

		self.graph = graph;
		self.bodies = nodes
			.iter()
			.map(|n| Body {
				width: n.width,
				height: n.height,
				pinned: false,
			})
			.collect();
		self.links = links.to_vec();
		self.options = *options;
		self.iteration = 0;
		self.running = false;
		debug!("engine loaded {} nodes, {} links", nodes.len(), links.len());
	}

	fn start(&mut self) {
		self.iteration = 0;
		self.running = true;
	}

	fn resume(&mut self) {
		let s = self.options.schedule;
		self.iteration = self.iteration.min(s.total() - s.overlap_constrained);
		self.running = true;
	}

	fn stop(&mut self) {
		self.running = false;
	}

	fn is_running(&self) -> bool {
		self.running
	}

	fn step(&mut self) -> EngineStep {
		if !self.running {
			return EngineStep::Converged;
		}
		let before = self.positions.clone();

		self.graph.update(DT);
		self.read_positions();
		let phase = self.phase();
		if phase >= Phase::LinkConstrained {
			self.project_lengths();
		}
		if phase == Phase::OverlapConstrained && self.options.avoid_overlaps {
			self.remove_overlaps();
		}
		self.write_positions();
		self.iteration += 1;

		let moved = before
			.iter()
			.zip(&self.positions)
			.map(|(a, b)| (b.x - a.x).hypot(b.y - a.y))
			.sum::<f64>()
			/ self.positions.len().max(1) as f64;

		if self.options.continuous {
			return EngineStep::Running;
		}
		let settled = phase == Phase::OverlapConstrained && moved < SETTLE_DISPLACEMENT;
		if settled || self.iteration >= self.options.schedule.total() {
			self.running = false;
			debug!("engine converged after {} iterations", self.iteration);
			EngineStep::Converged
		} else {
			EngineStep::Running
		}
	}

	fn bounds(&self, node: usize) -> Option<Rect> {
		let p = self.positions.get(node)?;
		let b = self.bodies.get(node)?;
		Some(Rect::centered(p.x, p.y, b.width, b.height))
	}

	fn pin(&mut self, node: usize, at: Point) {
		let Some(body) = self.bodies.get_mut(node) else {
			return;
		};
		body.pinned = true;
		self.positions[node] = at;
		self.graph.visit_nodes_mut(|n| {
			if n.data.user_data == node {
				n.data.x = at.x as f32;
				n.data.y = at.y as f32;
				n.data.is_anchor = true;
			}
		});
	}

	fn unpin(&mut self, node: usize) {
		let Some(body) = self.bodies.get_mut(node) else {
			return;
		};
		body.pinned = false;
		self.graph.visit_nodes_mut(|n| {
			if n.data.user_data == node {
				n.data.is_anchor = false;
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn boxes(n: usize) -> Vec<EngineNode> {
		(0..n)
			.map(|_| EngineNode {
				width: 60.0,
				height: 40.0,
			})
			.collect()
	}

	fn run(engine: &mut ForceGraphEngine) -> u32 {
		let mut steps = 0;
		while engine.step() == EngineStep::Running {
			steps += 1;
			assert!(steps < 10_000, "engine never converged");
		}
		steps
	}

	#[test]
	fn converges_within_schedule() {
		let mut engine = ForceGraphEngine::new();
		let links = [EngineLink {
			source: 0,
			target: 1,
			length: 150.0,
		}];
		engine.load(&boxes(3), &links, &EngineOptions::default());
		engine.start();
		run(&mut engine);
		assert!(!engine.is_running());
		assert!(engine.iteration <= ConvergenceSchedule::default().total());
	}

	#[test]
	fn stopped_engine_does_not_move() {
		let mut engine = ForceGraphEngine::new();
		engine.load(&boxes(2), &[], &EngineOptions::default());
		let before = engine.bounds(0);
		assert_eq!(engine.step(), EngineStep::Converged);
		assert_eq!(engine.bounds(0), before);
	}

	#[test]
	fn overlapping_boxes_are_separated() {
		let mut engine = ForceGraphEngine::new();
		engine.load(&boxes(2), &[], &EngineOptions::default());
		engine.positions = vec![Point::new(100.0, 100.0), Point::new(110.0, 100.0)];
		engine.remove_overlaps();
		let (a, b) = (engine.bounds(0).unwrap(), engine.bounds(1).unwrap());
		assert!(a.x_max <= b.x + 1e-9 || a.y_max <= b.y + 1e-9);
	}

	#[test]
	fn projection_moves_toward_target_length() {
		let mut engine = ForceGraphEngine::new();
		let links = [EngineLink {
			source: 0,
			target: 1,
			length: 100.0,
		}];
		engine.load(&boxes(2), &links, &EngineOptions::default());
		engine.positions = vec![Point::new(0.0, 0.0), Point::new(300.0, 0.0)];
		engine.project_lengths();
		let d = engine.positions[1].x - engine.positions[0].x;
		assert!((d - 200.0).abs() < 1e-9);
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut engine = ForceGraphEngine::new();
		let links = [EngineLink {
			source: 0,
			target: 1,
			length: 100.0,
		}];
		engine.load(&boxes(2), &links, &EngineOptions::default());
		engine.start();
		engine.pin(0, Point::new(10.0, 20.0));
		for _ in 0..30 {
			engine.step();
		}
		let b = engine.bounds(0).unwrap();
		assert_eq!(b.center(), Point::new(10.0, 20.0));
	}

	#[test]
	fn continuous_mode_never_settles() {
		let mut engine = ForceGraphEngine::new();
		let options = EngineOptions {
			continuous: true,
			..EngineOptions::default()
		};
		engine.load(&boxes(2), &[], &options);
		engine.start();
		for _ in 0..300 {
			assert_eq!(engine.step(), EngineStep::Running);
		}
	}
}
