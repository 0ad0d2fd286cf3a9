use crate::config::ViewerConfig;
use crate::graph::NodeId;
use crate::layout::{ForceGraphEngine, Generation, LayoutDriver, LayoutEngine, Point};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Scale by `factor` keeping the screen point (`sx`, `sy`) fixed.
	pub fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<(Generation, NodeId)>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct CanvasState {
	pub driver: LayoutDriver<ForceGraphEngine>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(config: &ViewerConfig, width: f64, height: f64) -> Self {
		let mut driver = LayoutDriver::new(ForceGraphEngine::new(), config);
		driver.resize(width, height);
		Self {
			driver,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Grab the node under the pointer, or start panning.
	pub fn press(&mut self, sx: f64, sy: f64) {
		let at = self.screen_to_graph(sx, sy);
		let generation = self.driver.generation();
		let hit = self.driver.node_at(at).and_then(|id| {
			let center = self.driver.engine().bounds(id.0)?.center();
			Some((id, center))
		});
		match hit {
			Some((id, center)) if self.driver.begin_drag(generation, id, center) => {
				self.drag = DragState {
					node: Some((generation, id)),
					start_x: sx,
					start_y: sy,
					node_start: center,
				};
			}
			_ => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	pub fn move_to(&mut self, sx: f64, sy: f64) {
		if let Some((generation, id)) = self.drag.node {
			let k = self.transform.k;
			let at = Point::new(
				self.drag.node_start.x + (sx - self.drag.start_x) / k,
				self.drag.node_start.y + (sy - self.drag.start_y) / k,
			);
			self.driver.drag_to(generation, id, at);
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn release(&mut self) {
		if let Some((generation, id)) = self.drag.node.take() {
			self.driver.end_drag(generation, id);
		}
		self.pan.active = false;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.driver.resize(width, height);
	}

	/// Forget the view and gestures of the previous graph.
	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
		self.drag = DragState::default();
		self.pan = PanState::default();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut t = ViewTransform { x: 40.0, y: -10.0, k: 1.0 };
		let before = ((300.0 - t.x) / t.k, (200.0 - t.y) / t.k);
		t.zoom_about(300.0, 200.0, 1.1);
		let after = ((300.0 - t.x) / t.k, (200.0 - t.y) / t.k);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut t = ViewTransform::default();
		for _ in 0..100 {
			t.zoom_about(0.0, 0.0, 1.1);
		}
		assert_eq!(t.k, MAX_ZOOM);
		for _ in 0..200 {
			t.zoom_about(0.0, 0.0, 0.9);
		}
		assert_eq!(t.k, MIN_ZOOM);
	}
}
