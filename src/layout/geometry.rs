//! Points, boxes and the box-to-box route helper.

/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Construct a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Midpoint of `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	/// Both coordinates are finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Axis-aligned box stored by its extremes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Right edge.
	pub x_max: f64,
	/// Top edge.
	pub y: f64,
	/// Bottom edge.
	pub y_max: f64,
}

impl Rect {
	/// Box of the given size centred on `(cx, cy)`.
	pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
		Self {
			x: cx - width / 2.0,
			x_max: cx + width / 2.0,
			y: cy - height / 2.0,
			y_max: cy + height / 2.0,
		}
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.x_max - self.x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.y_max - self.y
	}

	/// Centre x.
	pub fn cx(&self) -> f64 {
		(self.x + self.x_max) / 2.0
	}

	/// Centre y.
	pub fn cy(&self) -> f64 {
		(self.y + self.y_max) / 2.0
	}

	/// Centre point.
	pub fn center(&self) -> Point {
		Point::new(self.cx(), self.cy())
	}

	/// Grow by `pad` on every side; a negative pad shrinks.
	pub fn inflate(&self, pad: f64) -> Rect {
		Rect {
			x: self.x - pad,
			x_max: self.x_max + pad,
			y: self.y - pad,
			y_max: self.y_max + pad,
		}
	}

	/// `p` lies inside or on the boundary.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x_max && p.y >= self.y && p.y <= self.y_max
	}

	/// All four extremes are finite.
	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.x_max.is_finite() && self.y.is_finite() && self.y_max.is_finite()
	}

	/// Points where segment `a`→`b` crosses the boundary, in top, right, bottom, left order.
	pub fn line_intersections(&self, a: Point, b: Point) -> Vec<Point> {
		let sides = [
			(Point::new(self.x, self.y), Point::new(self.x_max, self.y)),
			(Point::new(self.x_max, self.y), Point::new(self.x_max, self.y_max)),
			(Point::new(self.x_max, self.y_max), Point::new(self.x, self.y_max)),
			(Point::new(self.x, self.y_max), Point::new(self.x, self.y)),
		];
		sides
			.iter()
			.filter_map(|&(c, d)| segment_intersection(a, b, c, d))
			.collect()
	}

	/// First boundary crossing of the segment from the centre to `toward`.
	pub fn ray_intersection(&self, toward: Point) -> Option<Point> {
		self.line_intersections(self.center(), toward).into_iter().next()
	}
}

/// Intersection of segments `a`→`b` and `c`→`d`, if they cross.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
	let (dx12, dy12) = (b.x - a.x, b.y - a.y);
	let (dx34, dy34) = (d.x - c.x, d.y - c.y);
	let denominator = dy34 * dx12 - dx34 * dy12;
	if denominator == 0.0 {
		return None;
	}
	let (dx31, dy31) = (a.x - c.x, a.y - c.y);
	let ta = (dx34 * dy31 - dy34 * dx31) / denominator;
	let tb = (dx12 * dy31 - dy12 * dx31) / denominator;
	if (0.0..=1.0).contains(&ta) && (0.0..=1.0).contains(&tb) {
		Some(Point::new(a.x + ta * dx12, a.y + ta * dy12))
	} else {
		None
	}
}

/// Where a straight edge between two boxes touches them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Route {
	/// Crossing of the source boundary.
	pub source_intersection: Point,
	/// Crossing of the target boundary.
	pub target_intersection: Point,
	/// Point `clearance` short of the target crossing, where an arrowhead starts.
	pub arrow_start: Point,
}

impl Route {
	/// Drawable segment from the source crossing to the arrow start.
	pub fn label_segment(&self) -> (Point, Point) {
		(self.source_intersection, self.arrow_start)
	}
}

/// Straight route between the centres of two boxes, clipped to their boundaries.
///
/// Returns `None` when the crossings coincide or any coordinate is not finite.
pub fn route_between(source: &Rect, target: &Rect, clearance: f64) -> Option<Route> {
	if !source.is_finite() || !target.is_finite() {
		return None;
	}
	let si = source.ray_intersection(target.center()).unwrap_or(source.center());
	let ti = target.ray_intersection(source.center()).unwrap_or(target.center());
	let (dx, dy) = (ti.x - si.x, ti.y - si.y);
	let length = dx.hypot(dy);
	if length == 0.0 || !length.is_finite() {
		return None;
	}
	let along = length - clearance;
	let arrow_start = Point::new(si.x + along * dx / length, si.y + along * dy / length);
	Some(Route {
		source_intersection: si,
		target_intersection: ti,
		arrow_start,
	})
	.filter(|r| r.arrow_start.is_finite())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn inflate_negative_shrinks() {
		let r = Rect::centered(0.0, 0.0, 20.0, 10.0).inflate(-4.0);
		assert_eq!((r.width(), r.height()), (12.0, 2.0));
		assert_eq!(r.center(), Point::new(0.0, 0.0));
	}

	#[test]
	fn horizontal_route_clips_to_facing_sides() {
		let a = Rect::centered(0.0, 0.0, 20.0, 20.0);
		let b = Rect::centered(100.0, 0.0, 20.0, 20.0);
		let route = route_between(&a, &b, 5.0).unwrap();
		assert!(close(route.source_intersection, Point::new(10.0, 0.0)));
		assert!(close(route.target_intersection, Point::new(90.0, 0.0)));
		assert!(close(route.arrow_start, Point::new(85.0, 0.0)));
	}

	#[test]
	fn reverse_route_mirrors_forward() {
		let a = Rect::centered(0.0, 0.0, 20.0, 20.0);
		let b = Rect::centered(60.0, 80.0, 30.0, 10.0);
		let fwd = route_between(&a, &b, 0.0).unwrap();
		let back = route_between(&b, &a, 0.0).unwrap();
		assert!(close(fwd.source_intersection, back.target_intersection));
		assert!(close(fwd.target_intersection, back.source_intersection));
	}

	#[test]
	fn coincident_boxes_have_no_route() {
		let a = Rect::centered(5.0, 5.0, 10.0, 10.0);
		assert_eq!(route_between(&a, &a, 5.0), None);
	}

	#[test]
	fn nan_boxes_have_no_route() {
		let a = Rect::centered(f64::NAN, 0.0, 10.0, 10.0);
		let b = Rect::centered(50.0, 0.0, 10.0, 10.0);
		assert_eq!(route_between(&a, &b, 5.0), None);
	}

	#[test]
	fn parallel_segments_do_not_intersect() {
		let hit = segment_intersection(
			Point::new(0.0, 0.0),
			Point::new(10.0, 0.0),
			Point::new(0.0, 1.0),
			Point::new(10.0, 1.0),
		);
		assert_eq!(hit, None);
	}
}
