//! Edge label orientation and arrow glyphs.
//!
//! Text rotated past vertical reads upside down, so a leftward segment gets its label
//! turned by a further 180°. The arrow glyph baked into the text then has to swap ends
//! to keep pointing along the flow. Forward and backward labels on one edge always
//! describe opposite directions, so their glyphs sit on opposite ends.

use super::geometry::Point;

/// Glyph appended after a label read in the drawing direction.
pub const ARROW_RIGHT: char = '→';
/// Glyph prepended before a label read against the drawing direction.
pub const ARROW_LEFT: char = '←';

/// Rotation for a label drawn along a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelOrientation {
	/// Rotation in degrees; a flipped label has 180° added to the segment angle.
	pub angle: f64,
	/// The label was flipped to stay upright.
	pub reversed: bool,
}

/// Orientation of a label on the segment `from`→`to`.
pub fn orient(from: Point, to: Point) -> LabelOrientation {
	let raw = (to.y - from.y).atan2(to.x - from.x).to_degrees();
	let reversed = raw > 90.0 || raw < -90.0;
	LabelOrientation {
		angle: if reversed { raw + 180.0 } else { raw },
		reversed,
	}
}

/// Which label stack of an edge a label belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSide {
	/// Drawn above the line, reads source→target.
	Forward,
	/// Drawn below the line, reads target→source.
	Backward,
}

/// Which end of the text carries the arrow glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphPlacement {
	/// `←text`
	Before,
	/// `text→`
	After,
}

impl LabelSide {
	/// Glyph end for this side under the given flip state.
	pub fn glyph(self, reversed: bool) -> GlyphPlacement {
		let before = match self {
			LabelSide::Forward => reversed,
			LabelSide::Backward => !reversed,
		};
		if before {
			GlyphPlacement::Before
		} else {
			GlyphPlacement::After
		}
	}

	/// Label text with its arrow glyph on the correct end.
	pub fn format(self, text: &str, reversed: bool) -> String {
		match self.glyph(reversed) {
			GlyphPlacement::Before => format!("{ARROW_LEFT}{text}"),
			GlyphPlacement::After => format!("{text}{ARROW_RIGHT}"),
		}
	}

	/// Line advance direction when stacking several labels: up for forward, down for backward.
	pub fn stack_direction(self) -> f64 {
		match self {
			LabelSide::Forward => -1.0,
			LabelSide::Backward => 1.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn toward(degrees: f64) -> LabelOrientation {
		let r = degrees.to_radians();
		orient(Point::new(0.0, 0.0), Point::new(100.0 * r.cos(), 100.0 * r.sin()))
	}

	#[test]
	fn flip_flag_matches_leftward_segments() {
		for step in -179..=180 {
			let theta = step as f64;
			let o = toward(theta);
			let raw = if o.reversed { o.angle - 180.0 } else { o.angle };
			assert_eq!(o.reversed, raw > 90.0 || raw < -90.0, "theta {theta}");
			// upright text always reads left to right
			assert!(o.angle.to_radians().cos() >= -1e-9, "theta {theta}");
		}
	}

	#[test]
	fn rightward_is_not_flipped() {
		assert!(!toward(0.0).reversed);
		assert!(!toward(90.0).reversed);
		assert!(!toward(-90.0).reversed);
		assert!(toward(135.0).reversed);
		assert!(toward(-135.0).reversed);
	}

	#[test]
	fn flipped_angle_adds_half_turn() {
		let o = toward(-135.0);
		assert!(o.reversed);
		assert!((o.angle - 45.0).abs() < 1e-9);
		let o = toward(135.0);
		assert!((o.angle - 315.0).abs() < 1e-9);
	}

	#[test]
	fn glyphs_are_complementary() {
		for reversed in [false, true] {
			assert_ne!(
				LabelSide::Forward.glyph(reversed),
				LabelSide::Backward.glyph(reversed)
			);
		}
		assert_eq!(LabelSide::Forward.format("next", false), "next→");
		assert_eq!(LabelSide::Forward.format("next", true), "←next");
		assert_eq!(LabelSide::Backward.format("prev", false), "←prev");
		assert_eq!(LabelSide::Backward.format("prev", true), "prev→");
	}
}
