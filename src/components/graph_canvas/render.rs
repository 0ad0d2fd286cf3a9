use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ViewTransform;
use crate::config::GeometryConfig;
use crate::error::{Result, ViewerError};
use crate::graph::{DiffColor, Diffed, Tag};
use crate::layout::{LabelSide, Point, RenderEdge, RenderFrame, RenderNode, SelfLoop, TextBox, TextMeasure};

const ARROW_SIZE: f64 = 8.0;
const LINE_WIDTH: f64 = 1.5;
const SELF_LOOP_RADIUS: f64 = 12.0;

/// Edge stroke sizes in graph units, so they keep their screen size at zoom `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Stroke {
	line: f64,
	arrow: f64,
	dash: f64,
	gap: f64,
}

impl Stroke {
	fn at_zoom(k: f64) -> Self {
		Self {
			line: LINE_WIDTH / k,
			arrow: ARROW_SIZE / k,
			dash: 4.0 / k,
			gap: 3.0 / k,
		}
	}
}

pub fn font(geometry: &GeometryConfig) -> String {
	format!("{}px monospace", geometry.font_px)
}

/// Canvas text metrics in the font labels are painted with.
pub struct CanvasSurface<'a> {
	/// Context whose font state is used for measuring.
	pub ctx: &'a CanvasRenderingContext2d,
	/// Font size and line advance.
	pub geometry: &'a GeometryConfig,
}

impl TextMeasure for CanvasSurface<'_> {
	fn measure(&self, lines: &[&str]) -> Result<TextBox> {
		self.ctx.set_font(&font(self.geometry));
		let mut width: f64 = 0.0;
		for line in lines {
			let metrics = self
				.ctx
				.measure_text(line)
				.map_err(|e| ViewerError::Measure(format!("{e:?}")))?;
			width = width.max(metrics.width());
		}
		if !width.is_finite() {
			return Err(ViewerError::Measure(format!("non-finite width for {lines:?}")));
		}
		Ok(TextBox {
			width,
			height: lines.len() as f64 * self.geometry.line_height(),
		})
	}
}

/// Colours read from the page stylesheet.
#[derive(Clone, Debug)]
pub struct Palette {
	diff: [String; 3],
	pub background: String,
	pub value_fill: String,
	pub name_fill: String,
	pub text: String,
}

fn css_var(style: Option<&web_sys::CssStyleDeclaration>, name: &str, fallback: &str) -> String {
	style
		.and_then(|s| s.get_property_value(name).ok())
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.unwrap_or_else(|| fallback.to_string())
}

impl Palette {
	pub fn from_document() -> Self {
		let style = web_sys::window().and_then(|w| {
			let root = w.document()?.document_element()?;
			w.get_computed_style(&root).ok().flatten()
		});
		let style = style.as_ref();
		Self {
			diff: DiffColor::ALL.map(|c| css_var(style, c.css_var(), c.fallback())),
			background: css_var(style, "--color-canvas-bg", "#1a1a2e"),
			value_fill: css_var(style, "--color-value-node-bg", "#24243e"),
			name_fill: css_var(style, "--color-name-node-bg", "#2e2440"),
			text: css_var(style, "--color-text", "#e6e6f0"),
		}
	}

	pub fn diff(&self, color: DiffColor) -> &str {
		let i = match color {
			DiffColor::Neutral => 0,
			DiffColor::Removed => 1,
			DiffColor::Added => 2,
		};
		&self.diff[i]
	}
}

/// What the frame is painted into.
pub struct Viewport<'a> {
	pub transform: &'a ViewTransform,
	pub width: f64,
	pub height: f64,
	pub geometry: &'a GeometryConfig,
}

pub fn render(
	viewport: &Viewport<'_>,
	frame: Option<&RenderFrame<'_>>,
	palette: &Palette,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(&palette.background);
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	let Some(frame) = frame else {
		return;
	};
	let (transform, geometry) = (viewport.transform, viewport.geometry);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	ctx.set_font(&font(geometry));
	let stroke = Stroke::at_zoom(transform.k);
	for edge in &frame.edges {
		draw_edge(edge, stroke, palette, geometry, ctx);
	}
	for node in &frame.nodes {
		draw_node(node, palette, geometry, ctx);
	}
	for self_loop in &frame.self_loops {
		draw_self_loop(self_loop, stroke, palette, geometry, ctx);
	}
	ctx.restore();
}

fn arrowhead(ctx: &CanvasRenderingContext2d, tip: Point, from: Point, size: f64) {
	let (dx, dy) = (tip.x - from.x, tip.y - from.y);
	let dist = dx.hypot(dy);
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let (back_x, back_y) = (tip.x - ux * size, tip.y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge(
	edge: &RenderEdge<'_>,
	stroke: Stroke,
	palette: &Palette,
	geometry: &GeometryConfig,
	ctx: &CanvasRenderingContext2d,
) {
	let color = palette.diff(edge.link.diff_color());
	ctx.set_stroke_style_str(color);
	ctx.set_fill_style_str(color);
	ctx.set_line_width(stroke.line);
	if edge.link.tag == Tag::Name {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(stroke.dash),
			&JsValue::from_f64(stroke.gap),
		));
	}
	ctx.begin_path();
	ctx.move_to(edge.start.x, edge.start.y);
	ctx.line_to(edge.end.x, edge.end.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	arrowhead(ctx, edge.end_tip(), edge.start, stroke.arrow);
	if let Some(tip) = edge.start_tip() {
		arrowhead(ctx, tip, edge.end, stroke.arrow);
	}

	ctx.set_text_align("center");
	for placement in &edge.labels {
		ctx.save();
		let _ = ctx.translate(placement.center.x, placement.center.y);
		let _ = ctx.rotate(placement.angle.to_radians());
		let step = placement.side.stack_direction() * geometry.line_height();
		for (i, line) in placement.lines.iter().enumerate() {
			ctx.set_fill_style_str(palette.diff(line.label.diff_color()));
			let _ = ctx.fill_text(&line.text, 0.0, placement.offset + step * i as f64);
		}
		ctx.restore();
	}
	ctx.set_text_align("start");
}

fn draw_node(
	node: &RenderNode<'_>,
	palette: &Palette,
	geometry: &GeometryConfig,
	ctx: &CanvasRenderingContext2d,
) {
	let sized = node.sized();
	let b = node.render_bounds;
	let fill = match sized.node.tag {
		Tag::Value => &palette.value_fill,
		Tag::Name => &palette.name_fill,
	};
	ctx.set_fill_style_str(fill);
	ctx.fill_rect(b.x, b.y, b.width(), b.height());
	ctx.set_stroke_style_str(palette.diff(sized.node.diff_color()));
	ctx.set_line_width(if sized.node.tag == Tag::Name { 2.0 } else { 1.0 });
	ctx.stroke_rect(b.x, b.y, b.width(), b.height());

	ctx.set_fill_style_str(&palette.text);
	let origin = node.label_origin();
	for (i, line) in sized.node.label.iter().enumerate() {
		let _ = ctx.fill_text(line, origin.x, origin.y + geometry.line_height() * i as f64);
	}
}

fn draw_self_loop(
	self_loop: &SelfLoop<'_>,
	stroke: Stroke,
	palette: &Palette,
	geometry: &GeometryConfig,
	ctx: &CanvasRenderingContext2d,
) {
	let color = palette.diff(self_loop.link.diff_color());
	let (cx, cy) = (self_loop.anchor.x_max, self_loop.anchor.y);
	ctx.set_stroke_style_str(color);
	ctx.set_fill_style_str(color);
	ctx.set_line_width(stroke.line);
	// three quarters of a circle outside the corner, ending on the right edge
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, SELF_LOOP_RADIUS, PI, 2.5 * PI);
	ctx.stroke();
	let tip = Point::new(cx, cy + SELF_LOOP_RADIUS);
	arrowhead(ctx, tip, Point::new(cx + stroke.arrow, tip.y), stroke.arrow);

	let x = cx + SELF_LOOP_RADIUS + 4.0;
	let y = cy - SELF_LOOP_RADIUS;
	let step = LabelSide::Forward.stack_direction() * geometry.line_height();
	for (i, label) in self_loop.link.forward_labels.iter().enumerate() {
		ctx.set_fill_style_str(palette.diff(label.diff_color()));
		let text = LabelSide::Forward.format(&label.label, false);
		let _ = ctx.fill_text(&text, x, y + step * i as f64);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strokes_keep_screen_size_under_zoom() {
		assert_eq!(Stroke::at_zoom(1.0).line, LINE_WIDTH);
		let zoomed = Stroke::at_zoom(4.0);
		assert_eq!(zoomed.line * 4.0, LINE_WIDTH);
		assert_eq!(zoomed.arrow * 4.0, ARROW_SIZE);
		assert!(Stroke::at_zoom(0.5).arrow > ARROW_SIZE);
	}
}
