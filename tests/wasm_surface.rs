#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use memgraph_viewer::CanvasSurface;
	use memgraph_viewer::config::ViewerConfig;
	use memgraph_viewer::graph::wire::{GraphWire, LabelWire, LinkWire, NodeWire};
	use memgraph_viewer::graph::{self, DiffType, Tag};
	use memgraph_viewer::layout::{ForceGraphEngine, LayoutDriver, TextMeasure};
	use wasm_bindgen::JsCast;
	use wasm_bindgen_test::*;
	use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

	wasm_bindgen_test_configure!(run_in_browser);

	fn context() -> CanvasRenderingContext2d {
		let document = web_sys::window().unwrap().document().unwrap();
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")
			.unwrap()
			.dyn_into()
			.unwrap();
		canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap()
	}

	#[wasm_bindgen_test]
	fn measures_widest_line_and_stacks_heights() {
		let ctx = context();
		let config = ViewerConfig::default();
		let surface = CanvasSurface {
			ctx: &ctx,
			geometry: &config.geometry,
		};
		let short = surface.measure(&["ab"]).unwrap();
		let long = surface.measure(&["ab", "abcdef"]).unwrap();
		assert!(short.width > 0.0);
		assert!(long.width > short.width);
		assert!((long.height - 2.0 * config.geometry.line_height()).abs() < 1e-9);
	}

	#[wasm_bindgen_test]
	fn force_graph_layout_produces_finite_frames() {
		let ctx = context();
		let config = ViewerConfig::default();
		let surface = CanvasSurface {
			ctx: &ctx,
			geometry: &config.geometry,
		};
		let node = |label: &str| NodeWire {
			id: label.into(),
			label: vec![label.into()],
			tag: Tag::Value,
			diff_type: DiffType::Unchanged,
		};
		let wire = GraphWire {
			nodes: vec![node("A"), node("B"), node("C")],
			links: vec![
				LinkWire {
					source: 0,
					target: 1,
					tag: Tag::Value,
					diff_type: DiffType::Unchanged,
					forward_labels: vec![LabelWire {
						label: "next".into(),
						diff_type: DiffType::Unchanged,
					}],
					backward_labels: vec![],
				},
				LinkWire {
					source: 1,
					target: 2,
					tag: Tag::Value,
					diff_type: DiffType::Unchanged,
					forward_labels: vec![],
					backward_labels: vec![],
				},
			],
		};
		let mut driver = LayoutDriver::new(ForceGraphEngine::new(), &config);
		let generation = driver.load(graph::load(wire).unwrap(), &surface).unwrap();
		for _ in 0..config.schedule.total() {
			let frame = driver.tick(generation).unwrap();
			assert!(frame.nodes.iter().all(|n| n.render_bounds.is_finite()));
		}
	}
}
