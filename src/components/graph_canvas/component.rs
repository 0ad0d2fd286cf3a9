use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render::{self, CanvasSurface, Palette, Viewport};
use super::state::CanvasState;
use crate::config::ViewerConfig;
use crate::session::{Status, TitledGraph};
use crate::session::runtime::SessionView;

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Draws the memory graph and runs its layout.
///
/// Graphs arrive through `view.incoming`; each one replaces whatever is on the canvas.
#[component]
pub fn GraphCanvas(
	config: ViewerConfig,
	view: SessionView,
	/// Stops the layout while set; cleared on every new graph.
	frozen: RwSignal<bool>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			error!("canvas has no 2d context");
			view.status
				.set(Status::RenderError("canvas has no 2d context".into()));
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(CanvasState::new(&config, w, h));
		let palette = Palette::from_document();

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let mut loaded = false;
			if let Some(ref mut guard) = *state_anim.borrow_mut() {
				let s: &mut CanvasState = guard;
				if let Some(TitledGraph { title, graph }) =
					view.incoming.try_update_untracked(Option::take).flatten()
				{
					let geometry = *s.driver.geometry();
					let surface = CanvasSurface {
						ctx: &ctx,
						geometry: &geometry,
					};
					match s.driver.load(graph, &surface) {
						Ok(_) => {
							s.reset_view();
							view.title.set(Some(title));
							loaded = true;
						}
						Err(e) => {
							view.status.set(Status::RenderError(e.to_string()));
							view.loading.set(None);
						}
					}
				}

				let generation = s.driver.generation();
				let geometry = *s.driver.geometry();
				let frame = s.driver.tick(generation);
				let viewport = Viewport {
					transform: &s.transform,
					width: s.width,
					height: s.height,
					geometry: &geometry,
				};
				render::render(&viewport, frame.as_ref(), &palette, &ctx);
				if s.driver.take_ready() {
					view.loading.set(None);
				}
			}
			if loaded && frozen.get_untracked() {
				frozen.set(false);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(w) = web_sys::window() {
					let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_freeze = state.clone();
	Effect::new(move |_| {
		let is_frozen = frozen.get();
		if let Some(ref mut s) = *state_freeze.borrow_mut() {
			s.driver.set_frozen(is_frozen);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.move_to(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.release();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.transform.zoom_about(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
