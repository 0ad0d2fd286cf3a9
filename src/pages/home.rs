use leptos::prelude::*;
use log::info;

use crate::components::graph_canvas::GraphCanvas;
use crate::components::history::HistoryPanel;
use crate::config::ViewerConfig;
use crate::session::runtime::SessionHandle;

fn page_config() -> ViewerConfig {
	let search = web_sys::window()
		.and_then(|w| w.location().search().ok())
		.unwrap_or_default();
	ViewerConfig::from_query(&search)
}

/// The viewer: header, history, and the graph canvas.
#[component]
pub fn Home() -> impl IntoView {
	let config = page_config();
	info!("viewer config: {config:?}");
	let session = SessionHandle::start(&config);
	let view = session.view;
	let frozen = RwSignal::new(false);

	let title = move || {
		view.title
			.get()
			.map(|t| format!("Active: {t}"))
			.unwrap_or_default()
	};
	let status_class = move || format!("status {}", view.status.get().severity().class());
	let status_text = move || view.status.get().text();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="viewer">
				<header class="viewer-header">
					<h1 id="title">{title}</h1>
					<label class="freeze">
						<input
							type="checkbox"
							prop:checked=move || frozen.get()
							on:change=move |ev| frozen.set(event_target_checked(&ev))
						/>
						"Freeze"
					</label>
					<span class=status_class>{status_text}</span>
				</header>
				<div class="viewer-body">
					<HistoryPanel session=session />
					<div class="canvas-container">
						<GraphCanvas config=config.clone() view=view frozen=frozen />
						<Show when=move || view.loading.get().is_some()>
							<div class="loading-screen visible">
								<p>{move || view.loading.get().unwrap_or_default()}</p>
							</div>
						</Show>
					</div>
				</div>
			</div>
		</ErrorBoundary>
	}
}
