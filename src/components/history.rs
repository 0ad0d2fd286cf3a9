use leptos::prelude::*;

use crate::graph::HistoryItem;
use crate::session::runtime::SessionHandle;

/// Captured snapshots, newest first; clicking one requests its graph.
#[component]
pub fn HistoryPanel(session: SessionHandle) -> impl IntoView {
	let history = session.view.history;
	let comparing = RwSignal::new(false);

	view! {
		<aside class="history-panel">
			<div class="history-toolbar">
				<button on:click=move |_| session.request_history()>"Refresh"</button>
				<button on:click=move |_| comparing.set(true)>"Compare"</button>
			</div>
			<div class="history-list">
				<For
					each=move || history.get()
					key=|item| item.index
					children=move |item: HistoryItem| {
						let index = item.index;
						let desc = item.label.desc.clone().unwrap_or_default();
						view! {
							<div class="history-item" on:click=move |_| session.select_history(index)>
								<p>{format!("#{index}")}</p>
								<p>{item.label.function_name.clone()}</p>
								<p>{item.label.location()}</p>
								<p>{desc}</p>
							</div>
						}
					}
				/>
			</div>
			<Show when=move || comparing.get()>
				<CompareDialog session=session open=comparing />
			</Show>
		</aside>
	}
}

fn first_index(history: &[HistoryItem]) -> Option<usize> {
	history.first().map(|item| item.index)
}

/// Picks a baseline and a compared snapshot and requests their diff.
#[component]
pub fn CompareDialog(session: SessionHandle, open: RwSignal<bool>) -> impl IntoView {
	let history = session.view.history;
	let initial = history.with_untracked(|h| first_index(h));
	let old_index = RwSignal::new(initial);
	let new_index = RwSignal::new(initial);

	let options = move || {
		history
			.get()
			.into_iter()
			.map(|item| {
				let index = item.index;
				view! { <option value=index.to_string()>{format!("#{index}")}</option> }
			})
			.collect_view()
	};

	let confirm = move |_| {
		open.set(false);
		if let (Some(old), Some(new)) = (old_index.get_untracked(), new_index.get_untracked()) {
			session.request_diff(old, new);
		}
	};

	view! {
		<div class="modal">
			<div class="modal-content">
				<h2>"Compare snapshots"</h2>
				<label>
					"Old "
					<select on:change=move |ev| old_index.set(event_target_value(&ev).parse().ok())>
						{options}
					</select>
				</label>
				<label>
					"New "
					<select on:change=move |ev| new_index.set(event_target_value(&ev).parse().ok())>
						{options}
					</select>
				</label>
				<div class="modal-actions">
					<button on:click=move |_| open.set(false)>"Cancel"</button>
					<button class="primary" on:click=confirm>"Compare"</button>
				</div>
			</div>
		</div>
	}
}
