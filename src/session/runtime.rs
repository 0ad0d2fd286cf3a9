//! Carries out [`SessionEffect`]s against the browser and the page signals.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use leptos::prelude::*;
use log::{error, warn};

use super::transport::{EventSink, WsTransport};
use super::{SessionController, SessionEffect, Status, TitledGraph, TransportEvent};
use crate::config::ViewerConfig;
use crate::graph::HistoryItem;

/// Page state the session writes and the components read.
#[derive(Clone, Copy)]
pub struct SessionView {
	/// Header status indicator.
	pub status: RwSignal<Status>,
	/// Title of the graph on screen, set by the canvas once it has loaded.
	pub title: RwSignal<Option<String>>,
	/// History list, newest first.
	pub history: RwSignal<Vec<HistoryItem>>,
	/// Loading overlay message; hidden when `None`.
	pub loading: RwSignal<Option<String>>,
	/// A validated graph waiting to be loaded by the canvas.
	pub incoming: RwSignal<Option<TitledGraph>>,
}

impl SessionView {
	/// Fresh signals in the current reactive owner.
	pub fn new() -> Self {
		Self {
			status: RwSignal::new(Status::Connecting),
			title: RwSignal::new(None),
			history: RwSignal::new(Vec::new()),
			loading: RwSignal::new(None),
			incoming: RwSignal::new(None),
		}
	}
}

impl Default for SessionView {
	fn default() -> Self {
		Self::new()
	}
}

struct Inner {
	controller: SessionController,
	transport: Option<WsTransport>,
	view: SessionView,
}

/// Handle to the live session, cheap to copy into event handlers.
#[derive(Clone, Copy)]
pub struct SessionHandle {
	inner: StoredValue<Rc<RefCell<Inner>>, LocalStorage>,
	/// Signals updated by the session.
	pub view: SessionView,
}

impl SessionHandle {
	/// Build the session and open the first connection.
	pub fn start(config: &ViewerConfig) -> Self {
		let view = SessionView::new();
		let inner = Rc::new(RefCell::new(Inner {
			controller: SessionController::new(config),
			transport: None,
			view,
		}));
		dispatch(&inner, SessionController::start);
		Self {
			inner: StoredValue::new_local(inner),
			view,
		}
	}

	fn run(&self, f: impl FnOnce(&mut SessionController) -> Vec<SessionEffect>) {
		if let Some(inner) = self.inner.try_get_value() {
			dispatch(&inner, f);
		}
	}

	/// Request the graph at a history index.
	pub fn select_history(&self, index: usize) {
		self.run(|c| c.select_history(index));
	}

	/// Request the diff between two history indices.
	pub fn request_diff(&self, old_index: usize, new_index: usize) {
		self.run(|c| c.request_diff(old_index, new_index));
	}

	/// Request the history list again.
	pub fn request_history(&self) {
		self.run(SessionController::request_history);
	}
}

fn dispatch(
	inner: &Rc<RefCell<Inner>>,
	f: impl FnOnce(&mut SessionController) -> Vec<SessionEffect>,
) {
	let effects = f(&mut inner.borrow_mut().controller);
	for effect in effects {
		apply(inner, effect);
	}
}

fn sink_for(inner: Weak<RefCell<Inner>>) -> EventSink {
	Rc::new(move |event| {
		if let Some(inner) = inner.upgrade() {
			dispatch(&inner, |c| c.handle(event));
		}
	})
}

fn apply(inner: &Rc<RefCell<Inner>>, effect: SessionEffect) {
	let view = inner.borrow().view;
	match effect {
		SessionEffect::Connect(url) => match WsTransport::connect(&url, sink_for(Rc::downgrade(inner))) {
			Ok(transport) => {
				let previous = inner.borrow_mut().transport.replace(transport);
				drop(previous);
			}
			Err(e) => {
				error!("{e}");
				dispatch(inner, |c| c.handle(TransportEvent::Closed));
			}
		},
		SessionEffect::Send(message) => {
			let inner = inner.borrow();
			match &inner.transport {
				Some(transport) => {
					if let Err(e) = transport.send(&message) {
						warn!("request dropped: {e}");
					}
				}
				None => warn!("request dropped: no transport"),
			}
		}
		SessionEffect::ReleaseTransport => {
			// usually runs inside the socket's own close handler
			if let Some(transport) = inner.borrow_mut().transport.take() {
				transport.detach();
				set_timeout(move || drop(transport), Duration::ZERO);
			}
		}
		SessionEffect::ScheduleReconnect(delay) => {
			let weak = Rc::downgrade(inner);
			set_timeout(
				move || {
					if let Some(inner) = weak.upgrade() {
						dispatch(&inner, |c| c.handle(TransportEvent::ReconnectDue));
					}
				},
				delay,
			);
		}
		SessionEffect::SetStatus(status) => view.status.set(status),
		SessionEffect::ShowHistory(history) => view.history.set(history),
		SessionEffect::LoadGraph(graph) => view.incoming.set(Some(graph)),
		SessionEffect::ShowLoading(message) => view.loading.set(Some(message)),
		SessionEffect::HideLoading => view.loading.set(None),
	}
}
