//! Browser WebSocket bound to a [`TransportEvent`] sink.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use super::TransportEvent;
use crate::error::{Result, ViewerError};
use crate::graph::ClientMessage;

/// Receives socket events in arrival order.
pub type EventSink = Rc<dyn Fn(TransportEvent)>;

/// An open (or opening) socket and the handlers keeping it wired to a sink.
///
/// Dropping the transport detaches every handler before closing, so a released
/// socket can never report into the session again. The handler closures are freed
/// with it, so it must not be dropped from inside one of them; see [`Self::detach`].
pub struct WsTransport {
	socket: WebSocket,
	released: Rc<Cell<bool>>,
	_on_open: Closure<dyn FnMut(Event)>,
	_on_message: Closure<dyn FnMut(MessageEvent)>,
	_on_error: Closure<dyn FnMut(ErrorEvent)>,
	_on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl WsTransport {
	/// Open a socket to `url`.
	pub fn connect(url: &str, sink: EventSink) -> Result<Self> {
		let socket =
			WebSocket::new(url).map_err(|e| ViewerError::Transport(format!("{url}: {e:?}")))?;
		let released = Rc::new(Cell::new(false));

		let (sink_open, released_open) = (sink.clone(), released.clone());
		let on_open = Closure::wrap(Box::new(move |_: Event| {
			if !released_open.get() {
				sink_open(TransportEvent::Opened);
			}
		}) as Box<dyn FnMut(Event)>);
		socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

		let (sink_message, released_message) = (sink.clone(), released.clone());
		let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
			if released_message.get() {
				return;
			}
			match e.data().as_string() {
				Some(text) => sink_message(TransportEvent::Message(text)),
				None => debug!("ignoring non-text frame"),
			}
		}) as Box<dyn FnMut(MessageEvent)>);
		socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

		let (sink_error, released_error) = (sink.clone(), released.clone());
		let on_error = Closure::wrap(Box::new(move |e: ErrorEvent| {
			if !released_error.get() {
				sink_error(TransportEvent::Error(e.message()));
			}
		}) as Box<dyn FnMut(ErrorEvent)>);
		socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

		let released_close = released.clone();
		let on_close = Closure::wrap(Box::new(move |_: CloseEvent| {
			if !released_close.get() {
				sink(TransportEvent::Closed);
			}
		}) as Box<dyn FnMut(CloseEvent)>);
		socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

		Ok(Self {
			socket,
			released,
			_on_open: on_open,
			_on_message: on_message,
			_on_error: on_error,
			_on_close: on_close,
		})
	}

	/// Send one request.
	pub fn send(&self, message: &ClientMessage) -> Result<()> {
		if self.socket.ready_state() != WebSocket::OPEN {
			return Err(ViewerError::Transport("socket is not open".into()));
		}
		self.socket
			.send_with_str(&message.to_json())
			.map_err(|e| ViewerError::Transport(format!("{e:?}")))
	}

	/// Stop reporting events. Safe to call from inside one of the socket's own handlers.
	pub fn detach(&self) {
		self.released.set(true);
		self.socket.set_onopen(None);
		self.socket.set_onmessage(None);
		self.socket.set_onerror(None);
		self.socket.set_onclose(None);
	}
}

impl Drop for WsTransport {
	fn drop(&mut self) {
		self.detach();
		let _ = self.socket.close();
	}
}
