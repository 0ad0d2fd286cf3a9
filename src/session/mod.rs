//! Connection lifecycle and message dispatch.
//!
//! [`SessionController`] never touches a socket or a timer. Every input is a
//! [`TransportEvent`] or a user request, and every output is a list of
//! [`SessionEffect`]s for the runtime to carry out in order. Inbound frames are
//! validated completely (parse, index resolution, normalization) before any effect
//! that changes what is on screen is emitted.

pub mod runtime;
pub mod transport;

use std::time::Duration;

use log::{error, info, warn};

use crate::config::ViewerConfig;
use crate::graph::{self, ClientMessage, Graph, HistoryItem, ServerMessage};

/// Socket-level happenings fed into the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
	/// The socket opened.
	Opened,
	/// A text frame arrived.
	Message(String),
	/// The socket reported an error.
	Error(String),
	/// The socket closed.
	Closed,
	/// The reconnect delay elapsed.
	ReconnectDue,
}

/// Connection state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
	/// A socket is being opened.
	Connecting,
	/// The socket is open and requests go out.
	Connected,
	/// No usable socket; a reconnect may be pending.
	Disconnected,
}

/// Severity of a [`Status`], used as its CSS class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	/// Healthy.
	Ok,
	/// Transitional.
	Warn,
	/// Something failed.
	Bad,
}

impl Severity {
	/// Stylesheet class.
	pub fn class(self) -> &'static str {
		match self {
			Severity::Ok => "ok",
			Severity::Warn => "warn",
			Severity::Bad => "bad",
		}
	}
}

/// What the header status shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
	/// Opening a socket.
	Connecting,
	/// Socket open.
	Connected,
	/// Socket closed, reconnect scheduled.
	Disconnected,
	/// Socket reported an error.
	ConnectionError,
	/// A frame or graph could not be used.
	RenderError(String),
}

impl Status {
	/// Display text.
	pub fn text(&self) -> &'static str {
		match self {
			Status::Connecting => "connecting…",
			Status::Connected => "connected",
			Status::Disconnected => "disconnected — retrying",
			Status::ConnectionError => "connection error",
			Status::RenderError(_) => "error rendering graph",
		}
	}

	/// Severity.
	pub fn severity(&self) -> Severity {
		match self {
			Status::Connected => Severity::Ok,
			Status::Connecting => Severity::Warn,
			Status::Disconnected | Status::ConnectionError | Status::RenderError(_) => Severity::Bad,
		}
	}
}

/// A validated graph and the title it is shown under.
#[derive(Clone, Debug, PartialEq)]
pub struct TitledGraph {
	pub title: String,
	pub graph: Graph,
}

/// Side effects requested by the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEffect {
	/// Open a socket to the URL.
	Connect(String),
	/// Send a request on the open socket.
	Send(ClientMessage),
	/// Drop the socket handle.
	ReleaseTransport,
	/// Deliver [`TransportEvent::ReconnectDue`] after the delay.
	ScheduleReconnect(Duration),
	/// Update the status indicator.
	SetStatus(Status),
	/// Replace the history list.
	ShowHistory(Vec<HistoryItem>),
	/// Hand a validated graph to the layout driver as a fresh load. The title
	/// is shown only once the load succeeds.
	LoadGraph(TitledGraph),
	/// Show the loading overlay with a message.
	ShowLoading(String),
	/// Hide the loading overlay.
	HideLoading,
}

/// Session state shared by the message handlers and the user-request handlers.
#[derive(Debug)]
pub struct SessionController {
	url: String,
	reconnect_delay: Duration,
	state: ConnectionState,
	reconnect_pending: bool,
	history: Vec<HistoryItem>,
	selected: Option<usize>,
}

impl SessionController {
	/// A controller that has not connected yet.
	pub fn new(config: &ViewerConfig) -> Self {
		Self {
			url: config.ws_url.clone(),
			reconnect_delay: config.reconnect_delay,
			state: ConnectionState::Disconnected,
			reconnect_pending: false,
			history: Vec::new(),
			selected: None,
		}
	}

	/// Current connection state.
	pub fn state(&self) -> ConnectionState {
		self.state
	}

	/// The last history list received.
	pub fn history(&self) -> &[HistoryItem] {
		&self.history
	}

	/// History index last requested by the user.
	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	/// Open the first connection.
	pub fn start(&mut self) -> Vec<SessionEffect> {
		self.connect()
	}

	fn connect(&mut self) -> Vec<SessionEffect> {
		self.state = ConnectionState::Connecting;
		self.reconnect_pending = false;
		info!("connecting to {}", self.url);
		vec![
			SessionEffect::SetStatus(Status::Connecting),
			SessionEffect::Connect(self.url.clone()),
		]
	}

	/// Feed one transport event.
	pub fn handle(&mut self, event: TransportEvent) -> Vec<SessionEffect> {
		match event {
			TransportEvent::Opened => {
				self.state = ConnectionState::Connected;
				info!("connected to {}", self.url);
				vec![
					SessionEffect::SetStatus(Status::Connected),
					SessionEffect::Send(ClientMessage::History),
				]
			}
			TransportEvent::Message(text) => self.on_message(&text),
			TransportEvent::Error(reason) => {
				warn!("transport error: {reason}");
				self.state = ConnectionState::Disconnected;
				vec![SessionEffect::SetStatus(Status::ConnectionError)]
			}
			TransportEvent::Closed => {
				self.state = ConnectionState::Disconnected;
				let mut effects = vec![
					SessionEffect::SetStatus(Status::Disconnected),
					SessionEffect::ReleaseTransport,
				];
				if !self.reconnect_pending {
					self.reconnect_pending = true;
					info!("reconnecting in {:?}", self.reconnect_delay);
					effects.push(SessionEffect::ScheduleReconnect(self.reconnect_delay));
				}
				effects
			}
			TransportEvent::ReconnectDue => {
				if self.state == ConnectionState::Disconnected && self.reconnect_pending {
					self.connect()
				} else {
					Vec::new()
				}
			}
		}
	}

	fn on_message(&mut self, text: &str) -> Vec<SessionEffect> {
		let message = match ServerMessage::parse(text) {
			Ok(message) => message,
			Err(e) => {
				error!("invalid message: {e}");
				return vec![
					SessionEffect::SetStatus(Status::RenderError(e.to_string())),
					SessionEffect::HideLoading,
				];
			}
		};

		match message {
			ServerMessage::History { history } => {
				self.history = history.clone();
				vec![SessionEffect::ShowHistory(history)]
			}
			ServerMessage::Graph {
				title,
				graph: wire,
				history,
			} => {
				let graph = match graph::load(wire) {
					Ok(graph) => graph,
					Err(e) => {
						error!("rejecting graph {title}: {e}");
						return vec![
							SessionEffect::SetStatus(Status::RenderError(e.to_string())),
							SessionEffect::HideLoading,
						];
					}
				};
				let mut effects = Vec::with_capacity(2);
				if let Some(history) = history {
					self.history = history.clone();
					effects.push(SessionEffect::ShowHistory(history));
				}
				effects.push(SessionEffect::LoadGraph(TitledGraph { title, graph }));
				effects
			}
		}
	}

	fn request(&mut self, message: ClientMessage) -> Vec<SessionEffect> {
		if self.state != ConnectionState::Connected {
			warn!("dropping {message:?}: not connected");
			return Vec::new();
		}
		vec![
			SessionEffect::ShowLoading("Loading graph…".into()),
			SessionEffect::Send(message),
		]
	}

	/// User picked a history entry.
	pub fn select_history(&mut self, index: usize) -> Vec<SessionEffect> {
		self.selected = Some(index);
		self.request(ClientMessage::Graph { index })
	}

	/// User asked to compare two history entries.
	pub fn request_diff(&mut self, old_index: usize, new_index: usize) -> Vec<SessionEffect> {
		self.request(ClientMessage::DiffGraph {
			old_index,
			new_index,
		})
	}

	/// Ask for the history list again.
	pub fn request_history(&mut self) -> Vec<SessionEffect> {
		if self.state != ConnectionState::Connected {
			warn!("dropping history request: not connected");
			return Vec::new();
		}
		vec![SessionEffect::Send(ClientMessage::History)]
	}
}
