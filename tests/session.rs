mod common;

use std::time::Duration;

use memgraph_viewer::config::ViewerConfig;
use memgraph_viewer::graph::wire::LinkWire;
use memgraph_viewer::graph::{ClientMessage, DiffColor, DiffType, Diffed, GraphWire};
use memgraph_viewer::session::{
	ConnectionState, SessionController, SessionEffect, Severity, Status, TitledGraph,
	TransportEvent,
};

fn reconnects(effects: &[SessionEffect]) -> Vec<Duration> {
	effects
		.iter()
		.filter_map(|e| match e {
			SessionEffect::ScheduleReconnect(d) => Some(*d),
			_ => None,
		})
		.collect()
}

fn connects(effects: &[SessionEffect]) -> usize {
	effects
		.iter()
		.filter(|e| matches!(e, SessionEffect::Connect(_)))
		.count()
}

#[test]
fn close_retries_until_open() {
	let config = ViewerConfig {
		reconnect_delay: Duration::from_millis(250),
		..ViewerConfig::default()
	};
	let mut session = SessionController::new(&config);
	assert_eq!(connects(&session.start()), 1);

	for _ in 0..5 {
		let effects = session.handle(TransportEvent::Closed);
		assert!(effects.contains(&SessionEffect::SetStatus(Status::Disconnected)));
		assert_eq!(reconnects(&effects), vec![Duration::from_millis(250)]);
		assert_eq!(session.state(), ConnectionState::Disconnected);

		let effects = session.handle(TransportEvent::ReconnectDue);
		assert_eq!(connects(&effects), 1);
		assert_eq!(session.state(), ConnectionState::Connecting);
		// a late timer must not open a second socket
		assert!(session.handle(TransportEvent::ReconnectDue).is_empty());
	}

	let effects = session.handle(TransportEvent::Opened);
	assert_eq!(session.state(), ConnectionState::Connected);
	assert!(effects.contains(&SessionEffect::Send(ClientMessage::History)));
	assert_eq!(Status::Connected.severity(), Severity::Ok);
	assert_eq!(Status::Disconnected.severity().class(), "bad");
}

#[test]
fn diff_frame_reaches_the_driver_with_colours() {
	let wire = GraphWire {
		nodes: vec![
			common::value_node(&["A"]),
			common::value_node(&["B"]),
			common::value_node(&["C"]),
		],
		links: vec![
			LinkWire {
				diff_type: DiffType::Removed,
				..common::value_link(0, 1, &["next"])
			},
			LinkWire {
				diff_type: DiffType::Added,
				..common::value_link(0, 2, &["next"])
			},
			common::value_link(1, 2, &["next"]),
		],
	};
	let frame = serde_json::json!({ "type": "graph", "title": "#1 vs #2", "graph": wire }).to_string();

	let mut session = SessionController::new(&ViewerConfig::default());
	session.start();
	session.handle(TransportEvent::Opened);
	let effects = session.request_diff(1, 2);
	assert!(effects.contains(&SessionEffect::Send(ClientMessage::DiffGraph {
		old_index: 1,
		new_index: 2,
	})));

	let effects = session.handle(TransportEvent::Message(frame));
	let TitledGraph { title, graph } = effects
		.into_iter()
		.find_map(|e| match e {
			SessionEffect::LoadGraph(g) => Some(g),
			_ => None,
		})
		.unwrap();
	assert_eq!(title, "#1 vs #2");
	let colours: Vec<DiffColor> = graph.links.iter().map(|l| l.diff_color()).collect();
	assert_eq!(
		colours,
		vec![DiffColor::Removed, DiffColor::Added, DiffColor::Neutral]
	);
}

#[test]
fn unknown_message_type_keeps_connection() {
	let mut session = SessionController::new(&ViewerConfig::default());
	session.start();
	session.handle(TransportEvent::Opened);
	let effects = session.handle(TransportEvent::Message(r#"{"type":"ping"}"#.into()));
	assert!(matches!(
		effects.first(),
		Some(SessionEffect::SetStatus(Status::RenderError(_)))
	));
	assert!(!effects.contains(&SessionEffect::ReleaseTransport));
	assert_eq!(session.state(), ConnectionState::Connected);
}
