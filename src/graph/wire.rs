//! JSON frames exchanged with the snapshot server.

use serde::{Deserialize, Serialize};

use super::model::{DiffType, Tag};

/// A node as shipped by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeWire {
	/// Stable node identity.
	pub id: String,
	/// Label lines, rendered stacked.
	pub label: Vec<String>,
	/// Name binding or runtime value.
	pub tag: Tag,
	/// Diff classification, absent outside diff views.
	#[serde(default)]
	pub diff_type: DiffType,
}

/// One field name riding on a link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelWire {
	/// Field or attribute text.
	pub label: String,
	/// Diff classification of this label alone.
	#[serde(default)]
	pub diff_type: DiffType,
}

/// A link whose endpoints are positions in [`GraphWire::nodes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkWire {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Name binding or value reference.
	pub tag: Tag,
	/// Diff classification of the link itself.
	#[serde(default)]
	pub diff_type: DiffType,
	/// Labels read in source→target direction.
	#[serde(default)]
	pub forward_labels: Vec<LabelWire>,
	/// Labels read in target→source direction.
	#[serde(default)]
	pub backward_labels: Vec<LabelWire>,
}

/// Index-based graph payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphWire {
	/// Nodes, addressed by position.
	pub nodes: Vec<NodeWire>,
	/// Links referencing nodes by position.
	pub links: Vec<LinkWire>,
}

/// Where a snapshot was captured.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLabel {
	/// Source file.
	pub filename: String,
	/// One-based line.
	pub line: u32,
	/// One-based column.
	pub column: u32,
	/// Enclosing function.
	pub function_name: String,
	/// Free-text description.
	#[serde(default)]
	pub desc: Option<String>,
}

impl HistoryLabel {
	/// `file:line:column` for display.
	pub fn location(&self) -> String {
		format!("{}:{}:{}", self.filename, self.line, self.column)
	}
}

/// One recorded snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
	/// Stable position in the recorded session.
	pub index: usize,
	/// Source-location metadata.
	pub label: HistoryLabel,
}

/// Frames sent by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
	/// Full replacement of the history list.
	History {
		/// Recorded snapshots, newest first.
		history: Vec<HistoryItem>,
	},
	/// A graph to display, optionally with a fresh history.
	Graph {
		/// Header text.
		title: String,
		/// The graph itself.
		graph: GraphWire,
		/// Replacement history, if the server attached one.
		#[serde(default)]
		history: Option<Vec<HistoryItem>>,
	},
}

impl ServerMessage {
	/// Parse one text frame.
	pub fn parse(text: &str) -> crate::Result<Self> {
		Ok(serde_json::from_str(text)?)
	}
}

/// Requests sent to the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
	/// Ask for the history list.
	History,
	/// Ask for the snapshot at `index`.
	Graph {
		/// History index.
		index: usize,
	},
	/// Ask for the diff between two snapshots.
	DiffGraph {
		/// Baseline snapshot.
		old_index: usize,
		/// Compared snapshot.
		new_index: usize,
	},
}

impl ClientMessage {
	/// Encode as a text frame.
	pub fn to_json(&self) -> String {
		// A tagged enum of integers cannot fail to serialize.
		serde_json::to_string(self).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_graph_frame_with_null_history() {
		let text = r##"{
			"type": "graph",
			"title": "#3",
			"graph": {
				"nodes": [
					{"id": "NAMEhead", "label": ["head"], "tag": "name"},
					{"id": "ADDR1", "label": ["val: 1", "next: 0x2"], "tag": "value"}
				],
				"links": [
					{"source": 0, "target": 1, "tag": "name", "diff_type": "",
					 "forward_labels": [], "backward_labels": []}
				]
			},
			"history": null
		}"##;
		let ServerMessage::Graph { title, graph, history } = ServerMessage::parse(text).unwrap() else {
			panic!("expected graph frame");
		};
		assert_eq!(title, "#3");
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.nodes[1].label.len(), 2);
		assert_eq!(graph.links[0].tag, Tag::Name);
		assert!(history.is_none());
	}

	#[test]
	fn parses_history_frame() {
		let text = r#"{"type":"history","history":[
			{"index":1,"label":{"filename":"list.cpp","line":12,"column":5,"function_name":"reverse","desc":"after swap"}},
			{"index":0,"label":{"filename":"list.cpp","line":3,"column":1,"function_name":"main"}}
		]}"#;
		let ServerMessage::History { history } = ServerMessage::parse(text).unwrap() else {
			panic!("expected history frame");
		};
		assert_eq!(history[0].label.location(), "list.cpp:12:5");
		assert_eq!(history[0].label.desc.as_deref(), Some("after swap"));
		assert_eq!(history[1].label.desc, None);
	}

	#[test]
	fn rejects_unknown_type() {
		let err = ServerMessage::parse(r#"{"type":"bogus"}"#).unwrap_err();
		assert!(matches!(err, crate::ViewerError::Protocol(_)));
	}

	#[test]
	fn client_requests_encode_with_type_tag() {
		assert_eq!(ClientMessage::History.to_json(), r#"{"type":"history"}"#);
		assert_eq!(ClientMessage::Graph { index: 4 }.to_json(), r#"{"type":"graph","index":4}"#);
		assert_eq!(
			ClientMessage::DiffGraph { old_index: 1, new_index: 2 }.to_json(),
			r#"{"type":"diff_graph","old_index":1,"new_index":2}"#
		);
	}
}
