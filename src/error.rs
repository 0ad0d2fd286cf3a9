//! Error type shared by the graph pipeline and the session controller.

/// Everything that can go wrong between receiving a frame and painting it.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
	/// Inbound frame was not valid JSON or carried an unknown `type`.
	#[error("malformed message: {0}")]
	Protocol(#[from] serde_json::Error),
	/// A link pointed past the end of the node list.
	#[error("link {link} references node {index} but the graph has {len} nodes")]
	NodeIndexOutOfBounds {
		/// Position of the offending link in the wire link list.
		link: usize,
		/// The out-of-range node index.
		index: usize,
		/// Number of nodes in the graph.
		len: usize,
	},
	/// The rendering surface could not measure label text.
	#[error("text measurement unavailable: {0}")]
	Measure(String),
	/// Socket construction or send failed.
	#[error("transport: {0}")]
	Transport(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ViewerError>;
