//! Viewer tunables and their query-string overrides.

use std::time::Duration;

use log::warn;
use serde::Deserialize;

/// Iteration budget for the three phases of the constraint layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvergenceSchedule {
	/// Iterations with plain forces only.
	pub unconstrained: u32,
	/// Iterations that also enforce link lengths.
	pub link_constrained: u32,
	/// Iterations that enforce link lengths and node non-overlap.
	pub overlap_constrained: u32,
}

impl ConvergenceSchedule {
	/// Total iterations before the engine reports convergence.
	pub fn total(&self) -> u32 {
		self.unconstrained + self.link_constrained + self.overlap_constrained
	}
}

impl Default for ConvergenceSchedule {
	fn default() -> Self {
		Self {
			unconstrained: 25,
			link_constrained: 50,
			overlap_constrained: 50,
		}
	}
}

/// Geometry constants consumed by the sizing and per-tick passes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
	/// Space kept between a node's constraint box and its drawn box.
	pub node_margin: f64,
	/// Space between the drawn box and the label glyphs.
	pub node_pad: f64,
	/// Extra length added to every link.
	pub link_pad: f64,
	/// Room left for the arrowhead before the target box.
	pub arrow_clearance: f64,
	/// Label font size in pixels.
	pub font_px: f64,
	/// Line advance as a multiple of `font_px`.
	pub line_height_em: f64,
	/// How far forward labels sit above their line.
	pub forward_label_lift: f64,
	/// Base gap between a line and its backward labels.
	pub backward_label_drop: f64,
}

impl GeometryConfig {
	/// Pixel advance between stacked label lines.
	pub fn line_height(&self) -> f64 {
		self.font_px * self.line_height_em
	}
}

impl Default for GeometryConfig {
	fn default() -> Self {
		Self {
			node_margin: 4.0,
			node_pad: 8.0,
			link_pad: 10.0,
			arrow_clearance: 5.0,
			font_px: 14.0,
			line_height_em: 1.2,
			forward_label_lift: 3.5,
			backward_label_drop: 2.5,
		}
	}
}

/// Everything the viewer needs to know before it connects.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// WebSocket endpoint of the snapshot server.
	pub ws_url: String,
	/// Fixed delay before every reconnect attempt.
	#[serde(with = "millis")]
	pub reconnect_delay: Duration,
	/// Layout geometry.
	pub geometry: GeometryConfig,
	/// Iteration phases of the engine.
	pub schedule: ConvergenceSchedule,
	/// Keep ticking forever instead of settling.
	pub continuous: bool,
	/// Ask the engine to keep node boxes apart.
	pub avoid_overlaps: bool,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			ws_url: "ws://localhost:8765".into(),
			reconnect_delay: Duration::from_millis(1000),
			geometry: GeometryConfig::default(),
			schedule: ConvergenceSchedule::default(),
			continuous: false,
			avoid_overlaps: true,
		}
	}
}

impl ViewerConfig {
	/// Apply overrides from a location search string such as `?ws=ws://host:1&reconnect_ms=500`.
	pub fn from_query(search: &str) -> Self {
		let mut config = Self::default();
		let query = search.strip_prefix('?').unwrap_or(search);
		for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
			match key.as_ref() {
				"ws" => config.ws_url = value.into_owned(),
				"reconnect_ms" => match value.parse::<u64>() {
					Ok(ms) => config.reconnect_delay = Duration::from_millis(ms),
					Err(_) => warn!("ignoring reconnect_ms={value}"),
				},
				"continuous" => config.continuous = matches!(value.as_ref(), "1" | "true"),
				"overlaps" => config.avoid_overlaps = !matches!(value.as_ref(), "0" | "false"),
				"font_px" => match value.parse::<f64>() {
					Ok(px) if px > 0.0 => config.geometry.font_px = px,
					_ => warn!("ignoring font_px={value}"),
				},
				_ => {}
			}
		}
		config
	}
}

mod millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
		u64::deserialize(d).map(Duration::from_millis)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_viewer_constants() {
		let config = ViewerConfig::default();
		assert_eq!(config.ws_url, "ws://localhost:8765");
		assert_eq!(config.reconnect_delay, Duration::from_secs(1));
		assert_eq!(config.schedule.total(), 125);
		assert_eq!(config.geometry.node_margin, 4.0);
		assert_eq!(config.geometry.node_pad, 8.0);
		assert_eq!(config.geometry.link_pad, 10.0);
	}

	#[test]
	fn query_overrides_known_keys() {
		let config = ViewerConfig::from_query("?ws=ws%3A%2F%2F10.0.0.2%3A9000&reconnect_ms=250&continuous=1");
		assert_eq!(config.ws_url, "ws://10.0.0.2:9000");
		assert_eq!(config.reconnect_delay, Duration::from_millis(250));
		assert!(config.continuous);
		assert!(config.avoid_overlaps);
	}

	#[test]
	fn bad_values_keep_defaults() {
		let config = ViewerConfig::from_query("reconnect_ms=soon&font_px=-3&what=ever");
		assert_eq!(config, ViewerConfig::default());
	}

	#[test]
	fn deserializes_partial_json() {
		let config: ViewerConfig =
			serde_json::from_str(r#"{"reconnect_delay": 40, "geometry": {"link_pad": 2}}"#).unwrap();
		assert_eq!(config.reconnect_delay, Duration::from_millis(40));
		assert_eq!(config.geometry.link_pad, 2.0);
		assert_eq!(config.geometry.node_pad, 8.0);
	}
}
