//! Diff classification to colour.

use super::model::{DiffType, Link, LinkLabel, Node};

/// Colour channel for one diff classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffColor {
	/// Unchanged entity.
	Neutral,
	/// Entity only in the baseline.
	Removed,
	/// Entity only in the compared snapshot.
	Added,
}

impl DiffColor {
	/// Every reachable colour.
	pub const ALL: [DiffColor; 3] = [DiffColor::Neutral, DiffColor::Removed, DiffColor::Added];

	/// Stylesheet custom property holding the colour.
	pub fn css_var(self) -> &'static str {
		match self {
			DiffColor::Neutral => "--color-btn-primary-bg-hover",
			DiffColor::Removed => "--color-ok-text",
			DiffColor::Added => "--color-bad-text",
		}
	}

	/// Used when the stylesheet does not define [`Self::css_var`].
	pub fn fallback(self) -> &'static str {
		match self {
			DiffColor::Neutral => "#64b4ff",
			DiffColor::Removed => "#3fb950",
			DiffColor::Added => "#f85149",
		}
	}
}

impl From<DiffType> for DiffColor {
	fn from(diff: DiffType) -> Self {
		match diff {
			DiffType::Unchanged => DiffColor::Neutral,
			DiffType::Removed => DiffColor::Removed,
			DiffType::Added => DiffColor::Added,
		}
	}
}

/// Anything carrying its own diff classification.
pub trait Diffed {
	/// The entity's classification.
	fn diff_type(&self) -> DiffType;

	/// The entity's colour.
	fn diff_color(&self) -> DiffColor {
		self.diff_type().into()
	}
}

impl Diffed for Node {
	fn diff_type(&self) -> DiffType {
		self.diff_type
	}
}

impl Diffed for Link {
	fn diff_type(&self) -> DiffType {
		self.diff_type
	}
}

impl Diffed for LinkLabel {
	fn diff_type(&self) -> DiffType {
		self.diff_type
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::LinkId;

	#[test]
	fn three_way_mapping() {
		assert_eq!(DiffColor::from(DiffType::Unchanged), DiffColor::Neutral);
		assert_eq!(DiffColor::from(DiffType::Removed), DiffColor::Removed);
		assert_eq!(DiffColor::from(DiffType::Added), DiffColor::Added);
	}

	#[test]
	fn tokens_are_distinct() {
		let vars: std::collections::HashSet<_> = DiffColor::ALL.iter().map(|c| c.css_var()).collect();
		assert_eq!(vars.len(), 3);
	}

	#[test]
	fn label_colour_is_independent_of_its_link() {
		let label = LinkLabel {
			label: "next".into(),
			diff_type: DiffType::Added,
			link: LinkId(0),
		};
		assert_eq!(label.diff_color(), DiffColor::Added);
	}
}
