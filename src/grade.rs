use serde::{Deserialize, Serialize};

/// Fractions within this distance of 0 or 1 count as exactly wrong or right
const FRACTION_TOLERANCE: f64 = 0.000001;

/// Semantic grade bucket a fraction falls into
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GradedState {
	Right,
	Partial,
	Wrong,
}

impl GradedState {
	pub fn for_fraction(fraction: f64) -> Self {
		if fraction < FRACTION_TOLERANCE {
			GradedState::Wrong
		} else if fraction > 1.0 - FRACTION_TOLERANCE {
			GradedState::Right
		} else {
			GradedState::Partial
		}
	}

	/// The lowest bucket. An answer in it never becomes a choice.
	pub fn is_incorrect(self) -> bool {
		self == GradedState::Wrong
	}

	pub fn name(self) -> &'static str {
		match self {
			GradedState::Right => "gradedright",
			GradedState::Partial => "gradedpartial",
			GradedState::Wrong => "gradedwrong",
		}
	}
}
