use std::{fmt, num::ParseIntError, str::FromStr};

use derive_new::new;
use serde::{Deserialize, Serialize};

pub mod choices;
pub mod config;
pub mod error;
pub mod grade;
pub mod matching;
pub mod pool;
pub mod question;
pub mod regrade;
pub mod remap;
pub mod sampler;
pub mod state;

pub use choices::{ChoiceSet, derive_choice};
pub use grade::GradedState;
pub use pool::{MemoryPool, SourcePool, VersionRef};
pub use question::{RandomShortAnswerMatch, StemSource, start_attempt};
pub use regrade::{RegradeDiagnostic, validate};
pub use remap::{RemapPhase, VersionRemapper};
pub use state::{Attempt, AttemptState, AttemptStore, StepData};

macro_rules! numeric_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
		#[serde(transparent)]
		pub struct $name(pub u64);

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = ParseIntError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.trim().parse().map($name)
			}
		}

		impl From<u64> for $name {
			fn from(value: u64) -> Self {
				$name(value)
			}
		}
	};
}

numeric_id! {
	/// Id of one version of a short-answer item in the source pool
	ItemId
}

numeric_id! {
	/// Id of a short-answer answer. Doubles as the key of the choice it introduces.
	AnswerId
}

/// How a piece of item text is marked up
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TextFormat {
	Moodle,
	#[default]
	Html,
	Plain,
	Markdown,
}

impl TextFormat {
	/// Integer code used by the attempt store
	pub fn code(self) -> u8 {
		match self {
			TextFormat::Moodle => 0,
			TextFormat::Html => 1,
			TextFormat::Plain => 2,
			TextFormat::Markdown => 4,
		}
	}

	/// Whether text in this format may carry markup that has to be stripped for plain-text summaries
	pub fn is_markup(self) -> bool {
		matches!(self, TextFormat::Moodle | TextFormat::Html)
	}
}

impl TryFrom<u8> for TextFormat {
	type Error = String;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		match code {
			0 => Ok(TextFormat::Moodle),
			1 => Ok(TextFormat::Html),
			2 => Ok(TextFormat::Plain),
			4 => Ok(TextFormat::Markdown),
			other => Err(format!("unknown text format code {other}")),
		}
	}
}

impl From<TextFormat> for u8 {
	fn from(format: TextFormat) -> Self {
		format.code()
	}
}

/// One accepted (or rejected) answer of a short-answer item
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, new)]
pub struct Answer {
	pub id: AnswerId,
	/// The answer text as the student would type it
	pub text: String,
	/// Grade fraction awarded for this answer, in `[0, 1]`
	pub fraction: f64,
}

/// An immutable short-answer item, one version of its lineage
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, new)]
pub struct Item {
	pub id: ItemId,
	/// The question text, shown as the stem of a matching pair
	pub text: String,
	#[serde(default)]
	pub format: TextFormat,
	/// Answers in the order the author listed them
	pub answers: Vec<Answer>,
}

/// The prompt side of one matching pair
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, new)]
pub struct Stem {
	/// The item version this stem was captured from
	pub item: ItemId,
	pub text: String,
	pub format: TextFormat,
	/// Key of the choice that answers this stem
	pub right: AnswerId,
}

impl fmt::Display for Stem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.item, self.text)
	}
}
