//! Error taxonomy of the library
//!
//! Every variant is deterministic in its inputs, so none of them is worth retrying.

use miette::Diagnostic;
use thiserror::Error;

use crate::{AnswerId, ItemId, regrade::RegradeDiagnostic};

#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum SampleError {
	#[error("asked for {requested} short-answer items but the pool only holds {available}")]
	#[diagnostic(code(samatch::sample::insufficient_pool), help("lower `choose` or add short-answer items to the candidate pool"))]
	InsufficientPool { requested: usize, available: usize },
}

#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum ChoiceError {
	#[error("short-answer item {0} has no answer that is not graded as incorrect")]
	#[diagnostic(code(samatch::choice::no_correct_answer), help("every candidate item needs at least one answer with a positive grade"))]
	NoCorrectAnswer(ItemId),
}

/// Faults found while reading or checking attempt state at the store boundary
#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum StateError {
	#[error("attempt store has no value for `{0}`")]
	#[diagnostic(code(samatch::state::missing_key))]
	MissingKey(String),

	#[error("attempt store value `{value}` under `{key}` is malformed")]
	#[diagnostic(code(samatch::state::invalid_value))]
	InvalidValue { key: String, value: String },

	#[error("attempt has no stems")]
	#[diagnostic(code(samatch::state::empty_stem_order))]
	EmptyStemOrder,

	#[error("stem {0} is listed more than once")]
	#[diagnostic(code(samatch::state::duplicate_stem))]
	DuplicateStem(ItemId),

	#[error("stem {0} is listed in the stem order but has no stem record")]
	#[diagnostic(code(samatch::state::missing_stem))]
	MissingStem(ItemId),

	#[error("stem {0} has a record but is not listed in the stem order")]
	#[diagnostic(code(samatch::state::unlisted_stem))]
	UnlistedStem(ItemId),

	#[error("choice {0} is listed more than once")]
	#[diagnostic(code(samatch::state::duplicate_choice))]
	DuplicateChoice(AnswerId),

	#[error("choice {0} is listed in the choice order but has no text")]
	#[diagnostic(code(samatch::state::missing_choice))]
	MissingChoice(AnswerId),

	#[error("stem {stem} points at choice {right}, which is not in the choice order")]
	#[diagnostic(code(samatch::state::dangling_right))]
	DanglingRight { stem: ItemId, right: AnswerId },
}

#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum AttemptError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Sample(#[from] SampleError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Choice(#[from] ChoiceError),

	#[error("short-answer item {0} is not in the pool")]
	#[diagnostic(code(samatch::attempt::missing_item))]
	MissingItem(ItemId),

	#[error(transparent)]
	#[diagnostic(transparent)]
	State(#[from] StateError),
}

#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum RemapError {
	/// The validator declined the regrade. Expected, and the attempt is untouched.
	#[error("regrade declined: {0}")]
	#[diagnostic(transparent)]
	Rejected(#[from] RegradeDiagnostic),

	#[error("no ready version in the lineage of item {0}")]
	#[diagnostic(code(samatch::remap::no_ready_version), help("the attempt stays on its previous versions"))]
	NoReadyVersion(ItemId),

	#[error("item {0} was resolved as the latest ready version but could not be loaded")]
	#[diagnostic(code(samatch::remap::missing_item))]
	MissingItem(ItemId),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Choice(#[from] ChoiceError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	State(#[from] StateError),
}
