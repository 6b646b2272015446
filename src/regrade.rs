//! Whether an in-progress attempt may move to a new version of its question

use miette::Diagnostic;
use thiserror::Error;

use crate::{ItemId, SourcePool, state::Attempt};

/// Why a regrade was declined. Meant to be shown as a warning, not treated as a crash.
#[derive(Clone, Debug, Diagnostic, Eq, Error, PartialEq)]
pub enum RegradeDiagnostic {
	#[error("the number of short-answer items to draw changed from {current} to {candidate}")]
	#[diagnostic(code(samatch::regrade::sampling_width_changed), help("attempts can only move to a version that draws as many items"))]
	SamplingWidthChanged { current: usize, candidate: usize },

	#[error("the number of sub-questions changed from {current} to {candidate}")]
	#[diagnostic(code(samatch::regrade::stem_count_changed))]
	StemCountChanged { current: usize, candidate: usize },

	#[error("the number of choices changed from {current} to {candidate}")]
	#[diagnostic(code(samatch::regrade::choice_count_changed))]
	ChoiceCountChanged { current: usize, candidate: usize },

	#[error("short-answer item {0} has been deleted")]
	#[diagnostic(code(samatch::regrade::item_deleted))]
	ItemDeleted(ItemId),

	#[error("short-answer item {0} has no version ready for use")]
	#[diagnostic(code(samatch::regrade::item_not_ready), help("mark a version of the item as ready, then regrade again"))]
	ItemNotReady(ItemId),
}

/// Structural compatibility check between the attempt as stored and the attempt it would become.
///
/// Checks run in a fixed order and the first failure wins.
pub fn validate<P: SourcePool + ?Sized>(current: &Attempt, candidate: &Attempt, pool: &P) -> Option<RegradeDiagnostic> {
	if current.choose != candidate.choose {
		return Some(RegradeDiagnostic::SamplingWidthChanged {
			current: current.choose,
			candidate: candidate.choose,
		});
	}
	if current.state.stem_count() != candidate.state.stem_count() {
		return Some(RegradeDiagnostic::StemCountChanged {
			current: current.state.stem_count(),
			candidate: candidate.state.stem_count(),
		});
	}
	if current.state.choice_count() != candidate.state.choice_count() {
		return Some(RegradeDiagnostic::ChoiceCountChanged {
			current: current.state.choice_count(),
			candidate: candidate.state.choice_count(),
		});
	}
	if let Some(id) = candidate.state.stem_order.iter().find(|id| pool.get_item(**id).is_none()) {
		return Some(RegradeDiagnostic::ItemDeleted(*id));
	}
	if let Some(id) = candidate.state.stem_order.iter().find(|id| pool.latest_ready_version(**id).is_none()) {
		return Some(RegradeDiagnostic::ItemNotReady(*id));
	}
	None
}
