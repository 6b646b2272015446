//! Moving an in-progress attempt onto the latest ready versions of its short-answer items
//!
//! The remapped attempt is built as a fresh [`AttemptState`] from the old one and only swapped into the
//! store once it is complete, so a failure at any point leaves the stored attempt as it was.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
	AnswerId, ChoiceSet, ItemId, SourcePool, Stem,
	choices::derive_choice,
	error::{RemapError, StateError},
	regrade::{RegradeDiagnostic, validate},
	state::{Attempt, AttemptState, AttemptStore},
};

/// Where a [`VersionRemapper`] is, or where its last run stopped
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RemapPhase {
	#[default]
	Idle,
	Validating,
	Remapping,
	Done,
	Rejected,
}

#[derive(Debug)]
pub struct VersionRemapper<'a, P: SourcePool + ?Sized> {
	pool: &'a P,
	phase: RemapPhase,
}

impl<'a, P: SourcePool + ?Sized> VersionRemapper<'a, P> {
	pub fn new(pool: &'a P) -> Self {
		Self { pool, phase: RemapPhase::Idle }
	}

	pub fn phase(&self) -> RemapPhase {
		self.phase
	}

	/// Moves the stored attempt onto the latest ready versions of its items, for a question that now draws
	/// `choose` items.
	///
	/// The remapped attempt is built first, without touching `store`, and it is what gets validated against
	/// the stored one. Only an attempt that passes validation is saved; on any error the store is not
	/// written to.
	pub fn regrade<S: AttemptStore + ?Sized>(&mut self, store: &mut S, choose: usize) -> Result<AttemptState, RemapError> {
		self.phase = RemapPhase::Validating;
		let current = Attempt::load(store)?;
		if current.choose != choose {
			return Err(self.reject(RegradeDiagnostic::SamplingWidthChanged { current: current.choose, candidate: choose }));
		}
		let candidate = Attempt::new(choose, self.remap_state(&current.state)?);
		if let Some(diagnostic) = validate(&current, &candidate, self.pool) {
			return Err(self.reject(diagnostic));
		}

		self.phase = RemapPhase::Remapping;
		candidate.save(store);
		self.phase = RemapPhase::Done;

		tracing::info!(stems = candidate.state.stem_count(), choices = candidate.state.choice_count(), "attempt moved to latest versions");
		Ok(candidate.state)
	}

	fn reject(&mut self, diagnostic: RegradeDiagnostic) -> RemapError {
		self.phase = RemapPhase::Rejected;
		tracing::warn!(%diagnostic, "regrade declined");
		RemapError::Rejected(diagnostic)
	}

	/// Re-resolves every stem to its latest ready version and patches choices to match.
	///
	/// Stems whose version did not change are carried over as they are. Stems that moved get their
	/// text and right choice from the new version, with the choice derived against the choices
	/// collected so far, so unchanged answer text keeps its old key.
	pub fn remap_state(&self, old: &AttemptState) -> Result<AttemptState, RemapError> {
		let mut choices = old.choices.clone();
		let mut moved: BTreeMap<AnswerId, Vec<AnswerId>> = BTreeMap::new();
		let mut stem_order = Vec::with_capacity(old.stem_order.len());
		let mut stems = BTreeMap::new();

		for &id in &old.stem_order {
			let stem = old.stems.get(&id).ok_or(StateError::MissingStem(id))?;
			let latest = self.pool.latest_ready_version(id).ok_or(RemapError::NoReadyVersion(id))?;
			if latest == id {
				stem_order.push(id);
				stems.insert(id, stem.clone());
				continue;
			}

			let item = self.pool.get_item(latest).ok_or(RemapError::MissingItem(latest))?;
			let right = derive_choice(item, &mut choices)?;
			tracing::debug!(from = %id, to = %latest, old_choice = %stem.right, new_choice = %right, "stem moved to new version");
			moved.entry(stem.right).or_default().push(right);
			stem_order.push(latest);
			stems.insert(latest, Stem::new(latest, item.text.clone(), item.format, right));
		}

		let choice_order = patch_choice_order(&old.choice_order, &moved, &stems);
		let choices: ChoiceSet = choice_order.iter().filter_map(|key| choices.get(*key).map(|text| (*key, text.to_owned()))).collect();

		let next = AttemptState {
			stem_order,
			stems,
			choice_order,
			choices,
		};
		next.check()?;
		Ok(next)
	}
}

/// Replaces moved choice keys in place.
///
/// A moved key is kept (with its successors right after it) while some stem still points at it, and a
/// successor that already had its own slot keeps that slot.
fn patch_choice_order(old_order: &[AnswerId], moved: &BTreeMap<AnswerId, Vec<AnswerId>>, stems: &BTreeMap<ItemId, Stem>) -> Vec<AnswerId> {
	let referenced: BTreeSet<AnswerId> = stems.values().map(|stem| stem.right).collect();
	let mut order: Vec<AnswerId> = Vec::with_capacity(old_order.len());
	let mut push = |key: AnswerId| {
		if !order.contains(&key) {
			order.push(key);
		}
	};

	for &key in old_order {
		let Some(successors) = moved.get(&key) else {
			push(key);
			continue;
		};
		if referenced.contains(&key) {
			push(key);
		}
		for &next in successors.iter().filter(|next| !old_order.contains(next)) {
			push(next);
		}
	}
	order
}
