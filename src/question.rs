//! Random short-answer matching: a matching question whose stems are drawn from short-answer items

use derive_new::new;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
	ChoiceSet, ItemId, SourcePool, Stem, TextFormat,
	choices::derive_choice,
	error::AttemptError,
	sampler::sample,
	state::{Attempt, AttemptState, AttemptStore},
};

/// Anything that can produce the stems and choices of a fresh matching attempt
pub trait StemSource {
	fn draw<P: SourcePool + ?Sized, R: Rng + ?Sized>(&self, pool: &P, rng: &mut R) -> Result<(Vec<Stem>, ChoiceSet), AttemptError>;

	/// How many stems each attempt draws
	fn choose(&self) -> usize;

	/// Whether stems are shown in a random order rather than the drawn one
	fn shuffle_stems(&self) -> bool;
}

/// Definition of a random short-answer matching question
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, new)]
pub struct RandomShortAnswerMatch {
	pub question_text: String,
	#[serde(default)]
	pub format: TextFormat,
	/// How many short-answer items each attempt draws
	pub choose: usize,
	/// Short-answer items eligible for drawing. Each one stands for its lineage and is drawn at the
	/// lineage's latest ready version; lineages with no ready version are skipped.
	pub candidates: Vec<ItemId>,
	#[serde(default = "default_shuffle_stems")]
	pub shuffle_stems: bool,
}

fn default_shuffle_stems() -> bool {
	true
}

impl RandomShortAnswerMatch {
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

impl StemSource for RandomShortAnswerMatch {
	fn draw<P: SourcePool + ?Sized, R: Rng + ?Sized>(&self, pool: &P, rng: &mut R) -> Result<(Vec<Stem>, ChoiceSet), AttemptError> {
		let ready: Vec<ItemId> = self.candidates.iter().filter_map(|id| pool.latest_ready_version(*id)).collect();
		if ready.len() < self.candidates.len() {
			tracing::debug!(candidates = self.candidates.len(), ready = ready.len(), "skipped candidates with no ready version");
		}
		let ids = sample(&ready, self.choose, rng)?;

		let mut choices = ChoiceSet::new();
		let mut stems = Vec::with_capacity(ids.len());
		for id in ids {
			let item = pool.get_item(id).ok_or(AttemptError::MissingItem(id))?;
			let right = derive_choice(item, &mut choices)?;
			stems.push(Stem::new(item.id, item.text.clone(), item.format, right));
		}
		Ok((stems, choices))
	}

	fn choose(&self) -> usize {
		self.choose
	}

	fn shuffle_stems(&self) -> bool {
		self.shuffle_stems
	}
}

/// Starts an attempt at `question` and saves it, together with the sampling width, into `store`.
///
/// Nothing is written unless the whole attempt could be built.
pub fn start_attempt<Q, P, R, S>(question: &Q, pool: &P, rng: &mut R, shuffle_choices: bool, store: &mut S) -> Result<AttemptState, AttemptError>
where
	Q: StemSource + ?Sized,
	P: SourcePool + ?Sized,
	R: Rng + ?Sized,
	S: AttemptStore + ?Sized,
{
	let (stems, choices) = question.draw(pool, rng)?;
	let mut state = AttemptState::from_parts(stems, choices);
	if question.shuffle_stems() {
		state.stem_order.shuffle(rng);
	}
	if shuffle_choices {
		state.choice_order.shuffle(rng);
	}
	state.check()?;
	Attempt::new(question.choose(), state.clone()).save(store);

	tracing::info!(stems = state.stem_count(), choices = state.choice_count(), "started attempt");
	Ok(state)
}
