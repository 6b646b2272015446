//! Choices: the deduplicated answer side of matching pairs

use serde::{Deserialize, Serialize};

use crate::{AnswerId, GradedState, Item, error::ChoiceError};

/// Insertion-ordered map from choice key to display text
///
/// Dedup happens by exact text match when a choice is derived, so two keys may still carry
/// texts that only differ in case or whitespace.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ChoiceSet {
	entries: Vec<(AnswerId, String)>,
}

impl ChoiceSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: AnswerId) -> Option<&str> {
		self.entries.iter().find(|(k, _)| *k == key).map(|(_, text)| text.as_str())
	}

	pub fn contains_key(&self, key: AnswerId) -> bool {
		self.entries.iter().any(|(k, _)| *k == key)
	}

	/// First key whose text is exactly `text`
	pub fn key_for_text(&self, text: &str) -> Option<AnswerId> {
		self.entries.iter().find(|(_, t)| t == text).map(|(k, _)| *k)
	}

	/// Inserts or overwrites the text under `key`, keeping the original position on overwrite.
	pub fn insert(&mut self, key: AnswerId, text: impl Into<String>) {
		let text = text.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = text,
			None => self.entries.push((key, text)),
		}
	}

	pub fn remove(&mut self, key: AnswerId) -> Option<String> {
		let pos = self.entries.iter().position(|(k, _)| *k == key)?;
		Some(self.entries.remove(pos).1)
	}

	pub fn keys(&self) -> impl Iterator<Item = AnswerId> + '_ {
		self.entries.iter().map(|(k, _)| *k)
	}

	pub fn iter(&self) -> impl Iterator<Item = (AnswerId, &str)> {
		self.entries.iter().map(|(k, text)| (*k, text.as_str()))
	}
}

/// Two sets are equal when they map the same keys to the same texts, whatever the insertion order.
impl PartialEq for ChoiceSet {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(key, text)| other.get(key) == Some(text))
	}
}

impl Eq for ChoiceSet {}

impl FromIterator<(AnswerId, String)> for ChoiceSet {
	fn from_iter<I: IntoIterator<Item = (AnswerId, String)>>(iter: I) -> Self {
		let mut set = ChoiceSet::new();
		for (key, text) in iter {
			set.insert(key, text);
		}
		set
	}
}

/// Resolves the choice that answers `item`, adding it to `choices` when its text is new.
///
/// Only the first answer not graded as incorrect is considered. When a choice with identical text
/// already exists its key is returned, otherwise the winning answer's id becomes the new key.
pub fn derive_choice(item: &Item, choices: &mut ChoiceSet) -> Result<AnswerId, ChoiceError> {
	let answer = item
		.answers
		.iter()
		.find(|answer| !GradedState::for_fraction(answer.fraction).is_incorrect())
		.ok_or(ChoiceError::NoCorrectAnswer(item.id))?;

	if let Some(existing) = choices.key_for_text(&answer.text) {
		tracing::debug!(item = %item.id, choice = %existing, "reusing choice with identical text");
		return Ok(existing);
	}

	choices.insert(answer.id, answer.text.clone());
	tracing::debug!(item = %item.id, choice = %answer.id, "added choice");
	Ok(answer.id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Answer, ItemId, TextFormat};

	fn item(id: u64, answers: &[(u64, &str, f64)]) -> Item {
		let answers = answers.iter().map(|&(aid, text, fraction)| Answer::new(AnswerId(aid), text.to_owned(), fraction)).collect();
		Item::new(ItemId(id), format!("Item {id}"), TextFormat::Html, answers)
	}

	#[test]
	fn skips_incorrect_answers() {
		let mut choices = ChoiceSet::new();
		let key = derive_choice(&item(1, &[(10, "wolf", 0.0), (11, "dog", 1.0), (12, "hound", 1.0)]), &mut choices).unwrap();
		assert_eq!(key, AnswerId(11));
		assert_eq!(choices.len(), 1);
		assert_eq!(choices.get(AnswerId(11)), Some("dog"));
	}

	#[test]
	fn partial_credit_counts_as_correct() {
		let mut choices = ChoiceSet::new();
		let key = derive_choice(&item(1, &[(10, "nearly", 0.5), (11, "exact", 1.0)]), &mut choices).unwrap();
		assert_eq!(key, AnswerId(10));
	}

	#[test]
	fn is_idempotent() {
		let mut choices = ChoiceSet::new();
		let it = item(1, &[(10, "cat", 1.0)]);
		let first = derive_choice(&it, &mut choices).unwrap();
		let second = derive_choice(&it, &mut choices).unwrap();
		assert_eq!(first, second);
		assert_eq!(choices.len(), 1);
	}

	#[test]
	fn identical_text_shares_a_key() {
		let mut choices = ChoiceSet::new();
		let dog = derive_choice(&item(1, &[(13, "Mammal", 1.0)]), &mut choices).unwrap();
		let cat = derive_choice(&item(2, &[(22, "Mammal", 1.0)]), &mut choices).unwrap();
		assert_eq!(dog, cat);
		assert_eq!(choices.len(), 1);
		assert!(!choices.contains_key(AnswerId(22)));
	}

	#[test]
	fn dedup_is_exact_match_only() {
		let mut choices = ChoiceSet::new();
		let a = derive_choice(&item(1, &[(13, "Mammal", 1.0)]), &mut choices).unwrap();
		let b = derive_choice(&item(2, &[(22, "mammal ", 1.0)]), &mut choices).unwrap();
		assert_ne!(a, b);
		assert_eq!(choices.len(), 2);
	}

	#[test]
	fn no_correct_answer() {
		let mut choices = ChoiceSet::new();
		let err = derive_choice(&item(5, &[(50, "nope", 0.0)]), &mut choices).unwrap_err();
		assert_eq!(err, ChoiceError::NoCorrectAnswer(ItemId(5)));
		assert!(choices.is_empty());
	}

	#[test]
	fn equality_ignores_insertion_order() {
		let a: ChoiceSet = [(AnswerId(1), "x".to_owned()), (AnswerId(2), "y".to_owned())].into_iter().collect();
		let b: ChoiceSet = [(AnswerId(2), "y".to_owned()), (AnswerId(1), "x".to_owned())].into_iter().collect();
		assert_eq!(a, b);
		let mut c = b.clone();
		c.insert(AnswerId(2), "z");
		assert_ne!(a, c);
		assert_eq!(c.remove(AnswerId(2)), Some("z".to_owned()));
		assert_eq!(c.keys().collect::<Vec<_>>(), vec![AnswerId(1)]);
	}
}
