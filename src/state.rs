//! Attempt state: the typed snapshot of a started attempt, and its flat key-value form
//!
//! Internally an attempt is a typed mapping from item id to [`Stem`] and from choice key to choice
//! text. The flat `_stem_<id>` style keys only exist at the store boundary, in [`AttemptState::load`]
//! and [`AttemptState::save`].

use std::{
	collections::{BTreeMap, BTreeSet},
	fmt,
	str::FromStr,
	sync::LazyLock,
};

use derive_new::new;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{AnswerId, ChoiceSet, ItemId, Stem, TextFormat, error::StateError};

const CHOOSE: &str = "_choose";
const STEM_ORDER: &str = "_stemorder";
const CHOICE_ORDER: &str = "_choiceorder";
const STEM_PREFIX: &str = "_stem_";
const STEM_FORMAT_PREFIX: &str = "_stemformat_";
const RIGHT_PREFIX: &str = "_right_";
const CHOICE_PREFIX: &str = "_choice_";

/// Keys this crate owns. Anything else in a store is left alone.
static OWNED_KEY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^_(?:choose|stemorder|choiceorder|(?:stem|stemformat|right|choice)_\d+)$").expect("static pattern is valid"));

/// A flat, string-keyed scalar store holding the durable state of one attempt step
pub trait AttemptStore {
	fn get(&self, key: &str) -> Option<&str>;
	fn set(&mut self, key: &str, value: String);
	fn remove(&mut self, key: &str) -> Option<String>;
	fn keys(&self) -> Vec<String>;
}

/// Ordered in-memory [`AttemptStore`], serialized as a plain JSON object
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StepData(BTreeMap<String, String>);

impl StepData {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Every entry, in key order
	pub fn snapshot(&self) -> &BTreeMap<String, String> {
		&self.0
	}
}

impl AttemptStore for StepData {
	fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	fn set(&mut self, key: &str, value: String) {
		self.0.insert(key.to_owned(), value);
	}

	fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	fn keys(&self) -> Vec<String> {
		self.0.keys().cloned().collect()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StepData {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Stems and choices of one attempt, in display order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttemptState {
	pub stem_order: Vec<ItemId>,
	pub stems: BTreeMap<ItemId, Stem>,
	pub choice_order: Vec<AnswerId>,
	pub choices: ChoiceSet,
}

/// An attempt as the regrade validator sees it: how many stems were asked for, and what was drawn
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct Attempt {
	pub choose: usize,
	pub state: AttemptState,
}

impl Attempt {
	/// Reads the attempt and the sampling width it was started with.
	///
	/// Attempts saved without a width fall back to their stem count, which is what a draw produces.
	pub fn load<S: AttemptStore + ?Sized>(store: &S) -> Result<Self, StateError> {
		let state = AttemptState::load(store)?;
		let choose = match store.get(CHOOSE) {
			Some(_) => parse_value(store, CHOOSE)?,
			None => state.stem_count(),
		};
		Ok(Self { choose, state })
	}

	pub fn save<S: AttemptStore + ?Sized>(&self, store: &mut S) {
		self.state.save(store);
		store.set(CHOOSE, self.choose.to_string());
	}
}

impl AttemptState {
	/// Builds a state that lists stems and choices in the order given.
	pub fn from_parts(stems: Vec<Stem>, choices: ChoiceSet) -> Self {
		Self {
			stem_order: stems.iter().map(|s| s.item).collect(),
			stems: stems.into_iter().map(|s| (s.item, s)).collect(),
			choice_order: choices.keys().collect(),
			choices,
		}
	}

	pub fn stem_count(&self) -> usize {
		self.stem_order.len()
	}

	pub fn choice_count(&self) -> usize {
		self.choice_order.len()
	}

	pub fn stems_in_order(&self) -> impl Iterator<Item = &Stem> {
		self.stem_order.iter().filter_map(|id| self.stems.get(id))
	}

	pub fn choices_in_order(&self) -> impl Iterator<Item = (AnswerId, &str)> {
		self.choice_order.iter().filter_map(|key| self.choices.get(*key).map(|text| (*key, text)))
	}

	/// 1-based position of `key` in the choice order
	pub fn choice_position(&self, key: AnswerId) -> Option<usize> {
		self.choice_order.iter().position(|k| *k == key).map(|i| i + 1)
	}

	/// Checks that orders, stem records and choice texts agree with each other.
	pub fn check(&self) -> Result<(), StateError> {
		if self.stem_order.is_empty() {
			return Err(StateError::EmptyStemOrder);
		}

		let mut listed = BTreeSet::new();
		for id in &self.stem_order {
			if !listed.insert(*id) {
				return Err(StateError::DuplicateStem(*id));
			}
			if !self.stems.contains_key(id) {
				return Err(StateError::MissingStem(*id));
			}
		}
		if let Some(id) = self.stems.keys().find(|id| !listed.contains(*id)) {
			return Err(StateError::UnlistedStem(*id));
		}

		let mut offered = BTreeSet::new();
		for key in &self.choice_order {
			if !offered.insert(*key) {
				return Err(StateError::DuplicateChoice(*key));
			}
			if !self.choices.contains_key(*key) {
				return Err(StateError::MissingChoice(*key));
			}
		}

		for stem in self.stems_in_order() {
			if !offered.contains(&stem.right) {
				return Err(StateError::DanglingRight { stem: stem.item, right: stem.right });
			}
		}
		Ok(())
	}

	/// Reads the attempt back from its flat form.
	pub fn load<S: AttemptStore + ?Sized>(store: &S) -> Result<Self, StateError> {
		let stem_order: Vec<ItemId> = parse_list(store, STEM_ORDER)?;
		let mut stems = BTreeMap::new();
		for id in &stem_order {
			let text = required(store, &format!("{STEM_PREFIX}{id}"))?.to_owned();
			let format_key = format!("{STEM_FORMAT_PREFIX}{id}");
			let code: u8 = parse_value(store, &format_key)?;
			let format = TextFormat::try_from(code).map_err(|_| StateError::InvalidValue {
				key: format_key,
				value: code.to_string(),
			})?;
			let right: AnswerId = parse_value(store, &format!("{RIGHT_PREFIX}{id}"))?;
			stems.insert(*id, Stem::new(*id, text, format, right));
		}

		let choice_order: Vec<AnswerId> = parse_list(store, CHOICE_ORDER)?;
		let mut choices = ChoiceSet::new();
		for key in &choice_order {
			choices.insert(*key, required(store, &format!("{CHOICE_PREFIX}{key}"))?);
		}

		let state = Self {
			stem_order,
			stems,
			choice_order,
			choices,
		};
		state.check()?;
		Ok(state)
	}

	/// Writes the attempt into `store`, replacing whatever attempt keys were there before.
	pub fn save<S: AttemptStore + ?Sized>(&self, store: &mut S) {
		for key in store.keys().into_iter().filter(|k| OWNED_KEY.is_match(k)) {
			store.remove(&key);
		}

		store.set(STEM_ORDER, join(&self.stem_order));
		for stem in self.stems_in_order() {
			store.set(&format!("{STEM_PREFIX}{}", stem.item), stem.text.clone());
			store.set(&format!("{STEM_FORMAT_PREFIX}{}", stem.item), stem.format.code().to_string());
			store.set(&format!("{RIGHT_PREFIX}{}", stem.item), stem.right.to_string());
		}

		store.set(CHOICE_ORDER, join(&self.choice_order));
		for (key, text) in self.choices_in_order() {
			store.set(&format!("{CHOICE_PREFIX}{key}"), text.to_owned());
		}
	}
}

impl fmt::Display for AttemptState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, stem) in self.stems_in_order().enumerate() {
			let right = self.choices.get(stem.right).unwrap_or("???");
			writeln!(f, "  sub{i}: {} -> [{}]", stem.text, right)?;
		}
		let available: Vec<&str> = self.choices_in_order().map(|(_, text)| text).collect();
		writeln!(f, "  (options: {})", available.join(", "))
	}
}

fn required<'s, S: AttemptStore + ?Sized>(store: &'s S, key: &str) -> Result<&'s str, StateError> {
	store.get(key).ok_or_else(|| StateError::MissingKey(key.to_owned()))
}

fn parse_value<T: FromStr, S: AttemptStore + ?Sized>(store: &S, key: &str) -> Result<T, StateError> {
	let value = required(store, key)?;
	value.parse().map_err(|_| StateError::InvalidValue {
		key: key.to_owned(),
		value: value.to_owned(),
	})
}

fn parse_list<T: FromStr, S: AttemptStore + ?Sized>(store: &S, key: &str) -> Result<Vec<T>, StateError> {
	let value = required(store, key)?;
	if value.trim().is_empty() {
		return Ok(Vec::new());
	}
	value
		.split(',')
		.map(|part| {
			part.parse().map_err(|_| StateError::InvalidValue {
				key: key.to_owned(),
				value: value.to_owned(),
			})
		})
		.collect()
}

fn join<T: fmt::Display>(ids: &[T]) -> String {
	ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}
