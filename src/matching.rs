//! Responses to a matching attempt, and grading them
//!
//! A response maps `sub<i>` (one field per stem, in stem order) to the 1-based position of the
//! picked choice in the choice order. `0` or a missing field means the stem was left unanswered.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::{AnswerId, GradedState, Stem, TextFormat, state::AttemptState};

pub type Response = BTreeMap<String, usize>;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static pattern is valid"));

pub fn field_name(index: usize) -> String {
	format!("sub{index}")
}

/// Response fields a submission for this attempt may carry
pub fn expected_fields(state: &AttemptState) -> Vec<String> {
	(0..state.stem_count()).map(field_name).collect()
}

fn picked(response: &Response, index: usize) -> usize {
	response.get(&field_name(index)).copied().unwrap_or(0)
}

/// Choice picked for the stem at `index`, if it names a valid position
pub fn picked_choice(state: &AttemptState, response: &Response, index: usize) -> Option<AnswerId> {
	match picked(response, index) {
		0 => None,
		position => state.choice_order.get(position - 1).copied(),
	}
}

/// Every stem has an answer.
pub fn is_complete_response(state: &AttemptState, response: &Response) -> bool {
	(0..state.stem_count()).all(|i| picked(response, i) != 0)
}

/// At least one stem has an answer.
pub fn is_gradable_response(state: &AttemptState, response: &Response) -> bool {
	(0..state.stem_count()).any(|i| picked(response, i) != 0)
}

pub fn is_same_response(state: &AttemptState, a: &Response, b: &Response) -> bool {
	(0..state.stem_count()).all(|i| picked(a, i) == picked(b, i))
}

/// The response that answers every stem correctly
pub fn correct_response(state: &AttemptState) -> Response {
	state
		.stems_in_order()
		.enumerate()
		.filter_map(|(i, stem)| state.choice_position(stem.right).map(|position| (field_name(i), position)))
		.collect()
}

/// Fraction of stems matched correctly, and the bucket it falls into
pub fn grade_response(state: &AttemptState, response: &Response) -> (f64, GradedState) {
	let total = state.stem_count();
	if total == 0 {
		return (0.0, GradedState::Wrong);
	}
	let right = state.stems_in_order().enumerate().filter(|(i, stem)| picked_choice(state, response, *i) == Some(stem.right)).count();
	let fraction = right as f64 / total as f64;
	(fraction, GradedState::for_fraction(fraction))
}

/// One `stem -> choice` pair per answered stem, joined with `; `
pub fn summarise_response(state: &AttemptState, response: &Response) -> String {
	let mut pairs = Vec::new();
	for (i, stem) in state.stems_in_order().enumerate() {
		let Some(choice) = picked_choice(state, response, i).and_then(|key| state.choices.get(key)) else {
			continue;
		};
		pairs.push(format!("{} -> {}", stem_text(stem), choice));
	}
	pairs.join("; ")
}

/// Plain-text rendering of the whole question: `text {stem; stem} -> {choice; choice}`
pub fn question_summary(question_text: &str, format: TextFormat, state: &AttemptState) -> String {
	let stems: Vec<String> = state.stems_in_order().map(stem_text).collect();
	let choices: Vec<&str> = state.choices_in_order().map(|(_, text)| text).collect();
	format!("{} {{{}}} -> {{{}}}", to_plain_text(question_text, format), stems.join("; "), choices.join("; "))
}

fn stem_text(stem: &Stem) -> String {
	to_plain_text(&stem.text, stem.format)
}

/// Strips markup and collapses whitespace
pub fn to_plain_text(text: &str, format: TextFormat) -> String {
	let text = match format.is_markup() {
		true => TAG.replace_all(text, " "),
		false => text.into(),
	};
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ChoiceSet, ItemId};

	/// Dog, Frog, Toad, Cat in that order; choices Mammal (13) then Amphibian (16)
	fn animals() -> AttemptState {
		let stems = [(1, "<p>Dog</p>", 13), (2, "Frog", 16), (3, "Toad", 16), (4, "Cat", 13)]
			.into_iter()
			.map(|(id, text, right)| Stem::new(ItemId(id), text.to_owned(), TextFormat::Html, AnswerId(right)))
			.collect();
		let choices: ChoiceSet = [(AnswerId(13), "Mammal".to_owned()), (AnswerId(16), "Amphibian".to_owned())].into_iter().collect();
		AttemptState::from_parts(stems, choices)
	}

	fn response(values: &[(&str, usize)]) -> Response {
		values.iter().map(|&(k, v)| (k.to_owned(), v)).collect()
	}

	#[test]
	fn expected_data() {
		assert_eq!(expected_fields(&animals()), vec!["sub0", "sub1", "sub2", "sub3"]);
	}

	#[test]
	fn completeness() {
		let state = animals();
		assert!(!is_complete_response(&state, &response(&[])));
		assert!(!is_complete_response(&state, &response(&[("sub0", 1), ("sub1", 1), ("sub2", 1), ("sub3", 0)])));
		assert!(!is_complete_response(&state, &response(&[("sub1", 1)])));
		assert!(is_complete_response(&state, &response(&[("sub0", 1), ("sub1", 1), ("sub2", 1), ("sub3", 1)])));
	}

	#[test]
	fn gradability() {
		let state = animals();
		assert!(!is_gradable_response(&state, &response(&[])));
		assert!(!is_gradable_response(&state, &response(&[("sub0", 0), ("sub1", 0), ("sub2", 0), ("sub3", 0)])));
		assert!(is_gradable_response(&state, &response(&[("sub0", 1), ("sub1", 0), ("sub2", 0), ("sub3", 0)])));
		assert!(is_gradable_response(&state, &response(&[("sub1", 1)])));
	}

	#[test]
	fn sameness() {
		let state = animals();
		let zeros = response(&[("sub0", 0), ("sub1", 0), ("sub2", 0), ("sub3", 0)]);
		let picks = response(&[("sub0", 1), ("sub1", 2), ("sub2", 2), ("sub3", 1)]);
		assert!(is_same_response(&state, &response(&[]), &zeros));
		assert!(is_same_response(&state, &zeros, &zeros));
		assert!(!is_same_response(&state, &zeros, &picks));
		assert!(is_same_response(&state, &picks, &picks.clone()));
		assert!(!is_same_response(&state, &response(&[("sub0", 2), ("sub1", 2), ("sub2", 2), ("sub3", 1)]), &picks));
	}

	#[test]
	fn grading() {
		let state = animals();
		assert_eq!(grade_response(&state, &response(&[("sub0", 1), ("sub1", 2), ("sub2", 2), ("sub3", 1)])), (1.0, GradedState::Right));
		assert_eq!(grade_response(&state, &response(&[("sub0", 1)])), (0.25, GradedState::Partial));
		assert_eq!(grade_response(&state, &response(&[("sub0", 2), ("sub1", 1), ("sub2", 1), ("sub3", 2)])), (0.0, GradedState::Wrong));
		// out of range positions are just wrong
		assert_eq!(grade_response(&state, &response(&[("sub0", 9)])), (0.0, GradedState::Wrong));
	}

	#[test]
	fn correct_response_grades_right() {
		let state = animals();
		let correct = correct_response(&state);
		assert_eq!(correct, response(&[("sub0", 1), ("sub1", 2), ("sub2", 2), ("sub3", 1)]));
		assert_eq!(grade_response(&state, &correct).1, GradedState::Right);
	}

	#[test]
	fn summaries() {
		let state = animals();
		let summary = summarise_response(&state, &response(&[("sub0", 2), ("sub1", 1)]));
		assert_eq!(summary, "Dog -> Amphibian; Frog -> Mammal");

		let question = question_summary("<b>Associate</b> the animals", TextFormat::Html, &state);
		assert_eq!(question, "Associate the animals {Dog; Frog; Toad; Cat} -> {Mammal; Amphibian}");
	}

	#[test]
	fn plain_text_keeps_angle_brackets() {
		assert_eq!(to_plain_text("a <b> c", TextFormat::Plain), "a <b> c");
		assert_eq!(to_plain_text("a <b>c</b>", TextFormat::Html), "a c");
	}
}
