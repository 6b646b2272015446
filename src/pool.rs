//! The source pool of short-answer items and their version lineages

use std::collections::BTreeMap;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{Item, ItemId};

/// One version in a lineage, and whether it is approved for live use
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, new)]
pub struct VersionRef {
	pub id: ItemId,
	pub ready: bool,
}

/// Read access to short-answer items and their lineages
pub trait SourcePool {
	fn get_item(&self, id: ItemId) -> Option<&Item>;

	/// All versions in the lineage `id` belongs to, oldest first. Empty if `id` is unknown.
	fn lineage_versions(&self, id: ItemId) -> Vec<VersionRef>;

	/// Newest version of `id`'s lineage that is ready for use
	fn latest_ready_version(&self, id: ItemId) -> Option<ItemId> {
		self.lineage_versions(id).into_iter().rev().find(|v| v.ready).map(|v| v.id)
	}
}

/// In-memory pool, loadable from JSON
///
/// An item that belongs to no declared lineage forms a lineage of its own and is ready.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(from = "PoolFile", into = "PoolFile")]
pub struct MemoryPool {
	items: BTreeMap<ItemId, Item>,
	lineages: Vec<Vec<VersionRef>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct PoolFile {
	#[serde(default)]
	items: Vec<Item>,
	#[serde(default)]
	lineages: Vec<Vec<VersionRef>>,
}

impl From<PoolFile> for MemoryPool {
	fn from(file: PoolFile) -> Self {
		let items = file.items.into_iter().map(|item| (item.id, item)).collect();
		Self { items, lineages: file.lineages }
	}
}

impl From<MemoryPool> for PoolFile {
	fn from(pool: MemoryPool) -> Self {
		Self {
			items: pool.items.into_values().collect(),
			lineages: pool.lineages,
		}
	}
}

impl MemoryPool {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	pub fn insert_item(&mut self, item: Item) {
		self.items.insert(item.id, item);
	}

	pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
		self.items.remove(&id)
	}

	/// Declares a lineage, oldest version first. Replaces any lineage sharing a version with it.
	pub fn add_lineage(&mut self, versions: Vec<VersionRef>) {
		self.lineages.retain(|lineage| !lineage.iter().any(|old| versions.iter().any(|new| new.id == old.id)));
		self.lineages.push(versions);
	}

	/// Flips the ready flag of `id` wherever it appears. Returns false if it is in no lineage.
	pub fn set_ready(&mut self, id: ItemId, ready: bool) -> bool {
		let mut found = false;
		for version in self.lineages.iter_mut().flatten().filter(|v| v.id == id) {
			version.ready = ready;
			found = true;
		}
		found
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl SourcePool for MemoryPool {
	fn get_item(&self, id: ItemId) -> Option<&Item> {
		self.items.get(&id)
	}

	fn lineage_versions(&self, id: ItemId) -> Vec<VersionRef> {
		if let Some(lineage) = self.lineages.iter().find(|lineage| lineage.iter().any(|v| v.id == id)) {
			return lineage.clone();
		}
		match self.items.contains_key(&id) {
			true => vec![VersionRef::new(id, true)],
			false => Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Answer, AnswerId, TextFormat};

	fn item(id: u64) -> Item {
		Item::new(ItemId(id), format!("q{id}"), TextFormat::Plain, vec![Answer::new(AnswerId(id * 10), "a".to_owned(), 1.0)])
	}

	#[test]
	fn standalone_item_is_its_own_ready_lineage() {
		let mut pool = MemoryPool::new();
		pool.insert_item(item(1));
		assert_eq!(pool.latest_ready_version(ItemId(1)), Some(ItemId(1)));
		assert_eq!(pool.latest_ready_version(ItemId(2)), None);
		assert!(pool.lineage_versions(ItemId(2)).is_empty());
	}

	#[test]
	fn latest_ready_skips_drafts() {
		let mut pool = MemoryPool::new();
		for id in [1, 2, 3] {
			pool.insert_item(item(id));
		}
		pool.add_lineage(vec![VersionRef::new(ItemId(1), false), VersionRef::new(ItemId(2), true), VersionRef::new(ItemId(3), false)]);
		assert_eq!(pool.latest_ready_version(ItemId(1)), Some(ItemId(2)));
		assert_eq!(pool.latest_ready_version(ItemId(3)), Some(ItemId(2)));

		assert!(pool.set_ready(ItemId(2), false));
		assert_eq!(pool.latest_ready_version(ItemId(1)), None);
		assert!(!pool.set_ready(ItemId(9), true));
	}

	#[test]
	fn loads_from_json() {
		let pool = MemoryPool::from_json(
			r#"{
				"items": [
					{"id": 1, "text": "Dog", "answers": [{"id": 13, "text": "Mammal", "fraction": 1.0}]},
					{"id": 5, "text": "Dog?", "answers": [{"id": 51, "text": "Mammal", "fraction": 1.0}]}
				],
				"lineages": [[{"id": 1, "ready": false}, {"id": 5, "ready": true}]]
			}"#,
		)
		.unwrap();
		assert_eq!(pool.len(), 2);
		assert_eq!(pool.latest_ready_version(ItemId(1)), Some(ItemId(5)));
		assert_eq!(pool.get_item(ItemId(5)).map(|i| i.text.as_str()), Some("Dog?"));
	}
}
