use std::collections::BTreeSet;

use rand::Rng;

use crate::{ItemId, error::SampleError};

/// Draws `count` distinct ids from `pool`, uniformly and without replacement.
///
/// Repeated ids in `pool` count once. The returned order is the draw order.
pub fn sample<R: Rng + ?Sized>(pool: &[ItemId], count: usize, rng: &mut R) -> Result<Vec<ItemId>, SampleError> {
	let mut seen = BTreeSet::new();
	let candidates: Vec<ItemId> = pool.iter().copied().filter(|id| seen.insert(*id)).collect();

	if count > candidates.len() {
		return Err(SampleError::InsufficientPool {
			requested: count,
			available: candidates.len(),
		});
	}

	let drawn: Vec<ItemId> = rand::seq::index::sample(rng, candidates.len(), count).into_iter().map(|i| candidates[i]).collect();
	tracing::debug!(pool = candidates.len(), count, ?drawn, "sampled stems");
	Ok(drawn)
}

#[cfg(test)]
mod tests {
	use rand::{SeedableRng, rngs::StdRng};

	use super::*;

	fn ids(range: std::ops::Range<u64>) -> Vec<ItemId> {
		range.map(ItemId).collect()
	}

	#[test]
	fn draws_distinct_members() {
		let pool = ids(1..11);
		for seed in 0..50 {
			let mut rng = StdRng::seed_from_u64(seed);
			for count in 0..=pool.len() {
				let drawn = sample(&pool, count, &mut rng).unwrap();
				assert_eq!(drawn.len(), count);
				assert!(drawn.iter().all(|id| pool.contains(id)));
				assert_eq!(drawn.iter().collect::<BTreeSet<_>>().len(), count);
			}
		}
	}

	#[test]
	fn full_draw_is_a_permutation() {
		let pool = ids(1..6);
		let mut rng = StdRng::seed_from_u64(7);
		let mut drawn = sample(&pool, pool.len(), &mut rng).unwrap();
		drawn.sort();
		assert_eq!(drawn, pool);
	}

	#[test]
	fn insufficient_pool() {
		let mut rng = StdRng::seed_from_u64(1);
		let err = sample(&ids(1..3), 3, &mut rng).unwrap_err();
		assert_eq!(err, SampleError::InsufficientPool { requested: 3, available: 2 });
	}

	#[test]
	fn repeated_ids_count_once() {
		let mut rng = StdRng::seed_from_u64(1);
		let pool = vec![ItemId(1), ItemId(1), ItemId(2)];
		assert!(matches!(sample(&pool, 3, &mut rng), Err(SampleError::InsufficientPool { requested: 3, available: 2 })));
		assert_eq!(sample(&pool, 2, &mut rng).unwrap().len(), 2);
	}

	#[test]
	fn every_member_gets_drawn_eventually() {
		let pool = ids(1..5);
		let mut rng = StdRng::seed_from_u64(99);
		let mut hit = BTreeSet::new();
		for _ in 0..200 {
			hit.extend(sample(&pool, 1, &mut rng).unwrap());
		}
		assert_eq!(hit.len(), pool.len());
	}
}
