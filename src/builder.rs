//! Breadth-first enumeration of a pattern's sub-states outward from solved.
//!
//! The distance table doubles as the BFS frontier: level `d` is every rank
//! whose entry equals `d`. Each level is scanned in parallel chunks, and a
//! child rank is claimed by whichever worker wins the
//! `UNREACHED -> d + 1` compare-exchange, so it is recorded once and expanded
//! once, on the next level.

use std::{sync::atomic::{AtomicU8, Ordering}, time::Instant};

use log::{debug, info};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
	error::{Error, Result},
	pattern::Pattern,
};



/// Table entry of a rank not reached (yet).
pub const UNREACHED: u8 = u8::MAX;

/// Ranks scanned by one parallel task.
const CHUNK_LEN: usize = 1 << 16;



/// Minimum move count from every sub-state of `pattern` to its solved sub-state, indexed by rank.
pub fn build(pattern: &Pattern) -> Result<Vec<u8>> {
	let state_count = pattern.state_count();
	let time_begin = Instant::now();
	info!("building {:?} table over pieces {:?}: {state_count} states", pattern.kind(), pattern.pieces());

	let table: Vec<AtomicU8> = (0..state_count)
		.into_par_iter()
		.map(|_| AtomicU8::new(UNREACHED))
		.collect();
	let solved = pattern.rank(&pattern.solved());
	table[solved].store(0, Ordering::Relaxed);

	let max_depth = fill(pattern, &table)?;
	debug!("table built in {:.3}s, max distance {max_depth}", time_begin.elapsed().as_secs_f64());
	Ok(table.into_iter().map(AtomicU8::into_inner).collect())
}

/// Runs the BFS outward from the ranks marked 0 until no new rank appears,
/// and checks that every rank was reached. Returns the largest distance.
fn fill(pattern: &Pattern, table: &[AtomicU8]) -> Result<u8> {
	let state_count = table.len();
	let mut reached = table.iter().filter(|entry| entry.load(Ordering::Relaxed) == 0).count();
	let mut depth: u8 = 0;
	loop {
		if depth + 1 == UNREACHED {
			return Err(Error::BuildFailure(format!("distances exceed {}", UNREACHED - 1)))
		}
		let discovered = expand_level(pattern, table, depth)?;
		if discovered == 0 {
			break
		}
		depth += 1;
		reached += discovered;
		info!("depth {depth}: {discovered} new states, {reached}/{state_count} reached");
		if reached > state_count {
			return Err(Error::BuildFailure(format!("{reached} ranks recorded for a table of {state_count}")))
		}
	}

	if reached != state_count {
		return Err(Error::BuildFailure(format!(
			"{} of {state_count} ranks never reached", state_count - reached
		)))
	}
	Ok(depth)
}

/// Expands every rank at `depth`, returning how many ranks were newly recorded at `depth + 1`.
fn expand_level(pattern: &Pattern, table: &[AtomicU8], depth: u8) -> Result<usize> {
	let transitions = pattern.transitions();
	let chunk_count = table.len().div_ceil(CHUNK_LEN);
	(0..chunk_count)
		.into_par_iter()
		.map(|chunk| {
			let begin = chunk * CHUNK_LEN;
			let end = (begin + CHUNK_LEN).min(table.len());
			let mut discovered = 0;
			for rank in begin..end {
				if table[rank].load(Ordering::Relaxed) != depth {
					continue
				}
				let sub = pattern.unrank(rank);
				for transition in transitions {
					let child = pattern.rank(&pattern.apply(&sub, transition));
					let Some(entry) = table.get(child) else {
						return Err(Error::BuildFailure(format!("rank {child} out of range {}", table.len())))
					};
					if entry.compare_exchange(UNREACHED, depth + 1, Ordering::Relaxed, Ordering::Relaxed).is_ok() {
						discovered += 1;
					}
				}
			}
			Ok(discovered)
		})
		.try_reduce(|| 0, |a, b| Ok(a + b))
}
