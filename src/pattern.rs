//! Sub-problems of the cube and their dense ranking.
//!
//! A [`Pattern`] tracks a subset of the corner pieces or of the edge pieces
//! and forgets everything else. Its sub-state is the slot and orientation of
//! each tracked piece. Ranks are mixed radix: the slots form a partial
//! permutation ranked by its Lehmer code, the orientations are digits in
//! base 3 (corners) or 2 (edges). When every piece of the orbit is tracked
//! the last orientation follows from the others, so it is left out.

use crate::{
	cube::CubeState,
	error::{Error, Result},
	moves::{CORNER_COUNT, EDGE_COUNT, SlotTransition, TRANSITIONS},
};



#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind { Corner, Edge }

impl PieceKind {
	pub const fn slot_count(self) -> usize {
		match self {
			PieceKind::Corner => CORNER_COUNT,
			PieceKind::Edge => EDGE_COUNT,
		}
	}

	pub const fn radix(self) -> u8 {
		match self {
			PieceKind::Corner => 3,
			PieceKind::Edge => 2,
		}
	}

	pub const fn tag(self) -> u8 {
		self as u8
	}

	pub const fn from_tag(tag: u8) -> Option<Self> {
		match tag {
			0 => Some(PieceKind::Corner),
			1 => Some(PieceKind::Edge),
			_ => None,
		}
	}
}

/// Slot and orientation of each tracked piece, in the pattern's piece order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SubState {
	pub positions: [u8; EDGE_COUNT],
	pub orientations: [u8; EDGE_COUNT],
}

const NOT_TRACKED: u8 = u8::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
	kind: PieceKind,
	pieces: Vec<u8>,
	/// piece number -> index into `pieces`
	tracked_index: [u8; EDGE_COUNT],
	orientation_digits: usize,
	orientation_count: usize,
	state_count: usize,
}

impl Pattern {
	pub fn new(kind: PieceKind, pieces: &[u8]) -> Result<Self> {
		let slot_count = kind.slot_count();
		if pieces.is_empty() {
			return Err(Error::InvalidPattern("no pieces tracked".to_string()))
		}
		let mut tracked_index = [NOT_TRACKED; EDGE_COUNT];
		for (i, &piece) in pieces.iter().enumerate() {
			if piece as usize >= slot_count {
				return Err(Error::InvalidPattern(format!("piece {piece} out of range for {kind:?}")))
			}
			if tracked_index[piece as usize] != NOT_TRACKED {
				return Err(Error::InvalidPattern(format!("piece {piece} tracked twice")))
			}
			tracked_index[piece as usize] = i as u8;
		}

		let orientation_digits = if pieces.len() == slot_count { pieces.len() - 1 } else { pieces.len() };
		let orientation_count = (kind.radix() as usize).pow(orientation_digits as u32);
		let placements: usize = (0..pieces.len()).map(|i| slot_count - i).product();
		Ok(Self {
			kind,
			pieces: pieces.to_vec(),
			tracked_index,
			orientation_digits,
			orientation_count,
			state_count: placements * orientation_count,
		})
	}

	/// All 8 corners: 8! * 3^7 = 88,179,840 ranks.
	pub fn all_corners() -> Self {
		Self::from_known(PieceKind::Corner, &[0, 1, 2, 3, 4, 5, 6, 7])
	}

	/// Edges 0..6: 12!/6! * 2^6 = 42,577,920 ranks.
	pub fn first_edges() -> Self {
		Self::from_known(PieceKind::Edge, &[0, 1, 2, 3, 4, 5])
	}

	/// Edges 6..12, disjoint from [`Self::first_edges`].
	pub fn last_edges() -> Self {
		Self::from_known(PieceKind::Edge, &[6, 7, 8, 9, 10, 11])
	}

	fn from_known(kind: PieceKind, pieces: &[u8]) -> Self {
		match Self::new(kind, pieces) {
			Ok(pattern) => pattern,
			Err(e) => unreachable!("{e}"),
		}
	}

	pub fn kind(&self) -> PieceKind {
		self.kind
	}

	pub fn pieces(&self) -> &[u8] {
		&self.pieces
	}

	pub fn slot_count(&self) -> usize {
		self.kind.slot_count()
	}

	pub fn radix(&self) -> u8 {
		self.kind.radix()
	}

	/// Number of distinct ranks, i.e. the table length.
	pub fn state_count(&self) -> usize {
		self.state_count
	}

	pub fn transitions(&self) -> &'static [SlotTransition; 18] {
		match self.kind {
			PieceKind::Corner => &TRANSITIONS.corners,
			PieceKind::Edge => &TRANSITIONS.edges,
		}
	}

	pub fn solved(&self) -> SubState {
		let mut sub = SubState::default();
		sub.positions[..self.pieces.len()].copy_from_slice(&self.pieces);
		sub
	}

	pub fn project(&self, cube: &CubeState) -> SubState {
		let (permutation, orientation): (&[u8], &[u8]) = match self.kind {
			PieceKind::Corner => (&cube.corner_permutation, &cube.corner_orientation),
			PieceKind::Edge => (&cube.edge_permutation, &cube.edge_orientation),
		};
		let radix = self.radix();
		let mut sub = SubState::default();
		for (slot, (&piece, &twist)) in permutation.iter().zip(orientation).enumerate() {
			let Some(&index) = self.tracked_index.get(piece as usize) else { continue };
			if index != NOT_TRACKED {
				sub.positions[index as usize] = slot as u8;
				sub.orientations[index as usize] = twist % radix;
			}
		}
		sub
	}

	/// Sub-state after one move, `transition` being one of [`Self::transitions`].
	#[inline]
	pub fn apply(&self, sub: &SubState, transition: &SlotTransition) -> SubState {
		let radix = self.radix();
		let mut next = *sub;
		for i in 0..self.pieces.len() {
			let slot = sub.positions[i] as usize;
			next.positions[i] = transition.dest[slot];
			next.orientations[i] = (sub.orientations[i] + transition.twist[slot]) % radix;
		}
		next
	}

	pub fn rank(&self, sub: &SubState) -> usize {
		let n = self.slot_count();
		let k = self.pieces.len();

		let mut placement_rank = 0;
		for i in 0..k {
			let position = sub.positions[i];
			let smaller_taken = sub.positions[..i].iter().filter(|&&earlier| earlier < position).count();
			placement_rank = placement_rank * (n - i) + (position as usize).saturating_sub(smaller_taken);
		}

		let radix = self.radix() as usize;
		let mut orientation_rank = 0;
		for &twist in &sub.orientations[..self.orientation_digits] {
			orientation_rank = orientation_rank * radix + twist as usize;
		}

		placement_rank * self.orientation_count + orientation_rank
	}

	pub fn rank_cube(&self, cube: &CubeState) -> usize {
		self.rank(&self.project(cube))
	}

	/// Inverse of [`Self::rank`] for `rank < self.state_count()`.
	pub fn unrank(&self, rank: usize) -> SubState {
		let n = self.slot_count();
		let k = self.pieces.len();
		let radix = self.radix() as usize;
		let mut sub = SubState::default();

		let mut orientation_rank = rank % self.orientation_count;
		let mut sum = 0;
		for i in (0..self.orientation_digits).rev() {
			let twist = orientation_rank % radix;
			orientation_rank /= radix;
			sub.orientations[i] = twist as u8;
			sum += twist;
		}
		if self.orientation_digits < k {
			sub.orientations[k - 1] = ((radix - sum % radix) % radix) as u8;
		}

		let mut placement_rank = rank / self.orientation_count;
		let mut digits = [0; EDGE_COUNT];
		for i in (0..k).rev() {
			digits[i] = placement_rank % (n - i);
			placement_rank /= n - i;
		}
		let mut taken = 0u16;
		for i in 0..k {
			// the digit counts free slots below the chosen one
			let mut remaining = digits[i];
			let mut slot = 0;
			loop {
				if taken & (1 << slot) == 0 {
					if remaining == 0 {
						break
					}
					remaining -= 1;
				}
				slot += 1;
			}
			taken |= 1 << slot;
			sub.positions[i] = slot as u8;
		}
		sub
	}
}

/// Corners, first six edges and last six edges.
pub fn default_patterns() -> Vec<Pattern> {
	vec![Pattern::all_corners(), Pattern::first_edges(), Pattern::last_edges()]
}



#[cfg(test)]
mod tests {
	use rand::{SeedableRng, rngs::StdRng};

	use super::*;
	use crate::moves::ALL_MOVES;

	#[test]
	fn state_counts() {
		assert_eq!(88_179_840, Pattern::all_corners().state_count());
		assert_eq!(42_577_920, Pattern::first_edges().state_count());
		assert_eq!(42_577_920, Pattern::last_edges().state_count());
		assert_eq!(8 * 7 * 6 * 27, Pattern::new(PieceKind::Corner, &[1, 3, 5]).unwrap().state_count());
		assert_eq!(12 * 4, Pattern::new(PieceKind::Edge, &[9]).unwrap().state_count());
	}

	#[test]
	fn rejects_bad_patterns() {
		assert!(matches!(Pattern::new(PieceKind::Edge, &[]), Err(Error::InvalidPattern(_))));
		assert!(matches!(Pattern::new(PieceKind::Corner, &[8]), Err(Error::InvalidPattern(_))));
		assert!(matches!(Pattern::new(PieceKind::Edge, &[2, 4, 2]), Err(Error::InvalidPattern(_))));
	}

	#[test]
	fn solved_state_projects_to_solved_substate() {
		for pattern in default_patterns() {
			assert_eq!(pattern.solved(), pattern.project(&CubeState::new()));
		}
	}

	mod rank {
		use super::*;

		#[test]
		fn unrank_inverts_rank_exhaustively() {
			for pattern in [
				Pattern::new(PieceKind::Edge, &[3, 7, 11]).unwrap(),
				Pattern::new(PieceKind::Corner, &[0, 2, 4]).unwrap(),
			] {
				for rank in 0..pattern.state_count() {
					assert_eq!(rank, pattern.rank(&pattern.unrank(rank)), "{pattern:?}");
				}
			}
		}

		#[test]
		fn compressed_corner_ranks_roundtrip() {
			let pattern = Pattern::all_corners();
			let mut rng = StdRng::seed_from_u64(5);
			for _ in 0..200 {
				let mut cube = CubeState::new();
				cube.randomize(40, &mut rng);
				let rank = pattern.rank_cube(&cube);
				assert!(rank < pattern.state_count());
				assert_eq!(pattern.project(&cube), pattern.unrank(rank));
			}
			assert_eq!(pattern.state_count() - 1, pattern.rank(&pattern.unrank(pattern.state_count() - 1)));
		}

		#[test]
		fn solved_corners_rank_zero() {
			assert_eq!(0, Pattern::all_corners().rank_cube(&CubeState::new()));
			assert_eq!(0, Pattern::first_edges().rank_cube(&CubeState::new()));
		}
	}

	#[test]
	fn transitions_agree_with_cube_moves() {
		let mut rng = StdRng::seed_from_u64(9);
		let patterns = [
			Pattern::all_corners(),
			Pattern::first_edges(),
			Pattern::last_edges(),
			Pattern::new(PieceKind::Edge, &[10, 1, 4]).unwrap(),
		];
		for _ in 0..20 {
			let mut cube = CubeState::new();
			cube.randomize(30, &mut rng);
			for (i, move_) in ALL_MOVES.iter().enumerate() {
				let mut moved = cube;
				moved.apply(*move_);
				for pattern in &patterns {
					let expected = pattern.project(&moved);
					let actual = pattern.apply(&pattern.project(&cube), &pattern.transitions()[i]);
					assert_eq!(expected, actual, "{move_} on {pattern:?}");
				}
			}
		}
	}
}
