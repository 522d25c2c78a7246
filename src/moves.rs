//! Faces, moves and the static move table.
//!
//! Slot numbering (corners are named by their faces, top layer first):
//!
//! corners: 0 DBL, 1 DRB, 2 DFR, 3 DLF, 4 ULB, 5 UBR, 6 URF, 7 UFL
//! edges:   0 LB, 1 RB, 2 RF, 3 LF, 4 UB, 5 UR, 6 UF, 7 UL, 8 DB, 9 DR, 10 DF, 11 DL
//!
//! A quarter turn moves the piece in cycle position `i` to cycle position
//! `i + 1`, which is clockwise when looking at the turned face.
//!
//! Orientation convention: a corner's twist counts how far its reference
//! sticker sits from the top/bottom face, so top and bottom turns never
//! twist corners and every other face twists its four corners by
//! `+1, -1, +1, -1` (mod 3) along the cycle. An edge's flip is measured
//! against the left/right axis, so only left and right turns flip edges,
//! and they flip all four edges they move.

use std::{fmt, str::FromStr, sync::LazyLock};

use crate::{cube::CubeState, error::{Error, Result}};



pub const CORNER_COUNT: usize = 8;
pub const EDGE_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Face { Top, Bottom, Front, Back, Left, Right }
pub const ALL_FACES: [Face; 6] = {use Face::*; [Top, Bottom, Front, Back, Left, Right]};

impl Face {
	pub const fn index(self) -> usize {
		self as usize
	}

	/// Faces are listed in opposite pairs, so the partner only differs in the lowest bit.
	pub const fn opposite(self) -> Self {
		match self {
			Face::Top => Face::Bottom,
			Face::Bottom => Face::Top,
			Face::Front => Face::Back,
			Face::Back => Face::Front,
			Face::Left => Face::Right,
			Face::Right => Face::Left,
		}
	}

	pub const fn letter(self) -> char {
		match self {
			Face::Top => 'U',
			Face::Bottom => 'D',
			Face::Front => 'F',
			Face::Back => 'B',
			Face::Left => 'L',
			Face::Right => 'R',
		}
	}

	pub const fn from_letter(letter: char) -> Option<Self> {
		match letter {
			'U' => Some(Face::Top),
			'D' => Some(Face::Bottom),
			'F' => Some(Face::Front),
			'B' => Some(Face::Back),
			'L' => Some(Face::Left),
			'R' => Some(Face::Right),
			_ => None,
		}
	}

	/// Whether turning `self` directly after `previous` can only repeat work.
	///
	/// Two turns of the same face merge into one, and opposite faces commute,
	/// so of the two orders `X Y` / `Y X` only the one starting with the lower
	/// face is kept.
	pub const fn is_redundant_after(self, previous: Face) -> bool {
		self.index() >> 1 == previous.index() >> 1 && self.index() <= previous.index()
	}
}

impl fmt::Display for Face {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.letter())
	}
}



/// A face turned by `count` clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
	pub face: Face,
	pub count: u8,
}

/// Every non-identity move: 6 faces times quarter, half and inverse turns.
pub const ALL_MOVES: [Move; 18] = {
	let mut moves = [Move { face: Face::Top, count: 1 }; 18];
	let mut i = 0;
	while i < 18 {
		moves[i] = Move { face: ALL_FACES[i / 3], count: (i % 3) as u8 + 1 };
		i += 1;
	}
	moves
};

impl Move {
	pub const fn new(face: Face, count: u8) -> Self {
		Self { face, count }
	}

	/// Position in [`ALL_MOVES`], or `None` for an identity turn.
	pub const fn index(self) -> Option<usize> {
		match self.count % 4 {
			0 => None,
			count => Some(self.face.index() * 3 + count as usize - 1),
		}
	}

	pub const fn inverse(self) -> Self {
		Self { face: self.face, count: (4 - self.count % 4) % 4 }
	}
}

impl fmt::Display for Move {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.count % 4 {
			0 => write!(f, "{}0", self.face),
			1 => write!(f, "{}", self.face),
			2 => write!(f, "{}2", self.face),
			_ => write!(f, "{}'", self.face),
		}
	}
}

impl FromStr for Move {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let mut chars = s.chars();
		let face = chars.next()
			.and_then(Face::from_letter)
			.ok_or_else(|| Error::InvalidMove(s.to_string()))?;
		let count = match chars.as_str() {
			"" | "1" => 1,
			"2" | "2'" => 2,
			"'" | "3" => 3,
			_ => return Err(Error::InvalidMove(s.to_string())),
		};
		Ok(Move { face, count })
	}
}

/// Parses a whitespace separated sequence such as `"F R U2 L'"`.
pub fn parse_moves(s: &str) -> Result<Vec<Move>> {
	s.split_whitespace().map(str::parse).collect()
}

pub fn format_moves(moves: &[Move]) -> String {
	moves.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}



// face order: top, bottom, front, back, left, right
pub const CORNER_CYCLES: [[usize; 4]; 6] = [
	[4, 5, 6, 7],
	[3, 2, 1, 0],
	[7, 6, 2, 3],
	[5, 4, 0, 1],
	[4, 7, 3, 0],
	[6, 5, 1, 2],
];

pub const EDGE_CYCLES: [[usize; 4]; 6] = [
	[4, 5, 6, 7],
	[11, 10, 9, 8],
	[6, 2, 10, 3],
	[4, 0, 8, 1],
	[7, 3, 11, 0],
	[5, 1, 9, 2],
];

/// Twist (mod 3) added to the corner that lands on each cycle position.
pub const CORNER_TWISTS: [[u8; 4]; 6] = [
	[0, 0, 0, 0],
	[0, 0, 0, 0],
	[1, 2, 1, 2],
	[1, 2, 1, 2],
	[1, 2, 1, 2],
	[1, 2, 1, 2],
];

/// Flip (mod 2) applied to the edge that lands on each cycle position.
pub const EDGE_FLIPS: [[u8; 4]; 6] = [
	[0, 0, 0, 0],
	[0, 0, 0, 0],
	[0, 0, 0, 0],
	[0, 0, 0, 0],
	[1, 1, 1, 1],
	[1, 1, 1, 1],
];



pub trait ExtArrayRotate4 {
	fn rotate4(&mut self, i1: usize, i2: usize, i3: usize, i4: usize);
}
impl<T: Copy, const L: usize> ExtArrayRotate4 for [T; L] {
	#[inline]
	fn rotate4(&mut self, i1: usize, i2: usize, i3: usize, i4: usize) {
		let temp = self[i4];
		self[i4] = self[i3];
		self[i3] = self[i2];
		self[i2] = self[i1];
		self[i1] = temp;
	}
}



/// Where a move sends the piece sitting in each slot, and the orientation
/// change it picks up on the way. Only the first 8 entries are used for corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTransition {
	pub dest: [u8; EDGE_COUNT],
	pub twist: [u8; EDGE_COUNT],
}

#[derive(Debug)]
pub struct MoveTransitions {
	pub corners: [SlotTransition; 18],
	pub edges: [SlotTransition; 18],
}

/// Slot transitions of all 18 moves, read off the full cube model so that the
/// convention above lives in exactly one place.
pub static TRANSITIONS: LazyLock<MoveTransitions> = LazyLock::new(|| {
	let empty = SlotTransition { dest: [0; EDGE_COUNT], twist: [0; EDGE_COUNT] };
	let mut transitions = MoveTransitions { corners: [empty; 18], edges: [empty; 18] };
	for (i, move_) in ALL_MOVES.iter().enumerate() {
		let mut cube = CubeState::new();
		cube.apply_move(move_.face, move_.count);
		// starting from solved, the piece number is the slot it came from
		for slot in 0..CORNER_COUNT {
			let source = cube.corner_permutation[slot] as usize;
			transitions.corners[i].dest[source] = slot as u8;
			transitions.corners[i].twist[source] = cube.corner_orientation[slot];
		}
		for slot in 0..EDGE_COUNT {
			let source = cube.edge_permutation[slot] as usize;
			transitions.edges[i].dest[source] = slot as u8;
			transitions.edges[i].twist[source] = cube.edge_orientation[slot];
		}
	}
	transitions
});




#[test]
fn rotate4() {
	//              0    1    2    3    4    5    6    7
	let mut arr = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
	arr.rotate4(1, 4, 5, 6);
	assert_eq!(
		['a', 'g', 'c', 'd', 'b', 'e', 'f', 'h'],
		arr
	);
}
