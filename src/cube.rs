//! Cubie-level cube state: permutation and orientation of corners and edges.

use std::{fs, path::Path, str::FromStr};

use rand::Rng;

use crate::{
	error::{Error, Result},
	moves::{
		ALL_FACES, CORNER_COUNT, CORNER_CYCLES, CORNER_TWISTS, EDGE_COUNT, EDGE_CYCLES, EDGE_FLIPS,
		ExtArrayRotate4, Face, Move,
	},
};



/// Sticker colors visible on a cubie, indexed by [`Face::index`]; the color
/// of a sticker is the face it belongs to on the solved cube.
pub type Stickers = [Option<Face>; 6];

/// `cp[slot]` is the corner piece in that slot and `co[slot]` its twist,
/// likewise for edges. See [`crate::moves`] for slot numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CubeState {
	pub corner_permutation: [u8; CORNER_COUNT],
	pub corner_orientation: [u8; CORNER_COUNT],
	pub edge_permutation: [u8; EDGE_COUNT],
	pub edge_orientation: [u8; EDGE_COUNT],
}

impl Default for CubeState {
	fn default() -> Self {
		Self::new()
	}
}

impl CubeState {
	const SOLVED: Self = Self {
		corner_permutation: [0, 1, 2, 3, 4, 5, 6, 7],
		corner_orientation: [0; CORNER_COUNT],
		edge_permutation: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
		edge_orientation: [0; EDGE_COUNT],
	};

	pub const fn new() -> Self {
		Self::SOLVED
	}

	pub fn is_solved(&self) -> bool {
		*self == Self::SOLVED
	}

	/// Turns `face` clockwise by `count` quarter turns; `count` is taken mod 4.
	pub fn apply_move(&mut self, face: Face, count: u8) {
		for _ in 0..count % 4 {
			self.quarter_turn(face);
		}
	}

	pub fn apply(&mut self, move_: Move) {
		self.apply_move(move_.face, move_.count);
	}

	pub fn apply_moves(&mut self, moves: &[Move]) {
		for &move_ in moves {
			self.apply(move_);
		}
	}

	fn quarter_turn(&mut self, face: Face) {
		let f = face.index();

		let [c1, c2, c3, c4] = CORNER_CYCLES[f];
		self.corner_permutation.rotate4(c1, c2, c3, c4);
		self.corner_orientation.rotate4(c1, c2, c3, c4);
		for (&slot, &twist) in CORNER_CYCLES[f].iter().zip(&CORNER_TWISTS[f]) {
			self.corner_orientation[slot] = (self.corner_orientation[slot] + twist) % 3;
		}

		let [e1, e2, e3, e4] = EDGE_CYCLES[f];
		self.edge_permutation.rotate4(e1, e2, e3, e4);
		self.edge_orientation.rotate4(e1, e2, e3, e4);
		for (&slot, &flip) in EDGE_CYCLES[f].iter().zip(&EDGE_FLIPS[f]) {
			self.edge_orientation[slot] ^= flip;
		}
	}

	/// Both permutation vectors are bijections. Says nothing about whether the
	/// state can actually be reached by turning faces, see [`Self::is_solvable`].
	pub fn is_structurally_valid(&self) -> bool {
		is_permutation(&self.corner_permutation) && is_permutation(&self.edge_permutation)
	}

	/// Structurally valid and reachable from the solved cube: orientations in
	/// range, total twist divisible by 3, total flip even, and equal
	/// permutation parity for corners and edges.
	pub fn is_solvable(&self) -> bool {
		if !self.is_structurally_valid() {
			return false
		}
		if self.corner_orientation.iter().any(|&twist| twist >= 3)
			|| self.edge_orientation.iter().any(|&flip| flip >= 2)
		{
			return false
		}
		let twist: u32 = self.corner_orientation.iter().map(|&t| t as u32).sum();
		let flip: u32 = self.edge_orientation.iter().map(|&f| f as u32).sum();
		twist % 3 == 0
			&& flip % 2 == 0
			&& is_odd_permutation(&self.corner_permutation) == is_odd_permutation(&self.edge_permutation)
	}

	/// Applies `step_count` quarter turns of uniformly chosen faces and returns them.
	///
	/// Short walks stay close to solved, so this is a scramble, not a uniform sample.
	pub fn randomize<R: Rng + ?Sized>(&mut self, step_count: usize, rng: &mut R) -> Vec<Move> {
		let mut moves = Vec::with_capacity(step_count);
		for _ in 0..step_count {
			let face = ALL_FACES[rng.random_range(0..ALL_FACES.len())];
			self.apply_move(face, 1);
			moves.push(Move::new(face, 1));
		}
		moves
	}

	/// Stickers shown by the cubie at grid cell `(level, x, y)`, each in `0..3`.
	///
	/// Level 0 is the bottom layer, `x` runs back to front and `y` left to
	/// right. Returns `None` outside the grid or when the occupying piece
	/// number is out of range.
	pub fn decode_visible_face(&self, level: usize, x: usize, y: usize) -> Option<Stickers> {
		if level >= 3 || x >= 3 || y >= 3 {
			return None
		}
		let mut stickers: Stickers = [None; 6];
		let cell = level * 9 + x * 3 + y;

		if level != 1 && x != 1 && y != 1 {
			let slot = (level << 1) | x | ((x ^ y) >> 1);
			let slot_faces = CORNER_FACES[slot];
			let piece_colors = CORNER_FACES.get(self.corner_permutation[slot] as usize)?;
			let twist = self.corner_orientation[slot] as usize;
			for i in 0..3 {
				stickers[slot_faces[i].index()] = Some(piece_colors[(i + twist) % 3]);
			}
		} else if let Some(slot) = EDGE_AT_CELL[cell] {
			let slot_faces = EDGE_FACES[slot];
			let piece_colors = EDGE_FACES.get(self.edge_permutation[slot] as usize)?;
			let flip = (self.edge_orientation[slot] & 1) as usize;
			stickers[slot_faces[0].index()] = Some(piece_colors[flip]);
			stickers[slot_faces[1].index()] = Some(piece_colors[flip ^ 1]);
		} else if let Some(face) = CENTER_AT_CELL[cell] {
			stickers[face.index()] = Some(face);
		}

		Some(stickers)
	}

	/// One line per grid cell: `block(level, x, y) = top, bottom, front, back, left, right`,
	/// with `-1` where no sticker is visible.
	pub fn block_listing(&self) -> String {
		let mut out = String::new();
		for level in 0..3 {
			for x in 0..3 {
				for y in 0..3 {
					let stickers = self.decode_visible_face(level, x, y).unwrap_or([None; 6]);
					let values: Vec<String> = stickers.iter()
						.map(|sticker| sticker.map_or(-1, |face| face.index() as i32).to_string())
						.collect();
					out.push_str(&format!("block({level}, {x}, {y}) = {}\n", values.join(", ")));
				}
			}
		}
		out
	}

	/// Four lines of space separated integers: corner permutation, corner
	/// orientation, edge permutation, edge orientation.
	pub fn to_text(&self) -> String {
		[
			join(&self.corner_permutation),
			join(&self.corner_orientation),
			join(&self.edge_permutation),
			join(&self.edge_orientation),
		].map(|line| line + "\n").concat()
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		fs::write(path, self.to_text())?;
		Ok(())
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		fs::read_to_string(path)?.parse()
	}
}

impl FromStr for CubeState {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let values = s.split_whitespace()
			.map(|token| token.parse::<u8>().map_err(|_| Error::Parse(format!("`{token}` is not a small integer"))))
			.collect::<Result<Vec<u8>>>()?;
		let expected = 2 * CORNER_COUNT + 2 * EDGE_COUNT;
		if values.len() != expected {
			return Err(Error::Parse(format!("expected {expected} values, found {}", values.len())))
		}

		let mut cube = CubeState::new();
		let (cp, rest) = values.split_at(CORNER_COUNT);
		let (co, rest) = rest.split_at(CORNER_COUNT);
		let (ep, eo) = rest.split_at(EDGE_COUNT);
		cube.corner_permutation.copy_from_slice(cp);
		cube.corner_orientation.copy_from_slice(co);
		cube.edge_permutation.copy_from_slice(ep);
		cube.edge_orientation.copy_from_slice(eo);

		check_range("corner permutation", cp, CORNER_COUNT as u8)?;
		check_range("corner orientation", co, 3)?;
		check_range("edge permutation", ep, EDGE_COUNT as u8)?;
		check_range("edge orientation", eo, 2)?;
		Ok(cube)
	}
}



// faces of each corner slot, starting at its top/bottom sticker and going clockwise
const CORNER_FACES: [[Face; 3]; CORNER_COUNT] = {
	use Face::*;
	[
		[Bottom, Back, Left],
		[Bottom, Right, Back],
		[Bottom, Front, Right],
		[Bottom, Left, Front],
		[Top, Left, Back],
		[Top, Back, Right],
		[Top, Right, Front],
		[Top, Front, Left],
	]
};

// faces of each edge slot, reference sticker first
const EDGE_FACES: [[Face; 2]; EDGE_COUNT] = {
	use Face::*;
	[
		[Left, Back], [Right, Back], [Right, Front], [Left, Front],
		[Top, Back], [Top, Right], [Top, Front], [Top, Left],
		[Bottom, Back], [Bottom, Right], [Bottom, Front], [Bottom, Left],
	]
};

// indexed by level * 9 + x * 3 + y
const EDGE_AT_CELL: [Option<usize>; 27] = [
	None, Some(8), None, Some(11), None, Some(9), None, Some(10), None,
	Some(0), None, Some(1), None, None, None, Some(3), None, Some(2),
	None, Some(4), None, Some(7), None, Some(5), None, Some(6), None,
];

const CENTER_AT_CELL: [Option<Face>; 27] = {
	use Face::*;
	[
		None, None, None, None, Some(Bottom), None, None, None, None,
		None, Some(Back), None, Some(Left), None, Some(Right), None, Some(Front), None,
		None, None, None, None, Some(Top), None, None, None, None,
	]
};

fn is_permutation(values: &[u8]) -> bool {
	let mut seen = [false; EDGE_COUNT];
	for &value in values {
		let value = value as usize;
		if value >= values.len() || seen[value] {
			return false
		}
		seen[value] = true;
	}
	true
}

fn is_odd_permutation(values: &[u8]) -> bool {
	let mut inversions = 0;
	for i in 0..values.len() {
		for j in i + 1..values.len() {
			if values[i] > values[j] {
				inversions += 1;
			}
		}
	}
	inversions % 2 == 1
}

fn join(values: &[u8]) -> String {
	values.iter().map(u8::to_string).collect::<Vec<_>>().join(" ")
}

fn check_range(name: &str, values: &[u8], bound: u8) -> Result<()> {
	match values.iter().find(|&&value| value >= bound) {
		Some(value) => Err(Error::Parse(format!("{name} value {value} is not below {bound}"))),
		None => Ok(()),
	}
}
