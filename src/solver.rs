//! IDA* over full cube states, bounded by the pattern tables.
//!
//! The heuristic is the maximum over all tables; each table is an exact
//! distance for a relaxation of the cube, so the maximum is admissible and
//! the first solution found is optimal.

use std::{
	fs::File,
	io::{self, BufReader, BufWriter, Read, Write},
	path::{Path, PathBuf},
	time::Instant,
};

use log::{debug, info, warn};

use crate::{
	cube::CubeState,
	error::{Error, Result},
	moves::{ALL_MOVES, Face, Move},
	pattern::{Pattern, default_patterns},
	store::{self, PatternDatabase},
};



pub const DEFAULT_TABLE_PATH: &str = "cube.pdb";
/// Every solvable state is within 20 face turns of solved.
pub const DEFAULT_MAX_DEPTH: u8 = 20;

const BUNDLE_MAGIC: [u8; 4] = *b"CPDS";
const BUNDLE_VERSION: u16 = 1;



#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
	pub nodes_visited: u64,
	pub iterations: u32,
	/// Bound of the iteration that found the solution, equal to its length.
	pub final_bound: u8,
}

#[derive(Debug)]
pub struct Solver {
	max_depth: u8,
	table_path: PathBuf,
	patterns: Vec<Pattern>,
	databases: Option<Vec<PatternDatabase>>,
}

impl Solver {
	pub fn new(max_depth: u8) -> Self {
		Self {
			max_depth,
			table_path: PathBuf::from(DEFAULT_TABLE_PATH),
			patterns: default_patterns(),
			databases: None,
		}
	}

	pub fn with_table_path(mut self, table_path: impl Into<PathBuf>) -> Self {
		self.table_path = table_path.into();
		self
	}

	/// Replaces the pattern set; tables built for the previous set are dropped.
	pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
		self.patterns = patterns;
		self.databases = None;
		self
	}

	pub fn max_depth(&self) -> u8 {
		self.max_depth
	}

	pub fn table_path(&self) -> &Path {
		&self.table_path
	}

	pub fn patterns(&self) -> &[Pattern] {
		&self.patterns
	}

	pub fn is_initialized(&self) -> bool {
		self.databases.is_some()
	}

	pub fn databases(&self) -> &[PatternDatabase] {
		self.databases.as_deref().unwrap_or(&[])
	}

	/// Loads the tables from the table path, or builds and saves them when the
	/// file is missing or was made for other patterns. Does nothing once tables are present.
	pub fn init(&mut self) -> Result<()> {
		if self.is_initialized() {
			return Ok(())
		}
		let path = self.table_path.clone();
		match self.load(&path) {
			Ok(()) => return Ok(()),
			Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
				info!("no pattern tables at {}, building them", path.display());
			}
			Err(Error::ConfigurationMismatch(reason)) => {
				warn!("pattern tables at {} are unusable ({reason}), rebuilding", path.display());
			}
			Err(e) => return Err(e),
		}
		self.build()?;
		self.save(&path)
	}

	/// Builds every table in memory, without touching the table path.
	pub fn build(&mut self) -> Result<()> {
		let time_begin = Instant::now();
		let databases = self.patterns.iter()
			.cloned()
			.map(PatternDatabase::build)
			.collect::<Result<Vec<_>>>()?;
		info!("built {} pattern tables in {:.3}s", databases.len(), time_begin.elapsed().as_secs_f64());
		self.databases = Some(databases);
		Ok(())
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let databases = self.databases.as_ref().ok_or(Error::NotInitialized)?;
		let Ok(count) = u8::try_from(databases.len()) else {
			return Err(Error::InvalidPattern(format!(
				"{} tables do not fit in a bundle, at most {} do", databases.len(), u8::MAX
			)))
		};
		let path = path.as_ref();
		let mut writer = BufWriter::new(File::create(path)?);
		writer.write_all(&BUNDLE_MAGIC)?;
		writer.write_all(&BUNDLE_VERSION.to_le_bytes())?;
		writer.write_all(&[count])?;
		for database in databases {
			database.write_to(&mut writer)?;
		}
		writer.flush()?;
		info!("saved {} pattern tables to {}", databases.len(), path.display());
		Ok(())
	}

	/// Replaces the tables with the ones stored at `path`, which must match the pattern set.
	pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let time_begin = Instant::now();
		let mut reader = BufReader::new(File::open(path)?);
		let databases = read_bundle(&mut reader, &self.patterns)?;
		info!(
			"loaded {} pattern tables from {} in {:.3}s",
			databases.len(), path.display(), time_begin.elapsed().as_secs_f64()
		);
		self.databases = Some(databases);
		Ok(())
	}

	/// Lower bound on the solution length: the largest table distance.
	pub fn estimate(&self, cube: &CubeState) -> u8 {
		heuristic(self.databases(), cube)
	}

	pub fn solve(&self, cube: &CubeState) -> Result<Vec<Move>> {
		self.solve_with_stats(cube).map(|(moves, _)| moves)
	}

	/// Shortest move sequence taking `cube` to solved. `cube` itself is left untouched.
	pub fn solve_with_stats(&self, cube: &CubeState) -> Result<(Vec<Move>, SearchStats)> {
		let databases = self.databases.as_deref().ok_or(Error::NotInitialized)?;
		if !cube.is_structurally_valid() {
			return Err(Error::InvalidState)
		}
		if !cube.is_solvable() {
			return Err(Error::Unsolvable)
		}

		let time_begin = Instant::now();
		let mut search = Search { databases, path: Vec::new(), nodes_visited: 0 };
		let mut stats = SearchStats::default();
		let mut bound = heuristic(databases, cube);
		info!("searching for a solution, estimate {bound}");
		loop {
			if bound > self.max_depth {
				return Err(Error::SearchExhausted { max_depth: self.max_depth })
			}
			debug!("searching bound {bound}...");
			let bound_begin = Instant::now();
			let nodes_before = search.nodes_visited;
			stats.iterations += 1;
			let outcome = search.search(cube, 0, bound, None);
			debug!(
				"traversed {} nodes in {:.3}s",
				search.nodes_visited - nodes_before, bound_begin.elapsed().as_secs_f64()
			);
			match outcome {
				Outcome::Found => break,
				// nothing left to expand, only possible for a state the checks above let through
				Outcome::Exceeded(u8::MAX) => return Err(Error::SearchExhausted { max_depth: self.max_depth }),
				Outcome::Exceeded(next_bound) => bound = next_bound,
			}
		}

		stats.nodes_visited = search.nodes_visited;
		stats.final_bound = bound;
		info!(
			"found solution of length {} in {:.3}s ({} nodes)",
			search.path.len(), time_begin.elapsed().as_secs_f64(), stats.nodes_visited
		);
		Ok((search.path, stats))
	}
}

impl Default for Solver {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_DEPTH)
	}
}



fn heuristic(databases: &[PatternDatabase], cube: &CubeState) -> u8 {
	databases.iter().map(|database| database.lookup(cube)).max().unwrap_or(0)
}

fn read_bundle<R: Read>(reader: &mut R, patterns: &[Pattern]) -> Result<Vec<PatternDatabase>> {
	let mut magic = [0u8; 4];
	store::read_exact(reader, &mut magic)?;
	if magic != BUNDLE_MAGIC {
		return Err(Error::ConfigurationMismatch("not a pattern table bundle".to_string()))
	}
	let mut version = [0u8; 2];
	store::read_exact(reader, &mut version)?;
	let version = u16::from_le_bytes(version);
	if version != BUNDLE_VERSION {
		return Err(Error::ConfigurationMismatch(format!("bundle version {version}, expected {BUNDLE_VERSION}")))
	}
	let mut count = [0u8; 1];
	store::read_exact(reader, &mut count)?;
	if count[0] as usize != patterns.len() {
		return Err(Error::ConfigurationMismatch(format!(
			"bundle holds {} tables, expected {}", count[0], patterns.len()
		)))
	}
	patterns.iter()
		.map(|pattern| PatternDatabase::read_from(reader, pattern))
		.collect()
}

enum Outcome {
	Found,
	/// Smallest f-value above the bound, `u8::MAX` when nothing was cut off.
	Exceeded(u8),
}

struct Search<'a> {
	databases: &'a [PatternDatabase],
	path: Vec<Move>,
	nodes_visited: u64,
}

impl Search<'_> {
	fn search(&mut self, cube: &CubeState, g: u8, bound: u8, previous: Option<Face>) -> Outcome {
		self.nodes_visited += 1;
		let f = g.saturating_add(heuristic(self.databases, cube));
		if f > bound {
			return Outcome::Exceeded(f)
		}
		if cube.is_solved() {
			return Outcome::Found
		}

		let mut next_bound = u8::MAX;
		for move_ in ALL_MOVES {
			if previous.is_some_and(|previous| move_.face.is_redundant_after(previous)) {
				continue
			}
			let mut child = *cube;
			child.apply(move_);
			self.path.push(move_);
			match self.search(&child, g.saturating_add(1), bound, Some(move_.face)) {
				Outcome::Found => return Outcome::Found,
				Outcome::Exceeded(f) => next_bound = next_bound.min(f),
			}
			self.path.pop();
		}
		Outcome::Exceeded(next_bound)
	}
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{moves::parse_moves, pattern::PieceKind};

	fn small_solver() -> Solver {
		let mut solver = Solver::new(8).with_patterns(vec![
			Pattern::new(PieceKind::Corner, &[0, 1, 2, 3]).unwrap(),
			Pattern::new(PieceKind::Edge, &[0, 1, 2]).unwrap(),
			Pattern::new(PieceKind::Edge, &[4, 6, 8]).unwrap(),
		]);
		solver.build().unwrap();
		solver
	}

	#[test]
	fn defaults() {
		let solver = Solver::default();
		assert_eq!(DEFAULT_MAX_DEPTH, solver.max_depth());
		assert_eq!(Path::new(DEFAULT_TABLE_PATH), solver.table_path());
		assert_eq!(default_patterns(), solver.patterns());
		assert!(!solver.is_initialized());
		assert_eq!(0, solver.estimate(&CubeState::new()));
	}

	#[test]
	fn with_patterns_drops_tables() {
		let solver = small_solver();
		assert!(solver.is_initialized());
		let solver = solver.with_patterns(vec![Pattern::new(PieceKind::Edge, &[5]).unwrap()]);
		assert!(!solver.is_initialized());
	}

	#[test_log::test]
	fn solves_short_scramble() {
		let solver = small_solver();
		let mut cube = CubeState::new();
		cube.apply_moves(&parse_moves("R U'").unwrap());
		let (moves, stats) = solver.solve_with_stats(&cube).unwrap();
		assert_eq!(2, moves.len());
		assert_eq!(2, stats.final_bound);
		assert!(stats.iterations >= 1);
		assert!(stats.nodes_visited >= 3);
		let mut replayed = cube;
		replayed.apply_moves(&moves);
		assert!(replayed.is_solved());
	}

	#[test]
	fn never_follows_a_face_with_itself() {
		let solver = small_solver();
		let mut cube = CubeState::new();
		cube.apply_moves(&parse_moves("F2 D B'").unwrap());
		let moves = solver.solve(&cube).unwrap();
		assert_eq!(3, moves.len());
		for pair in moves.windows(2) {
			assert!(!pair[1].face.is_redundant_after(pair[0].face), "{pair:?}");
		}
	}

	#[test]
	fn bound_above_max_depth_is_reported() {
		let solver = Solver::new(2).with_patterns(vec![Pattern::new(PieceKind::Edge, &[0, 1]).unwrap()]);
		let mut solver = solver;
		solver.build().unwrap();
		let mut cube = CubeState::new();
		cube.apply_moves(&parse_moves("R U F").unwrap());
		assert!(matches!(solver.solve(&cube), Err(Error::SearchExhausted { max_depth: 2 })));
	}

	#[test]
	fn bundle_table_count_is_bounded() {
		let patterns: Vec<Pattern> = (0..=u8::MAX)
			.map(|i| Pattern::new(PieceKind::Edge, &[i % 12]).unwrap())
			.collect();
		let mut solver = Solver::new(5).with_patterns(patterns);
		solver.build().unwrap();
		let path = std::env::temp_dir().join(format!("too-many-tables-{}.pdb", std::process::id()));
		assert!(matches!(solver.save(&path), Err(Error::InvalidPattern(_))));
		assert!(!path.exists());

		let mut solver = solver.with_patterns(vec![Pattern::new(PieceKind::Edge, &[3]).unwrap(); u8::MAX as usize]);
		solver.build().unwrap();
		solver.save(&path).unwrap();
		let mut loaded = Solver::new(5).with_patterns(solver.patterns().to_vec());
		loaded.load(&path).unwrap();
		std::fs::remove_file(&path).unwrap();
		assert_eq!(u8::MAX as usize, loaded.databases().len());
	}

	#[test]
	fn save_requires_tables() {
		let solver = Solver::new(5);
		let path = std::env::temp_dir().join("never-written.pdb");
		assert!(matches!(solver.save(&path), Err(Error::NotInitialized)));
		assert!(!path.exists());
	}
}
