//! Built distance tables: heuristic lookup and binary persistence.
//!
//! Table format (little endian):
//! - 4 bytes: magic `CPDB`
//! - u16: format version
//! - u8: piece kind, u8: orientation radix, u8: slot count
//! - u8: tracked piece count, then one byte per tracked piece
//! - u64: rank count
//! - one distance byte per rank

use std::{
	fs::File,
	io::{self, BufReader, BufWriter, Read, Write},
	path::Path,
};

use crate::{
	builder::{self, UNREACHED},
	cube::CubeState,
	error::{Error, Result},
	pattern::{Pattern, PieceKind},
};



const MAGIC: [u8; 4] = *b"CPDB";
pub const FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDatabase {
	pattern: Pattern,
	distances: Vec<u8>,
}

impl PatternDatabase {
	/// Enumerates the whole sub-problem; expensive for the full-size patterns.
	pub fn build(pattern: Pattern) -> Result<Self> {
		let distances = builder::build(&pattern)?;
		Ok(Self { pattern, distances })
	}

	pub fn from_distances(pattern: Pattern, distances: Vec<u8>) -> Result<Self> {
		if distances.len() != pattern.state_count() {
			return Err(Error::ConfigurationMismatch(format!(
				"{} distances for a pattern with {} ranks", distances.len(), pattern.state_count()
			)))
		}
		Ok(Self { pattern, distances })
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	pub fn distances(&self) -> &[u8] {
		&self.distances
	}

	pub fn distance(&self, rank: usize) -> u8 {
		// zero is still a lower bound for a rank that cannot come from a valid state
		self.distances.get(rank).copied().unwrap_or(0)
	}

	/// Lower bound on the moves needed to solve `cube`.
	#[inline]
	pub fn lookup(&self, cube: &CubeState) -> u8 {
		self.distance(self.pattern.rank_cube(cube))
	}

	pub fn max_distance(&self) -> u8 {
		self.distances.iter().copied().max().unwrap_or(0)
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
		let pattern = &self.pattern;
		writer.write_all(&MAGIC)?;
		writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
		writer.write_all(&[
			pattern.kind().tag(),
			pattern.radix(),
			pattern.slot_count() as u8,
			pattern.pieces().len() as u8,
		])?;
		writer.write_all(pattern.pieces())?;
		writer.write_all(&(self.distances.len() as u64).to_le_bytes())?;
		writer.write_all(&self.distances)?;
		Ok(())
	}

	/// Reads one table and checks that it was built for `expected`.
	pub fn read_from<R: Read>(reader: &mut R, expected: &Pattern) -> Result<Self> {
		let mut magic = [0u8; 4];
		read_exact(reader, &mut magic)?;
		if magic != MAGIC {
			return Err(Error::ConfigurationMismatch("not a pattern table".to_string()))
		}
		let mut version = [0u8; 2];
		read_exact(reader, &mut version)?;
		let version = u16::from_le_bytes(version);
		if version != FORMAT_VERSION {
			return Err(Error::ConfigurationMismatch(format!(
				"format version {version}, expected {FORMAT_VERSION}"
			)))
		}

		let mut header = [0u8; 4];
		read_exact(reader, &mut header)?;
		let [kind, radix, slot_count, piece_count] = header;
		let kind = PieceKind::from_tag(kind)
			.ok_or_else(|| Error::ConfigurationMismatch(format!("unknown piece kind {kind}")))?;
		let mut pieces = vec![0u8; piece_count as usize];
		read_exact(reader, &mut pieces)?;
		if kind != expected.kind()
			|| radix != expected.radix()
			|| slot_count as usize != expected.slot_count()
			|| pieces != expected.pieces()
		{
			return Err(Error::ConfigurationMismatch(format!(
				"table tracks {kind:?} {pieces:?} (radix {radix}), expected {:?} {:?}",
				expected.kind(), expected.pieces()
			)))
		}

		let mut count = [0u8; 8];
		read_exact(reader, &mut count)?;
		let count = u64::from_le_bytes(count);
		if count != expected.state_count() as u64 {
			return Err(Error::ConfigurationMismatch(format!(
				"table has {count} ranks, expected {}", expected.state_count()
			)))
		}
		let mut distances = vec![0u8; expected.state_count()];
		read_exact(reader, &mut distances)?;
		if distances.contains(&UNREACHED) {
			return Err(Error::ConfigurationMismatch("table contains unreached ranks".to_string()))
		}

		Ok(Self { pattern: expected.clone(), distances })
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
		let mut writer = BufWriter::new(File::create(path)?);
		self.write_to(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	pub fn load(path: impl AsRef<Path>, expected: &Pattern) -> Result<Self> {
		let mut reader = BufReader::new(File::open(path)?);
		Self::read_from(&mut reader, expected)
	}
}

/// `read_exact` that reports a short file as a mismatch rather than an I/O failure.
pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
	reader.read_exact(buf).map_err(|e| match e.kind() {
		io::ErrorKind::UnexpectedEof => Error::ConfigurationMismatch("file is truncated".to_string()),
		_ => Error::Io(e),
	})
}



#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use rand::{SeedableRng, rngs::StdRng};

	use super::*;
	use crate::moves::parse_moves;

	fn small_database() -> PatternDatabase {
		PatternDatabase::build(Pattern::new(PieceKind::Edge, &[2, 3, 6]).unwrap()).unwrap()
	}

	fn encoded(database: &PatternDatabase) -> Vec<u8> {
		let mut bytes = Vec::new();
		database.write_to(&mut bytes).unwrap();
		bytes
	}

	#[test]
	fn lookup() {
		let database = small_database();
		assert_eq!(0, database.lookup(&CubeState::new()));
		let mut cube = CubeState::new();
		cube.apply_moves(&parse_moves("F").unwrap());
		assert_eq!(1, database.lookup(&cube));
		let mut rng = StdRng::seed_from_u64(1);
		for steps in 0..10 {
			let mut cube = CubeState::new();
			cube.randomize(steps, &mut rng);
			assert!(database.lookup(&cube) as usize <= steps);
		}
		assert!(database.max_distance() > 0);
	}

	mod persistence {
		use super::*;

		#[test]
		fn roundtrip_is_identical() {
			let database = small_database();
			let bytes = encoded(&database);
			let loaded = PatternDatabase::read_from(&mut Cursor::new(&bytes), database.pattern()).unwrap();
			assert_eq!(database, loaded);
			assert_eq!(database.distances(), loaded.distances());
		}

		#[test]
		fn file_roundtrip() {
			let database = small_database();
			let path = std::env::temp_dir().join(format!("pattern-table-{}.pdb", std::process::id()));
			database.save(&path).unwrap();
			let loaded = PatternDatabase::load(&path, database.pattern());
			std::fs::remove_file(&path).unwrap();
			assert_eq!(database, loaded.unwrap());
		}

		#[test]
		fn other_pattern_is_rejected() {
			let database = small_database();
			let bytes = encoded(&database);
			for other in [
				Pattern::new(PieceKind::Edge, &[2, 3, 7]).unwrap(),
				Pattern::new(PieceKind::Edge, &[3, 2, 6]).unwrap(),
				Pattern::new(PieceKind::Corner, &[2, 3, 6]).unwrap(),
			] {
				let result = PatternDatabase::read_from(&mut Cursor::new(&bytes), &other);
				assert!(matches!(result, Err(Error::ConfigurationMismatch(_))), "{other:?}");
			}
		}

		#[test]
		fn damaged_files_are_rejected() {
			let database = small_database();
			let pattern = database.pattern();
			let bytes = encoded(&database);

			let truncated = &bytes[..bytes.len() - 1];
			assert!(matches!(
				PatternDatabase::read_from(&mut Cursor::new(truncated), pattern),
				Err(Error::ConfigurationMismatch(_))
			));

			let mut bad_magic = bytes.clone();
			bad_magic[0] = b'X';
			assert!(matches!(
				PatternDatabase::read_from(&mut Cursor::new(&bad_magic), pattern),
				Err(Error::ConfigurationMismatch(_))
			));

			let mut bad_version = bytes.clone();
			bad_version[4] = 99;
			assert!(matches!(
				PatternDatabase::read_from(&mut Cursor::new(&bad_version), pattern),
				Err(Error::ConfigurationMismatch(_))
			));

			let mut unreached = bytes;
			let last = unreached.len() - 1;
			unreached[last] = UNREACHED;
			assert!(matches!(
				PatternDatabase::read_from(&mut Cursor::new(&unreached), pattern),
				Err(Error::ConfigurationMismatch(_))
			));
		}

		#[test]
		fn wrong_length() {
			let pattern = Pattern::new(PieceKind::Edge, &[1]).unwrap();
			assert!(matches!(
				PatternDatabase::from_distances(pattern.clone(), vec![0; 3]),
				Err(Error::ConfigurationMismatch(_))
			));
			assert!(PatternDatabase::from_distances(pattern, vec![0; 24]).is_ok());
		}
	}
}
