//! Optimal Rubik's cube solving by IDA* with pattern database heuristics.

pub mod builder;
pub mod cube;
pub mod error;
pub mod moves;
pub mod pattern;
pub mod solver;
pub mod store;

pub use cube::CubeState;
pub use error::{Error, Result};
pub use moves::{Face, Move, format_moves, parse_moves};
pub use pattern::{Pattern, PieceKind};
pub use solver::{DEFAULT_MAX_DEPTH, DEFAULT_TABLE_PATH, SearchStats, Solver};
pub use store::PatternDatabase;
