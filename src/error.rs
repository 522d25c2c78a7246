use std::io;

use thiserror::Error;



#[derive(Error, Debug)]
pub enum Error {
	/// A persisted table was produced by a different pattern, format or version.
	#[error("pattern table does not match the expected configuration: {0}")]
	ConfigurationMismatch(String),
	/// Enumeration left ranks unreached or ran out of distance values.
	#[error("pattern table build failed: {0}")]
	BuildFailure(String),
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	#[error("no solution found within {max_depth} moves")]
	SearchExhausted { max_depth: u8 },
	#[error("cube state is not structurally valid")]
	InvalidState,
	#[error("cube state is not reachable from the solved cube")]
	Unsolvable,
	#[error("solver tables have not been initialized, call `init` or `load` first")]
	NotInitialized,
	#[error("invalid cube state text: {0}")]
	Parse(String),
	#[error("invalid pattern: {0}")]
	InvalidPattern(String),
	#[error("invalid move `{0}`")]
	InvalidMove(String),
}

pub type Result<T> = std::result::Result<T, Error>;
