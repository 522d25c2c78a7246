//! Rubiks Cube Solver by IDA* with pattern databases.

use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, error};
use rand::{SeedableRng, rng, rngs::StdRng};

use rubiks_cube_ida::{
	CubeState, DEFAULT_MAX_DEPTH, DEFAULT_TABLE_PATH, Result, Solver, format_moves, parse_moves,
};



const DEMO_SCRAMBLE_LEN: usize = 10;



/// Finds shortest solutions for scrambled Rubik's cubes.
#[derive(Parser)]
#[command(name = "rubiks-cube-ida")]
#[command(version, about, long_about = None)]
struct Cli {
	/// Pattern table file, built on first use.
	#[arg(long, default_value = DEFAULT_TABLE_PATH, value_name = "FILE")]
	tables: PathBuf,

	/// Longest solution to search for.
	#[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
	max_depth: u8,

	/// Increase logging verbosity (can be repeated)
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
	/// Scramble a solved cube with random quarter turns.
	Scramble {
		#[arg(long, default_value_t = 20)]
		moves: usize,
		/// Seed for a reproducible scramble.
		#[arg(long)]
		seed: Option<u64>,
		/// Write the scrambled state to this file.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Solve a cube state, read from a file or given as moves from solved.
	Solve {
		#[arg(required_unless_present = "moves")]
		state_file: Option<PathBuf>,
		/// Scramble to apply to a solved cube instead, e.g. "F R U2".
		#[arg(long, conflicts_with = "state_file")]
		moves: Option<String>,
	},
	/// Rebuild the pattern tables and save them.
	Build,
	/// Print a cube state and the stickers of every cubie.
	Show {
		state_file: PathBuf,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(match cli.verbose {
			0 => LevelFilter::Info,
			1 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		})
		.parse_default_env()
		.init();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{e}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<()> {
	let solver = Solver::new(cli.max_depth).with_table_path(&cli.tables);
	match cli.command {
		Some(Command::Scramble { moves, seed, output }) => run_scramble(moves, seed, output),
		Some(Command::Solve { state_file, moves }) => {
			let cube = match (state_file, moves) {
				(Some(path), _) => CubeState::load(path)?,
				(None, Some(moves)) => {
					let mut cube = CubeState::new();
					cube.apply_moves(&parse_moves(&moves)?);
					cube
				}
				(None, None) => CubeState::new(),
			};
			run_solve(solver, &cube)
		}
		Some(Command::Build) => {
			let mut solver = solver;
			solver.build()?;
			solver.save(&cli.tables)
		}
		Some(Command::Show { state_file }) => {
			let cube = CubeState::load(state_file)?;
			print!("{}", cube.to_text());
			println!("solvable: {}", cube.is_solvable());
			print!("{}", cube.block_listing());
			Ok(())
		}
		None => {
			// default: scramble and solve
			let mut cube = CubeState::new();
			let moves = cube.randomize(DEMO_SCRAMBLE_LEN, &mut rng());
			println!("scramble: {}", format_moves(&moves));
			run_solve(solver, &cube)
		}
	}
}

fn run_scramble(move_count: usize, seed: Option<u64>, output: Option<PathBuf>) -> Result<()> {
	let mut cube = CubeState::new();
	let moves = match seed {
		Some(seed) => cube.randomize(move_count, &mut StdRng::seed_from_u64(seed)),
		None => cube.randomize(move_count, &mut rng()),
	};
	println!("scramble: {}", format_moves(&moves));
	match output {
		Some(path) => cube.save(path)?,
		None => print!("{}", cube.to_text()),
	}
	Ok(())
}

fn run_solve(mut solver: Solver, cube: &CubeState) -> Result<()> {
	solver.init()?;
	let time_begin = Instant::now();
	let (moves, stats) = solver.solve_with_stats(cube)?;
	println!("solution ({} moves): {}", moves.len(), format_moves(&moves));
	println!(
		"{} nodes in {} iterations, {:.3}s",
		stats.nodes_visited, stats.iterations, time_begin.elapsed().as_secs_f64()
	);
	Ok(())
}
