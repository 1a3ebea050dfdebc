//! A command line utility for counting and printing sudoku solutions.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use log::info;

use maker_engine::{write_grid, Options, Puzzle};

#[derive(Parser)]
#[command(author, version, about, name = "sudoku_maker")]
struct Args {
    /// Sudoku file; stdin when absent.
    file: Option<PathBuf>,

    /// Add the color constraint (same position within each block).
    #[arg(short, long)]
    colorconstrained: bool,

    /// Add the diagonality constraint.
    #[arg(short, long)]
    diagonal: bool,

    /// Kikagaku with color areas; reads additional color definitions.
    #[arg(short, long)]
    kikagaku: bool,

    /// Maximum number of solutions printed.
    #[arg(short = 'm', long, default_value_t = 100)]
    solvemax: usize,

    /// Print per-depth search statistics.
    #[arg(short, long)]
    statistics: bool,

    /// Measure and report the solve runtime.
    #[arg(short, long)]
    time: bool,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let options = Options {
        diagonal: args.diagonal,
        color_constrained: args.colorconstrained,
        kikagaku: args.kikagaku,
        solvemax: args.solvemax,
    };

    let mut puzzle = match &args.file {
        Some(path) => Puzzle::from_reader(BufReader::new(File::open(path)?), options)?,
        None => Puzzle::from_reader(io::stdin().lock(), options)?,
    };

    info!("solving a puzzle with {} givens", puzzle.given_count());
    let before = Instant::now();
    puzzle.solve()?;
    let runtime = before.elapsed();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for solution in puzzle.solutions() {
        write_grid(&mut out, solution)?;
    }
    out.flush()?;

    if puzzle.solvecount() >= args.solvemax {
        info!("max. solutions ({}) reached", args.solvemax);
    } else {
        info!("no (more) solutions, found {}", puzzle.solvecount());
    }
    if args.time {
        println!("runtime: {runtime:?}");
    }
    if args.statistics {
        print!("{}", puzzle.stats());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info")); // RUST_LOG
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
