//! Fitness evaluation for evolutionary sudoku generation.
//!
//! A genome is an ordered sequence of 81 alleles in `[0, 9]`, read as a
//! row-major board. The evaluator materializes the board, counts its
//! solutions up to a cap, and maps the result to a scalar that an
//! external genetic algorithm minimizes: uniquely solvable boards score
//! their number of givens (sparser is better), ambiguous boards land in
//! a middling band, and boards whose givens already contradict each
//! other are punished hard.
//!
//! Results are memoized in a process-wide cache keyed by the genome
//! contents, since selection keeps re-visiting the same boards.

#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::debug;
use maker_engine::{Options, Puzzle};
use once_cell::sync::Lazy;

/// Number of alleles in a board genome.
pub const GENOME_LEN: usize = 81;

/// Default solution cap while evaluating a genome.
pub const DEFAULT_SOLVEMAX: usize = 50;

/// Variant rules the evaluator applies to every board it scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Variants {
    /// Add the two long diagonals as regions.
    pub diagonal: bool,
    /// Add the nine same-position-within-block regions.
    pub color_constrained: bool,
}

/// Fitness values, once computed, never change; the map only grows.
static CACHE: Lazy<Mutex<HashMap<[u8; GENOME_LEN], u64>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Scores genomes for a genetic algorithm; see the crate docs.
#[derive(Debug)]
pub struct Evaluator {
    variants: Variants,
    solvemax: usize,
    cache_hits: AtomicU64,
}

impl Evaluator {
    /// An evaluator with the default solution cap.
    #[must_use]
    pub fn new(variants: Variants) -> Self {
        Evaluator {
            variants,
            solvemax: DEFAULT_SOLVEMAX,
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Override the solution cap.
    #[must_use]
    pub fn with_solvemax(mut self, solvemax: usize) -> Self {
        self.solvemax = solvemax;
        self
    }

    /// How often a genome was answered from the cache.
    #[must_use]
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Alleles outside `[0, 9]` read as blanks.
    fn clamp(genome: &[i32; GENOME_LEN]) -> [u8; GENOME_LEN] {
        std::array::from_fn(|i| {
            let v = genome[i];
            if (0..=9).contains(&v) {
                v as u8
            } else {
                0
            }
        })
    }

    fn board(&self, grid: [u8; GENOME_LEN]) -> Puzzle {
        let options = Options {
            diagonal: self.variants.diagonal,
            color_constrained: self.variants.color_constrained,
            kikagaku: false,
            solvemax: self.solvemax,
        };
        Puzzle::from_grid(grid, options).expect("clamped alleles are valid digits")
    }

    /// The board a genome encodes, with this evaluator's options.
    #[must_use]
    pub fn phenotype(&self, genome: &[i32; GENOME_LEN]) -> Puzzle {
        self.board(Self::clamp(genome))
    }

    /// Score a genome; lower is better.
    pub fn evaluate(&self, genome: &[i32; GENOME_LEN]) -> u64 {
        let grid = Self::clamp(genome);

        if let Some(cached) = CACHE.lock().expect("fitness cache lock").get(&grid) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return *cached;
        }

        let count = grid.iter().filter(|v| **v != 0).count() as u64;
        let mut puzzle = self.board(grid);
        let solvecount = puzzle
            .solve()
            .expect("diagonal and color layouts always build") as u64;

        let fitness = match solvecount {
            // The givens already contradict each other.
            0 => 1000 * count * count,
            1 => count,
            n => 1000 - count + n,
        };
        debug!("genome with {count} givens, {solvecount} solution(s): fitness {fitness}");

        CACHE
            .lock()
            .expect("fitness cache lock")
            .entry(grid)
            .or_insert(fitness);
        fitness
    }
}
