//! A sudoku solving engine built for puzzle generation: it counts the
//! solutions of a candidate board up to a cap, so a caller can tell
//! uniquely solvable boards from ambiguous or broken ones.
//!
//! The state kept per board is a set of still-possible digits for every
//! cell. Placing a given propagates exclusions to all peers, and an
//! inference pass derives further placements from how many cells each
//! digit has left within a region. Only then does the solver branch,
//! always on a cell with the fewest remaining candidates.
//!
//! Supported variants: the two long diagonals (`diagonal`), the nine
//! same-position-within-block regions (`color_constrained`), and
//! irregular colored areas replacing the blocks (`kikagaku`).

#![warn(missing_docs)]

mod alternatives;
mod puzzle;
mod regions;
mod stats;
mod types;

pub use puzzle::{write_grid, Grid, Options, Puzzle};
pub use stats::{Statistics, Tally};
pub use types::SudokuError;

/// Build a puzzle from an 81-character string, row-major. `0` and `.`
/// denote blanks.
///
/// # Errors
/// Returns an error when the string is not exactly 81 characters or
/// contains anything but digits and `.`.
pub fn from_string(repr: &str, options: Options) -> Result<Puzzle, SudokuError> {
    if repr.chars().count() != 81 {
        return Err(SudokuError::BadGridLine(1));
    }

    let mut grid: Grid = [0; 81];
    for (i, ch) in repr.chars().enumerate() {
        grid[i] = match ch {
            '.' => 0,
            _ => ch
                .to_digit(10)
                .ok_or(SudokuError::BadDigit(i / 9 + 1))? as u8,
        };
    }

    Puzzle::from_grid(grid, options)
}
