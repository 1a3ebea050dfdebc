//! The user-facing puzzle: the given grid, variant flags, and the
//! recursive search that counts solutions up to a cap.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::debug;

use crate::alternatives::Alternatives;
use crate::regions::{Layout, CELLS, SIZE};
use crate::stats::Statistics;
use crate::types::SudokuError;

/// A grid in row-major order; 0 marks a blank cell.
pub type Grid = [u8; 81];

/// Variant flags and the solution cap for one puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Add the two long diagonals as regions.
    pub diagonal: bool,
    /// Add the nine same-position-within-block regions.
    pub color_constrained: bool,
    /// Replace the 3x3 blocks by nine irregular colored areas, read as
    /// a second grid of color tags.
    pub kikagaku: bool,
    /// Stop the search after this many solutions.
    pub solvemax: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            diagonal: false,
            color_constrained: false,
            kikagaku: false,
            solvemax: 100,
        }
    }
}

/// A sudoku puzzle plus the results of its last `solve` run.
#[derive(Debug)]
pub struct Puzzle {
    grid: Grid,
    options: Options,
    colors: Option<Box<[u8; CELLS]>>,
    solvecount: usize,
    solutions: Vec<Grid>,
    stats: Statistics,
}

/// Write a grid in the 9-line decimal format, followed by the blank
/// separator line.
///
/// # Errors
/// Fails when the writer does.
pub fn write_grid<W: Write>(out: &mut W, grid: &Grid) -> io::Result<()> {
    for row in grid.chunks(SIZE) {
        for v in row {
            write!(out, "{v}")?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

impl Puzzle {
    /// An empty puzzle with the given options.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Puzzle {
            grid: [0; CELLS],
            options,
            colors: None,
            solvecount: 0,
            solutions: Vec::new(),
            stats: Statistics::default(),
        }
    }

    /// Build a puzzle from a complete grid.
    ///
    /// # Errors
    /// Returns [`SudokuError::ValueTooLarge`] when a cell holds a value
    /// above nine.
    pub fn from_grid(grid: Grid, options: Options) -> Result<Self, SudokuError> {
        if grid.iter().any(|v| *v > 9) {
            return Err(SudokuError::ValueTooLarge);
        }
        let mut puzzle = Self::new(options);
        puzzle.grid = grid;
        Ok(puzzle)
    }

    /// Read a puzzle as 9 lines of 9 decimal digits. In kikagaku mode,
    /// 9 further lines of single-character color tags follow; exactly 9
    /// colors covering 9 cells each are required.
    ///
    /// # Errors
    /// Returns an error for malformed lines, bad digits, invalid color
    /// grids, or reader failures.
    pub fn from_reader<R: BufRead>(mut reader: R, options: Options) -> Result<Self, SudokuError> {
        let mut puzzle = Self::new(options);
        let mut line = String::new();

        for r in 0..SIZE {
            line.clear();
            reader.read_line(&mut line)?;
            let row = line.trim_end();
            if row.len() != SIZE {
                return Err(SudokuError::BadGridLine(r + 1));
            }
            for (c, ch) in row.chars().enumerate() {
                let digit = ch.to_digit(10).ok_or(SudokuError::BadDigit(r + 1))?;
                puzzle.grid[r * SIZE + c] = digit as u8;
            }
        }

        if options.kikagaku {
            let mut colors = Box::new([0; CELLS]);
            for r in 0..SIZE {
                line.clear();
                reader.read_line(&mut line)?;
                let row = line.trim_end().as_bytes();
                if row.len() != SIZE {
                    return Err(SudokuError::BadGridLine(SIZE + r + 1));
                }
                colors[r * SIZE..(r + 1) * SIZE].copy_from_slice(row);
            }
            puzzle.colors = Some(colors);
        }

        // Reject invalid variant input at the edge rather than at the
        // first solve.
        puzzle.layout()?;
        Ok(puzzle)
    }

    /// Place a given; 0 clears the cell.
    ///
    /// # Errors
    /// Returns an error for out-of-range coordinates or values.
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> Result<(), SudokuError> {
        if row >= SIZE || col >= SIZE {
            return Err(SudokuError::OutOfBounds);
        }
        if value > 9 {
            return Err(SudokuError::ValueTooLarge);
        }
        self.grid[row * SIZE + col] = value;
        Ok(())
    }

    /// Supply the kikagaku color grid for programmatic construction.
    pub fn set_colors(&mut self, colors: [u8; 81]) {
        self.colors = Some(Box::new(colors));
    }

    /// Number of non-blank cells in the input grid.
    #[must_use]
    pub fn given_count(&self) -> usize {
        self.grid.iter().filter(|v| **v != 0).count()
    }

    /// The input grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Solutions found by the last `solve` run, at most `solvemax`.
    #[must_use]
    pub fn solutions(&self) -> &[Grid] {
        &self.solutions
    }

    /// Number of solutions found by the last `solve` run.
    #[must_use]
    pub fn solvecount(&self) -> usize {
        self.solvecount
    }

    /// Search statistics of the last `solve` run.
    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Write the input grid.
    ///
    /// # Errors
    /// Fails when the writer does.
    pub fn display<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_grid(out, &self.grid)
    }

    fn layout(&self) -> Result<Layout, SudokuError> {
        if self.options.kikagaku {
            match &self.colors {
                Some(colors) => Layout::new(
                    self.options.diagonal,
                    self.options.color_constrained,
                    Some(colors),
                ),
                None => Err(SudokuError::MissingColors),
            }
        } else {
            Layout::new(self.options.diagonal, self.options.color_constrained, None)
        }
    }

    /// Count solutions up to `solvemax`, collecting each solved grid.
    /// Givens that contradict a constraint are not an error; they
    /// simply yield a count of zero.
    ///
    /// # Errors
    /// Returns an error only for invalid variant set-ups (bad or
    /// missing kikagaku colors, conflicting variants).
    pub fn solve(&mut self) -> Result<usize, SudokuError> {
        self.solvecount = 0;
        self.solutions.clear();
        self.stats = Statistics::default();

        let layout = Arc::new(self.layout()?);
        let mut root = Alternatives::new(&self.grid, layout);
        self.stats.record(0, root.take_tally());
        self.search(&root);
        debug!("search finished with {} solution(s)", self.solvecount);
        Ok(self.solvecount)
    }

    fn search(&mut self, alt: &Alternatives) {
        if self.solvecount >= self.options.solvemax || !alt.solvable() {
            return;
        }

        let Some(pos) = alt.branch_cell() else {
            // Every cell is a singleton: one solution.
            self.solutions.push(alt.solution_grid());
            self.solvecount += 1;
            debug!("solution {} at depth {}", self.solvecount, alt.depth());
            if self.solvecount >= self.options.solvemax {
                debug!("solution cap {} reached", self.options.solvemax);
            }
            return;
        };

        let values: Vec<usize> = alt.candidates(pos).collect();
        self.stats.record_branches(alt.depth(), values.len());
        for value in values {
            let mut child = alt.descend();
            child.set(pos, value);
            self.search(&child);
            self.stats.record(child.depth(), child.take_tally());
            if self.solvecount >= self.options.solvemax {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str, options: Options) -> Result<Puzzle, SudokuError> {
        Puzzle::from_reader(input.as_bytes(), options)
    }

    const EASY_TOP_ROWS: &str = "\
000678912
672195348
198342567
859761423
426853791
713924856
961537284
287419635
345286179
";

    #[test]
    fn parses_nine_lines() {
        let puzzle = parse(EASY_TOP_ROWS, Options::default()).unwrap();
        assert_eq!(puzzle.given_count(), 78);
        assert_eq!(puzzle.grid()[3], 6);
        assert_eq!(puzzle.grid()[0], 0);
    }

    #[test]
    fn short_line_is_rejected() {
        let input = EASY_TOP_ROWS.replacen("000678912", "00067891", 1);
        assert_eq!(
            parse(&input, Options::default()).unwrap_err(),
            SudokuError::BadGridLine(1)
        );
    }

    #[test]
    fn non_digit_is_rejected() {
        let input = EASY_TOP_ROWS.replacen('6', "x", 1);
        assert_eq!(
            parse(&input, Options::default()).unwrap_err(),
            SudokuError::BadDigit(1)
        );
    }

    #[test]
    fn missing_input_is_rejected() {
        let err = parse("123\n", Options::default()).unwrap_err();
        assert_eq!(err, SudokuError::BadGridLine(1));
    }

    #[test]
    fn kikagaku_lines_follow_the_grid() {
        let mut input = String::from(EASY_TOP_ROWS);
        for r in 0..9 {
            for c in 0..9 {
                let tag = b'a' + ((r / 3) * 3 + c / 3) as u8;
                input.push(tag as char);
            }
            input.push('\n');
        }
        let options = Options {
            kikagaku: true,
            ..Options::default()
        };
        let puzzle = parse(&input, options).unwrap();
        assert!(puzzle.colors.is_some());
    }

    #[test]
    fn kikagaku_without_colors_fails_to_solve() {
        let mut puzzle = Puzzle::new(Options {
            kikagaku: true,
            ..Options::default()
        });
        assert_eq!(puzzle.solve().unwrap_err(), SudokuError::MissingColors);
    }

    #[test]
    fn bad_kikagaku_colors_are_rejected_at_parse_time() {
        let mut input = String::from(EASY_TOP_ROWS);
        for _ in 0..9 {
            input.push_str("aaaaaaaaa\n");
        }
        let options = Options {
            kikagaku: true,
            ..Options::default()
        };
        assert_eq!(
            parse(&input, options).unwrap_err(),
            SudokuError::ColorCount
        );
    }

    #[test]
    fn set_validates_its_arguments() {
        let mut puzzle = Puzzle::new(Options::default());
        assert_eq!(puzzle.set(0, 9, 1), Err(SudokuError::OutOfBounds));
        assert_eq!(puzzle.set(9, 0, 1), Err(SudokuError::OutOfBounds));
        assert_eq!(puzzle.set(3, 3, 10), Err(SudokuError::ValueTooLarge));
        assert_eq!(puzzle.set(3, 3, 9), Ok(()));
        assert_eq!(puzzle.given_count(), 1);
        assert_eq!(puzzle.set(3, 3, 0), Ok(()));
        assert_eq!(puzzle.given_count(), 0);
    }

    #[test]
    fn from_grid_rejects_large_values() {
        let mut grid = [0; 81];
        grid[17] = 12;
        assert_eq!(
            Puzzle::from_grid(grid, Options::default()).unwrap_err(),
            SudokuError::ValueTooLarge
        );
    }

    #[test]
    fn display_writes_the_nine_line_format() {
        let puzzle = parse(EASY_TOP_ROWS, Options::default()).unwrap();
        let mut out = Vec::new();
        puzzle.display(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{EASY_TOP_ROWS}\n"));
    }

    #[test]
    fn nearly_full_grid_collapses_without_branching() {
        let mut puzzle = parse(EASY_TOP_ROWS, Options::default()).unwrap();
        assert_eq!(puzzle.solve().unwrap(), 1);
        assert_eq!(puzzle.solvecount(), 1);
        assert_eq!(puzzle.stats().cumulated().branches, 0);

        let solution = puzzle.solutions()[0];
        assert_eq!(&solution[3..9], &[6, 7, 8, 9, 1, 2]);
        assert_eq!(&solution[0..3], &[5, 3, 4]);
    }

    #[test]
    fn solve_resets_previous_results() {
        let mut puzzle = parse(EASY_TOP_ROWS, Options::default()).unwrap();
        assert_eq!(puzzle.solve().unwrap(), 1);
        assert_eq!(puzzle.solve().unwrap(), 1);
        assert_eq!(puzzle.solutions().len(), 1);
    }
}
