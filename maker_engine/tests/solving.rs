//! Board-level solving scenarios: solution counting, the cap, and the
//! behavior of the variant constraints.

use maker_engine::{from_string, Grid, Options, Puzzle};

const WIKIPEDIA_SOLVED: &str =
    "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

// The first entry of the well-known collection of 17-clue puzzles.
const SEVENTEEN_CLUES: &str =
    "000000010400000000020000000000050407008000300001090000300400200050100000000806000";

fn solve_str(repr: &str, options: Options) -> Puzzle {
    let mut puzzle = from_string(repr, options).unwrap();
    puzzle.solve().unwrap();
    puzzle
}

/// Every row, column, and block contains each digit exactly once.
fn classically_valid(grid: &Grid) -> bool {
    let mut units: Vec<Vec<usize>> = Vec::new();
    for r in 0..9 {
        units.push((0..9).map(|c| r * 9 + c).collect());
        units.push((0..9).map(|c| c * 9 + r).collect());
        let (top, left) = ((r / 3) * 3, (r % 3) * 3);
        units.push(
            (0..9)
                .map(|i| (top + i / 3) * 9 + left + i % 3)
                .collect(),
        );
    }

    units.iter().all(|unit| {
        let mut seen = [false; 10];
        for pos in unit {
            let v = grid[*pos] as usize;
            if v == 0 || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        true
    })
}

#[test]
fn empty_board_runs_into_the_cap() {
    let options = Options {
        solvemax: 50,
        ..Options::default()
    };
    let puzzle = solve_str(&"0".repeat(81), options);

    assert_eq!(puzzle.solvecount(), 50);
    assert_eq!(puzzle.solutions().len(), 50);
    for solution in puzzle.solutions() {
        assert!(classically_valid(solution));
    }
}

#[test]
fn solvecount_never_exceeds_the_cap() {
    for cap in [1, 7] {
        let options = Options {
            solvemax: cap,
            ..Options::default()
        };
        let puzzle = solve_str(&"0".repeat(81), options);
        assert_eq!(puzzle.solvecount(), cap);
    }
}

#[test]
fn seventeen_clue_puzzle_is_uniquely_solvable() {
    let options = Options {
        solvemax: 50,
        ..Options::default()
    };
    let puzzle = solve_str(SEVENTEEN_CLUES, options);

    assert_eq!(puzzle.solvecount(), 1);
    let solution = &puzzle.solutions()[0];
    assert!(classically_valid(solution));
    for (pos, given) in puzzle.grid().iter().enumerate() {
        if *given != 0 {
            assert_eq!(solution[pos], *given);
        }
    }
}

#[test]
fn duplicate_givens_have_no_solution() {
    let mut repr = vec![b'0'; 81];
    repr[9] = b'5';
    repr[15] = b'5';
    let puzzle = solve_str(std::str::from_utf8(&repr).unwrap(), Options::default());
    assert_eq!(puzzle.solvecount(), 0);
    assert!(puzzle.solutions().is_empty());
}

#[test]
fn unavoidable_rectangle_has_exactly_two_solutions() {
    // Blank four cells of a solved grid that admit swapping 6 and 7.
    let mut repr: Vec<u8> = WIKIPEDIA_SOLVED.bytes().collect();
    for pos in [3, 4, 30, 31] {
        repr[pos] = b'0';
    }
    let puzzle = solve_str(std::str::from_utf8(&repr).unwrap(), Options::default());

    assert_eq!(puzzle.solvecount(), 2);
    let [a, b] = puzzle.solutions() else {
        panic!("expected two solutions");
    };
    assert!(classically_valid(a));
    assert!(classically_valid(b));
    assert_ne!(a[3], b[3]);
    assert_eq!(a[3] + a[4], 13);
    assert_eq!(b[30] + b[31], 13);
}

#[test]
fn search_statistics_reflect_the_branching() {
    let mut repr: Vec<u8> = WIKIPEDIA_SOLVED.bytes().collect();
    for pos in [3, 4, 30, 31] {
        repr[pos] = b'0';
    }
    let puzzle = solve_str(std::str::from_utf8(&repr).unwrap(), Options::default());

    // One branch point with the two halves of the rectangle.
    assert_eq!(puzzle.stats().at_depth(0).branches, 2);
    assert_eq!(puzzle.stats().cumulated().branches, 2);

    let deep = solve_str(
        &"0".repeat(81),
        Options {
            solvemax: 2,
            ..Options::default()
        },
    );
    assert!(deep.stats().max_depth() >= 1);
    assert!(deep.stats().cumulated().branches > deep.stats().at_depth(0).branches);
}

#[test]
fn diagonal_rule_rejects_a_classically_valid_grid() {
    // The solved grid repeats 7 on the main diagonal.
    let classical = solve_str(WIKIPEDIA_SOLVED, Options::default());
    assert_eq!(classical.solvecount(), 1);

    let diagonal = solve_str(
        WIKIPEDIA_SOLVED,
        Options {
            diagonal: true,
            ..Options::default()
        },
    );
    assert_eq!(diagonal.solvecount(), 0);
}

#[test]
fn diagonal_rule_links_the_two_diagonal_cells() {
    let mut repr = vec![b'0'; 81];
    repr[0] = b'7';
    repr[40] = b'7';
    let repr = std::str::from_utf8(&repr).unwrap().to_string();

    let diagonal = solve_str(
        &repr,
        Options {
            diagonal: true,
            ..Options::default()
        },
    );
    assert_eq!(diagonal.solvecount(), 0);

    let classical = solve_str(
        &repr,
        Options {
            solvemax: 2,
            ..Options::default()
        },
    );
    assert_eq!(classical.solvecount(), 2);
}

#[test]
fn color_constraint_links_same_block_positions() {
    // (0,0) and (3,3) share their position within their blocks.
    let mut repr = vec![b'0'; 81];
    repr[0] = b'5';
    repr[30] = b'5';
    let repr = std::str::from_utf8(&repr).unwrap().to_string();

    let constrained = solve_str(
        &repr,
        Options {
            color_constrained: true,
            ..Options::default()
        },
    );
    assert_eq!(constrained.solvecount(), 0);

    let classical = solve_str(
        &repr,
        Options {
            solvemax: 2,
            ..Options::default()
        },
    );
    assert_eq!(classical.solvecount(), 2);
}

fn kikagaku_input(grid: &str, tag_of: impl Fn(usize, usize) -> u8) -> String {
    let mut input = String::new();
    for r in 0..9 {
        input.push_str(&grid[r * 9..(r + 1) * 9]);
        input.push('\n');
    }
    for r in 0..9 {
        for c in 0..9 {
            input.push(tag_of(r, c) as char);
        }
        input.push('\n');
    }
    input
}

#[test]
fn kikagaku_with_block_shaped_areas_matches_classical() {
    let input = kikagaku_input(WIKIPEDIA_SOLVED, |r, c| b'a' + ((r / 3) * 3 + c / 3) as u8);
    let options = Options {
        kikagaku: true,
        ..Options::default()
    };
    let mut puzzle = Puzzle::from_reader(input.as_bytes(), options).unwrap();
    assert_eq!(puzzle.solve().unwrap(), 1);
}

#[test]
fn kikagaku_areas_need_not_be_rectangular() {
    // Columns as areas: any Latin square qualifies, so the cap is hit.
    let empty = "0".repeat(81);
    let input = kikagaku_input(&empty, |_, c| b'a' + c as u8);
    let options = Options {
        kikagaku: true,
        solvemax: 5,
        ..Options::default()
    };
    let mut puzzle = Puzzle::from_reader(input.as_bytes(), options).unwrap();
    assert_eq!(puzzle.solve().unwrap(), 5);
}
