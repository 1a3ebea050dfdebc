//! The live puzzle state while solving: an arena of 81 candidate masks
//! plus the two worklists that drive propagation and inference.
//!
//! `pending` holds cells that just collapsed to a single digit and whose
//! value still has to be excluded from their peers; `dirty` holds the
//! regions touched since the last inference pass. Construction and every
//! `set` drain both before returning, so callers always observe a
//! fixpoint.

use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::regions::{Layout, CELLS, SIZE};
use crate::stats::Tally;
use crate::types::{digits_of, sole_value, to_bits, Bits, PosSet, ALL_DIGITS};

#[derive(Clone)]
pub(crate) struct Alternatives {
    /// Candidate mask per cell, row-major.
    cells: [Bits; CELLS],
    /// For each digit, the cells that are the singleton of that digit.
    solved_by_n: [PosSet; 10],
    solvable: bool,
    /// Cells that became singletons and still need peer exclusion.
    pending: PosSet,
    /// Touched regions per kind, one bit per region index.
    dirty: Vec<u16>,
    depth: usize,
    tally: Tally,
    layout: Arc<Layout>,
}

impl Alternatives {
    /// Build the state from an input grid (0 = blank) and run full
    /// propagation and inference. Contradicting givens do not error;
    /// they leave the state marked unsolvable.
    pub(crate) fn new(grid: &[u8; CELLS], layout: Arc<Layout>) -> Self {
        let dirty = vec![0; layout.kind_count()];
        let mut alt = Alternatives {
            cells: [ALL_DIGITS; CELLS],
            solved_by_n: [PosSet::ZERO; 10],
            solvable: true,
            pending: PosSet::ZERO,
            dirty,
            depth: 0,
            tally: Tally::default(),
            layout,
        };

        for (pos, v) in grid.iter().enumerate() {
            if *v != 0 {
                alt.set_at(pos, *v as usize);
            }
        }
        alt.propagate();
        alt.invert();
        alt
    }

    /// Clone for one search branch. The child starts one level deeper
    /// with a fresh tally; the region layout is shared.
    pub(crate) fn descend(&self) -> Self {
        debug_assert!(self.solvable);
        let mut child = self.clone();
        child.depth += 1;
        child.tally = Tally::default();
        child
    }

    pub(crate) fn solvable(&self) -> bool {
        self.solvable
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    #[cfg(test)]
    pub(crate) fn mask(&self, pos: usize) -> Bits {
        self.cells[pos]
    }

    pub(crate) fn candidates(&self, pos: usize) -> impl Iterator<Item = usize> {
        digits_of(self.cells[pos])
    }

    #[cfg(test)]
    pub(crate) fn solved_positions(&self, value: usize) -> PosSet {
        self.solved_by_n[value]
    }

    #[cfg(test)]
    pub(crate) fn pending_is_empty(&self) -> bool {
        self.pending == PosSet::ZERO
    }

    pub(crate) fn take_tally(&mut self) -> Tally {
        std::mem::take(&mut self.tally)
    }

    /// Public mutator: place `value` and run propagation and inference
    /// to the next fixpoint.
    pub(crate) fn set(&mut self, pos: usize, value: usize) {
        self.set_at(pos, value);
        self.propagate();
        self.invert();
    }

    /// The cell to branch on: smallest candidate set of size at least
    /// two, ties resolved towards the smallest position. `None` means
    /// every cell is a singleton.
    pub(crate) fn branch_cell(&self) -> Option<usize> {
        let mut best: Option<(u32, usize)> = None;
        for (pos, bits) in self.cells.iter().enumerate() {
            let n = bits.count_ones();
            if n < 2 {
                continue;
            }
            if best.map_or(true, |(m, _)| n < m) {
                best = Some((n, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Extract the solved grid. Only meaningful once `branch_cell`
    /// returns `None` on a solvable state.
    pub(crate) fn solution_grid(&self) -> [u8; CELLS] {
        let mut grid = [0; CELLS];
        for v in 1..=9 {
            for pos in self.solved_by_n[v].iter_ones() {
                grid[pos] = v as u8;
            }
        }
        grid
    }

    fn mark_solved(&mut self, pos: usize, value: usize) {
        self.solved_by_n[value].set(pos, true);
        self.pending.set(pos, true);
    }

    fn mark_dirty(&mut self, pos: usize) {
        for k in 0..self.layout.kind_count() {
            if let Some(idx) = self.layout.index_of(k, pos) {
                self.dirty[k] |= 1 << idx;
            }
        }
    }

    /// Collapse the cell to `value`. A value that is no longer a
    /// candidate makes the whole state unsolvable.
    fn set_at(&mut self, pos: usize, value: usize) {
        let bit = to_bits(value);
        let current = self.cells[pos];
        if current & bit == 0 {
            self.cells[pos] = 0;
            self.solvable = false;
        } else if current != bit {
            self.cells[pos] = bit;
            self.mark_dirty(pos);
            self.mark_solved(pos, value);
        }
    }

    /// Remove `value` from the cell's candidates. Idempotent.
    fn discard_at(&mut self, pos: usize, value: usize) {
        let bit = to_bits(value);
        let current = self.cells[pos];
        if current & bit == 0 {
            return;
        }
        let next = current & !bit;
        self.cells[pos] = next;
        if next == 0 {
            self.solvable = false;
            return;
        }
        self.mark_dirty(pos);
        if let Some(v) = sole_value(next) {
            self.mark_solved(pos, v);
        }
    }

    /// Drain `pending`: exclude every fresh singleton's value from all
    /// of its peers. Each discard may enqueue further singletons; the
    /// loop runs until the worklist empties or the state turns
    /// unsolvable.
    fn propagate(&mut self) {
        let layout = Arc::clone(&self.layout);
        while self.solvable {
            let Some(pos) = self.pending.first_one() else {
                break;
            };
            self.pending.set(pos, false);
            let value = match sole_value(self.cells[pos]) {
                Some(v) => v,
                None => {
                    debug_assert!(!self.solvable);
                    return;
                }
            };
            for k in 0..layout.kind_count() {
                let Some(idx) = layout.index_of(k, pos) else {
                    continue;
                };
                for peer in layout.region(k, idx) {
                    if *peer != pos {
                        self.discard_at(*peer, value);
                    }
                }
            }
        }
    }

    /// Drain `dirty`: per region, derive forced placements and candidate
    /// removals from how many cells each digit has left.
    fn invert(&mut self) {
        while self.solvable {
            let Some((kind_no, idx)) = self.pop_dirty() else {
                break;
            };
            self.infer_region(kind_no, idx);
            self.propagate();
        }
    }

    fn pop_dirty(&mut self) -> Option<(usize, usize)> {
        for (k, mask) in self.dirty.iter_mut().enumerate() {
            if *mask != 0 {
                let idx = mask.trailing_zeros() as usize;
                *mask &= *mask - 1;
                return Some((k, idx));
            }
        }
        None
    }

    fn infer_region(&mut self, kind_no: usize, idx: usize) {
        let layout = Arc::clone(&self.layout);

        // Cells of the region that still admit each digit.
        let mut places: [ArrayVec<usize, 9>; 10] = std::array::from_fn(|_| ArrayVec::new());
        for pos in layout.region(kind_no, idx) {
            for v in digits_of(self.cells[*pos]) {
                places[v].push(*pos);
            }
        }

        // Scarcest digits first, so forced placements fire before the
        // pointing checks; the sort is stable, so ties stay in digit
        // order.
        let mut order: Vec<usize> = (1..=9).collect();
        order.sort_by_key(|v| places[*v].len());

        for v in order {
            let spots = &places[v];
            match spots.len() {
                0 => {
                    self.solvable = false;
                    self.tally.invert_stop += 1;
                    return;
                }
                1 => {
                    let pos = spots[0];
                    if self.cells[pos].count_ones() != 1 {
                        self.tally.invert_matches += 1;
                    }
                    self.set_at(pos, v);
                    self.propagate();
                    if !self.solvable {
                        return;
                    }
                }
                2 | 3 => self.point_at_shared_region(kind_no, v, spots),
                // Digits are visited by ascending count, so everything
                // from here on is too spread out for pointing.
                _ => break,
            }
        }

        self.eliminate_number_sets(&places);
    }

    /// Pointing pairs and triples, generalized over region kinds: when
    /// every remaining cell for `value` also shares a region of another
    /// kind, the value cannot sit anywhere else in that region.
    fn point_at_shared_region(&mut self, kind_no: usize, value: usize, spots: &[usize]) {
        let layout = Arc::clone(&self.layout);
        for other in 0..layout.kind_count() {
            if other == kind_no {
                continue;
            }
            let Some(first) = layout.index_of(other, spots[0]) else {
                continue;
            };
            if spots[1..]
                .iter()
                .any(|pos| layout.index_of(other, *pos) != Some(first))
            {
                continue;
            }
            for pos in layout.region(other, first) {
                if spots.contains(pos) {
                    continue;
                }
                let before = self.cells[*pos];
                self.discard_at(*pos, value);
                if self.cells[*pos] != before {
                    self.tally.invert_matches += 1;
                }
            }
        }
    }

    /// Hidden/naked subset sweep: if k digits together fit in at most k
    /// cells of the region, those cells carry nothing but these digits.
    fn eliminate_number_sets(&mut self, places: &[ArrayVec<usize, 9>; 10]) {
        let nums: Vec<usize> = (1..=9)
            .filter(|v| (2..=SIZE - 2).contains(&places[*v].len()))
            .collect();

        for k in 2..nums.len().saturating_sub(1) {
            for combo in nums.iter().combinations(k) {
                let mut group: Bits = 0;
                let mut union: ArrayVec<usize, 9> = ArrayVec::new();
                for v in &combo {
                    group |= to_bits(**v);
                    for pos in &places[**v] {
                        if !union.contains(pos) {
                            union.push(*pos);
                        }
                    }
                }
                if union.len() > k {
                    continue;
                }
                for pos in &union {
                    for v in digits_of(self.cells[*pos] & !group) {
                        self.discard_at(*pos, v);
                        self.tally.number_sets += 1;
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn mark_all_dirty(&mut self) {
        for k in 0..self.layout.kind_count() {
            for idx in 0..self.layout.region_count(k) {
                self.dirty[k] |= 1 << idx;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl fmt::Debug for Alternatives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alternatives (solvable: {}):", self.solvable)?;
        for r in 0..SIZE {
            for c in 0..SIZE {
                let digits: String = digits_of(self.cells[r * SIZE + c])
                    .map(|v| (b'0' + v as u8) as char)
                    .collect();
                write!(f, "{digits:<9} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
