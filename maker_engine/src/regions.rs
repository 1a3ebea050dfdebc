//! The region model. Every constraint the solver knows is a set of nine
//! cells that together contain each digit exactly once; the kinds below
//! only differ in how membership is derived.

use crate::types::SudokuError;

pub(crate) const SIZE: usize = 9;
pub(crate) const CELLS: usize = SIZE * SIZE;

/// One family of constraint regions. Kinds are enabled independently,
/// except that `Block` and `Irregular` are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RegionKind {
    Row,
    Col,
    Block,
    /// The top-left to bottom-right diagonal (diagonal variant).
    DiagMain,
    /// The bottom-left to top-right diagonal (diagonal variant).
    DiagAnti,
    /// Cells sharing their position within a block (color variant).
    BlockPos,
    /// The nine colored areas of a kikagaku grid, replacing the blocks.
    Irregular,
}

/// The immutable region structure of one puzzle. Built once from the
/// variant flags and shared by every board state cloned during search.
#[derive(Debug)]
pub(crate) struct Layout {
    kinds: Vec<RegionKind>,
    /// Member cells per kind, parallel to `kinds`. Diagonals have one
    /// region, every other kind has nine.
    members: Vec<Vec<[usize; 9]>>,
    /// Reverse lookup for the irregular partition.
    irregular_idx: Option<Box<[usize; CELLS]>>,
}

fn row_members() -> Vec<[usize; 9]> {
    (0..SIZE)
        .map(|r| std::array::from_fn(|c| r * SIZE + c))
        .collect()
}

fn col_members() -> Vec<[usize; 9]> {
    (0..SIZE)
        .map(|c| std::array::from_fn(|r| r * SIZE + c))
        .collect()
}

fn block_members() -> Vec<[usize; 9]> {
    (0..SIZE)
        .map(|b| {
            let top = (b / 3) * 3;
            let left = (b % 3) * 3;
            std::array::from_fn(|i| (top + i / 3) * SIZE + left + i % 3)
        })
        .collect()
}

fn block_pos_members() -> Vec<[usize; 9]> {
    (0..SIZE)
        .map(|p| {
            let (roffs, coffs) = (p / 3, p % 3);
            std::array::from_fn(|i| (3 * (i / 3) + roffs) * SIZE + 3 * (i % 3) + coffs)
        })
        .collect()
}

/// Read the irregular partition from a grid of color tags. Any alphabet
/// works; colors are numbered in order of first appearance.
fn irregular_members(
    colors: &[u8; CELLS],
) -> Result<(Vec<[usize; 9]>, Box<[usize; CELLS]>), SudokuError> {
    let mut palette: Vec<u8> = Vec::with_capacity(SIZE);
    let mut areas: Vec<Vec<usize>> = Vec::with_capacity(SIZE);
    let mut idx = Box::new([0usize; CELLS]);

    for (pos, color) in colors.iter().enumerate() {
        let i = match palette.iter().position(|c| c == color) {
            Some(i) => i,
            None => {
                if palette.len() == SIZE {
                    return Err(SudokuError::ColorCount);
                }
                palette.push(*color);
                areas.push(Vec::with_capacity(SIZE));
                palette.len() - 1
            }
        };
        areas[i].push(pos);
        idx[pos] = i;
    }

    if palette.len() != SIZE {
        return Err(SudokuError::ColorCount);
    }

    let mut members = Vec::with_capacity(SIZE);
    for area in areas {
        let cells: [usize; 9] = area
            .try_into()
            .map_err(|_| SudokuError::ColorAreaSize)?;
        members.push(cells);
    }

    Ok((members, idx))
}

impl Layout {
    pub(crate) fn new(
        diagonal: bool,
        color_constrained: bool,
        kikagaku: Option<&[u8; CELLS]>,
    ) -> Result<Self, SudokuError> {
        if color_constrained && kikagaku.is_some() {
            return Err(SudokuError::ConflictingVariants);
        }

        let mut kinds = vec![RegionKind::Row, RegionKind::Col];
        let mut members = vec![row_members(), col_members()];
        let mut irregular_idx = None;

        match kikagaku {
            Some(colors) => {
                let (cells, idx) = irregular_members(colors)?;
                kinds.push(RegionKind::Irregular);
                members.push(cells);
                irregular_idx = Some(idx);
            }
            None => {
                kinds.push(RegionKind::Block);
                members.push(block_members());
            }
        }

        if diagonal {
            kinds.push(RegionKind::DiagMain);
            members.push(vec![std::array::from_fn(|i| i * SIZE + i)]);
            kinds.push(RegionKind::DiagAnti);
            members.push(vec![std::array::from_fn(|i| i * SIZE + (SIZE - 1 - i))]);
        }

        if color_constrained {
            kinds.push(RegionKind::BlockPos);
            members.push(block_pos_members());
        }

        Ok(Layout {
            kinds,
            members,
            irregular_idx,
        })
    }

    /// The enabled kinds, in the fixed order inference visits them.
    #[cfg(test)]
    pub(crate) fn kinds(&self) -> &[RegionKind] {
        &self.kinds
    }

    pub(crate) fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    #[cfg(test)]
    pub(crate) fn region_count(&self, kind_no: usize) -> usize {
        self.members[kind_no].len()
    }

    /// The region index of `pos` within kind number `kind_no`, or `None`
    /// when the cell is not a member (off-diagonal cells).
    pub(crate) fn index_of(&self, kind_no: usize, pos: usize) -> Option<usize> {
        let (r, c) = (pos / SIZE, pos % SIZE);
        match self.kinds[kind_no] {
            RegionKind::Row => Some(r),
            RegionKind::Col => Some(c),
            RegionKind::Block => Some((r / 3) * 3 + c / 3),
            RegionKind::DiagMain => (r == c).then_some(0),
            RegionKind::DiagAnti => (r + c == SIZE - 1).then_some(0),
            RegionKind::BlockPos => Some((r % 3) * 3 + c % 3),
            RegionKind::Irregular => self.irregular_idx.as_ref().map(|idx| idx[pos]),
        }
    }

    /// The nine member cells of one region.
    pub(crate) fn region(&self, kind_no: usize, idx: usize) -> &[usize; 9] {
        &self.members[kind_no][idx]
    }
}
