//! Per-depth counters for search branches and inference hits. Purely
//! observational; the search never reads them back.

use std::fmt;

/// Counters gathered while one board state runs inference, and per depth
/// while the search branches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Candidate values tried at a branch point.
    pub branches: u64,
    /// Digits placed because a region left them a single cell.
    pub invert_matches: u64,
    /// Regions found with no cell left for some digit.
    pub invert_stop: u64,
    /// Candidates removed by the hidden/naked subset sweep.
    pub number_sets: u64,
}

impl Tally {
    pub(crate) fn absorb(&mut self, other: Tally) {
        self.branches += other.branches;
        self.invert_matches += other.invert_matches;
        self.invert_stop += other.invert_stop;
        self.number_sets += other.number_sets;
    }
}

/// Accumulated statistics of one `solve` run, indexed by search depth.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    depths: Vec<Tally>,
    max_depth: usize,
}

impl Statistics {
    pub(crate) fn record(&mut self, depth: usize, tally: Tally) {
        if tally == Tally::default() {
            return;
        }
        if depth >= self.depths.len() {
            self.depths.resize(depth + 1, Tally::default());
        }
        self.depths[depth].absorb(tally);
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn record_branches(&mut self, depth: usize, count: usize) {
        self.record(
            depth,
            Tally {
                branches: count as u64,
                ..Tally::default()
            },
        );
    }

    /// Counters recorded at one depth.
    #[must_use]
    pub fn at_depth(&self, depth: usize) -> Tally {
        self.depths.get(depth).copied().unwrap_or_default()
    }

    /// The deepest search level that did any work.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Sum over all depths.
    #[must_use]
    pub fn cumulated(&self) -> Tally {
        let mut total = Tally::default();
        for t in &self.depths {
            total.absorb(*t);
        }
        total
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, t) in self.depths.iter().enumerate() {
            writeln!(
                f,
                "depth: {depth:2} branches: {:5} invert_matches: {:5} \
                 invert_stop: {:5} number_sets: {:5}",
                t.branches, t.invert_matches, t.invert_stop, t.number_sets
            )?;
        }
        let c = self.cumulated();
        writeln!(
            f,
            "cumulated (maxdepth {:2}) branches: {:5} invert_matches: {:5} \
             invert_stop: {:5} number_sets: {:5}",
            self.max_depth, c.branches, c.invert_matches, c.invert_stop, c.number_sets
        )
    }
}
