//! Degree-of-freedom ownership ranges and sparsity patterns.
//!
//! The matrix layer borrows these as shared handles; it never builds or owns
//! them. Row ownership is expected to be contiguous by increasing rank -- the
//! distributed printer relies on that layout.

use std::sync::Arc;

/// Which `(row, column)` entries a matrix is allowed to store nonzeros for.
///
/// Per-row sorted column lists; construction of the pattern itself (coupling
/// analysis, ghost coupling, ...) happens upstream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparsityPattern {
    rows: Vec<Vec<usize>>,
}

impl SparsityPattern {
    /// Build from per-row column lists. Columns are sorted and deduplicated.
    pub fn new(mut rows: Vec<Vec<usize>>) -> Self {
        for cols in &mut rows {
            cols.sort_unstable();
            cols.dedup();
        }
        Self { rows }
    }

    /// Number of rows described by this pattern.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Allowed columns of row `i` (empty for rows beyond the pattern).
    pub fn row(&self, i: usize) -> &[usize] {
        self.rows.get(i).map_or(&[], Vec::as_slice)
    }

    /// Total number of allowed entries.
    pub fn n_nonzeros(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Global DOF ownership as seen by one process.
pub trait DofMap: Send + Sync {
    /// First global row owned by this process.
    fn first_dof(&self) -> usize;
    /// One past the last global row owned by this process.
    fn end_dof(&self) -> usize;
    /// Total number of global DOFs across all processes.
    fn n_dofs(&self) -> usize;
    /// Sparsity pattern for the owned rows, if one has been built.
    fn sparsity_pattern(&self) -> Option<Arc<SparsityPattern>> {
        None
    }
    /// Number of locally owned rows.
    fn n_local_dofs(&self) -> usize {
        self.end_dof().saturating_sub(self.first_dof())
    }
}

/// Contiguous-by-rank reference implementation of [`DofMap`].
#[derive(Clone, Debug, Default)]
pub struct ContiguousDofMap {
    first: usize,
    end: usize,
    n_dofs: usize,
    sparsity: Option<Arc<SparsityPattern>>,
}

impl ContiguousDofMap {
    /// Own the half-open global row range `[first, end)` of `n_dofs` rows.
    pub fn new(first: usize, end: usize, n_dofs: usize) -> Self {
        debug_assert!(first <= end && end <= n_dofs);
        Self {
            first,
            end,
            n_dofs,
            sparsity: None,
        }
    }

    /// Evenly split `n_dofs` rows over `n_ranks`, remainder to the low ranks.
    pub fn uniform(n_dofs: usize, rank: usize, n_ranks: usize) -> Self {
        debug_assert!(rank < n_ranks);
        let base = n_dofs / n_ranks;
        let extra = n_dofs % n_ranks;
        let first = rank * base + rank.min(extra);
        let len = base + usize::from(rank < extra);
        Self::new(first, first + len, n_dofs)
    }

    /// Attach a pre-built sparsity pattern to hand out via the trait.
    pub fn with_sparsity(mut self, sparsity: Arc<SparsityPattern>) -> Self {
        self.sparsity = Some(sparsity);
        self
    }
}

impl DofMap for ContiguousDofMap {
    fn first_dof(&self) -> usize {
        self.first
    }
    fn end_dof(&self) -> usize {
        self.end
    }
    fn n_dofs(&self) -> usize {
        self.n_dofs
    }
    fn sparsity_pattern(&self) -> Option<Arc<SparsityPattern>> {
        self.sparsity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_split_covers_all_rows_contiguously() {
        let n_dofs = 10;
        let n_ranks = 3;
        let mut next = 0;
        for rank in 0..n_ranks {
            let map = ContiguousDofMap::uniform(n_dofs, rank, n_ranks);
            assert_eq!(map.first_dof(), next);
            assert!(map.n_local_dofs() > 0);
            next = map.end_dof();
        }
        assert_eq!(next, n_dofs);
    }

    #[test]
    fn uniform_remainder_goes_to_low_ranks() {
        assert_eq!(ContiguousDofMap::uniform(10, 0, 3).n_local_dofs(), 4);
        assert_eq!(ContiguousDofMap::uniform(10, 1, 3).n_local_dofs(), 3);
        assert_eq!(ContiguousDofMap::uniform(10, 2, 3).n_local_dofs(), 3);
    }

    #[test]
    fn pattern_sorts_and_dedups() {
        let sp = SparsityPattern::new(vec![vec![2, 0, 2], vec![]]);
        assert_eq!(sp.row(0), &[0, 2]);
        assert_eq!(sp.row(1), &[] as &[usize]);
        assert_eq!(sp.row(99), &[] as &[usize]);
        assert_eq!(sp.n_nonzeros(), 2);
    }
}
