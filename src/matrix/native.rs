//! In-process row-map backend, always compiled in.

use std::collections::BTreeMap;

use num_traits::Zero;

use super::{BackendKind, MatrixCore, MatrixScalar, SparseMatrix};
use crate::error::MatrixSieveError;

/// Sparse storage over sorted per-row maps.
///
/// Holds whatever rows the local process inserts; it performs no cross-process
/// migration of remote-row contributions.
#[derive(Debug)]
pub struct NativeMatrix<T> {
    core: MatrixCore,
    m: usize,
    n: usize,
    rows: BTreeMap<usize, BTreeMap<usize, T>>,
}

impl<T: MatrixScalar> NativeMatrix<T> {
    pub fn new(rank: usize, n_processes: usize) -> Self {
        Self::with_core(MatrixCore::new(rank, n_processes))
    }

    pub(crate) fn with_core(core: MatrixCore) -> Self {
        Self {
            core,
            m: 0,
            n: 0,
            rows: BTreeMap::new(),
        }
    }

    /// Number of explicitly stored entries (including stored zeros).
    pub fn n_stored(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }
}

impl<T: MatrixScalar> SparseMatrix<T> for NativeMatrix<T> {
    fn core(&self) -> &MatrixCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MatrixCore {
        &mut self.core
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn init(&mut self, m: usize, n: usize) -> Result<(), MatrixSieveError> {
        self.m = m;
        self.n = n;
        self.rows.clear();
        self.core.initialized = true;
        Ok(())
    }

    fn m(&self) -> usize {
        self.m
    }

    fn n(&self) -> usize {
        self.n
    }

    fn entry(&self, i: usize, j: usize) -> T {
        self.rows
            .get(&i)
            .and_then(|row| row.get(&j))
            .copied()
            .unwrap_or_else(T::zero)
    }

    fn add_value(&mut self, i: usize, j: usize, v: T) -> Result<(), MatrixSieveError> {
        if i >= self.m {
            return Err(MatrixSieveError::RowOutOfBounds { row: i, m: self.m });
        }
        if j >= self.n {
            return Err(MatrixSieveError::ColOutOfBounds { col: j, n: self.n });
        }
        let slot = self
            .rows
            .entry(i)
            .or_default()
            .entry(j)
            .or_insert_with(T::zero);
        *slot = *slot + v;
        Ok(())
    }

    fn zero(&mut self) {
        for row in self.rows.values_mut() {
            for value in row.values_mut() {
                *value = T::zero();
            }
        }
    }

    fn zero_rows(&mut self, rows: &[usize], diag: T) -> Result<(), MatrixSieveError> {
        for &r in rows {
            if r >= self.m {
                return Err(MatrixSieveError::RowOutOfBounds { row: r, m: self.m });
            }
            let row = self.rows.entry(r).or_default();
            row.clear();
            if r < self.n {
                row.insert(r, diag);
            }
        }
        Ok(())
    }
}
