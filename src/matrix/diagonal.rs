//! Diagonal-only backend.
//!
//! Constructed through the `MatrixBuildType::Diagonal` override; stores a
//! single value per row. Off-diagonal contributions are discarded, which is
//! what lumped-mass and preconditioner assembly expect from this variant.

use num_traits::Zero;

use super::{BackendKind, MatrixCore, MatrixScalar, SparseMatrix};
use crate::error::MatrixSieveError;

#[derive(Debug)]
pub struct DiagonalMatrix<T> {
    core: MatrixCore,
    m: usize,
    n: usize,
    diag: Vec<T>,
}

impl<T: MatrixScalar> DiagonalMatrix<T> {
    pub fn new(rank: usize, n_processes: usize) -> Self {
        Self::with_core(MatrixCore::new(rank, n_processes))
    }

    pub(crate) fn with_core(core: MatrixCore) -> Self {
        Self {
            core,
            m: 0,
            n: 0,
            diag: Vec::new(),
        }
    }

    /// The stored diagonal.
    pub fn diagonal(&self) -> &[T] {
        &self.diag
    }
}

impl<T: MatrixScalar> SparseMatrix<T> for DiagonalMatrix<T> {
    fn core(&self) -> &MatrixCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MatrixCore {
        &mut self.core
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Diagonal
    }

    fn init(&mut self, m: usize, n: usize) -> Result<(), MatrixSieveError> {
        self.m = m;
        self.n = n;
        self.diag = vec![T::zero(); m.min(n)];
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
        if i == j {
            self.diag.get(i).copied().unwrap_or_else(T::zero)
        } else {
            T::zero()
        }
    }

    fn add_value(&mut self, i: usize, j: usize, v: T) -> Result<(), MatrixSieveError> {
        if i >= self.m {
            return Err(MatrixSieveError::RowOutOfBounds { row: i, m: self.m });
        }
        if j >= self.n {
            return Err(MatrixSieveError::ColOutOfBounds { col: j, n: self.n });
        }
        if i == j {
            self.diag[i] = self.diag[i] + v;
        }
        Ok(())
    }

    fn zero(&mut self) {
        self.diag.fill(T::zero());
    }

    fn zero_rows(&mut self, rows: &[usize], diag: T) -> Result<(), MatrixSieveError> {
        for &r in rows {
            if r >= self.m {
                return Err(MatrixSieveError::RowOutOfBounds { row: r, m: self.m });
            }
            if r < self.diag.len() {
                self.diag[r] = diag;
            }
        }
        Ok(())
    }
}
