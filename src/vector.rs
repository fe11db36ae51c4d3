//! Distributed numeric-vector collaborator interface.
//!
//! The matrix layer contributes no matvec arithmetic of its own: it only fixes
//! the contract that `vector_mult_add` means `dest += self * arg` and that the
//! vector collaborator carries the fused operation.

use crate::error::MatrixSieveError;
use crate::matrix::{MatrixScalar, SparseMatrix};

/// Capability set this layer needs from a numeric vector.
pub trait NumericVector<T: MatrixScalar> {
    /// Set every entry to zero.
    fn zero(&mut self);

    /// Fused multiply-add by a matrix: `self += matrix * arg`.
    fn add_matrix_vector(
        &mut self,
        matrix: &dyn SparseMatrix<T>,
        arg: &dyn NumericVector<T>,
    ) -> Result<(), MatrixSieveError>;

    /// Value at global index `i`.
    fn get(&self, i: usize) -> T;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: MatrixScalar> dyn SparseMatrix<T> {
    /// `dest = self * arg`.
    pub fn vector_mult(
        &self,
        dest: &mut dyn NumericVector<T>,
        arg: &dyn NumericVector<T>,
    ) -> Result<(), MatrixSieveError> {
        dest.zero();
        self.vector_mult_add(dest, arg)
    }

    /// `dest += self * arg`; the arithmetic lives in the vector collaborator.
    pub fn vector_mult_add(
        &self,
        dest: &mut dyn NumericVector<T>,
        arg: &dyn NumericVector<T>,
    ) -> Result<(), MatrixSieveError> {
        dest.add_matrix_vector(self, arg)
    }
}
