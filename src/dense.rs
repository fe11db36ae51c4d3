//! Dense local element matrix, the unit of assembly contributions.
//!
//! Row-major storage; small and owned by the assembly loop. This is the
//! argument type of both scalar and block insertion on
//! [`crate::matrix::SparseMatrix`].

use num_traits::Zero;

/// A small dense matrix holding one element's local contribution.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<T> {
    m: usize,
    n: usize,
    data: Vec<T>,
}

impl<T: Copy + Zero> DenseMatrix<T> {
    /// An `m` x `n` matrix of zeros.
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            data: vec![T::zero(); m * n],
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != m * n`.
    pub fn from_row_major(m: usize, n: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            m * n,
            "row-major buffer length must match matrix shape"
        );
        Self { m, n, data }
    }

    /// Number of rows.
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of columns.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: T) {
        self.data[i * self.n + j] = v;
    }

    /// Row-major view of the raw buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let dm = DenseMatrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(dm.m(), 2);
        assert_eq!(dm.n(), 3);
        assert_eq!(dm.get(0, 2), 3.0);
        assert_eq!(dm.get(1, 0), 4.0);
    }

    #[test]
    fn new_is_zeroed() {
        let dm: DenseMatrix<f64> = DenseMatrix::new(2, 2);
        assert!(dm.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "row-major buffer length")]
    fn shape_mismatch_panics() {
        let _ = DenseMatrix::from_row_major(2, 2, vec![1.0; 3]);
    }
}
