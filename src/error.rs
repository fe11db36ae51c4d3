//! MatrixSieveError: Unified error type for matrix-sieve public APIs
//!
//! Every fault in this layer is returned at the point of detection. Nothing
//! here is retried or recovered locally: configuration faults, precondition
//! violations, unimplemented capabilities and ordering violations all indicate
//! a caller bug or a broken deployment.

use crate::matrix::SolverBackend;
use thiserror::Error;

/// Unified error type for matrix-sieve operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixSieveError {
    /// The requested solver backend is not compiled into this build.
    #[error("unrecognized or unavailable solver backend: {backend}")]
    UnsupportedBackend { backend: SolverBackend },
    /// An element matrix cannot be split into the supplied block index counts.
    #[error(
        "block shape mismatch: {m}x{n} element matrix does not expand over {brows} block rows and {bcols} block columns"
    )]
    BlockShapeMismatch {
        m: usize,
        n: usize,
        brows: usize,
        bcols: usize,
    },
    /// Element matrix dimensions do not match the scalar index sequences.
    #[error(
        "insertion shape mismatch: {m}x{n} element matrix with {rows} row and {cols} column indices"
    )]
    InsertShapeMismatch {
        m: usize,
        n: usize,
        rows: usize,
        cols: usize,
    },
    /// Operation requires a dof map but none is attached.
    #[error("matrix has no dof map attached")]
    MissingDofMap,
    /// Operation requires an initialized matrix.
    #[error("matrix is not initialized")]
    Uninitialized,
    /// Row index outside `[0, m)`.
    #[error("row index {row} out of bounds for a matrix with {m} rows")]
    RowOutOfBounds { row: usize, m: usize },
    /// Column index outside `[0, n)`.
    #[error("column index {col} out of bounds for a matrix with {n} columns")]
    ColOutOfBounds { col: usize, n: usize },
    /// Capability is not implemented for this backend/mode combination.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    /// The root process of a distributed print must own global row 0.
    #[error("root process must own global row 0, but its dof range starts at {first_dof}")]
    RootNotFirst { first_dof: usize },
    /// A gathered row range is non-increasing or overlaps rows already emitted.
    #[error("row ordering violation from rank {rank}: received row {got}, expected >= {expected}")]
    RowOrderViolation {
        rank: usize,
        got: u64,
        expected: u64,
    },
    /// The three parallel gather sequences have different lengths.
    #[error(
        "gather buffers from rank {neighbor} have mismatched lengths ({rows} rows, {cols} cols, {vals} values)"
    )]
    GatherLengthMismatch {
        neighbor: usize,
        rows: usize,
        cols: usize,
        vals: usize,
    },
    /// A wire-level message had an unexpected size.
    #[error("buffer size mismatch from rank {neighbor}: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        neighbor: usize,
        expected: usize,
        got: usize,
    },
    /// Point-to-point communication failed.
    #[error("communication error with rank {neighbor}: {message}")]
    CommError { neighbor: usize, message: String },
    /// Writing to the output stream failed.
    #[error("I/O error while printing: {0}")]
    Io(String),
}

impl From<std::io::Error> for MatrixSieveError {
    fn from(err: std::io::Error) -> Self {
        MatrixSieveError::Io(err.to_string())
    }
}
