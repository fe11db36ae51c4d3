//! # matrix-sieve
//!
//! matrix-sieve is a backend-agnostic distributed sparse-matrix layer for
//! finite-element assembly and solve pipelines. It presents one uniform matrix
//! interface (scalar and block insertion, matvec, printing) while storage and
//! arithmetic are delegated to a pluggable linear-algebra backend chosen at
//! construction time.
//!
//! ## Features
//! - [`matrix::SparseMatrix`] capability trait over a closed set of backends,
//!   constructed through the [`matrix::build`] factory
//! - Block-to-scalar index expansion for block-structured element matrices
//! - Distributed gather-and-print of a row-partitioned matrix over a
//!   pluggable [`comm::Communicator`] (serial, in-process multi-rank)
//! - Borrowed degree-of-freedom maps and sparsity patterns with explicit
//!   attach/overwrite semantics
//!
//! ## Error handling
//! Every fault surfaces immediately as a [`error::MatrixSieveError`]. There is
//! no retry or degraded-mode continuation: an inconsistency at this layer
//! indicates a caller bug or a misconfigured deployment, not a transient
//! condition.
//!
//! ## Usage
//! ```
//! use matrix_sieve::prelude::*;
//! use std::sync::Arc;
//!
//! let comm = NoComm;
//! let mut a = build::<f64, _>(&comm, SolverBackend::Native, MatrixBuildType::Automatic)?;
//! a.init(3, 3)?;
//! a.attach_dof_map(Arc::new(ContiguousDofMap::new(0, 3, 3)));
//! a.add_value(0, 0, 1.0)?;
//!
//! let mut out = Vec::new();
//! print_matrix(&*a, &comm, &mut out, true)?;
//! assert_eq!(out, b"0 0 1\n");
//! # Ok::<(), matrix_sieve::error::MatrixSieveError>(())
//! ```

pub mod comm;
pub mod dense;
pub mod dof_map;
pub mod error;
pub mod matrix;
pub mod print;
pub mod vector;
pub mod wire;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::comm::{CommTag, Communicator, LocalComm, NoComm, Wait};
    pub use crate::dense::DenseMatrix;
    pub use crate::dof_map::{ContiguousDofMap, DofMap, SparsityPattern};
    pub use crate::error::MatrixSieveError;
    pub use crate::matrix::{
        BackendKind, DiagonalMatrix, MatrixBuildType, MatrixScalar, NativeMatrix, SolverBackend,
        SparseMatrix, build,
    };
    pub use crate::print::{
        ComplexScalar, PrintCommTags, print_complex, print_matrix, print_matrix_with_tags,
    };
    pub use crate::vector::NumericVector;
}
