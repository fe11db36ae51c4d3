//! Backend-agnostic sparse matrix interface and factory.
//!
//! [`SparseMatrix`] is the capability set every backend satisfies; the
//! [`build`] factory maps a runtime [`SolverBackend`] tag (plus the orthogonal
//! [`MatrixBuildType`] override) to exactly one newly constructed, not yet
//! initialized backend instance. The abstraction owns no storage itself: it
//! contributes the block-to-scalar index expansion, attach semantics for
//! borrowed dof maps / sparsity patterns, and the default behaviors that are
//! expressible purely through the interface.

pub mod diagonal;
pub mod native;

use std::fmt;
use std::sync::Arc;

use num_traits::Zero;

use crate::comm::Communicator;
use crate::dense::DenseMatrix;
use crate::dof_map::{DofMap, SparsityPattern};
use crate::error::MatrixSieveError;

pub use diagonal::DiagonalMatrix;
pub use native::NativeMatrix;

/// Scalar bound for matrix entries.
pub trait MatrixScalar:
    Copy + PartialEq + fmt::Display + fmt::Debug + Zero + Send + Sync + 'static
{
}

impl<T> MatrixScalar for T where
    T: Copy + PartialEq + fmt::Display + fmt::Debug + Zero + Send + Sync + 'static
{
}

/// Vendor tag selecting which backend the factory constructs.
///
/// Only [`SolverBackend::Native`] is compiled into this build; the
/// vendor-library-backed variants require their binding builds and requesting
/// one of them is a fatal configuration error, not a retryable condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolverBackend {
    /// In-process row-map backend, always available.
    Native,
    /// Distributed PETSc-backed matrices.
    Petsc,
    /// hypre-backed matrices.
    Hypre,
    /// faer CPU sparse matrices.
    Faer,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverBackend::Native => "native",
            SolverBackend::Petsc => "petsc",
            SolverBackend::Hypre => "hypre",
            SolverBackend::Faer => "faer",
        };
        f.write_str(name)
    }
}

/// Build-type override, orthogonal to the vendor tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MatrixBuildType {
    /// Pick the backend from the vendor tag.
    #[default]
    Automatic,
    /// Construct the diagonal-only backend regardless of the vendor tag.
    Diagonal,
}

/// Runtime variant of a constructed matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Native,
    Diagonal,
    Petsc,
    Hypre,
    Faer,
}

/// State shared by every backend: borrowed collaborator handles, the
/// initialized flag, and this process's identity within the group.
#[derive(Clone, Default)]
pub struct MatrixCore {
    pub(crate) dof_map: Option<Arc<dyn DofMap>>,
    pub(crate) sparsity: Option<Arc<SparsityPattern>>,
    pub(crate) initialized: bool,
    pub(crate) rank: usize,
    pub(crate) n_processes: usize,
}

impl fmt::Debug for MatrixCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixCore")
            .field("dof_map", &self.dof_map.as_ref().map(|_| ".."))
            .field("sparsity", &self.sparsity)
            .field("initialized", &self.initialized)
            .field("rank", &self.rank)
            .field("n_processes", &self.n_processes)
            .finish()
    }
}

impl MatrixCore {
    pub fn new(rank: usize, n_processes: usize) -> Self {
        Self {
            dof_map: None,
            sparsity: None,
            initialized: false,
            rank,
            n_processes,
        }
    }
}

/// Capability set of a logically global, row-distributed m x n matrix.
///
/// Each process's backend instance owns only its local row partition;
/// cross-process consistency of insertions touching remote rows is the
/// backend's responsibility, not specified here.
pub trait SparseMatrix<T: MatrixScalar>: Send + fmt::Debug {
    fn core(&self) -> &MatrixCore;
    fn core_mut(&mut self) -> &mut MatrixCore;

    /// Which backend variant this instance is.
    fn backend_kind(&self) -> BackendKind;

    /// Set the global shape and mark the matrix initialized. Clears storage.
    fn init(&mut self, m: usize, n: usize) -> Result<(), MatrixSieveError>;

    /// Global row count.
    fn m(&self) -> usize;
    /// Global column count.
    fn n(&self) -> usize;

    /// Value at `(i, j)`; zero where nothing is stored. `i` must be a row the
    /// calling process can address.
    fn entry(&self, i: usize, j: usize) -> T;

    /// Add `v` to the entry at `(i, j)`.
    fn add_value(&mut self, i: usize, j: usize, v: T) -> Result<(), MatrixSieveError>;

    /// Reset every stored entry to zero, keeping the structure.
    fn zero(&mut self);

    /// Add a dense element contribution at the given scalar indices:
    /// `self[rows[i], cols[j]] += dm[i, j]`.
    fn add_matrix(
        &mut self,
        dm: &DenseMatrix<T>,
        rows: &[usize],
        cols: &[usize],
    ) -> Result<(), MatrixSieveError> {
        if dm.m() != rows.len() || dm.n() != cols.len() {
            return Err(MatrixSieveError::InsertShapeMismatch {
                m: dm.m(),
                n: dm.n(),
                rows: rows.len(),
                cols: cols.len(),
            });
        }
        for (i, &row) in rows.iter().enumerate() {
            for (j, &col) in cols.iter().enumerate() {
                self.add_value(row, col, dm.get(i, j))?;
            }
        }
        Ok(())
    }

    /// Add a dense element contribution expressed in *block* indices.
    ///
    /// Each block index expands to `blocksize` consecutive scalar indices,
    /// where `blocksize = dm.m() / brows.len()`; both dimension divisions must
    /// be exact and agree on the block size. Only indices are expanded -- the
    /// dense data is handed to [`SparseMatrix::add_matrix`] unchanged and
    /// matched positionally.
    fn add_block_matrix(
        &mut self,
        dm: &DenseMatrix<T>,
        brows: &[usize],
        bcols: &[usize],
    ) -> Result<(), MatrixSieveError> {
        let mismatch = MatrixSieveError::BlockShapeMismatch {
            m: dm.m(),
            n: dm.n(),
            brows: brows.len(),
            bcols: bcols.len(),
        };
        if brows.is_empty() || bcols.is_empty() {
            return Err(mismatch);
        }
        if dm.m() % brows.len() != 0 || dm.n() % bcols.len() != 0 {
            return Err(mismatch);
        }
        let blocksize = dm.m() / brows.len();
        if dm.n() / bcols.len() != blocksize {
            return Err(mismatch);
        }

        let mut rows = Vec::with_capacity(dm.m());
        let mut cols = Vec::with_capacity(dm.n());
        for &brow in brows {
            let i = brow * blocksize;
            rows.extend(i..i + blocksize);
        }
        for &bcol in bcols {
            let j = bcol * blocksize;
            cols.extend(j..j + blocksize);
        }

        self.add_matrix(dm, &rows, &cols)
    }

    /// Zero out the listed rows and set their diagonal entry to `diag`.
    ///
    /// Not implemented at this layer; backends that support it override.
    fn zero_rows(&mut self, _rows: &[usize], _diag: T) -> Result<(), MatrixSieveError> {
        Err(MatrixSieveError::NotImplemented("zero_rows"))
    }

    /// Borrow the dof map; if no sparsity pattern is attached yet, pull one
    /// from the map. An already attached pattern is never replaced this way.
    fn attach_dof_map(&mut self, dof_map: Arc<dyn DofMap>) {
        let core = self.core_mut();
        if core.sparsity.is_none() {
            core.sparsity = dof_map.sparsity_pattern();
        }
        core.dof_map = Some(dof_map);
    }

    /// Borrow a sparsity pattern, unconditionally replacing any previous one.
    fn attach_sparsity_pattern(&mut self, sparsity: Arc<SparsityPattern>) {
        self.core_mut().sparsity = Some(sparsity);
    }

    fn dof_map(&self) -> Option<Arc<dyn DofMap>> {
        self.core().dof_map.clone()
    }

    fn sparsity_pattern(&self) -> Option<Arc<SparsityPattern>> {
        self.core().sparsity.clone()
    }

    fn initialized(&self) -> bool {
        self.core().initialized
    }

    /// Rank of the owning process within its group.
    fn processor_id(&self) -> usize {
        self.core().rank
    }

    /// Size of the process group this matrix was built for.
    fn n_processes(&self) -> usize {
        self.core().n_processes
    }
}

/// Construct a backend matrix for the given process group.
///
/// `MatrixBuildType::Diagonal` is a hard override: it bypasses vendor
/// selection entirely. Otherwise the vendor tag dispatches to the matching
/// backend constructor; a vendor that is not compiled into this build yields
/// [`MatrixSieveError::UnsupportedBackend`] naming the tag. The returned
/// instance is exclusively owned and not yet initialized.
pub fn build<T, C>(
    comm: &C,
    backend: SolverBackend,
    build_type: MatrixBuildType,
) -> Result<Box<dyn SparseMatrix<T>>, MatrixSieveError>
where
    T: MatrixScalar,
    C: Communicator,
{
    let core = MatrixCore::new(comm.rank(), comm.size());

    if build_type == MatrixBuildType::Diagonal {
        return Ok(Box::new(DiagonalMatrix::with_core(core)));
    }

    match backend {
        SolverBackend::Native => Ok(Box::new(NativeMatrix::with_core(core))),
        // Vendor-backed variants need their binding builds, none of which are
        // part of this deployment.
        SolverBackend::Petsc | SolverBackend::Hypre | SolverBackend::Faer => {
            Err(MatrixSieveError::UnsupportedBackend { backend })
        }
    }
}
