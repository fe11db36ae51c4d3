//! Distributed gather-and-print of a row-partitioned matrix.
//!
//! This is a collective operation: every process in the communicator group
//! must call [`print_matrix`]. Rank 0 writes the globally ordered rendering;
//! every other rank scans its owned rows, collects `(row, col, value)`
//! triplets for its nonzeros and sends them to rank 0 as three parallel
//! sequences. Receives are issued and consumed in increasing rank order,
//! which together with contiguous row ownership keeps the printed row order
//! globally increasing without any process materializing the full matrix.
//!
//! There is no timeout: a missing sender stalls the root until the transport
//! reports the failure.

use std::io::Write;
use std::mem::size_of;

use num_traits::Zero;

use crate::comm::{CommTag, Communicator, Wait};
use crate::dof_map::DofMap;
use crate::error::MatrixSieveError;
use crate::matrix::{MatrixScalar, SparseMatrix};
use crate::wire::{WireCount, WireIndex, cast_slice, cast_slice_mut};

/// Tags for the three parallel gather sequences. Each sequence occupies two
/// adjacent tags (size header, payload).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PrintCommTags {
    rows: CommTag,
    cols: CommTag,
    vals: CommTag,
}

impl PrintCommTags {
    /// Construct tags from a base, assigning deterministic offsets per
    /// sequence.
    #[inline]
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            rows: base,
            cols: base.offset(2),
            vals: base.offset(4),
        }
    }
}

impl Default for PrintCommTags {
    fn default() -> Self {
        Self::from_base(CommTag::new(0x51A7))
    }
}

/// Print the matrix on rank 0, dense (`sparse = false`) or as sparse
/// `row col value` triplets, using the default tag block.
pub fn print_matrix<T, C, W>(
    matrix: &dyn SparseMatrix<T>,
    comm: &C,
    out: &mut W,
    sparse: bool,
) -> Result<(), MatrixSieveError>
where
    T: MatrixScalar + bytemuck::Pod,
    C: Communicator,
    W: Write,
{
    print_matrix_with_tags(matrix, comm, out, sparse, PrintCommTags::default())
}

/// [`print_matrix`] with an explicit tag block, for callers interleaving
/// several collectives over one communicator.
pub fn print_matrix_with_tags<T, C, W>(
    matrix: &dyn SparseMatrix<T>,
    comm: &C,
    out: &mut W,
    sparse: bool,
    tags: PrintCommTags,
) -> Result<(), MatrixSieveError>
where
    T: MatrixScalar + bytemuck::Pod,
    C: Communicator,
    W: Write,
{
    if !matrix.initialized() {
        return Err(MatrixSieveError::Uninitialized);
    }
    let dof_map = matrix.dof_map().ok_or(MatrixSieveError::MissingDofMap)?;

    if comm.rank() == 0 {
        print_root(matrix, &*dof_map, comm, out, sparse, tags)
    } else {
        send_local_nonzeros(matrix, &*dof_map, comm, tags)
    }
}

fn print_root<T, C, W>(
    matrix: &dyn SparseMatrix<T>,
    dof_map: &dyn DofMap,
    comm: &C,
    out: &mut W,
    sparse: bool,
    tags: PrintCommTags,
) -> Result<(), MatrixSieveError>
where
    T: MatrixScalar + bytemuck::Pod,
    C: Communicator,
    W: Write,
{
    // The gather protocol only lines up if rank 0 owns the first global row.
    if dof_map.first_dof() != 0 {
        return Err(MatrixSieveError::RootNotFirst {
            first_dof: dof_map.first_dof(),
        });
    }
    let n = matrix.n();

    // Locally owned rows go straight to the stream.
    for i in dof_map.first_dof()..dof_map.end_dof() {
        if sparse {
            for j in 0..n {
                let c = matrix.entry(i, j);
                if !c.is_zero() {
                    writeln!(out, "{i} {j} {c}")?;
                }
            }
        } else {
            for j in 0..n {
                write!(out, "{} ", matrix.entry(i, j))?;
            }
            writeln!(out)?;
        }
    }

    let mut current_row = dof_map.end_dof() as u64;
    for p in 1..comm.size() {
        let rows = recv_indices(comm, p, tags.rows)?;
        let cols = recv_indices(comm, p, tags.cols)?;
        let vals: Vec<T> = recv_values(comm, p, tags.vals)?;
        if rows.len() != cols.len() || rows.len() != vals.len() {
            return Err(MatrixSieveError::GatherLengthMismatch {
                neighbor: p,
                rows: rows.len(),
                cols: cols.len(),
                vals: vals.len(),
            });
        }
        log::trace!("print gather: rank {p} sent {} nonzeros", rows.len());
        if rows.is_empty() {
            continue;
        }

        // Senders are drained in rank order; their row ranges must be
        // non-decreasing and must not overlap rows already emitted.
        let first = rows[0];
        let last = rows[rows.len() - 1];
        if first < current_row {
            return Err(MatrixSieveError::RowOrderViolation {
                rank: p,
                got: first,
                expected: current_row,
            });
        }
        if last < first {
            return Err(MatrixSieveError::RowOrderViolation {
                rank: p,
                got: last,
                expected: first,
            });
        }

        // Walk columns per row, consuming a triplet exactly when its
        // (row, column) matches the cursor.
        let mut b = 0usize;
        while current_row <= last {
            if sparse {
                for j in 0..n as u64 {
                    if b < rows.len() && rows[b] == current_row && cols[b] == j {
                        writeln!(out, "{current_row} {j} {}", vals[b])?;
                        b += 1;
                    }
                }
            } else {
                for j in 0..n as u64 {
                    if b < rows.len() && rows[b] == current_row && cols[b] == j {
                        write!(out, "{} ", vals[b])?;
                        b += 1;
                    } else {
                        write!(out, "{} ", T::zero())?;
                    }
                }
                writeln!(out)?;
            }
            current_row += 1;
        }
    }

    // Dense mode pads any trailing rows no enumerated sender owned.
    if !sparse {
        while (current_row as usize) < matrix.m() {
            for _ in 0..n {
                write!(out, "{} ", T::zero())?;
            }
            writeln!(out)?;
            current_row += 1;
        }
    }

    out.flush()?;
    Ok(())
}

fn send_local_nonzeros<T, C>(
    matrix: &dyn SparseMatrix<T>,
    dof_map: &dyn DofMap,
    comm: &C,
    tags: PrintCommTags,
) -> Result<(), MatrixSieveError>
where
    T: MatrixScalar + bytemuck::Pod,
    C: Communicator,
{
    // Local rows are scanned in increasing row-major order, so the buffers
    // arrive at the root already sorted. Density expansion is always the
    // root's job; only nonzeros travel.
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut vals = Vec::new();
    for i in dof_map.first_dof()..dof_map.end_dof() {
        for j in 0..matrix.n() {
            let c = matrix.entry(i, j);
            if !c.is_zero() {
                rows.push(WireIndex::of(i as u64));
                cols.push(WireIndex::of(j as u64));
                vals.push(c);
            }
        }
    }
    log::trace!(
        "print gather: rank {} sending {} nonzeros to root",
        comm.rank(),
        rows.len()
    );
    send_chunk(comm, 0, tags.rows, cast_slice(&rows));
    send_chunk(comm, 0, tags.cols, cast_slice(&cols));
    send_chunk(comm, 0, tags.vals, cast_slice(&vals));
    Ok(())
}

// --- chunked variable-length transfers (size header, then payload) ---

fn send_chunk<C: Communicator>(comm: &C, peer: usize, tag: CommTag, bytes: &[u8]) {
    let hdr = WireCount::new(bytes.len());
    comm.isend(peer, tag.as_u16(), cast_slice(std::slice::from_ref(&hdr)))
        .wait();
    comm.isend(peer, tag.offset(1).as_u16(), bytes).wait();
}

fn recv_chunk<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
) -> Result<Vec<u8>, MatrixSieveError> {
    let mut hdr = WireCount::new(0);
    let handle = comm.irecv(
        peer,
        tag.as_u16(),
        cast_slice_mut(std::slice::from_mut(&mut hdr)),
    );
    let raw = handle.wait().ok_or_else(|| MatrixSieveError::CommError {
        neighbor: peer,
        message: "no size header received".to_string(),
    })?;
    if raw.len() != size_of::<WireCount>() {
        return Err(MatrixSieveError::BufferSizeMismatch {
            neighbor: peer,
            expected: size_of::<WireCount>(),
            got: raw.len(),
        });
    }
    cast_slice_mut(std::slice::from_mut(&mut hdr)).copy_from_slice(&raw);

    let len = hdr.get();
    let mut buf = vec![0u8; len];
    let handle = comm.irecv(peer, tag.offset(1).as_u16(), &mut buf);
    let raw = handle.wait().ok_or_else(|| MatrixSieveError::CommError {
        neighbor: peer,
        message: "no payload received".to_string(),
    })?;
    if raw.len() != len {
        return Err(MatrixSieveError::BufferSizeMismatch {
            neighbor: peer,
            expected: len,
            got: raw.len(),
        });
    }
    buf.copy_from_slice(&raw);
    Ok(buf)
}

fn recv_indices<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
) -> Result<Vec<u64>, MatrixSieveError> {
    let bytes = recv_chunk(comm, peer, tag)?;
    if bytes.len() % size_of::<WireIndex>() != 0 {
        return Err(MatrixSieveError::BufferSizeMismatch {
            neighbor: peer,
            expected: bytes.len().next_multiple_of(size_of::<WireIndex>()),
            got: bytes.len(),
        });
    }
    let mut wire = vec![WireIndex::of(0); bytes.len() / size_of::<WireIndex>()];
    cast_slice_mut(&mut wire).copy_from_slice(&bytes);
    Ok(wire.iter().map(WireIndex::get).collect())
}

fn recv_values<T, C>(comm: &C, peer: usize, tag: CommTag) -> Result<Vec<T>, MatrixSieveError>
where
    T: MatrixScalar + bytemuck::Pod,
    C: Communicator,
{
    let bytes = recv_chunk(comm, peer, tag)?;
    if bytes.len() % size_of::<T>() != 0 {
        return Err(MatrixSieveError::BufferSizeMismatch {
            neighbor: peer,
            expected: bytes.len().next_multiple_of(size_of::<T>()),
            got: bytes.len(),
        });
    }
    let mut vals = vec![T::zero(); bytes.len() / size_of::<T>()];
    cast_slice_mut(&mut vals).copy_from_slice(&bytes);
    Ok(vals)
}

// --- complex-valued specialization ---

/// Scalar types that split into real and imaginary parts.
pub trait ComplexScalar: MatrixScalar {
    type Real: MatrixScalar;
    fn real(&self) -> Self::Real;
    fn imag(&self) -> Self::Real;
}

impl ComplexScalar for num_complex::Complex<f64> {
    type Real = f64;
    fn real(&self) -> f64 {
        self.re
    }
    fn imag(&self) -> f64 {
        self.im
    }
}

impl ComplexScalar for num_complex::Complex<f32> {
    type Real = f32;
    fn real(&self) -> f32 {
        self.re
    }
    fn imag(&self) -> f32 {
        self.im
    }
}

/// Print a complex-valued matrix as two labeled dense blocks, real part then
/// imaginary part, in fixed width-8 fields.
///
/// This specialization iterates the whole matrix locally and bypasses the
/// distributed gather protocol; it is only well-defined when every entry is
/// locally addressable. Sparse printing is not implemented for complex
/// scalars.
pub fn print_complex<T, W>(
    matrix: &dyn SparseMatrix<T>,
    out: &mut W,
    sparse: bool,
) -> Result<(), MatrixSieveError>
where
    T: ComplexScalar,
    W: Write,
{
    if sparse {
        return Err(MatrixSieveError::NotImplemented(
            "sparse print of complex matrices",
        ));
    }

    writeln!(out, "Real part:")?;
    for i in 0..matrix.m() {
        for j in 0..matrix.n() {
            write!(out, "{:8} ", matrix.entry(i, j).real())?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "Imaginary part:")?;
    for i in 0..matrix.m() {
        for j in 0..matrix.n() {
            write!(out, "{:8} ", matrix.entry(i, j).imag())?;
        }
        writeln!(out)?;
    }
    Ok(())
}
