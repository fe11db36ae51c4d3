//! Multi-rank gather-and-print scenarios, with ranks simulated by threads
//! sharing a `LocalComm` mailbox. Each test uses its own tag block so the
//! scenarios can run concurrently.

use matrix_sieve::comm::{CommTag, LocalComm};
use matrix_sieve::dof_map::ContiguousDofMap;
use matrix_sieve::error::MatrixSieveError;
use matrix_sieve::matrix::{MatrixBuildType, SolverBackend, SparseMatrix, build};
use matrix_sieve::print::{PrintCommTags, print_matrix_with_tags};
use std::sync::Arc;

fn rank_matrix(
    comm: &LocalComm,
    m: usize,
    n: usize,
    first: usize,
    end: usize,
    entries: &[(usize, usize, f64)],
) -> Box<dyn SparseMatrix<f64>> {
    let mut a = build(comm, SolverBackend::Native, MatrixBuildType::Automatic).unwrap();
    a.init(m, n).unwrap();
    a.attach_dof_map(Arc::new(ContiguousDofMap::new(first, end, m)));
    for &(i, j, v) in entries {
        a.add_value(i, j, v).unwrap();
    }
    a
}

/// Rank 0 owns rows [0,2) with {(0,0):1, (1,1):2}; rank 1 owns [2,3) with
/// {(2,0):3}.
fn spawn_rank1(tags: PrintCommTags) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let comm1 = LocalComm::new(1, 2);
        let a = rank_matrix(&comm1, 3, 3, 2, 3, &[(2, 0, 3.0)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, false, tags).unwrap();
        // Non-root ranks write nothing.
        assert!(sink.is_empty());
    })
}

#[test]
fn two_rank_dense_print() {
    let tags = PrintCommTags::from_base(CommTag::new(0x1000));
    let rank1 = spawn_rank1(tags);

    let comm0 = LocalComm::new(0, 2);
    let a = rank_matrix(&comm0, 3, 3, 0, 2, &[(0, 0, 1.0), (1, 1, 2.0)]);
    let mut out = Vec::new();
    print_matrix_with_tags(&*a, &comm0, &mut out, false, tags).unwrap();
    rank1.join().unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "1 0 0 \n0 2 0 \n3 0 0 \n");
}

#[test]
fn two_rank_sparse_print() {
    let tags = PrintCommTags::from_base(CommTag::new(0x1100));
    let rank1 = std::thread::spawn(move || {
        let comm1 = LocalComm::new(1, 2);
        let a = rank_matrix(&comm1, 3, 3, 2, 3, &[(2, 0, 3.0)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, true, tags).unwrap();
    });

    let comm0 = LocalComm::new(0, 2);
    let a = rank_matrix(&comm0, 3, 3, 0, 2, &[(0, 0, 1.0), (1, 1, 2.0)]);
    let mut out = Vec::new();
    print_matrix_with_tags(&*a, &comm0, &mut out, true, tags).unwrap();
    rank1.join().unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "0 0 1\n1 1 2\n2 0 3\n");
}

#[test]
fn dense_print_pads_trailing_unowned_rows() {
    // The partition covers rows [0,3) of a 5-row matrix; the root pads the
    // tail with all-zero rows after draining the last rank.
    let tags = PrintCommTags::from_base(CommTag::new(0x1200));
    let rank1 = std::thread::spawn(move || {
        let comm1 = LocalComm::new(1, 2);
        let a = rank_matrix(&comm1, 5, 3, 2, 3, &[(2, 0, 3.0)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, false, tags).unwrap();
    });

    let comm0 = LocalComm::new(0, 2);
    let a = rank_matrix(&comm0, 5, 3, 0, 2, &[(0, 0, 1.0), (1, 1, 2.0)]);
    let mut out = Vec::new();
    print_matrix_with_tags(&*a, &comm0, &mut out, false, tags).unwrap();
    rank1.join().unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "1 0 0 \n0 2 0 \n3 0 0 \n0 0 0 \n0 0 0 \n"
    );
}

#[test]
fn empty_middle_rank_is_skipped() {
    let tags = PrintCommTags::from_base(CommTag::new(0x1300));
    let rank1 = std::thread::spawn(move || {
        // Rank 1 owns nothing; it still participates in the collective.
        let comm1 = LocalComm::new(1, 3);
        let a = rank_matrix(&comm1, 3, 3, 2, 2, &[]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, false, tags).unwrap();
    });
    let rank2 = std::thread::spawn(move || {
        let comm2 = LocalComm::new(2, 3);
        let a = rank_matrix(&comm2, 3, 3, 2, 3, &[(2, 0, 3.0)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm2, &mut sink, false, tags).unwrap();
    });

    let comm0 = LocalComm::new(0, 3);
    let a = rank_matrix(&comm0, 3, 3, 0, 2, &[(0, 0, 1.0), (1, 1, 2.0)]);
    let mut out = Vec::new();
    print_matrix_with_tags(&*a, &comm0, &mut out, false, tags).unwrap();
    rank1.join().unwrap();
    rank2.join().unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "1 0 0 \n0 2 0 \n3 0 0 \n");
}

#[test]
fn overlapping_sender_rows_are_an_ordering_violation() {
    // Rank 1 claims row 1, which the root already emitted.
    let tags = PrintCommTags::from_base(CommTag::new(0x1400));
    let rank1 = std::thread::spawn(move || {
        let comm1 = LocalComm::new(1, 2);
        let a = rank_matrix(&comm1, 3, 3, 1, 2, &[(1, 1, 9.0)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, false, tags).unwrap();
    });

    let comm0 = LocalComm::new(0, 2);
    let a = rank_matrix(&comm0, 3, 3, 0, 2, &[(0, 0, 1.0)]);
    let mut out = Vec::new();
    let err = print_matrix_with_tags(&*a, &comm0, &mut out, false, tags).unwrap_err();
    rank1.join().unwrap();

    assert_eq!(
        err,
        MatrixSieveError::RowOrderViolation {
            rank: 1,
            got: 1,
            expected: 2,
        }
    );
}

#[test]
fn two_rank_sparse_print_roundtrips_through_reinsertion() {
    let tags = PrintCommTags::from_base(CommTag::new(0x1500));
    let rank1 = std::thread::spawn(move || {
        let comm1 = LocalComm::new(1, 2);
        let a = rank_matrix(&comm1, 4, 4, 2, 4, &[(2, 3, 0.125), (3, 1, -7.5)]);
        let mut sink = Vec::new();
        print_matrix_with_tags(&*a, &comm1, &mut sink, true, tags).unwrap();
    });

    let comm0 = LocalComm::new(0, 2);
    let a = rank_matrix(&comm0, 4, 4, 0, 2, &[(0, 0, 1.5), (1, 2, 2.0)]);
    let mut out = Vec::new();
    print_matrix_with_tags(&*a, &comm0, &mut out, true, tags).unwrap();
    rank1.join().unwrap();

    // Re-insert the printed triplets into a fresh serial matrix and compare
    // against the logically global original.
    let serial = LocalComm::new(0, 1);
    let mut b = rank_matrix(&serial, 4, 4, 0, 4, &[]);
    for line in String::from_utf8(out).unwrap().lines() {
        let mut fields = line.split_whitespace();
        let i: usize = fields.next().unwrap().parse().unwrap();
        let j: usize = fields.next().unwrap().parse().unwrap();
        let v: f64 = fields.next().unwrap().parse().unwrap();
        b.add_value(i, j, v).unwrap();
    }

    let expected = [
        (0, 0, 1.5),
        (1, 2, 2.0),
        (2, 3, 0.125),
        (3, 1, -7.5),
    ];
    for i in 0..4 {
        for j in 0..4 {
            let want = expected
                .iter()
                .find(|&&(r, c, _)| r == i && c == j)
                .map_or(0.0, |&(_, _, v)| v);
            assert_eq!(b.entry(i, j), want, "mismatch at ({i}, {j})");
        }
    }
}
