//! Cache-aware matrix transpose kernels.
//!
//! Companion exercise to the simulator: blocked transposes tuned for a 1 KiB
//! direct-mapped cache with 32-byte blocks (eight `i32`s per block, 32 sets).
//! The kernels never construct or consult the simulation engine; the tuning
//! lives entirely in their access patterns.

use std::ops::{Index, IndexMut};

/// `i32`s per cache block of the tuning target.
const INTS_PER_BLOCK: usize = 8;
/// Direct-mapped sets of the tuning target.
const CACHE_SETS: usize = 32;

/// Owned row-major `i32` matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl Matrix {
    /// Builds a zeroed `rows` x `cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Builds a matrix with `f(row, col)` at each position.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> i32,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = i32;

    fn index(&self, (row, col): (usize, usize)) -> &i32 {
        debug_assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut i32 {
        debug_assert!(row < self.rows && col < self.cols);
        &mut self.data[row * self.cols + col]
    }
}

fn check_shapes(a: &Matrix, b: &Matrix) {
    assert!(
        b.rows == a.cols && b.cols == a.rows,
        "transpose of a {}x{} matrix needs a {}x{} destination",
        a.rows,
        a.cols,
        a.cols,
        a.rows
    );
}

/// Simple row-wise scan transpose, the correctness baseline.
pub fn transpose_naive(a: &Matrix, b: &mut Matrix) {
    check_shapes(a, b);
    for i in 0..a.rows {
        for j in 0..a.cols {
            b[(j, i)] = a[(i, j)];
        }
    }
}

/// Cache-aware transpose of `a` into `b`.
///
/// Dispatches on shape: the 32x32 and 64x64 cases get dedicated blocked
/// kernels, everything else a generic one. Output always equals
/// [`transpose_naive`]; only the miss behavior on the tuning target differs.
pub fn transpose(a: &Matrix, b: &mut Matrix) {
    check_shapes(a, b);
    if a.cols == 32 && a.rows == 32 {
        transpose_32(a, b);
    } else if a.cols == 64 && a.rows == 64 {
        transpose_64(a, b);
    } else {
        transpose_generic(a, b);
    }
}

/// 8x8 blocking for 32x32.
///
/// Off-diagonal blocks transpose directly. A diagonal block of `a` shares
/// cache sets with its destination block in `b`, so its two diagonal
/// sub-blocks are staged at swapped positions inside the destination block
/// and put right in a final pass that touches only `b`.
fn transpose_32(a: &Matrix, b: &mut Matrix) {
    const BLOCK: usize = 8;
    const HALF: usize = BLOCK / 2;
    let n = a.rows;
    let m = a.cols;
    for row in (0..n).step_by(BLOCK) {
        for col in (0..m).step_by(BLOCK) {
            if row == col {
                for dr in 0..HALF {
                    let r = row + dr;
                    for dc in 0..HALF {
                        let c = col + dc;
                        b[(c + HALF, r + HALF)] = a[(r, c)];
                    }
                    for dc in HALF..BLOCK {
                        let c = col + dc;
                        b[(c, r)] = a[(r, c)];
                    }
                }
                for dr in HALF..BLOCK {
                    let r = row + dr;
                    for dc in 0..HALF {
                        let c = col + dc;
                        b[(c, r)] = a[(r, c)];
                    }
                    for dc in HALF..BLOCK {
                        let c = col + dc;
                        b[(c - HALF, r - HALF)] = a[(r, c)];
                    }
                }
                // Swap the two staged sub-blocks into their final places.
                for dr in 0..HALF {
                    let r = row + dr;
                    for dc in 0..HALF {
                        let c = col + dc;
                        let tmp = b[(r, c)];
                        b[(r, c)] = b[(r + HALF, c + HALF)];
                        b[(r + HALF, c + HALF)] = tmp;
                    }
                }
            } else {
                for dr in 0..BLOCK.min(n - row) {
                    let r = row + dr;
                    for dc in 0..BLOCK.min(m - col) {
                        let c = col + dc;
                        b[(c, r)] = a[(r, c)];
                    }
                }
            }
        }
    }
}

/// 8x8 blocking for 64x64, staged through spare stripes of `b`.
///
/// At this shape every source row of a block aliases the destination rows in
/// cache. Each block is copied into two 4x8 stripes of `b` that cannot
/// conflict with the lines in flight, then transposed quadrant by quadrant
/// from the stripes into place, so each source line is read only once. Blocks
/// whose stripes would fall outside `b` transpose directly instead.
fn transpose_64(a: &Matrix, b: &mut Matrix) {
    const BLOCK: usize = 8;
    const HALF: usize = BLOCK / 2;
    let n = a.rows;
    let m = a.cols;
    for col in (0..m).step_by(BLOCK) {
        for row in (0..n).step_by(BLOCK) {
            // Pick the stripes: the next two block columns to the right of
            // the destination, skipping any that would alias it, wrapping
            // into the next block row of b when they run off the end.
            let mut c_i = col;
            let mut d_i = col;
            let mut c_j = row + BLOCK;
            let mut d_j = row + 2 * BLOCK;
            if (row + BLOCK) % n == col {
                c_j += BLOCK;
                d_j += BLOCK;
            } else if (row + 2 * BLOCK) % n == col {
                d_j += BLOCK;
            }
            if c_j >= n {
                c_j -= n;
                c_i += BLOCK;
            }
            if d_j >= n {
                d_j -= n;
                d_i += BLOCK;
            }

            let stripes_fit = c_i + HALF <= b.rows
                && d_i + HALF <= b.rows
                && c_j + BLOCK <= b.cols
                && d_j + BLOCK <= b.cols;
            if stripes_fit {
                copy_block(a, (row, col), b, (c_i, c_j), HALF);
                copy_block(a, (row, col + HALF), b, (c_i, c_j + HALF), HALF);
                copy_block(a, (row + HALF, col), b, (d_i, d_j), HALF);
                copy_block(a, (row + HALF, col + HALF), b, (d_i, d_j + HALF), HALF);

                transpose_block_within(b, (c_i, c_j), (col, row), HALF);
                transpose_block_within(b, (d_i, d_j), (col, row + HALF), HALF);
                transpose_block_within(b, (d_i, d_j + HALF), (col + HALF, row + HALF), HALF);
                transpose_block_within(b, (c_i, c_j + HALF), (col + HALF, row), HALF);
            } else {
                transpose_block(a, (row, col), b, (col, row), BLOCK);
            }
        }
    }
}

/// 16x16 blocking for every other shape.
///
/// Within a block row sweep, an element whose source and destination map to
/// the same cache set is held back and written once the sweep no longer needs
/// the source line.
fn transpose_generic(a: &Matrix, b: &mut Matrix) {
    const BLOCK: usize = 16;
    let n = a.rows;
    let m = a.cols;
    for j in (0..m).step_by(BLOCK) {
        for i in (0..n).step_by(BLOCK) {
            for di in 0..BLOCK {
                let mut deferred = [(0usize, 0i32); BLOCK];
                let mut held = 0;
                for dj in 0..BLOCK {
                    if i + di >= n || j + dj >= m {
                        continue;
                    }
                    let src_set = (m * (i + di) + (j + dj)) / INTS_PER_BLOCK % CACHE_SETS;
                    let dst_set = (n * (j + dj) + (i + di)) / INTS_PER_BLOCK % CACHE_SETS;
                    if src_set == dst_set {
                        deferred[held] = (dj, a[(i + di, j + dj)]);
                        held += 1;
                    } else {
                        b[(j + dj, i + di)] = a[(i + di, j + dj)];
                    }
                }
                for &(dj, value) in &deferred[..held] {
                    b[(j + dj, i + di)] = value;
                }
            }
        }
    }
}

/// Copies a `size` x `size` block between matrices.
///
/// Rows go in pairs, the second walked backwards, so the lines the first pass
/// pulled in are still resident. `size` must be even.
fn copy_block(
    src: &Matrix,
    (si, sj): (usize, usize),
    dst: &mut Matrix,
    (di, dj): (usize, usize),
    size: usize,
) {
    for i in (0..size).step_by(2) {
        for j in 0..size {
            dst[(di + i, dj + j)] = src[(si + i, sj + j)];
        }
        for j in (0..size).rev() {
            dst[(di + i + 1, dj + j)] = src[(si + i + 1, sj + j)];
        }
    }
}

/// Transposes a `size` x `size` block between matrices, same row pairing as
/// [`copy_block`]. `size` must be even.
fn transpose_block(
    src: &Matrix,
    (si, sj): (usize, usize),
    dst: &mut Matrix,
    (di, dj): (usize, usize),
    size: usize,
) {
    for i in (0..size).step_by(2) {
        for j in 0..size {
            dst[(di + j, dj + i)] = src[(si + i, sj + j)];
        }
        for j in (0..size).rev() {
            dst[(di + j, dj + i + 1)] = src[(si + i + 1, sj + j)];
        }
    }
}

/// [`transpose_block`] with source and destination in the same matrix; the
/// two regions must not overlap.
fn transpose_block_within(
    m: &mut Matrix,
    (si, sj): (usize, usize),
    (di, dj): (usize, usize),
    size: usize,
) {
    for i in (0..size).step_by(2) {
        for j in 0..size {
            m[(di + j, dj + i)] = m[(si + i, sj + j)];
        }
        for j in (0..size).rev() {
            m[(di + j, dj + i + 1)] = m[(si + i + 1, sj + j)];
        }
    }
}
